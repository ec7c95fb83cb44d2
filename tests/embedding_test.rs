//! Embedding invariants: capacity guard, off-payload equivalence and the
//! small worked scenarios.

mod common;

use halftone::{bayer_matrix, ColorMode, Raster, OFF, ON};
use htstego::models::{MethodKind, OutputFormat, StegoConfig};
use htstego::services::payload_codec;
use htstego::services::{extract, Extraction, RunStatus, StegoPipeline};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::{fixtures, TestRun};

#[test]
fn test_payload_too_long_writes_nothing() {
    let run = TestRun::new();
    let cover = fixtures::midtone_cover(4, 4, 1);
    let request = run.request(
        MethodKind::ErrDiff,
        ColorMode::Binary,
        &cover,
        fixtures::payloads::LONG.as_bytes(),
    );

    let outcome = run.run(&request).unwrap();
    assert_eq!(outcome.status, RunStatus::PayloadTooLong);
    assert!(outcome.output_dir.is_none());
    assert!(!run.output_dir().exists(), "Output directory was created");
}

#[test]
fn test_no_output_files() {
    let mut run = TestRun::new();
    run.config.write_shares = false;
    let cover = fixtures::midtone_cover(16, 16, 1);
    let request = run.request(MethodKind::Ordered, ColorMode::Binary, &cover, b"x");

    let outcome = run.run(&request).unwrap();
    common::assert_run_ok(&outcome);
    assert!(outcome.output_dir.is_none());
    assert!(!run.output_dir().exists());
}

#[test]
fn test_shares_diverge_only_at_payload_bits() {
    let pipeline = StegoPipeline::new(StegoConfig::default());
    let run = TestRun::new();
    let cover = fixtures::midtone_cover(32, 32, 3);
    let payload = b"abc";
    let bits = payload_codec::encode(payload, false).len();

    for method in MethodKind::ALL {
        for color in [ColorMode::Binary, ColorMode::Color] {
            let request = run.request(method, color, &cover, payload);
            let halftoner = pipeline.validate(&request).unwrap();
            let mut rng = StdRng::seed_from_u64(11);
            let outcome = pipeline
                .embed_cover(&request, &halftoner, &cover, payload, &mut rng)
                .unwrap();
            common::assert_run_ok(&outcome);
            let set = outcome.share_set.unwrap();
            assert_eq!(set.report.placements.len(), bits);
            match method {
                MethodKind::Pattern => common::assert_cell_divergence(&set, bits),
                _ => common::assert_sample_divergence(&set, bits),
            }
        }
    }
}

#[test]
fn test_mid_gray_forward_kernel_scenario() {
    let pipeline = StegoPipeline::new(StegoConfig::default());
    let run = TestRun::new();
    let cover = fixtures::mid_gray(8, 8);
    let mut request = run.request(
        MethodKind::ErrDiff,
        ColorMode::Binary,
        &cover,
        fixtures::payloads::ONE_BIT,
    );
    request.kernel = Some("forward".to_string());

    let halftoner = pipeline.validate(&request).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let outcome = pipeline
        .embed_cover(&request, &halftoner, &cover, fixtures::payloads::ONE_BIT, &mut rng)
        .unwrap();
    common::assert_run_ok(&outcome);
    let set = outcome.share_set.unwrap();

    // 128/255 sits just above one half: every row starts on and alternates
    for y in 0..8 {
        let row: Vec<u8> = (0..8).map(|x| set.reference.get(y, x, 0)).collect();
        assert_eq!(row, vec![ON, OFF, ON, OFF, ON, OFF, ON, OFF]);
    }

    // 64 units for 8 bits: one row per bit, one divergent sample each
    assert_eq!(set.report.block_size, 8);
    assert_eq!(set.report.skipped_blocks, 0);
    common::assert_sample_divergence(&set, 8);
    for placement in &set.report.placements {
        assert_eq!(placement.unit / 8, placement.bit_index);
    }

    assert_eq!(
        extract(&set.shares, MethodKind::ErrDiff.layout()).unwrap(),
        Extraction::Recovered("\u{1}".to_string())
    );
}

#[test]
fn test_ramp_ordered_scenario() {
    let pipeline = StegoPipeline::new(StegoConfig::default());
    let run = TestRun::new();
    let ramp = [0u8, 64, 128, 192];
    let cover = Raster::from_fn(4, 4, 1, |y, _, _| ramp[y]);
    let mut request = run.request(MethodKind::Ordered, ColorMode::Binary, &cover, b"A");
    request.bayer_size = 2;

    // Levels are fixed by the threshold comparison before any embedding
    let matrix = bayer_matrix(2).unwrap();
    let halftoner = pipeline.validate(&request).unwrap();
    let reference = halftoner.render(&cover).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            let value = ramp[y] as f64 / 255.0;
            let expected = if value > matrix[x % 2][y % 2] { ON } else { OFF };
            assert_eq!(reference.get(y, x, 0), expected, "({}, {})", y, x);
        }
    }

    // Row 0 is all off and cannot carry the leading 0 bits of 'A', so the
    // eight two-sample blocks run out after six bits
    let mut rng = StdRng::seed_from_u64(9);
    let outcome = pipeline
        .embed_cover(&request, &halftoner, &cover, b"A", &mut rng)
        .unwrap();
    assert_eq!(outcome.status, RunStatus::CapacityExhausted);
    assert!(outcome.share_set.is_none());
}

#[test]
fn test_record_format_parity() {
    let run = TestRun::new();
    let cover = fixtures::midtone_cover(16, 16, 3);
    let request = run.request(MethodKind::ErrDiff, ColorMode::Color, &cover, b"hi");
    let outcome = run.run(&request).unwrap();
    let record = outcome.record();

    let csv = record.render(OutputFormat::Csv);
    let json: serde_json::Value = serde_json::from_str(&record.render(OutputFormat::Json)).unwrap();
    let xml = record.render(OutputFormat::Xml);

    let mut lines = csv.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    let values: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(header, record.names().collect::<Vec<_>>());

    for (i, (name, value)) in record.fields().iter().enumerate() {
        let text = value.to_string();
        assert_eq!(values[i], text, "CSV value of {}", name);
        let json_text = match &json[name.as_str()] {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        assert_eq!(json_text, text, "JSON value of {}", name);
        assert!(
            xml.contains(&format!("<{name}>{text}</{name}>")),
            "XML value of {}",
            name
        );
    }
    assert_eq!(json["errdiff_kernel"], "floyd");
    assert_eq!(json["bayer_size"], "N/A");
}
