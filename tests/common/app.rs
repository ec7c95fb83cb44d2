//! Test run factory for integration tests.

use std::path::{Path, PathBuf};

use halftone::{ColorMode, Raster};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use htstego::models::{MethodKind, StegoConfig};
use htstego::rendering::save_png;
use htstego::services::{EmbedOutcome, EmbedRequest, PipelineError, StegoPipeline};

/// Scratch workspace holding a cover, a payload and the output directory
pub struct TestRun {
    dir: TempDir,
    pub config: StegoConfig,
}

impl TestRun {
    /// Create a workspace whose run directories land in a temp dir
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = StegoConfig {
            output_dir: dir.path().join("output"),
            seed: Some(42),
            ..StegoConfig::default()
        };
        Self { dir, config }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.config.output_dir.clone()
    }

    /// Write `cover` as `cover.png` and return its path
    pub fn write_cover(&self, cover: &Raster) -> PathBuf {
        let path = self.dir.path().join("cover.png");
        save_png(&path, cover).expect("Failed to write cover");
        path
    }

    /// Write `payload` as `payload.txt` and return its path
    pub fn write_payload(&self, payload: &[u8]) -> PathBuf {
        let path = self.dir.path().join("payload.txt");
        std::fs::write(&path, payload).expect("Failed to write payload");
        path
    }

    /// Build a request for `method` over freshly written inputs
    pub fn request(
        &self,
        method: MethodKind,
        color: ColorMode,
        cover: &Raster,
        payload: &[u8],
    ) -> EmbedRequest {
        EmbedRequest {
            method,
            cover: self.write_cover(cover),
            payload: self.write_payload(payload),
            share_count: 4,
            kernel: Some("floyd".to_string()),
            bayer_size: 8,
            color,
        }
    }

    /// Run the full pipeline with a seeded RNG
    pub fn run(&self, request: &EmbedRequest) -> Result<EmbedOutcome, PipelineError> {
        let pipeline = StegoPipeline::new(self.config.clone());
        let mut rng = StdRng::seed_from_u64(self.config.seed.unwrap_or(0));
        pipeline.run_with_rng(request, &mut rng)
    }
}
