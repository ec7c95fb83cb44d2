//! Share-set storage: run directories, file naming and share discovery.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use halftone::{ColorMode, Raster};
use regex::Regex;

use crate::error::CodecError;
use crate::models::MethodKind;
use crate::rendering::save_png;

const RUN_DIR_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Builds the file names of one share set.
///
/// Shares are `{stem}_ht{method}{col}_stego_msg{bytes}_{i}of{n}[_{param}].png`,
/// the reference is `{stem}_ht{method}{col}_regular[_{param}].png`.
#[derive(Debug, Clone)]
pub struct ShareNaming {
    stem: String,
    method: MethodKind,
    color: ColorMode,
    payload_bytes: usize,
    param: Option<String>,
}

impl ShareNaming {
    pub fn new(
        cover: &Path,
        method: MethodKind,
        color: ColorMode,
        payload_bytes: usize,
        param: Option<String>,
    ) -> Self {
        let stem = cover
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "cover".to_string());
        Self {
            stem,
            method,
            color,
            payload_bytes,
            param,
        }
    }

    fn prefix(&self) -> String {
        format!(
            "{}_ht{}{}",
            self.stem,
            self.method.file_tag(),
            self.color.short_tag()
        )
    }

    fn suffix(&self) -> String {
        match &self.param {
            Some(param) => format!("_{}.png", param),
            None => ".png".to_string(),
        }
    }

    /// File name of share `index` (1-based) out of `count`.
    pub fn share_name(&self, index: usize, count: usize) -> String {
        format!(
            "{}_stego_msg{}_{}of{}{}",
            self.prefix(),
            self.payload_bytes,
            index,
            count,
            self.suffix()
        )
    }

    pub fn reference_name(&self) -> String {
        format!("{}_regular{}", self.prefix(), self.suffix())
    }
}

/// Create `{output_dir}/{timestamp}-{k}` with the next free `k` for the
/// current second.
pub fn create_run_dir(output_dir: &Path) -> io::Result<PathBuf> {
    let stamp = chrono::Local::now().format(RUN_DIR_FORMAT).to_string();
    create_run_dir_with_stamp(output_dir, &stamp)
}

fn create_run_dir_with_stamp(output_dir: &Path, stamp: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(output_dir)?;

    let prefix = format!("{}-", stamp);
    let mut next = 0usize;
    for entry in fs::read_dir(output_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(k) = name
            .strip_prefix(&prefix)
            .and_then(|rest| rest.parse::<usize>().ok())
        {
            next = next.max(k + 1);
        }
    }

    let dir = output_dir.join(format!("{}{}", prefix, next));
    fs::create_dir(&dir)?;
    tracing::debug!(dir = %dir.display(), "Created run directory");
    Ok(dir)
}

/// Write the stego shares and, if given, the reference halftone into
/// `dir`. Returns the written paths, shares first.
pub fn write_share_set(
    dir: &Path,
    naming: &ShareNaming,
    shares: &[Raster],
    reference: Option<&Raster>,
) -> Result<Vec<PathBuf>, CodecError> {
    let count = shares.len();
    let mut written = Vec::with_capacity(count + 1);
    for (i, share) in shares.iter().enumerate() {
        let path = dir.join(naming.share_name(i + 1, count));
        save_png(&path, share)?;
        written.push(path);
    }
    if let Some(reference) = reference {
        let path = dir.join(naming.reference_name());
        save_png(&path, reference)?;
        written.push(path);
    }
    tracing::info!(files = written.len(), dir = %dir.display(), "Share set written");
    Ok(written)
}

/// Every `*.png` file directly inside `dir`, sorted by name.
pub fn list_share_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false);
        if is_png && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"_(\d+)of(\d+)").expect("share marker pattern is valid"))
}

/// Parse the `{i}of{n}` marker of a share file name.
pub fn parse_share_marker(name: &str) -> Option<(usize, usize)> {
    let caps = marker_regex().captures(name)?;
    let index = caps.get(1)?.as_str().parse().ok()?;
    let count = caps.get(2)?.as_str().parse().ok()?;
    Some((index, count))
}

/// Warn when the share markers in `files` do not describe one complete
/// set. Returns `false` if a problem was found.
pub fn check_share_set(files: &[PathBuf]) -> bool {
    let markers: Vec<(usize, usize)> = files
        .iter()
        .filter_map(|p| p.file_name())
        .filter_map(|n| parse_share_marker(&n.to_string_lossy()))
        .collect();

    if markers.is_empty() {
        return true;
    }
    if markers.len() != files.len() {
        tracing::warn!(
            files = files.len(),
            marked = markers.len(),
            "Share directory contains files without a share marker"
        );
        return false;
    }

    let expected = markers[0].1;
    if markers.iter().any(|&(_, n)| n != expected) {
        tracing::warn!("Share files disagree on the share count");
        return false;
    }
    if markers.len() != expected {
        tracing::warn!(
            found = markers.len(),
            expected,
            "Share set looks incomplete"
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use halftone::ON;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn naming(param: Option<&str>) -> ShareNaming {
        ShareNaming::new(
            Path::new("covers/lena.png"),
            MethodKind::ErrDiff,
            ColorMode::Binary,
            12,
            param.map(str::to_string),
        )
    }

    #[test]
    fn test_share_names() {
        let naming = naming(Some("floyd"));
        assert_eq!(
            naming.share_name(2, 4),
            "lena_hterrdiffbin_stego_msg12_2of4_floyd.png"
        );
        assert_eq!(naming.reference_name(), "lena_hterrdiffbin_regular_floyd.png");
    }

    #[test]
    fn test_pattern_names_without_param() {
        let naming = ShareNaming::new(
            Path::new("cat.png"),
            MethodKind::Pattern,
            ColorMode::Color,
            3,
            None,
        );
        assert_eq!(naming.share_name(1, 3), "cat_htpatcol_stego_msg3_1of3.png");
        assert_eq!(naming.reference_name(), "cat_htpatcol_regular.png");
    }

    #[test]
    fn test_run_dir_counter() {
        let tmp = tempdir().unwrap();
        let stamp = "2024-01-02-03-04-05";
        let first = create_run_dir_with_stamp(tmp.path(), stamp).unwrap();
        let second = create_run_dir_with_stamp(tmp.path(), stamp).unwrap();
        assert_eq!(first.file_name().unwrap(), "2024-01-02-03-04-05-0");
        assert_eq!(second.file_name().unwrap(), "2024-01-02-03-04-05-1");
        let other = create_run_dir_with_stamp(tmp.path(), "2024-01-02-03-04-06").unwrap();
        assert_eq!(other.file_name().unwrap(), "2024-01-02-03-04-06-0");
    }

    #[test]
    fn test_create_run_dir_makes_parents() {
        let tmp = tempdir().unwrap();
        let dir = create_run_dir(&tmp.path().join("nested/output")).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_write_and_list() {
        let tmp = tempdir().unwrap();
        let naming = naming(None);
        let shares = vec![Raster::from_fn(4, 4, 1, |_, _, _| ON); 3];
        let written =
            write_share_set(tmp.path(), &naming, &shares, Some(&shares[0])).unwrap();
        assert_eq!(written.len(), 4);
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let listed = list_share_files(tmp.path()).unwrap();
        let names: Vec<String> = listed
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "lena_hterrdiffbin_regular.png",
                "lena_hterrdiffbin_stego_msg12_1of3.png",
                "lena_hterrdiffbin_stego_msg12_2of3.png",
                "lena_hterrdiffbin_stego_msg12_3of3.png",
            ]
        );
    }

    #[test]
    fn test_list_missing_dir() {
        let tmp = tempdir().unwrap();
        assert!(list_share_files(&tmp.path().join("absent")).is_err());
    }

    #[test]
    fn test_parse_share_marker() {
        assert_eq!(
            parse_share_marker("x_hterrdiffbin_stego_msg5_3of4_floyd.png"),
            Some((3, 4))
        );
        assert_eq!(parse_share_marker("x_hterrdiffbin_regular.png"), None);
    }

    #[test]
    fn test_check_share_set() {
        let complete: Vec<PathBuf> = (1..=3)
            .map(|i| PathBuf::from(format!("a_stego_msg1_{}of3.png", i)))
            .collect();
        assert!(check_share_set(&complete));
        assert!(!check_share_set(&complete[..2]));

        let mut mixed = complete.clone();
        mixed.push(PathBuf::from("a_regular.png"));
        assert!(!check_share_set(&mixed));

        let unmarked = vec![PathBuf::from("a.png"), PathBuf::from("b.png")];
        assert!(check_share_set(&unmarked));
    }
}
