//! Diffusion kernel assets with embedded fallbacks
//!
//! Kernels are small text files named `<kernel>.txt`:
//!
//! - If no kernels directory is configured: use the embedded set only
//! - If a directory is configured: files there override embedded kernels
//!   with the same name and add new ones

use halftone::Kernel;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Embedded kernel definitions
#[derive(RustEmbed)]
#[folder = "kernels/"]
#[include = "*.txt"]
struct EmbeddedKernels;

const KERNEL_EXT: &str = ".txt";

/// Kernel names are plain file stems: ASCII alphanumerics, `_` and `-`.
fn is_valid_kernel_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Kernel loader with optional filesystem override
#[derive(Debug, Clone, Default)]
pub struct KernelStore {
    /// External kernels directory (from HTSTEGO_KERNELS_DIR or config)
    kernels_dir: Option<PathBuf>,
}

impl KernelStore {
    /// Create a kernel store.
    ///
    /// `kernels_dir` should be `Some` only if a directory was configured.
    pub fn new(kernels_dir: Option<PathBuf>) -> Self {
        Self { kernels_dir }
    }

    pub fn kernels_dir(&self) -> Option<&PathBuf> {
        self.kernels_dir.as_ref()
    }

    /// Read the raw kernel text for `name`.
    pub fn read_kernel(&self, name: &str) -> Result<Cow<'static, [u8]>, ConfigError> {
        if !is_valid_kernel_name(name) {
            return Err(ConfigError::InvalidKernelName(name.to_string()));
        }
        let file_name = format!("{}{}", name, KERNEL_EXT);

        if let Some(ref dir) = self.kernels_dir {
            let full_path = dir.join(&file_name);
            if full_path.exists() {
                tracing::trace!(path = %full_path.display(), "Loading kernel from filesystem");
                return fs::read(&full_path)
                    .map(Cow::Owned)
                    .map_err(|source| ConfigError::KernelIo {
                        name: name.to_string(),
                        source,
                    });
            }
        }

        EmbeddedKernels::get(&file_name)
            .map(|f| {
                tracing::trace!(kernel = %name, "Loading kernel from embedded assets");
                f.data
            })
            .ok_or_else(|| ConfigError::UnknownKernel(name.to_string()))
    }

    /// Load and validate the kernel called `name`.
    pub fn load(&self, name: &str) -> Result<Kernel, ConfigError> {
        let bytes = self.read_kernel(name)?;
        let text = String::from_utf8_lossy(&bytes);
        Kernel::parse(name, &text).map_err(|source| ConfigError::Kernel {
            name: name.to_string(),
            source,
        })
    }

    /// Names of all available kernels, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: HashSet<String> = EmbeddedKernels::iter()
            .filter_map(|f| f.strip_suffix(KERNEL_EXT).map(str::to_string))
            .collect();

        if let Some(ref dir) = self.kernels_dir {
            if let Ok(entries) = fs::read_dir(dir) {
                for entry in entries.flatten() {
                    if let Some(name) = entry.file_name().to_str() {
                        if let Some(stem) = name.strip_suffix(KERNEL_EXT) {
                            if is_valid_kernel_name(stem) {
                                names.insert(stem.to_string());
                            }
                        }
                    }
                }
            }
        }

        let mut result: Vec<_> = names.into_iter().collect();
        result.sort();
        result
    }
}
