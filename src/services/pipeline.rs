use std::fmt;
use std::path::PathBuf;

use halftone::{bayer, ColorMode, HalftoneError, HalftoneMethod, Halftoner, Raster};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::KernelStore;
use crate::error::{CodecError, ConfigError};
use crate::models::{FieldValue, MethodKind, ResultRecord, StegoConfig};
use crate::rendering::load_png;
use crate::services::embedder::{EmbedError, Embedder, ShareSet, MIN_SHARES};
use crate::services::fidelity::{self, FidelityError, FidelityReport};
use crate::services::payload_codec;
use crate::services::share_store::{create_run_dir, write_share_set, ShareNaming};

/// One embedding run as requested on the command line.
#[derive(Debug, Clone)]
pub struct EmbedRequest {
    pub method: MethodKind,
    pub cover: PathBuf,
    pub payload: PathBuf,
    pub share_count: usize,
    /// Diffusion kernel name, required for error diffusion
    pub kernel: Option<String>,
    /// Bayer matrix size, used by ordered dithering
    pub bayer_size: usize,
    pub color: ColorMode,
}

/// Outcome of an embedding run as reported in the result record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    PayloadTooLong,
    PayloadEmpty,
    CapacityExhausted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::PayloadTooLong => "payload too long",
            RunStatus::PayloadEmpty => "payload is empty",
            RunStatus::CapacityExhausted => "embedding capacity exhausted",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from the embedding pipeline
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image error: {0}")]
    Codec(#[from] CodecError),

    #[error("Cannot halftone cover: {0}")]
    Halftone(#[from] HalftoneError),

    #[error("Failed to read payload '{path}': {source}")]
    Payload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fidelity evaluation failed: {0}")]
    Fidelity(#[from] FidelityError),
}

/// Result of one embedding run.
#[derive(Debug, Clone)]
pub struct EmbedOutcome {
    pub request: EmbedRequest,
    pub status: RunStatus,
    pub compress_payload: bool,
    /// Present only when `status` is [`RunStatus::Ok`]
    pub share_set: Option<ShareSet>,
    pub fidelity: Option<FidelityReport>,
    /// Run directory, if files were written
    pub output_dir: Option<PathBuf>,
}

impl EmbedOutcome {
    /// Flat result record in the fixed field order.
    pub fn record(&self) -> ResultRecord {
        let request = &self.request;
        let mut record = ResultRecord::new();
        record
            .push("status", FieldValue::text(self.status.as_str()))
            .push("halftoning_method", FieldValue::text(request.method.as_str()))
            .push(
                "errdiff_kernel",
                match request.method {
                    MethodKind::ErrDiff => FieldValue::optional(request.kernel.clone()),
                    _ => FieldValue::NotApplicable,
                },
            )
            .push(
                "bayer_size",
                match request.method {
                    MethodKind::Ordered => FieldValue::Integer(request.bayer_size as i64),
                    _ => FieldValue::NotApplicable,
                },
            )
            .push("output_color", FieldValue::text(request.color.as_str()))
            .push(
                "number_of_shares",
                FieldValue::Integer(request.share_count as i64),
            )
            .push(
                "cover_file",
                FieldValue::text(request.cover.display().to_string()),
            )
            .push(
                "payload_file",
                FieldValue::text(request.payload.display().to_string()),
            )
            .push("payload_compression", FieldValue::Flag(self.compress_payload));

        let metric = |f: fn(&FidelityReport) -> Option<f64>| {
            self.fidelity
                .as_ref()
                .and_then(f)
                .map_or(FieldValue::NotApplicable, FieldValue::Real)
        };
        record
            .push("avg_snr", metric(|r| Some(r.avg_snr)))
            .push("avg_psnr", metric(|r| Some(r.avg_psnr)))
            .push("avg_ssim", metric(|r| r.avg_ssim));
        record
    }
}

/// Validates requests and runs cover → halftone → embed → store.
pub struct StegoPipeline {
    config: StegoConfig,
    kernels: KernelStore,
}

impl StegoPipeline {
    pub fn new(config: StegoConfig) -> Self {
        let kernels = KernelStore::new(config.kernels_dir.clone());
        Self { config, kernels }
    }

    pub fn config(&self) -> &StegoConfig {
        &self.config
    }

    pub fn kernels(&self) -> &KernelStore {
        &self.kernels
    }

    /// Check everything that can be checked without touching the cover
    /// and build the halftoner for the request.
    pub fn validate(&self, request: &EmbedRequest) -> Result<Halftoner, ConfigError> {
        if request.share_count < MIN_SHARES {
            return Err(ConfigError::TooFewShares {
                requested: request.share_count,
                minimum: MIN_SHARES,
            });
        }

        let method = match request.method {
            MethodKind::ErrDiff => {
                let name = request.kernel.as_deref().ok_or(ConfigError::MissingKernel)?;
                HalftoneMethod::ErrorDiffusion(self.kernels.load(name)?)
            }
            MethodKind::Ordered => {
                bayer::validate_size(request.bayer_size)?;
                HalftoneMethod::Ordered {
                    bayer_size: request.bayer_size,
                }
            }
            MethodKind::Pattern => HalftoneMethod::Pattern,
        };
        Ok(Halftoner::new(method).mode(request.color))
    }

    /// Halftone `cover` with a halftoner from [`validate`](Self::validate)
    /// and embed `payload` in memory. Nothing is written.
    pub fn embed_cover<R: Rng + ?Sized>(
        &self,
        request: &EmbedRequest,
        halftoner: &Halftoner,
        cover: &Raster,
        payload: &[u8],
        rng: &mut R,
    ) -> Result<EmbedOutcome, PipelineError> {
        let reference = halftoner.render(cover)?;
        tracing::debug!(
            method = %request.method,
            color = %request.color,
            width = reference.width(),
            height = reference.height(),
            "Cover halftoned"
        );

        let bits = payload_codec::encode(payload, self.config.compress_payload);
        let embedder = Embedder::new(request.share_count)
            .map_err(|_| ConfigError::TooFewShares {
                requested: request.share_count,
                minimum: MIN_SHARES,
            })?
            .max_attempts(self.config.max_attempts);

        let mut outcome = EmbedOutcome {
            request: request.clone(),
            status: RunStatus::Ok,
            compress_payload: self.config.compress_payload,
            share_set: None,
            fidelity: None,
            output_dir: None,
        };

        match embedder.embed(&reference, request.method.layout(), &bits, rng) {
            Ok(share_set) => {
                outcome.fidelity = Some(fidelity::evaluate(
                    &share_set.reference,
                    &share_set.shares,
                )?);
                outcome.share_set = Some(share_set);
            }
            Err(e) => {
                tracing::warn!(%e, "Embedding failed");
                outcome.status = match e {
                    EmbedError::EmptyPayload => RunStatus::PayloadEmpty,
                    EmbedError::PayloadTooLong { .. } => RunStatus::PayloadTooLong,
                    EmbedError::CapacityExhausted { .. } => RunStatus::CapacityExhausted,
                    EmbedError::TooFewShares { requested, minimum } => {
                        return Err(ConfigError::TooFewShares { requested, minimum }.into())
                    }
                };
            }
        }
        Ok(outcome)
    }

    /// Full run with the configured seed, or an entropy-seeded RNG.
    pub fn run(&self, request: &EmbedRequest) -> Result<EmbedOutcome, PipelineError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run_with_rng(request, &mut rng)
    }

    /// Validate, load inputs, embed and write the share set.
    ///
    /// Files are only written when embedding succeeded.
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        request: &EmbedRequest,
        rng: &mut R,
    ) -> Result<EmbedOutcome, PipelineError> {
        let halftoner = self.validate(request)?;

        let cover = load_png(&request.cover)?;
        let payload = std::fs::read(&request.payload).map_err(|source| PipelineError::Payload {
            path: request.payload.clone(),
            source,
        })?;
        tracing::info!(
            cover = %request.cover.display(),
            payload_bytes = payload.len(),
            shares = request.share_count,
            "Starting embedding run"
        );

        let mut outcome = self.embed_cover(request, &halftoner, &cover, &payload, rng)?;

        if let Some(share_set) = &outcome.share_set {
            if self.config.write_shares {
                let dir = create_run_dir(&self.config.output_dir)?;
                let naming = self.naming(request, payload.len());
                let reference = self
                    .config
                    .write_reference
                    .then_some(&share_set.reference);
                write_share_set(&dir, &naming, &share_set.shares, reference)?;
                outcome.output_dir = Some(dir);
            }
        }
        Ok(outcome)
    }

    fn naming(&self, request: &EmbedRequest, payload_bytes: usize) -> ShareNaming {
        let param = match request.method {
            MethodKind::ErrDiff => request.kernel.clone(),
            MethodKind::Ordered => Some(format!("bayer{}", request.bayer_size)),
            MethodKind::Pattern => None,
        };
        ShareNaming::new(
            &request.cover,
            request.method,
            request.color,
            payload_bytes,
            param,
        )
    }
}
