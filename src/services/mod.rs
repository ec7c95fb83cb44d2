pub mod embedder;
pub mod extractor;
pub mod fidelity;
pub mod payload_codec;
pub mod pipeline;
pub mod share_store;

pub use embedder::{EmbedError, EmbedReport, Embedder, Placement, ShareSet, MIN_SHARES};
pub use extractor::{extract, extract_bits, extract_from_dir, ExtractError, Extraction};
pub use fidelity::{FidelityError, FidelityReport};
pub use payload_codec::PayloadError;
pub use pipeline::{EmbedOutcome, EmbedRequest, PipelineError, RunStatus, StegoPipeline};
pub use share_store::ShareNaming;
