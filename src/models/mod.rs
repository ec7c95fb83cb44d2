pub mod config;
pub mod method;
pub mod record;

pub use config::{StegoConfig, DEFAULT_MAX_ATTEMPTS};
pub use method::{MethodKind, UnitLayout};
pub use record::{format_real, FieldValue, OutputFormat, ResultRecord, NOT_APPLICABLE, XML_ROOT};
