//! Data models shared across the pipeline.

pub mod config;
pub mod record;
pub mod sheet;
pub mod value;

pub use config::OnboardConfig;
pub use record::{CanonicalRecord, RawFieldMap};
pub use sheet::Sheet;
pub use value::Value;
