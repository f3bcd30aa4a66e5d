pub mod cache;
pub mod config;
pub mod error;

pub use cache::{global_cache, ModelCache, ModelOptions};
pub use config::{AnalyzerConfig, ChartConfig, ModelConfig};
pub use error::{AnalyzerError, Result};
