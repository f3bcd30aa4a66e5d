pub mod analysis;
pub mod chart;
pub mod core;
pub mod loaders;
pub mod models;
pub mod pipelines;
pub mod report;
pub mod reviews;

// Re-export core types
pub use core::{AnalyzerConfig, AnalyzerError, Result};

// Re-export the Analyze operation and its outputs
pub use analysis::{analyze, analyze_table, Analysis, AnalyzeOptions, SentimentDistribution};
pub use chart::{PieChart, SentimentPalette};
pub use reviews::ReviewTable;

// Re-export pipeline types for easier access
pub use pipelines::{
    Prediction, SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder, SentimentClassifier,
};
pub use models::SentimentDistilBertModel;
