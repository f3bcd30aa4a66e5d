//! Sentiment analysis pipeline for classifying review text.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - Tokenizer + model, one prediction per text
//! - [`SentimentAnalysisPipelineBuilder`] - Builder pattern for pipeline configuration
//! - [`SentimentAnalysisModel`] - Trait for sentiment analysis model implementations
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_analyzer::pipelines::sentiment_analysis_pipeline::*;
//!
//! # fn main() -> sentiment_analyzer::core::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::sst2().build()?;
//!
//! let result = pipeline.predict("I love this product!")?;
//! println!("Sentiment: {} (confidence: {:.2})", result.label, result.score);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod model;
pub mod pipeline;

pub use builder::SentimentAnalysisPipelineBuilder;
pub use model::SentimentAnalysisModel;
pub use pipeline::{Prediction, SentimentAnalysisPipeline};

pub use crate::loaders::ModelSource;
pub use crate::models::SentimentDistilBertModel;
