pub mod sentiment_analysis_pipeline;
pub mod utils;

use crate::core::Result;

pub use sentiment_analysis_pipeline::*;

/// Anything that can label a single review.
///
/// The analysis code only depends on this trait, so a loaded
/// [`SentimentAnalysisPipeline`] and a test double are interchangeable.
pub trait SentimentClassifier {
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// The closed set of labels `classify` may return.
    fn labels(&self) -> Vec<String>;
}

impl<C: SentimentClassifier + ?Sized> SentimentClassifier for &C {
    fn classify(&self, text: &str) -> Result<Prediction> {
        (**self).classify(text)
    }

    fn labels(&self) -> Vec<String> {
        (**self).labels()
    }
}
