use super::model::SentimentAnalysisModel;
use crate::core::Result;
use crate::pipelines::SentimentClassifier;
use serde::Serialize;
use tokenizers::Tokenizer;

/// A sentiment prediction with label and confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The predicted sentiment (e.g. "POSITIVE", "NEGATIVE").
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Classifies text sentiment with a pretrained model.
///
/// Construct with [`SentimentAnalysisPipelineBuilder`](super::SentimentAnalysisPipelineBuilder).
///
/// ```rust,no_run
/// use sentiment_analyzer::pipelines::sentiment_analysis_pipeline::*;
///
/// # fn main() -> sentiment_analyzer::core::Result<()> {
/// let pipeline = SentimentAnalysisPipelineBuilder::sst2().cpu().build()?;
/// let prediction = pipeline.predict("Arrived broken and support never answered.")?;
/// assert_eq!(prediction.label, "NEGATIVE");
/// # Ok(())
/// # }
/// ```
pub struct SentimentAnalysisPipeline<M: SentimentAnalysisModel> {
    pub(crate) model: M,
    pub(crate) tokenizer: Tokenizer,
}

impl<M: SentimentAnalysisModel> SentimentAnalysisPipeline<M> {
    pub fn predict(&self, text: &str) -> Result<Prediction> {
        self.model.predict(&self.tokenizer, text)
    }

    /// One result per input, in input order.
    pub fn predict_batch(&self, texts: &[&str]) -> Vec<Result<Prediction>> {
        self.model.predict_batch(&self.tokenizer, texts)
    }

    pub fn labels(&self) -> Vec<String> {
        self.model.labels()
    }

    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: SentimentAnalysisModel> SentimentClassifier for SentimentAnalysisPipeline<M> {
    fn classify(&self, text: &str) -> Result<Prediction> {
        self.predict(text)
    }

    fn labels(&self) -> Vec<String> {
        self.model.labels()
    }
}
