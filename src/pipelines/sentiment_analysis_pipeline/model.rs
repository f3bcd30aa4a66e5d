use super::pipeline::Prediction;
use crate::core::Result;
use tokenizers::Tokenizer;

pub trait SentimentAnalysisModel {
    type Options: std::fmt::Debug + Clone;

    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    fn predict(&self, tokenizer: &Tokenizer, text: &str) -> Result<Prediction>;

    fn predict_batch(&self, tokenizer: &Tokenizer, texts: &[&str]) -> Vec<Result<Prediction>> {
        texts
            .iter()
            .map(|text| self.predict(tokenizer, text))
            .collect()
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// Every label `predict` can return, in class id order.
    fn labels(&self) -> Vec<String>;

    fn device(&self) -> &candle_core::Device;
}
