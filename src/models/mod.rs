pub mod implementations;

pub use implementations::distilbert::{Config as DistilBertConfig, HiddenAct};
pub use implementations::{DistilBertForSequenceClassification, SentimentDistilBertModel};
