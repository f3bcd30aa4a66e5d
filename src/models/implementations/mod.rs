pub mod distilbert;

pub use distilbert::{DistilBertForSequenceClassification, SentimentDistilBertModel};
