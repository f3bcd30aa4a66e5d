#![allow(dead_code)]

use rust_xlsxwriter::Workbook;
use sentiment_analyzer::core::{AnalyzerError, Result};
use sentiment_analyzer::pipelines::{Prediction, SentimentClassifier};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Writes a one-sheet workbook: `header` on row 0, then `rows`.
pub fn write_xlsx(dir: &Path, name: &str, header: &[&str], rows: &[Vec<&str>]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, title) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *title).unwrap();
    }
    for (row, cells) in rows.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            worksheet
                .write_string(row as u32 + 1, col as u16, *cell)
                .unwrap();
        }
    }

    workbook.save(&path).unwrap();
    path
}

/// Reviews-only workbook.
pub fn write_reviews(dir: &Path, reviews: &[&str]) -> PathBuf {
    let rows: Vec<Vec<&str>> = reviews.iter().map(|review| vec![*review]).collect();
    write_xlsx(dir, "reviews.xlsx", &["Reviews"], &rows)
}

/// Labels a review NEGATIVE when it mentions a complaint word, POSITIVE otherwise.
pub struct KeywordClassifier;

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let lower = text.to_lowercase();
        let negative = ["bad", "awful", "cold", "rude", "broken", "never"]
            .iter()
            .any(|word| lower.contains(word));
        Ok(Prediction {
            label: if negative { "NEGATIVE" } else { "POSITIVE" }.to_string(),
            score: 0.9,
        })
    }

    fn labels(&self) -> Vec<String> {
        vec!["NEGATIVE".to_string(), "POSITIVE".to_string()]
    }
}

/// Counts calls and fails on the given (1-based) call.
pub struct FailingClassifier {
    pub fail_on: usize,
    pub calls: Cell<usize>,
}

impl FailingClassifier {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }
}

impl SentimentClassifier for FailingClassifier {
    fn classify(&self, text: &str) -> Result<Prediction> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call == self.fail_on {
            return Err(AnalyzerError::Tokenization(format!("cannot encode {text:?}")));
        }
        KeywordClassifier.classify(text)
    }

    fn labels(&self) -> Vec<String> {
        KeywordClassifier.labels()
    }
}
