//! The Analyze operation: read a review file, label every row, tabulate the labels and
//! build the distribution chart.
//!
//! ```rust,no_run
//! use sentiment_analyzer::analysis::{analyze, AnalyzeOptions};
//! use sentiment_analyzer::pipelines::SentimentAnalysisPipelineBuilder;
//! use std::path::Path;
//!
//! # fn main() -> sentiment_analyzer::core::Result<()> {
//! let classifier = SentimentAnalysisPipelineBuilder::sst2().build()?;
//! let analysis = analyze(
//!     Some(Path::new("reviews.xlsx")),
//!     &classifier,
//!     &AnalyzeOptions::default(),
//! )?;
//! for entry in analysis.distribution.counts() {
//!     println!("{}: {}", entry.label, entry.count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod distribution;

pub use distribution::{format_percentage, LabelCount, SentimentDistribution};

use crate::chart::{PieChart, SentimentPalette};
use crate::core::config::{DEFAULT_CHART_TITLE, DEFAULT_REVIEW_COLUMN, DEFAULT_SENTIMENT_COLUMN};
use crate::core::{AnalyzerConfig, AnalyzerError, Result};
use crate::pipelines::SentimentClassifier;
use crate::reviews::{read_table, ReviewTable};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub review_column: String,
    pub sentiment_column: String,
    pub sheet: Option<String>,
    pub chart_title: String,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            review_column: DEFAULT_REVIEW_COLUMN.to_string(),
            sentiment_column: DEFAULT_SENTIMENT_COLUMN.to_string(),
            sheet: None,
            chart_title: DEFAULT_CHART_TITLE.to_string(),
        }
    }
}

impl From<&AnalyzerConfig> for AnalyzeOptions {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            review_column: config.review_column.clone(),
            sentiment_column: config.sentiment_column.clone(),
            sheet: config.sheet.clone(),
            chart_title: config.chart.title.clone(),
        }
    }
}

/// Timing of the classification pass.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisStats {
    pub total_time: Duration,
    pub items_processed: usize,
}

impl AnalysisStats {
    pub(crate) fn start() -> AnalysisStatsBuilder {
        AnalysisStatsBuilder {
            start_time: Instant::now(),
        }
    }

    pub fn items_per_second(&self) -> f64 {
        let seconds = self.total_time.as_secs_f64();
        if seconds > 0.0 {
            self.items_processed as f64 / seconds
        } else {
            0.0
        }
    }
}

pub(crate) struct AnalysisStatsBuilder {
    start_time: Instant,
}

impl AnalysisStatsBuilder {
    pub fn finish(self, items_processed: usize) -> AnalysisStats {
        AnalysisStats {
            total_time: self.start_time.elapsed(),
            items_processed,
        }
    }
}

/// Everything one analysis produces.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The input table with the sentiment column added.
    pub table: ReviewTable,
    pub distribution: SentimentDistribution,
    pub chart: PieChart,
    pub stats: AnalysisStats,
}

/// Classify every review in `file` and chart the result.
///
/// Fails with [`AnalyzerError::MissingInput`] when `file` is `None`,
/// [`AnalyzerError::FileNotFound`] when the path does not exist and
/// [`AnalyzerError::MissingColumn`] when the review column is absent. A classifier error
/// on any row aborts the whole analysis.
pub fn analyze<C>(file: Option<&Path>, classifier: &C, options: &AnalyzeOptions) -> Result<Analysis>
where
    C: SentimentClassifier + ?Sized,
{
    let path = resolve_input(file)?;
    let table = read_table(path, options.sheet.as_deref())?;
    analyze_table(table, classifier, options)
}

/// The input checks [`analyze`] runs before touching the file: present, then existing.
pub fn resolve_input(file: Option<&Path>) -> Result<&Path> {
    let path = file.ok_or(AnalyzerError::MissingInput)?;
    if !path.exists() {
        return Err(AnalyzerError::FileNotFound(path.to_path_buf()));
    }
    Ok(path)
}

/// [`analyze`] for a table that is already in memory.
pub fn analyze_table<C>(
    mut table: ReviewTable,
    classifier: &C,
    options: &AnalyzeOptions,
) -> Result<Analysis>
where
    C: SentimentClassifier + ?Sized,
{
    let review_index = table.require_column(&options.review_column)?;
    tracing::info!(rows = table.len(), column = %options.review_column, "classifying reviews");

    let stats = AnalysisStats::start();
    let labels = table
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let row_number = index + 1;
            let prediction = classifier
                .classify(&row[review_index])
                .map_err(|e| AnalyzerError::Classification {
                    row: row_number,
                    message: e.to_string(),
                })?;
            tracing::debug!(row = row_number, label = %prediction.label, score = prediction.score, "classified");
            Ok(prediction.label)
        })
        .collect::<Result<Vec<String>>>()?;
    let stats = stats.finish(labels.len());

    let known: HashSet<String> = classifier.labels().into_iter().collect();
    let mut unexpected: Vec<&str> = labels
        .iter()
        .map(String::as_str)
        .filter(|label| !known.contains(*label))
        .collect();
    unexpected.sort_unstable();
    unexpected.dedup();
    if !unexpected.is_empty() {
        tracing::warn!(labels = ?unexpected, "classifier returned labels outside its declared set");
    }

    let distribution = SentimentDistribution::from_labels(labels.iter().map(String::as_str));
    table.set_column(&options.sentiment_column, labels)?;

    let chart = PieChart::from_distribution(
        &distribution,
        &options.chart_title,
        &SentimentPalette::default(),
    );

    tracing::info!(
        rows = stats.items_processed,
        elapsed = ?stats.total_time,
        "analysis complete"
    );

    Ok(Analysis {
        table,
        distribution,
        chart,
        stats,
    })
}
