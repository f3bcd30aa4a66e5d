use crate::core::{AnalyzerError, Result};
use crate::loaders::ModelSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_REVIEW_COLUMN: &str = "Reviews";
pub const DEFAULT_SENTIMENT_COLUMN: &str = "Sentiment";
pub const DEFAULT_CHART_TITLE: &str = "Review Sentiment Distribution";

/// Settings for a single analysis run.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "review_column": "Feedback", "model": { "local_dir": "./Models/sst2" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub review_column: String,
    pub sentiment_column: String,
    pub sheet: Option<String>,
    pub chart: ChartConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub repo: String,
    pub revision: String,
    pub local_dir: Option<PathBuf>,
    pub cpu: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            review_column: DEFAULT_REVIEW_COLUMN.to_string(),
            sentiment_column: DEFAULT_SENTIMENT_COLUMN.to_string(),
            sheet: None,
            chart: ChartConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_CHART_TITLE.to_string(),
            width: 640,
            height: 480,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let (repo, revision) = ModelSource::SST2_REPO_DEFAULTS;
        Self {
            repo: repo.to_string(),
            revision: revision.to_string(),
            local_dir: None,
            cpu: false,
        }
    }
}

impl ModelConfig {
    /// A local snapshot directory wins over the hub repository.
    pub fn source(&self) -> ModelSource {
        match &self.local_dir {
            Some(dir) => ModelSource::Local(dir.clone()),
            None => ModelSource::Hub {
                repo: self.repo.clone(),
                revision: self.revision.clone(),
            },
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.review_column.trim().is_empty() {
            return Err(AnalyzerError::Config("review_column cannot be empty".into()));
        }
        if self.sentiment_column.trim().is_empty() {
            return Err(AnalyzerError::Config(
                "sentiment_column cannot be empty".into(),
            ));
        }
        if self.review_column == self.sentiment_column {
            return Err(AnalyzerError::Config(format!(
                "review_column and sentiment_column are both '{}'",
                self.review_column
            )));
        }
        if self.chart.width < 200 || self.chart.height < 200 {
            return Err(AnalyzerError::Config(format!(
                "chart must be at least 200x200, got {}x{}",
                self.chart.width, self.chart.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "review_column": "Feedback" }"#).unwrap();
        assert_eq!(config.review_column, "Feedback");
        assert_eq!(config.sentiment_column, "Sentiment");
        assert_eq!(config.chart.title, "Review Sentiment Distribution");
        assert!(matches!(config.model.source(), ModelSource::Hub { .. }));
    }

    #[test]
    fn local_dir_overrides_hub() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{ "model": { "local_dir": "/models/sst2" } }"#).unwrap();
        assert_eq!(
            config.model.source(),
            ModelSource::Local(PathBuf::from("/models/sst2"))
        );
    }

    #[test]
    fn rejects_clashing_columns() {
        let config = AnalyzerConfig {
            sentiment_column: "Reviews".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalyzerError::Config(_))));
    }
}
