use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    // Input validation
    #[error("No file uploaded.")]
    MissingInput,

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Unsupported file format: {} (expected .xlsx, .xlsm, .xls, .xlsb, .ods or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Excel file must contain a column named '{column}'. Found columns: {}", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    // Spreadsheet parsing
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Worksheet not found: {0}")]
    SheetNotFound(String),

    #[error("Column '{column}' expects {expected} values, got {actual}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    // Model loading
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Invalid model format: {0}")]
    ModelFormat(String),

    #[error("Model metadata missing: {0}")]
    ModelMetadata(String),

    #[error("Model cache unavailable: {0}")]
    Cache(String),

    // Tokenization
    #[error("Tokenizer not found: {0}")]
    TokenizerNotFound(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    // Inference
    #[error("Classification failed on row {row}: {message}")]
    Classification { row: usize, message: String },

    // Network/Download
    #[error("Download failed: {0}")]
    Download(String),

    // Device
    #[error("Device error: {0}")]
    Device(String),

    // Output
    #[error("Chart rendering failed: {0}")]
    Chart(String),

    #[error("Report rendering failed: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // Pass-through from dependencies
    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

impl From<hf_hub::api::sync::ApiError> for AnalyzerError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        AnalyzerError::Download(value.to_string())
    }
}

impl From<calamine::Error> for AnalyzerError {
    fn from(value: calamine::Error) -> Self {
        AnalyzerError::Spreadsheet(value.to_string())
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(value: csv::Error) -> Self {
        AnalyzerError::Spreadsheet(value.to_string())
    }
}
