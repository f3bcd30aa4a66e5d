//! Model and tokenizer file resolution.
//!
//! A checkpoint is either a Hugging Face Hub repository pinned to a revision, or a local
//! snapshot directory with the same layout (`config.json`, weights, tokenizer files).
//!
//! ## Main Types
//!
//! - [`ModelSource`] - Where checkpoint files come from
//! - [`HfLoader`] - Hub file loader with retry on lock contention
//! - [`CheckpointFiles`] - Resolved config + weights paths
//! - [`TokenizerLoader`] - Loads `tokenizer.json`, or builds a WordPiece tokenizer from `vocab.txt`
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_analyzer::loaders::{CheckpointFiles, ModelSource, TokenizerLoader};
//!
//! let source = ModelSource::sst2();
//! let files = CheckpointFiles::resolve(&source)?;
//! let tokenizer = TokenizerLoader::new(source, 512).load()?;
//! # Ok::<(), sentiment_analyzer::core::AnalyzerError>(())
//! ```

use crate::core::{AnalyzerError, ModelOptions, Result};
use hf_hub::{Repo, RepoType};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Tokenizer, TruncationParams};

const LOCK_RETRIES: u32 = 3;

/// Location of a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Hub { repo: String, revision: String },
    Local(PathBuf),
}

impl ModelSource {
    /// DistilBERT fine-tuned on SST-2, pinned to a known snapshot.
    pub const SST2_REPO_DEFAULTS: (&'static str, &'static str) = (
        "distilbert/distilbert-base-uncased-finetuned-sst-2-english",
        "714eb0fa89d2f80546fda750413ed43d93601a13",
    );

    pub fn sst2() -> Self {
        let (repo, revision) = Self::SST2_REPO_DEFAULTS;
        Self::hub(repo, revision)
    }

    pub fn hub(repo: impl Into<String>, revision: impl Into<String>) -> Self {
        Self::Hub {
            repo: repo.into(),
            revision: revision.into(),
        }
    }

    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self::Local(dir.into())
    }

    /// Resolve one file of the checkpoint to a path on disk, downloading it if needed.
    pub fn fetch(&self, filename: &str) -> Result<PathBuf> {
        match self {
            ModelSource::Hub { repo, revision } => HfLoader::new(repo, revision, filename).load(),
            ModelSource::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(AnalyzerError::ModelNotFound(format!(
                        "{filename} not found in {}",
                        dir.display()
                    )))
                }
            }
        }
    }

    /// Resolve the first of `candidates` that the checkpoint provides.
    pub fn fetch_first(&self, candidates: &[&str]) -> Result<PathBuf> {
        let mut failures = Vec::with_capacity(candidates.len());
        for filename in candidates {
            match self.fetch(filename) {
                Ok(path) => return Ok(path),
                Err(e) => failures.push(format!("{filename}: {e}")),
            }
        }
        Err(AnalyzerError::ModelNotFound(format!(
            "none of [{}] available from {self} ({})",
            candidates.join(", "),
            failures.join("; ")
        )))
    }
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::sst2()
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Hub { repo, revision } => write!(f, "{repo}@{revision}"),
            ModelSource::Local(dir) => write!(f, "{}", dir.display()),
        }
    }
}

impl ModelOptions for ModelSource {
    fn cache_key(&self) -> String {
        match self {
            ModelSource::Hub { .. } => format!("hub:{self}"),
            ModelSource::Local(dir) => format!("local:{}", dir.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub revision: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, revision: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new().build()?;
        let hf_repo = hf_api.repo(Repo::with_revision(
            self.repo.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));

        let mut attempt = 0;
        loop {
            match hf_repo.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    // Another process is downloading the same file; back off and retry.
                    if e.to_string().contains("Lock acquisition failed")
                        && attempt + 1 < LOCK_RETRIES
                    {
                        let wait_time = std::time::Duration::from_millis(100 * (1 << attempt));
                        tracing::debug!(
                            file = %self.filename,
                            attempt,
                            "hub lock busy, retrying in {:?}",
                            wait_time
                        );
                        std::thread::sleep(wait_time);
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

/// Paths of the files needed to construct a classifier.
#[derive(Debug, Clone)]
pub struct CheckpointFiles {
    pub config: PathBuf,
    pub weights: PathBuf,
}

impl CheckpointFiles {
    pub fn resolve(source: &ModelSource) -> Result<Self> {
        let config = source.fetch("config.json")?;
        let weights = source.fetch_first(&["model.safetensors", "pytorch_model.bin"])?;
        tracing::debug!(config = %config.display(), weights = %weights.display(), "resolved checkpoint");
        Ok(Self { config, weights })
    }
}

#[derive(Deserialize)]
struct RawTokenizerConfig {
    #[serde(default = "default_lower_case")]
    do_lower_case: bool,
}

fn default_lower_case() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub source: ModelSource,
    pub max_length: usize,
}

impl TokenizerLoader {
    pub fn new(source: ModelSource, max_length: usize) -> Self {
        Self { source, max_length }
    }

    /// Load the checkpoint's tokenizer, truncating inputs to `max_length` tokens.
    pub fn load(&self) -> Result<Tokenizer> {
        let mut tokenizer = match self.source.fetch("tokenizer.json") {
            Ok(path) => Tokenizer::from_file(&path).map_err(|e| {
                AnalyzerError::Tokenization(format!(
                    "failed to load {}: {e}",
                    path.display()
                ))
            })?,
            Err(e) => {
                tracing::debug!("no tokenizer.json ({e}), building WordPiece from vocab.txt");
                let vocab = self.source.fetch("vocab.txt").map_err(|_| {
                    AnalyzerError::TokenizerNotFound(format!(
                        "{} provides neither tokenizer.json nor vocab.txt",
                        self.source
                    ))
                })?;
                wordpiece_tokenizer(&vocab, self.lower_case())?
            }
        };

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: self.max_length,
                ..Default::default()
            }))
            .map_err(|e| AnalyzerError::Tokenization(e.to_string()))?;
        tokenizer.with_padding(None);

        Ok(tokenizer)
    }

    fn lower_case(&self) -> bool {
        self.source
            .fetch("tokenizer_config.json")
            .ok()
            .and_then(|path| std::fs::read_to_string(path).ok())
            .and_then(|content| serde_json::from_str::<RawTokenizerConfig>(&content).ok())
            .map_or(true, |config| config.do_lower_case)
    }
}

/// Build a BERT-style WordPiece tokenizer: `[CLS] tokens [SEP]`.
pub fn wordpiece_tokenizer(vocab: &Path, lower_case: bool) -> Result<Tokenizer> {
    let vocab_path = vocab.to_str().ok_or_else(|| {
        AnalyzerError::TokenizerNotFound(format!("non UTF-8 vocab path {}", vocab.display()))
    })?;
    let wordpiece = WordPiece::from_file(vocab_path)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| AnalyzerError::Tokenization(format!("invalid vocab.txt: {e}")))?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    let special_id = |token: &str| {
        tokenizer.token_to_id(token).ok_or_else(|| {
            AnalyzerError::Tokenization(format!("vocab.txt is missing the {token} token"))
        })
    };
    let cls_id = special_id("[CLS]")?;
    let sep_id = special_id("[SEP]")?;

    tokenizer
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lower_case)))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep_id),
            ("[CLS]".to_string(), cls_id),
        )));

    Ok(tokenizer)
}
