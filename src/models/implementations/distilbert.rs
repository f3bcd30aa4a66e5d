//! DistilBERT sequence classification.
//!
//! DistilBERT is a 6-layer distillation of BERT. This module implements the encoder and
//! the `pre_classifier -> ReLU -> classifier` head used by the
//! `DistilBertForSequenceClassification` checkpoints, e.g. the SST-2 sentiment model.
//!
//! # Quick Start
//! ```rust,no_run
//! use candle_core::Device;
//! use sentiment_analyzer::loaders::{ModelSource, TokenizerLoader};
//! use sentiment_analyzer::models::SentimentDistilBertModel;
//!
//! let model = SentimentDistilBertModel::new(ModelSource::sst2(), Device::Cpu)?;
//! let tokenizer = TokenizerLoader::new(ModelSource::sst2(), 512).load()?;
//! let prediction = model.predict(&tokenizer, "The delivery was quick and painless")?;
//! println!("{} ({:.3})", prediction.label, prediction.score);
//! # Ok::<(), sentiment_analyzer::core::AnalyzerError>(())
//! ```

use crate::core::{AnalyzerError, Result};
use crate::loaders::{CheckpointFiles, ModelSource, TokenizerLoader};
use crate::pipelines::sentiment_analysis_pipeline::{Prediction, SentimentAnalysisModel};
use candle_core::{DType, Device, IndexOp, Module, Tensor};
use candle_nn::{embedding, layer_norm, linear, ops::softmax_last_dim, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokenizers::Tokenizer;

const MIN_VALUE_F64: f64 = f32::MIN as f64;
const LAYER_NORM_EPS: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HiddenAct {
    #[default]
    Gelu,
    Relu,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub vocab_size: usize,
    pub dim: usize,
    pub n_layers: usize,
    pub n_heads: usize,
    pub hidden_dim: usize,
    #[serde(default)]
    pub activation: HiddenAct,
    pub max_position_embeddings: usize,
    #[serde(default)]
    pub pad_token_id: u32,
    #[serde(default)]
    pub id2label: HashMap<String, String>,
}

impl Config {
    /// Label names ordered by class id. Ids must be exactly `0..n`.
    pub fn labels(&self) -> Result<Vec<String>> {
        if self.id2label.is_empty() {
            return Err(AnalyzerError::ModelMetadata(
                "config.json has no id2label mapping".into(),
            ));
        }
        let mut labels = vec![None; self.id2label.len()];
        for (id, label) in &self.id2label {
            let slot = id
                .parse::<usize>()
                .ok()
                .and_then(|index| labels.get_mut(index))
                .ok_or_else(|| {
                    AnalyzerError::ModelMetadata(format!("id2label has out of range id '{id}'"))
                })?;
            *slot = Some(label.clone());
        }
        labels
            .into_iter()
            .enumerate()
            .map(|(index, label)| {
                label.ok_or_else(|| {
                    AnalyzerError::ModelMetadata(format!("id2label is missing id {index}"))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Embeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    layer_norm: LayerNorm,
    span: tracing::Span,
}

impl Embeddings {
    fn load(vb: VarBuilder, config: &Config) -> candle_core::Result<Self> {
        let word_embeddings = embedding(config.vocab_size, config.dim, vb.pp("word_embeddings"))?;
        let position_embeddings = embedding(
            config.max_position_embeddings,
            config.dim,
            vb.pp("position_embeddings"),
        )?;
        let layer_norm = layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("LayerNorm"))?;
        Ok(Self {
            word_embeddings,
            position_embeddings,
            layer_norm,
            span: tracing::span!(tracing::Level::TRACE, "embeddings"),
        })
    }

    fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();
        let (_batch, seq_len) = input_ids.dims2()?;
        let positions = Tensor::arange(0u32, seq_len as u32, input_ids.device())?;

        let words = self.word_embeddings.forward(input_ids)?;
        let positions = self.position_embeddings.forward(&positions)?;
        words.broadcast_add(&positions)?.apply(&self.layer_norm)
    }
}

#[derive(Debug, Clone)]
struct MultiHeadSelfAttention {
    q_lin: Linear,
    k_lin: Linear,
    v_lin: Linear,
    out_lin: Linear,
    n_heads: usize,
    head_dim: usize,
    span: tracing::Span,
}

impl MultiHeadSelfAttention {
    fn load(vb: VarBuilder, config: &Config) -> candle_core::Result<Self> {
        let dim = config.dim;
        Ok(Self {
            q_lin: linear(dim, dim, vb.pp("q_lin"))?,
            k_lin: linear(dim, dim, vb.pp("k_lin"))?,
            v_lin: linear(dim, dim, vb.pp("v_lin"))?,
            out_lin: linear(dim, dim, vb.pp("out_lin"))?,
            n_heads: config.n_heads,
            head_dim: dim / config.n_heads,
            span: tracing::span!(tracing::Level::TRACE, "attn"),
        })
    }

    /// (batch, seq, dim) -> (batch, heads, seq, head_dim)
    fn split_heads(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let (batch, seq_len, _) = xs.dims3()?;
        xs.reshape((batch, seq_len, self.n_heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();
        let (batch, seq_len, dim) = hidden_states.dims3()?;

        let q = self.split_heads(&hidden_states.apply(&self.q_lin)?)?;
        let k = self.split_heads(&hidden_states.apply(&self.k_lin)?)?;
        let v = self.split_heads(&hidden_states.apply(&self.v_lin)?)?;

        let q = (q * (self.head_dim as f64).powf(-0.5))?;
        let scores = q.matmul(&k.t()?.contiguous()?)?;
        let scores = scores.broadcast_add(attention_mask)?;
        let probs = softmax_last_dim(&scores)?;

        probs
            .matmul(&v)?
            .transpose(1, 2)?
            .reshape((batch, seq_len, dim))?
            .apply(&self.out_lin)
    }
}

#[derive(Debug, Clone)]
struct TransformerBlock {
    attention: MultiHeadSelfAttention,
    sa_layer_norm: LayerNorm,
    lin1: Linear,
    lin2: Linear,
    output_layer_norm: LayerNorm,
    activation: HiddenAct,
    span: tracing::Span,
}

impl TransformerBlock {
    fn load(vb: VarBuilder, config: &Config) -> candle_core::Result<Self> {
        Ok(Self {
            attention: MultiHeadSelfAttention::load(vb.pp("attention"), config)?,
            sa_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("sa_layer_norm"))?,
            lin1: linear(config.dim, config.hidden_dim, vb.pp("ffn.lin1"))?,
            lin2: linear(config.hidden_dim, config.dim, vb.pp("ffn.lin2"))?,
            output_layer_norm: layer_norm(config.dim, LAYER_NORM_EPS, vb.pp("output_layer_norm"))?,
            activation: config.activation,
            span: tracing::span!(tracing::Level::TRACE, "layer"),
        })
    }

    fn forward(&self, hidden_states: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();
        let attn = self.attention.forward(hidden_states, attention_mask)?;
        let hidden_states = (attn + hidden_states)?.apply(&self.sa_layer_norm)?;

        let ffn = hidden_states.apply(&self.lin1)?;
        let ffn = match self.activation {
            HiddenAct::Gelu => ffn.gelu_erf()?,
            HiddenAct::Relu => ffn.relu()?,
        };
        let ffn = ffn.apply(&self.lin2)?;
        (ffn + hidden_states)?.apply(&self.output_layer_norm)
    }
}

/// DistilBERT encoder with a sequence classification head.
#[derive(Debug, Clone)]
pub struct DistilBertForSequenceClassification {
    embeddings: Embeddings,
    layers: Vec<TransformerBlock>,
    pre_classifier: Linear,
    classifier: Linear,
    span: tracing::Span,
}

impl DistilBertForSequenceClassification {
    pub fn load(vb: VarBuilder, config: &Config, num_labels: usize) -> candle_core::Result<Self> {
        let encoder = vb.pp("distilbert");
        let embeddings = Embeddings::load(encoder.pp("embeddings"), config)?;
        let layers = (0..config.n_layers)
            .map(|index| {
                TransformerBlock::load(encoder.pp(format!("transformer.layer.{index}")), config)
            })
            .collect::<candle_core::Result<Vec<_>>>()?;

        Ok(Self {
            embeddings,
            layers,
            pre_classifier: linear(config.dim, config.dim, vb.pp("pre_classifier"))?,
            classifier: linear(config.dim, num_labels, vb.pp("classifier"))?,
            span: tracing::span!(tracing::Level::TRACE, "model"),
        })
    }

    /// Returns logits of shape `(batch, num_labels)`.
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();

        // 0 where attended, f32::MIN where padded; (batch, 1, 1, seq)
        let additive_mask = attention_mask
            .to_dtype(DType::F32)?
            .affine(-1.0, 1.0)?
            .affine(MIN_VALUE_F64, 0.0)?
            .unsqueeze(1)?
            .unsqueeze(1)?;

        let mut hidden_states = self.embeddings.forward(input_ids)?;
        for layer in &self.layers {
            hidden_states = layer.forward(&hidden_states, &additive_mask)?;
        }

        // First token ([CLS]) pooling
        hidden_states
            .i((.., 0))?
            .apply(&self.pre_classifier)?
            .relu()?
            .apply(&self.classifier)
    }
}

/// Sentiment classifier backed by a DistilBERT checkpoint.
#[derive(Clone)]
pub struct SentimentDistilBertModel {
    model: DistilBertForSequenceClassification,
    device: Device,
    labels: Vec<String>,
}

impl SentimentDistilBertModel {
    pub fn new(source: ModelSource, device: Device) -> Result<Self> {
        let files = CheckpointFiles::resolve(&source)?;
        let config = read_config(&files.config)?;
        let labels = config.labels()?;

        let dtype = DType::F32;
        let vb = if files
            .weights
            .extension()
            .is_some_and(|ext| ext == "safetensors")
        {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&files.weights], dtype, &device)? }
        } else if files.weights.extension().is_some_and(|ext| ext == "bin") {
            VarBuilder::from_pth(&files.weights, dtype, &device)?
        } else {
            return Err(AnalyzerError::ModelFormat(format!(
                "Unsupported weight file format: {:?}",
                files.weights
            )));
        };

        let model = DistilBertForSequenceClassification::load(vb, &config, labels.len())?;
        tracing::info!(%source, labels = ?labels, device = ?device.location(), "loaded DistilBERT classifier");

        Ok(Self::from_parts(model, device, labels))
    }

    pub(crate) fn from_parts(
        model: DistilBertForSequenceClassification,
        device: Device,
        labels: Vec<String>,
    ) -> Self {
        Self {
            model,
            device,
            labels,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn predict(&self, tokenizer: &Tokenizer, text: &str) -> Result<Prediction> {
        let encoding = tokenizer
            .encode(text, true)
            .map_err(|e| AnalyzerError::Tokenization(e.to_string()))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let probabilities = softmax_last_dim(&logits)?.squeeze(0)?.to_vec1::<f32>()?;

        let (index, score) = probabilities
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| AnalyzerError::ModelFormat("classifier produced no logits".into()))?;
        let label = self.labels.get(index).cloned().ok_or_else(|| {
            AnalyzerError::ModelMetadata(format!("Predicted id {index} has no label"))
        })?;

        Ok(Prediction { label, score })
    }
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        AnalyzerError::ModelFormat(format!("Failed to read config file {path:?}: {e}"))
    })?;
    serde_json::from_str(&content)
        .map_err(|e| AnalyzerError::ModelFormat(format!("Failed to parse model config: {e}")))
}

impl SentimentAnalysisModel for SentimentDistilBertModel {
    type Options = ModelSource;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        SentimentDistilBertModel::new(options, device)
    }

    fn predict(&self, tokenizer: &Tokenizer, text: &str) -> Result<Prediction> {
        self.predict(tokenizer, text)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        let config = read_config(&options.fetch("config.json")?)?;
        TokenizerLoader::new(options, config.max_position_embeddings).load()
    }

    fn labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn device(&self) -> &Device {
        self.device()
    }
}
