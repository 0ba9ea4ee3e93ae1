//! ONNX Runtime implementation of [`TextEmbedder`].
//!
//! Runs a sentence-transformers encoder (all-MiniLM-L6-v2 by default,
//! 384 dimensions) with attention-masked mean pooling and L2
//! normalisation, so cosine distance over the output vectors is
//! well-defined. The model directory must contain `model.onnx` and
//! `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::info;

use crate::{EmbedError, TextEmbedder};

const FALLBACK_MODEL_ID: &str = "all-MiniLM-L6-v2";
const FALLBACK_DIM: usize = 384;
const MAX_TOKENS: usize = 256;

/// Sentence embedder backed by an ONNX Runtime session.
pub struct OnnxEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    model_id: String,
    dim: usize,
}

impl From<ort::Error> for EmbedError {
    fn from(e: ort::Error) -> Self {
        EmbedError::Inference(e.to_string())
    }
}

impl OnnxEmbedder {
    /// Load a model from a directory containing `model.onnx` and
    /// `tokenizer.json`. The directory name becomes the model id recorded
    /// in the index.
    pub fn load(model_dir: &Path) -> Result<Self, EmbedError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(EmbedError::ModelNotFound(path.clone()));
            }
        }

        let session = Session::builder()?.commit_from_file(&model_path)?;
        let dim = output_dim(&session).unwrap_or(FALLBACK_DIM);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| EmbedError::Tokenize(e.to_string()))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_TOKENS,
                ..Default::default()
            }))
            .map_err(|e| EmbedError::Tokenize(e.to_string()))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams::default()));

        let model_id = model_dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(FALLBACK_MODEL_ID)
            .to_string();

        info!(model_id, dim, "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            model_id,
            dim,
        })
    }
}

impl TextEmbedder for OnnxEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbedError::Tokenize(e.to_string()))?;

        // Padding is enabled, so every encoding shares one sequence length.
        let batch = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        let mut input_ids = Vec::with_capacity(batch * seq_len);
        let mut attention_mask = Vec::with_capacity(batch * seq_len);
        let mut token_type_ids = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
            token_type_ids.extend(encoding.get_type_ids().iter().map(|&t| t as i64));
        }

        let shape = [batch as i64, seq_len as i64];
        let outputs = self.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, input_ids.into_boxed_slice()))?,
            "attention_mask" => Tensor::from_array((shape, attention_mask.into_boxed_slice()))?,
            "token_type_ids" => Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?,
        ])?;

        // Token embeddings come back as [batch, seq_len, dim].
        let (out_shape, out_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = out_shape;
        if dims.len() != 3 || dims[0] as usize != batch || dims[2] as usize != self.dim {
            return Err(EmbedError::Inference(format!(
                "unexpected output shape {dims:?}, expected [{batch}, {seq_len}, {}]",
                self.dim
            )));
        }
        let out_seq_len = dims[1] as usize;

        let vectors = encodings
            .iter()
            .enumerate()
            .map(|(i, encoding)| {
                let tokens = &out_data[i * out_seq_len * self.dim..(i + 1) * out_seq_len * self.dim];
                mean_pool(tokens, encoding.get_attention_mask(), out_seq_len, self.dim)
            })
            .collect();
        Ok(vectors)
    }
}

/// Attention-masked mean pooling over token embeddings, L2-normalised.
fn mean_pool(tokens: &[f32], mask: &[u32], seq_len: usize, dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut count = 0.0f32;
    for (j, &m) in mask.iter().take(seq_len).enumerate() {
        if m > 0 {
            let token = &tokens[j * dim..(j + 1) * dim];
            for (p, &t) in pooled.iter_mut().zip(token) {
                *p += t;
            }
            count += 1.0;
        }
    }
    if count > 0.0 {
        for p in &mut pooled {
            *p /= count;
        }
    }
    let norm = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for p in &mut pooled {
            *p /= norm;
        }
    }
    pooled
}

/// Read the embedding dimension from the model's output tensor shape.
fn output_dim(session: &Session) -> Option<usize> {
    match session.outputs().first()?.dtype() {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
