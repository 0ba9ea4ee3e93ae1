//! Embedding boundary for clauseguard.
//!
//! The index is built and queried through the same [`TextEmbedder`], and
//! mixing vectors from different models in one index is undefined
//! behaviour. The store records [`TextEmbedder::model_id`] alongside the
//! index and refuses queries under a different id.

use std::path::PathBuf;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxEmbedder;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("model file missing: {0}")]
    ModelNotFound(PathBuf),

    #[error("tokenizer error: {0}")]
    Tokenize(String),

    #[error("inference error: {0}")]
    Inference(String),
}

/// Maps text to fixed-dimensionality vectors.
///
/// Deterministic for a given model version: the same text always yields
/// the same vector. Implementations take `&mut self` because inference
/// sessions are stateful.
pub trait TextEmbedder {
    /// Stable identifier of the underlying model version.
    fn model_id(&self) -> &str;

    /// Output dimensionality, constant for the lifetime of the embedder.
    fn dim(&self) -> usize;

    /// Embed a batch of texts, one vector per input, in input order.
    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single text.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Inference("empty batch result".into()))
    }
}
