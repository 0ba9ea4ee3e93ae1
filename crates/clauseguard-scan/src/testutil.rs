//! Deterministic embedder and record helpers shared by the pipeline tests.

use clauseguard_ai::{EmbedError, TextEmbedder};
use clauseguard_core::{RiskCategory, RiskyClause, SafeRewrite};

const DIM: usize = 4;

/// Keyword-axis embedder: axis 0 counts "liab", axis 1 "terminat",
/// axis 2 "compet"; texts matching none land on axis 3. Vectors are
/// L2-normalised, so cosine distances are exact and repeatable:
/// same-axis texts sit at distance 0, unrelated texts at distance 1.
pub(crate) struct StubEmbedder {
    fail_marker: Option<&'static str>,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self { fail_marker: None }
    }

    /// An embedder that errors on any text containing `marker`.
    pub fn failing_on(marker: &'static str) -> Self {
        Self {
            fail_marker: Some(marker),
        }
    }

    /// The vector this embedder would produce, for building query vectors
    /// without threading `&mut self`.
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        feature_vector(text)
    }
}

fn feature_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v = vec![0.0f32; DIM];
    for (axis, needle) in ["liab", "terminat", "compet"].iter().enumerate() {
        v[axis] = lower.matches(needle).count() as f32;
    }
    if v.iter().all(|&x| x == 0.0) {
        v[3] = 1.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    v.iter().map(|x| x / norm).collect()
}

impl TextEmbedder for StubEmbedder {
    fn model_id(&self) -> &str {
        "stub-model"
    }

    fn dim(&self) -> usize {
        DIM
    }

    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts
            .iter()
            .map(|text| {
                if let Some(marker) = self.fail_marker {
                    if text.contains(marker) {
                        return Err(EmbedError::Inference(format!(
                            "stub refuses text containing {marker:?}"
                        )));
                    }
                }
                Ok(feature_vector(text))
            })
            .collect()
    }
}

pub(crate) fn risky(id: &str, text: &str) -> RiskyClause {
    risky_with_category(id, text, RiskCategory::General)
}

pub(crate) fn risky_with_category(id: &str, text: &str, category: RiskCategory) -> RiskyClause {
    RiskyClause {
        id: id.to_string(),
        risky_clause: text.to_string(),
        category,
    }
}

pub(crate) fn safe_rewrite(id: &str, text: &str) -> SafeRewrite {
    SafeRewrite {
        id: id.to_string(),
        safe_text: text.to_string(),
    }
}
