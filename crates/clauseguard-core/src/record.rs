//! Typed records flowing through the build and scan pipelines.

use serde::{Deserialize, Serialize};

use crate::category::RiskCategory;

/// One entry of the knowledge base: a known-risky clause joined with its
/// vetted safe rewrite, plus the embedding of the risky text.
///
/// `safe_rewrite` is non-empty for every record that reaches the index;
/// records without a resolved rewrite are dropped before insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseRecord {
    pub id: String,
    pub risky_text: String,
    pub category: RiskCategory,
    pub safe_rewrite: String,
    pub embedding: Vec<f32>,
}

/// A flagged clause in a scan report.
///
/// `deviation_score` is `(1 - distance) * 100`, clamped to `[0, 100]`
/// (cosine distance can exceed 1.0 for anti-correlated vectors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFinding {
    pub clause_text: String,
    /// 0-based index of the clause in the segmented document.
    pub position: usize,
    pub category: RiskCategory,
    pub safe_rewrite: String,
    pub distance: f32,
    pub deviation_score: f32,
}

/// Accounting returned from a knowledge-base build.
///
/// `join_misses` counts risky records with no safe counterpart (the join is
/// inner, and a risky clause without a vetted rewrite is never surfaced).
/// A rising miss count across rebuilds signals corpus quality regressions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BuildSummary {
    pub indexed: usize,
    pub join_misses: usize,
    pub duplicate_safe_ids: usize,
    pub duplicate_risky_ids: usize,
}
