//! Deviation scanning: segment a document, embed each clause, and flag the
//! ones sitting close to a known-risky pattern.

use serde::{Deserialize, Serialize};
use tracing::warn;

use clauseguard_ai::TextEmbedder;
use clauseguard_core::{RiskFinding, segment};
use clauseguard_store::{KnowledgeBase, StoreError};

/// Reference distance threshold, calibrated empirically for
/// all-MiniLM-L6-v2 in cosine space. A policy value, not a structural
/// constant, and it does not transfer across embedding models.
pub const DEFAULT_THRESHOLD: f32 = 0.35;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-call scan configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScanOptions {
    /// A clause is flagged when its nearest-neighbor distance is strictly
    /// below this value.
    pub threshold: f32,
    /// Segmenter minimum: fragments of this many characters or fewer are
    /// not candidate clauses.
    pub min_clause_chars: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_clause_chars: clauseguard_core::DEFAULT_MIN_CLAUSE_CHARS,
        }
    }
}

/// Outcome of one scan invocation. Findings are ordered by document
/// position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub findings: Vec<RiskFinding>,
    /// Candidate clauses that completed the embed + query round trip.
    pub clauses_scanned: usize,
    /// Candidate clauses skipped because embedding failed.
    pub clauses_skipped: usize,
}

/// Deviation percentage for a nearest-neighbor distance.
///
/// Proximity to a risky pattern *is* deviation from the safe standard:
/// `(1 - distance) * 100`, monotonically decreasing in distance. Clamped
/// to [0, 100] since cosine distance ranges over [0, 2].
pub fn deviation_score(distance: f32) -> f32 {
    ((1.0 - distance) * 100.0).clamp(0.0, 100.0)
}

/// Scan a document's text against the knowledge base.
///
/// Clauses are processed sequentially in document order, one embed call
/// and one k=1 index query each, so the report is deterministic for a
/// given document and index snapshot. A clause whose embedding fails is
/// skipped and counted, not fatal; store failures propagate: a broken
/// index must never read as a clean bill of health. An empty index makes
/// every clause clean.
pub async fn scan_document<E: TextEmbedder>(
    kb: &KnowledgeBase,
    embedder: &mut E,
    document_text: &str,
    options: &ScanOptions,
) -> Result<ScanReport, ScanError> {
    let candidates = segment(document_text, options.min_clause_chars);

    let mut report = ScanReport::default();
    for clause in candidates {
        let vector = match embedder.embed(&clause.text) {
            Ok(vector) => vector,
            Err(error) => {
                warn!(position = clause.position, %error, "skipping clause: embedding failed");
                report.clauses_skipped += 1;
                continue;
            }
        };
        report.clauses_scanned += 1;

        let neighbors = kb.query_nearest(&vector, 1, embedder.model_id()).await?;
        // No neighbor (empty index) is equivalent to "not flagged".
        let Some(nearest) = neighbors.into_iter().next() else {
            continue;
        };

        if nearest.distance < options.threshold {
            report.findings.push(RiskFinding {
                clause_text: clause.text,
                position: clause.position,
                category: nearest.category,
                safe_rewrite: nearest.safe_rewrite,
                distance: nearest.distance,
                deviation_score: deviation_score(nearest.distance),
            });
        }
    }
    Ok(report)
}
