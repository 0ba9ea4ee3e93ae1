//! Heuristic clause segmentation for extracted contract text.
//!
//! Splits on line breaks, trims whitespace, and drops fragments at or below
//! a minimum character count; short lines are headers, page numbers, or
//! extraction noise rather than substantive clauses. Order follows the
//! source document; downstream reporting numbers findings by position.
//!
//! This is not a legal-clause parser. Any segmentation strategy that yields
//! an ordered sequence of non-trivial text spans can replace it.

use serde::{Deserialize, Serialize};

/// Fragments of this many characters or fewer are discarded.
pub const DEFAULT_MIN_CLAUSE_CHARS: usize = 30;

/// A candidate clause produced by segmentation. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateClause {
    pub text: String,
    /// 0-based index within the segmented sequence.
    pub position: usize,
}

/// Segment raw document text into ordered candidate clauses.
///
/// A fragment survives when its trimmed character count is strictly
/// greater than `min_chars`.
pub fn segment(raw_text: &str, min_chars: usize) -> Vec<CandidateClause> {
    raw_text
        .lines()
        .map(str::trim)
        .filter(|line| line.chars().count() > min_chars)
        .enumerate()
        .map(|(position, text)| CandidateClause {
            text: text.to_string(),
            position,
        })
        .collect()
}
