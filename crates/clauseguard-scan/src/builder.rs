//! Knowledge-base construction: join the risky and safe datasets by id,
//! embed the risky text, and rebuild the index as one total operation.

use std::collections::{HashMap, HashSet};

use tracing::info;

use clauseguard_ai::{EmbedError, TextEmbedder};
use clauseguard_core::{BuildSummary, ClauseRecord, RiskyClause, SafeRewrite};
use clauseguard_store::{KnowledgeBase, StoreError};

/// Texts embedded per call, aligned with the store's insert batches.
const EMBED_BATCH_SIZE: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("embedding failed during build: {0}")]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Join the datasets and rebuild the knowledge base from scratch.
///
/// Join policies (both deliberate, see the returned counts):
/// - the safe lookup is last-writer-wins on duplicate ids;
/// - the join is inner: a risky clause without a vetted rewrite is
///   dropped, never surfaced to an end user;
/// - a risky id seen more than once keeps its first occurrence.
///
/// The embedding covers `risky_clause` (not the safe text): scan-time
/// queries are risky-pattern text, and the index payload is the cure.
/// Re-running with the same inputs fully replaces state, so a failed
/// attempt is retried by simply running the build again.
pub async fn build_knowledge_base<E: TextEmbedder>(
    kb: &KnowledgeBase,
    embedder: &mut E,
    risky: &[RiskyClause],
    safe: &[SafeRewrite],
) -> Result<BuildSummary, BuildError> {
    let mut summary = BuildSummary::default();

    let mut safe_lookup: HashMap<&str, &str> = HashMap::new();
    for rewrite in safe {
        if safe_lookup
            .insert(rewrite.id.as_str(), rewrite.safe_text.as_str())
            .is_some()
        {
            summary.duplicate_safe_ids += 1;
        }
    }

    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut joined: Vec<(&RiskyClause, &str)> = Vec::new();
    for clause in risky {
        let Some(&safe_text) = safe_lookup.get(clause.id.as_str()) else {
            summary.join_misses += 1;
            continue;
        };
        if safe_text.trim().is_empty() {
            summary.join_misses += 1;
            continue;
        }
        if !seen_ids.insert(clause.id.as_str()) {
            summary.duplicate_risky_ids += 1;
            continue;
        }
        joined.push((clause, safe_text));
    }

    let mut records = Vec::with_capacity(joined.len());
    for chunk in joined.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<&str> = chunk.iter().map(|(c, _)| c.risky_clause.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        for ((clause, safe_text), embedding) in chunk.iter().zip(embeddings) {
            records.push(ClauseRecord {
                id: clause.id.clone(),
                risky_text: clause.risky_clause.clone(),
                category: clause.category,
                safe_rewrite: safe_text.to_string(),
                embedding,
            });
        }
    }

    kb.rebuild(&records, embedder.dim(), embedder.model_id())
        .await?;
    summary.indexed = records.len();

    info!(
        indexed = summary.indexed,
        join_misses = summary.join_misses,
        duplicate_safe_ids = summary.duplicate_safe_ids,
        duplicate_risky_ids = summary.duplicate_risky_ids,
        "knowledge base built"
    );
    Ok(summary)
}
