//! Storage layer: the persistent vector index of known-risky clauses.

mod error;
pub use error::StoreError;

mod lance;
pub use lance::{KnowledgeBase, Neighbor};
