//! Build and scan pipelines over the clause knowledge base.
//!
//! [`build_knowledge_base`] joins the two offline datasets and rebuilds the
//! index from scratch; [`scan_document`] segments a document and flags every
//! clause whose nearest indexed neighbor sits below the distance threshold.

mod builder;
mod scanner;

pub use builder::{BuildError, build_knowledge_base};
pub use scanner::{DEFAULT_THRESHOLD, ScanError, ScanOptions, ScanReport, deviation_score, scan_document};

#[cfg(test)]
pub(crate) mod testutil;
