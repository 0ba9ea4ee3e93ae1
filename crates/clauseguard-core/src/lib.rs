pub mod category;
pub mod dataset;
pub mod record;
pub mod schema;
pub mod segment;

pub use category::RiskCategory;
pub use dataset::{DatasetError, RiskyClause, SafeRewrite, load_risky_dataset, load_safe_dataset};
pub use record::{BuildSummary, ClauseRecord, RiskFinding};
pub use segment::{CandidateClause, DEFAULT_MIN_CLAUSE_CHARS, segment};
