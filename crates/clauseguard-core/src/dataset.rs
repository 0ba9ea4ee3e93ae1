//! Loaders for the two offline corpus datasets.
//!
//! Both datasets are JSON arrays produced by the upstream curation
//! pipeline. The risky dataset carries the clauses to index; the safe
//! dataset carries vetted rewrites keyed by the same ids. Joining the two
//! is the builder's job; loading only normalises rows into typed records.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::category::RiskCategory;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("input dataset not found: {0}")]
    InputNotFound(PathBuf),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("record {id} has unknown risk category {name:?}")]
    UnknownCategory { id: String, name: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A risky-clause record ready for joining and embedding.
#[derive(Debug, Clone)]
pub struct RiskyClause {
    pub id: String,
    pub risky_clause: String,
    pub category: RiskCategory,
}

/// A safe-rewrite record with its text already resolved.
#[derive(Debug, Clone)]
pub struct SafeRewrite {
    pub id: String,
    pub safe_text: String,
}

/// Dataset ids appear as either integers or strings in the source JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RiskyRow {
    #[serde(default)]
    id: Option<RecordId>,
    risky_clause: String,
    #[serde(default)]
    risk_category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SafeRow {
    id: RecordId,
    #[serde(default)]
    safe_option_1: Option<String>,
    #[serde(default)]
    safe_clause_base: Option<String>,
}

/// Load the risky-clause dataset.
///
/// A row without an `id` takes its 0-based row index as id. A row without
/// a `risk_category` defaults to [`RiskCategory::General`]; an unrecognised
/// category string is an error.
pub fn load_risky_dataset(path: &Path) -> Result<Vec<RiskyClause>, DatasetError> {
    let rows: Vec<RiskyRow> = read_json(path)?;

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let id = match row.id {
            Some(id) => id.to_string(),
            None => index.to_string(),
        };
        let category = match row.risk_category.as_deref().map(str::trim) {
            None | Some("") => RiskCategory::General,
            Some(name) => RiskCategory::from_name(name).ok_or_else(|| {
                DatasetError::UnknownCategory {
                    id: id.clone(),
                    name: name.to_string(),
                }
            })?,
        };
        records.push(RiskyClause {
            id,
            risky_clause: row.risky_clause,
            category,
        });
    }
    Ok(records)
}

/// Load the safe-rewrite dataset.
///
/// The resolved text prefers `safe_option_1` over `safe_clause_base`. Rows
/// resolving to empty text are dropped with a warning: a blank rewrite
/// must never be surfaced to an end user.
pub fn load_safe_dataset(path: &Path) -> Result<Vec<SafeRewrite>, DatasetError> {
    let rows: Vec<SafeRow> = read_json(path)?;

    let mut records = Vec::with_capacity(rows.len());
    let mut unresolved = 0usize;
    for row in rows {
        let id = row.id.to_string();
        let safe_text = [row.safe_option_1, row.safe_clause_base]
            .into_iter()
            .flatten()
            .map(|text| text.trim().to_string())
            .find(|text| !text.is_empty());
        match safe_text {
            Some(safe_text) => records.push(SafeRewrite { id, safe_text }),
            None => unresolved += 1,
        }
    }
    if unresolved > 0 {
        warn!(
            unresolved,
            path = %path.display(),
            "dropped safe rows without resolved rewrite text"
        );
    }
    Ok(records)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::InputNotFound(path.to_path_buf()));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_json(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn risky_rows_load_with_ids_and_categories() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(
            &tmp,
            "risky.json",
            r#"[
                {"id": 7, "risky_clause": "Provider shall be liable for all damages.", "risk_category": "Unlimited Liability"},
                {"id": "cuad-12", "risky_clause": "Either party may terminate at any time.", "risk_category": "Unilateral Termination"}
            ]"#,
        );
        let rows = load_risky_dataset(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[0].category, RiskCategory::UnlimitedLiability);
        assert_eq!(rows[1].id, "cuad-12");
        assert_eq!(rows[1].category, RiskCategory::UnilateralTermination);
    }

    #[test]
    fn missing_id_falls_back_to_row_index() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(
            &tmp,
            "risky.json",
            r#"[
                {"risky_clause": "First clause."},
                {"risky_clause": "Second clause."}
            ]"#,
        );
        let rows = load_risky_dataset(&path).unwrap();
        assert_eq!(rows[0].id, "0");
        assert_eq!(rows[1].id, "1");
    }

    #[test]
    fn missing_category_defaults_to_general() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(
            &tmp,
            "risky.json",
            r#"[{"id": 1, "risky_clause": "A clause."}, {"id": 2, "risky_clause": "B clause.", "risk_category": ""}]"#,
        );
        let rows = load_risky_dataset(&path).unwrap();
        assert_eq!(rows[0].category, RiskCategory::General);
        assert_eq!(rows[1].category, RiskCategory::General);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(
            &tmp,
            "risky.json",
            r#"[{"id": 3, "risky_clause": "A clause.", "risk_category": "Indemnity"}]"#,
        );
        let err = load_risky_dataset(&path).unwrap_err();
        assert!(matches!(err, DatasetError::UnknownCategory { .. }), "{err}");
    }

    #[test]
    fn safe_rows_prefer_variation_over_base() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(
            &tmp,
            "safe.json",
            r#"[
                {"id": 1, "safe_option_1": "Preferred rewrite.", "safe_clause_base": "Base rewrite."},
                {"id": 2, "safe_clause_base": "Base only rewrite."},
                {"id": 3, "safe_option_1": "   "}
            ]"#,
        );
        let rows = load_safe_dataset(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].safe_text, "Preferred rewrite.");
        assert_eq!(rows[1].safe_text, "Base only rewrite.");
    }

    #[test]
    fn missing_file_reports_input_not_found() {
        let err = load_risky_dataset(Path::new("/nonexistent/risky.json")).unwrap_err();
        assert!(matches!(err, DatasetError::InputNotFound(_)));
        let err = load_safe_dataset(Path::new("/nonexistent/safe.json")).unwrap_err();
        assert!(matches!(err, DatasetError::InputNotFound(_)));
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_json(&tmp, "risky.json", "{not json");
        let err = load_risky_dataset(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));
    }
}
