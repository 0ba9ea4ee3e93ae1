//! Risk categories carried by the curated clause corpus.

use serde::{Deserialize, Serialize};

/// Closed set of risk categories known at index-build time.
///
/// `General` is the fallback for corpus records that carry no category
/// field; it is never inferred from an unrecognised string (those are
/// rejected when the dataset is loaded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    UnilateralTermination,
    NonCompete,
    UnlimitedLiability,
    General,
}

impl RiskCategory {
    /// Canonical display name, matching the corpus category strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnilateralTermination => "Unilateral Termination",
            Self::NonCompete => "Non-Compete",
            Self::UnlimitedLiability => "Unlimited Liability",
            Self::General => "General",
        }
    }

    /// Parse a corpus category string. Returns `None` for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Unilateral Termination" => Some(Self::UnilateralTermination),
            "Non-Compete" => Some(Self::NonCompete),
            "Unlimited Liability" => Some(Self::UnlimitedLiability),
            "General" => Some(Self::General),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_round_trip() {
        for cat in [
            RiskCategory::UnilateralTermination,
            RiskCategory::NonCompete,
            RiskCategory::UnlimitedLiability,
            RiskCategory::General,
        ] {
            assert_eq!(RiskCategory::from_name(cat.as_str()), Some(cat));
        }
    }

    #[test]
    fn unknown_name_rejected() {
        assert_eq!(RiskCategory::from_name("Indemnification"), None);
        assert_eq!(RiskCategory::from_name(""), None);
    }

    #[test]
    fn surrounding_whitespace_tolerated() {
        assert_eq!(
            RiskCategory::from_name("  Non-Compete "),
            Some(RiskCategory::NonCompete)
        );
    }
}
