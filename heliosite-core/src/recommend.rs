//! Ordinal recommendation bands applied to the final score.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suitability recommendation derived from a `[0, 1]` score.
///
/// The band thresholds are closed policy constants: 0.8, 0.6, and 0.4.
///
/// # Examples
/// ```
/// use heliosite_core::Recommendation;
///
/// assert_eq!(Recommendation::from_score(0.85), Recommendation::HighlySuitable);
/// assert_eq!(Recommendation::from_score(0.6), Recommendation::ModeratelySuitable);
/// assert_eq!(Recommendation::from_score(0.1), Recommendation::NotSuitable);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    /// Score at or above 0.8.
    HighlySuitable,
    /// Score in `[0.6, 0.8)`.
    ModeratelySuitable,
    /// Score in `[0.4, 0.6)`.
    MarginallySuitable,
    /// Score below 0.4.
    NotSuitable,
}

impl Recommendation {
    /// Map a score onto its recommendation band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::HighlySuitable
        } else if score >= 0.6 {
            Self::ModeratelySuitable
        } else if score >= 0.4 {
            Self::MarginallySuitable
        } else {
            Self::NotSuitable
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::HighlySuitable => "Highly Suitable",
            Self::ModeratelySuitable => "Moderately Suitable",
            Self::MarginallySuitable => "Marginally Suitable",
            Self::NotSuitable => "Not Suitable",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, Recommendation::HighlySuitable)]
    #[case(0.8, Recommendation::HighlySuitable)]
    #[case(0.799_999, Recommendation::ModeratelySuitable)]
    #[case(0.6, Recommendation::ModeratelySuitable)]
    #[case(0.4, Recommendation::MarginallySuitable)]
    #[case(0.399_999, Recommendation::NotSuitable)]
    #[case(0.0, Recommendation::NotSuitable)]
    fn band_boundaries_are_closed_below(#[case] score: f64, #[case] expected: Recommendation) {
        assert_eq!(Recommendation::from_score(score), expected);
    }

    #[rstest]
    fn labels_match_reference_wording() {
        assert_eq!(Recommendation::HighlySuitable.label(), "Highly Suitable");
        assert_eq!(Recommendation::NotSuitable.to_string(), "Not Suitable");
    }
}
