//! Manual overrides for normalized sub-criterion values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use heliosite_core::SubCriterion;

/// Caller-supplied replacements for normalized values.
///
/// Overrides are kept as the raw strings the caller entered; parsing is
/// deferred to scoring time so an assessment can report which entries were
/// unusable. An override that fails to parse is ignored and the automatic
/// value stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualOverrides {
    entries: HashMap<SubCriterion, String>,
}

impl ManualOverrides {
    /// Construct an empty override set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an override for a sub-criterion.
    pub fn set(&mut self, sub: SubCriterion, raw: impl Into<String>) {
        self.entries.insert(sub, raw.into());
    }

    /// Record an override while returning `self` for chaining.
    #[must_use]
    pub fn with(mut self, sub: SubCriterion, raw: impl Into<String>) -> Self {
        self.set(sub, raw);
        self
    }

    /// The raw override string for a sub-criterion, when one is set.
    #[must_use]
    pub fn raw(&self, sub: SubCriterion) -> Option<&str> {
        self.entries.get(&sub).map(String::as_str)
    }

    /// The override parsed as a number, when it is set and usable.
    ///
    /// Surrounding whitespace is tolerated. Non-finite values (`nan`,
    /// `inf`) are rejected like any other unparseable entry, so they can
    /// never leak into a score. Range clamping is left to the value map,
    /// which clamps every insert.
    #[must_use]
    pub fn parsed(&self, sub: SubCriterion) -> Option<f64> {
        self.entries
            .get(&sub)?
            .trim()
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
    }

    /// Report whether no overrides are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of overrides set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
