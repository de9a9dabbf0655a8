//! Session files: persisted weights, calibration, and overrides.
//!
//! A session file is a JSON document with three optional sections. Absent
//! sections fall back to the reference defaults, so `{}` is a valid session.

use std::collections::HashMap;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use heliosite_core::{Calibration, SubCriterion, WeightSet};

use crate::CliError;

/// Persisted tuning state loaded via `--session`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SessionFile {
    /// Replacement weight model; reference weights when absent.
    pub(crate) weights: Option<WeightSet>,
    /// Replacement calibration; reference calibration when absent.
    pub(crate) calibration: Option<Calibration>,
    /// Manual overrides, keyed by sub-criterion, values as entered.
    pub(crate) overrides: HashMap<SubCriterion, String>,
}

impl SessionFile {
    /// Load and decode a session file.
    pub(crate) fn load(path: &Utf8Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadSession {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CliError::ParseSession {
            path: path.to_path_buf(),
            source,
        })
    }
}
