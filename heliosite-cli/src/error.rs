//! Error types emitted by the Heliosite CLI.

use camino::Utf8PathBuf;
use thiserror::Error;

use heliosite_core::ParseSubCriterionError;
use heliosite_data::ClientBuildError;

/// Errors emitted by the Heliosite CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// A coordinate lies outside its valid range.
    #[error("{axis} {value} is outside the valid range {lo}..={hi}")]
    CoordinateOutOfRange {
        /// Axis name: "latitude" or "longitude".
        axis: &'static str,
        /// Offending value.
        value: f64,
        /// Lower bound of the valid range.
        lo: f64,
        /// Upper bound of the valid range.
        hi: f64,
    },
    /// Reading the session file failed.
    #[error("failed to read session file {path:?}: {source}")]
    ReadSession {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Session file JSON could not be decoded.
    #[error("failed to parse session file {path:?}: {source}")]
    ParseSession {
        /// Path that was parsed.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// A `--set` argument is not of the form `sub-criterion=value`.
    #[error("override {entry:?} is not of the form <sub-criterion>=<value>")]
    MalformedOverride {
        /// The argument as given.
        entry: String,
    },
    /// A `--set` argument names an unknown sub-criterion.
    #[error("unknown sub-criterion in override {entry:?}: {source}")]
    UnknownSubCriterion {
        /// The argument as given.
        entry: String,
        /// Underlying parse error listing the valid names.
        #[source]
        source: ParseSubCriterionError,
    },
    /// Constructing a data-source client failed.
    #[error("failed to build data-source client: {0}")]
    BuildClient(#[from] ClientBuildError),
    /// Constructing the async runtime failed.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serializing the assessment to JSON failed.
    #[error("failed to serialize assessment: {0}")]
    SerializeAssessment(#[source] serde_json::Error),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    WriteReport(#[source] std::io::Error),
}
