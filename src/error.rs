use thiserror::Error;

/// Errors that abort a fill run. Everything else (unmatched fields, widgets
/// missing sub-structure, page failures on one element) is contained per
/// field and only shows up in the run tallies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FillError {
    /// Service endpoint, model or credentials missing; raised before any
    /// network attempt
    #[error("Missing service config: {0}")]
    Configuration(String),

    /// Service unreachable or answered with a non-success status
    #[error("Service request failed: {0}")]
    Transport(String),

    /// Service answered, but not with a usable JSON object
    #[error("Service response did not include a valid JSON object: {0}")]
    MalformedResponse(String),

    /// User-supplied record is missing, not JSON, or not an object
    #[error("Invalid record JSON: {0}")]
    RecordParse(String),
}
