use thiserror::Error;

/// Failure kinds surfaced by extraction, reassembly, and angle normalization.
///
/// Extraction-level errors are caught per entity type by the pipeline so one
/// bad document cannot poison the accumulated output of the others.
#[derive(Debug, Error)]
pub enum Error {
    /// The document's version tag is outside the supported v1..v3 range.
    /// Column semantics are version-dependent, so this aborts the document.
    #[error("unsupported site model version {found:?}, supported versions are v1, v2 and v3")]
    UnsupportedVersion { found: String },

    /// A nested field could not be flattened at all. Callers recover by
    /// substituting an empty partial table and logging.
    #[error("failed to flatten nested field {field:?}: {reason}")]
    MalformedNestedField { field: String, reason: String },

    /// An angle column held a value that cannot be read as a number.
    /// Silently dropping it would desynchronize joined rows, so it is fatal
    /// for the document.
    #[error("column {column:?} holds non-numeric value {value}")]
    NumericCoercion { column: String, value: String },

    /// The columns shared by a main table and a partial table are not the
    /// declared join keys. This is a programming-contract violation.
    #[error("join key mismatch: expected {expected:?}, tables share {found:?}")]
    JoinKeyMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}
