/// Errors surfaced to callers of the converter.
///
/// Per-document conversion failures are not represented here; they are collected in
/// [`crate::model::ConversionResult::errors`] and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ConverterError {
    /// Malformed query or transport failure while scanning
    #[error("query failed: {0}")]
    Query(String),

    /// Rejected before any scan or conversion starts
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// `convert` was called without scanned groups
    #[error("nothing to convert: run a scan first")]
    NothingToConvert,
}

impl ConverterError {
    pub fn query(error: &anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line
        ConverterError::Query(format!("{:#}", error))
    }
}
