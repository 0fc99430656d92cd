//! What a conversion call hands back to its caller.

use serde::Serialize;

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub batches: u64,
    pub rows: u64,
    /// Encoding the input was decoded with.
    pub encoding: String,
    /// Output column names, in input header order.
    pub columns: Vec<String>,
    /// False when the input held no records and no file was created.
    pub output_written: bool,
    pub elapsed_ms: u64,
}

/// Success or failure of one conversion; never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Converted(ConversionReport),
    Failed { message: String },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Converted(_))
    }

    /// Failure message, or `""` on success.
    pub fn message(&self) -> &str {
        match self {
            ConversionOutcome::Converted(_) => "",
            ConversionOutcome::Failed { message } => message,
        }
    }

    pub fn report(&self) -> Option<&ConversionReport> {
        match self {
            ConversionOutcome::Converted(report) => Some(report),
            ConversionOutcome::Failed { .. } => None,
        }
    }

    /// The `(success, message)` pair.
    pub fn into_pair(self) -> (bool, String) {
        match self {
            ConversionOutcome::Converted(_) => (true, String::new()),
            ConversionOutcome::Failed { message } => (false, message),
        }
    }
}
