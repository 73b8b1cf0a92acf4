//! Error types for record loading
//!
//! Only load-level problems are errors. Bad values inside individual rows
//! are defaulted by the normalizer and never surface here.

/// Errors while loading raw rows into a record set
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Required columns absent from the first row
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Absent column names, in contract order
        columns: Vec<String>,
    },

    /// Input document is not valid JSON
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Input document is JSON but not an array of row objects
    #[error("invalid row {index}: {reason}")]
    InvalidRow {
        /// Zero-based row position
        index: usize,
        /// What was wrong with it
        reason: String,
    },
}

impl RecordError {
    /// Create missing columns error
    #[must_use]
    pub fn missing_columns(columns: &[&str]) -> Self {
        Self::MissingColumns {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Create invalid row error
    pub fn invalid_row(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRow {
            index,
            reason: reason.into(),
        }
    }

    /// Check if this is a header validation failure
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingColumns { .. })
    }
}

/// Result type alias for record operations
pub type RecordResult<T> = Result<T, RecordError>;
