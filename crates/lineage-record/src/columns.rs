//! Column contract for raw lineage rows
//!
//! Column names are matched exactly, including case and spacing.

use crate::error::RecordError;
use std::collections::HashMap;

/// Raw string-keyed row as handed over by the row-parsing collaborator
pub type RawRow = HashMap<String, String>;

/// `Source system`
pub const SOURCE_SYSTEM: &str = "Source system";
/// `Source EIM ID`
pub const SOURCE_EIM_ID: &str = "Source EIM ID";
/// `Source Application Name`
pub const SOURCE_APPLICATION_NAME: &str = "Source Application Name";
/// `SYS_CODE`
pub const SYS_CODE: &str = "SYS_CODE";
/// `SUB_SYS_CODE`
pub const SUB_SYS_CODE: &str = "SUB_SYS_CODE";
/// `Downstream Application Name`
pub const DOWNSTREAM_APPLICATION_NAME: &str = "Downstream Application Name";
/// `Downstream EIM ID`
pub const DOWNSTREAM_EIM_ID: &str = "Downstream EIM ID";
/// `GB/GF`
pub const GBGF: &str = "GB/GF";
/// `Source File/Table Count`
pub const SOURCE_TABLE_COUNT: &str = "Source File/Table Count";
/// `Total CDP Table Count`
pub const CDP_TABLE_COUNT: &str = "Total CDP Table Count";
/// `Share to Downstream Table Count`
pub const SHARED_TABLE_COUNT: &str = "Share to Downstream Table Count";

/// Every column the first row must carry
pub const REQUIRED: [&str; 11] = [
    SOURCE_SYSTEM,
    SOURCE_EIM_ID,
    SOURCE_APPLICATION_NAME,
    SYS_CODE,
    SUB_SYS_CODE,
    DOWNSTREAM_APPLICATION_NAME,
    DOWNSTREAM_EIM_ID,
    GBGF,
    SOURCE_TABLE_COUNT,
    CDP_TABLE_COUNT,
    SHARED_TABLE_COUNT,
];

/// Numeric columns, coerced to 0 when unparsable
pub const NUMERIC: [&str; 3] = [SOURCE_TABLE_COUNT, CDP_TABLE_COUNT, SHARED_TABLE_COUNT];

/// Required columns absent from a row, in contract order
#[must_use]
pub fn missing_columns(row: &RawRow) -> Vec<&'static str> {
    REQUIRED
        .iter()
        .copied()
        .filter(|column| !row.contains_key(*column))
        .collect()
}

/// Validate the header contract against the first row
///
/// # Errors
/// Returns [`RecordError::MissingColumns`] naming every absent column.
pub fn validate_header(first: &RawRow) -> Result<(), RecordError> {
    let missing = missing_columns(first);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RecordError::missing_columns(&missing))
    }
}

/// Check whether every value in the row is blank
#[inline]
#[must_use]
pub fn is_blank(row: &RawRow) -> bool {
    row.values().all(|value| value.trim().is_empty())
}
