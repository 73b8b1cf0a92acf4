//! Row normalization
//!
//! Turns one raw string-keyed row into a [`FlowRecord`]. Normalization never
//! fails: blank strings take their default, unparsable counts become 0, and
//! the GB/GF column is split into a tag set here and nowhere else.

use crate::columns::{self, RawRow};
use crate::record::{FlowRecord, UNKNOWN};
use std::collections::BTreeSet;

/// Separator between GB/GF tags inside one cell
pub const TAG_SEPARATOR: char = ',';

/// Largest accepted count; bigger values are coerced to 0
///
/// Keeps every per-tier sum of fewer than 2^32 records within `u64`.
#[allow(clippy::cast_lossless)]
pub const MAX_COUNT: u64 = u32::MAX as u64;

/// Normalized record plus the number of numeric cells that had to be coerced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// The typed record
    pub record: FlowRecord,
    /// Numeric cells that held text but could not be read as a count
    pub coerced: usize,
}

/// Outcome of reading one count cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    /// Cell was absent or blank
    Missing,
    /// Cell parsed as a count
    Parsed(u64),
    /// Cell held text that is not a non-negative number
    Coerced,
}

impl Count {
    /// Read a count cell
    ///
    /// Integers parse directly, decimals truncate toward zero. Negative or
    /// non-finite numbers, values above [`MAX_COUNT`] and any other text are
    /// [`Count::Coerced`].
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Missing;
        };

        if let Ok(n) = text.parse::<u64>() {
            return if n <= MAX_COUNT {
                Self::Parsed(n)
            } else {
                Self::Coerced
            };
        }

        match text.parse::<f64>() {
            Ok(f) if f.is_finite() && f >= 0.0 && f.trunc() <= MAX_COUNT as f64 => {
                Self::Parsed(f.trunc() as u64)
            }
            _ => Self::Coerced,
        }
    }

    /// Count value, 0 unless parsed
    #[inline]
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Self::Parsed(n) => n,
            Self::Missing | Self::Coerced => 0,
        }
    }

    /// Check if the cell had to be coerced
    #[inline]
    #[must_use]
    pub fn is_coerced(self) -> bool {
        matches!(self, Self::Coerced)
    }
}

/// Split a GB/GF cell into its tag set
///
/// An empty result is replaced by the single tag [`UNKNOWN`] so the record
/// stays reachable through the GB/GF filter.
#[must_use]
pub fn split_tags(raw: Option<&str>) -> BTreeSet<String> {
    let tags: BTreeSet<String> = raw
        .unwrap_or_default()
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    if tags.is_empty() {
        BTreeSet::from([UNKNOWN.to_string()])
    } else {
        tags
    }
}

/// Converts raw rows into typed, defaulted records
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    /// Create new normalizer
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Normalize one row
    #[must_use]
    pub fn normalize(&self, row: &RawRow) -> FlowRecord {
        self.normalize_counted(row).record
    }

    /// Normalize one row and report how many counts were coerced
    #[must_use]
    pub fn normalize_counted(&self, row: &RawRow) -> Normalized {
        let cell = |column: &str| row.get(column).map(String::as_str);

        let source_tables = Count::parse(cell(columns::SOURCE_TABLE_COUNT));
        let cdp_tables = Count::parse(cell(columns::CDP_TABLE_COUNT));
        let shared_tables = Count::parse(cell(columns::SHARED_TABLE_COUNT));
        let coerced = [source_tables, cdp_tables, shared_tables]
            .iter()
            .filter(|count| count.is_coerced())
            .count();

        let record = FlowRecord {
            source_system_id: text(cell(columns::SOURCE_SYSTEM), UNKNOWN),
            source_application_name: text(cell(columns::SOURCE_APPLICATION_NAME), UNKNOWN),
            source_eim_id: text(cell(columns::SOURCE_EIM_ID), UNKNOWN),
            sys_code: text(cell(columns::SYS_CODE), ""),
            sub_sys_code: text(cell(columns::SUB_SYS_CODE), ""),
            downstream_application_name: text(
                cell(columns::DOWNSTREAM_APPLICATION_NAME),
                UNKNOWN,
            ),
            downstream_eim_id: text(cell(columns::DOWNSTREAM_EIM_ID), UNKNOWN),
            gbgf_tags: split_tags(cell(columns::GBGF)),
            source_table_count: source_tables.value(),
            cdp_table_count: cdp_tables.value(),
            shared_table_count: shared_tables.value(),
        };

        Normalized { record, coerced }
    }
}

fn text(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => default.to_string(),
    }
}
