//! Immutable record sets
//!
//! A [`RecordSet`] is produced by one atomic load: either every row is
//! validated and normalized, or the load fails and nothing is produced.

use crate::columns::{self, RawRow};
use crate::error::RecordResult;
use crate::normalize::RecordNormalizer;
use crate::record::FlowRecord;
use std::sync::Arc;

/// Immutable, cheaply clonable set of normalized records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    records: Arc<[FlowRecord]>,
}

/// Counters gathered while loading a record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows handed to the loader
    pub rows_read: usize,
    /// Records kept
    pub records: usize,
    /// Rows dropped because every value was blank
    pub blank_rows: usize,
    /// Numeric cells coerced to 0
    pub coerced_values: usize,
    /// Rows with at least one coerced cell
    pub rows_with_coercions: usize,
}

impl RecordSet {
    /// Empty record set
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::from_records(Vec::new())
    }

    /// Wrap already-normalized records
    #[inline]
    #[must_use]
    pub fn from_records(records: Vec<FlowRecord>) -> Self {
        Self {
            records: Arc::from(records),
        }
    }

    /// Validate and normalize raw rows
    ///
    /// The first row must carry every required column. Blank rows are
    /// skipped; bad values inside rows are defaulted, never rejected.
    /// An empty input loads as an empty set.
    ///
    /// # Errors
    /// Returns [`crate::RecordError::MissingColumns`] when the header
    /// contract is broken.
    pub fn load(rows: &[RawRow]) -> RecordResult<(Self, LoadReport)> {
        let mut report = LoadReport {
            rows_read: rows.len(),
            ..LoadReport::default()
        };

        let Some(first) = rows.first() else {
            tracing::warn!("loading empty row set");
            return Ok((Self::empty(), report));
        };
        columns::validate_header(first)?;

        let normalizer = RecordNormalizer::new();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if columns::is_blank(row) {
                report.blank_rows += 1;
                continue;
            }

            let normalized = normalizer.normalize_counted(row);
            if normalized.coerced > 0 {
                report.coerced_values += normalized.coerced;
                report.rows_with_coercions += 1;
            }
            records.push(normalized.record);
        }
        report.records = records.len();

        if report.rows_with_coercions > 0 {
            tracing::warn!(
                rows = report.rows_with_coercions,
                values = report.coerced_values,
                "rows with invalid numeric values coerced to 0"
            );
        }
        tracing::info!(
            rows_read = report.rows_read,
            records = report.records,
            blank_rows = report.blank_rows,
            "record set loaded"
        );

        Ok((Self::from_records(records), report))
    }

    /// Records as a slice
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[FlowRecord] {
        &self.records
    }

    /// Iterate records
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, FlowRecord> {
        self.records.iter()
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set has no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl AsRef<[FlowRecord]> for RecordSet {
    fn as_ref(&self) -> &[FlowRecord] {
        self.as_slice()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a FlowRecord;
    type IntoIter = std::slice::Iter<'a, FlowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
