//! Headline figures for the overview cards

use crate::filter::FilterState;
use lineage_record::FlowRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// Counts and totals over the records accepted by a filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    /// Records accepted by the filter
    pub record_count: usize,
    /// Distinct source systems
    pub source_system_count: usize,
    /// Distinct downstream applications
    pub downstream_app_count: usize,
    /// Summed source tables
    pub total_source_tables: u64,
    /// Summed hub-ingested tables
    pub total_cdp_tables: u64,
    /// Summed shared tables
    pub total_shared_tables: u64,
    /// Distinct GB/GF tags
    pub gbgf_tag_count: usize,
}

impl FlowSummary {
    /// Summarize the records accepted by `state`
    #[must_use]
    pub fn compute(records: &[FlowRecord], state: &FilterState) -> Self {
        let mut sources = BTreeSet::new();
        let mut downstream = BTreeSet::new();
        let mut tags = BTreeSet::new();
        let mut summary = Self::default();

        for record in records.iter().filter(|r| state.matches(r)) {
            summary.record_count += 1;
            summary.total_source_tables += record.source_table_count;
            summary.total_cdp_tables += record.cdp_table_count;
            summary.total_shared_tables += record.shared_table_count;
            sources.insert(record.source_system_id.as_str());
            downstream.insert(record.downstream_application_name.as_str());
            tags.extend(record.gbgf_tags.iter().map(String::as_str));
        }

        summary.source_system_count = sources.len();
        summary.downstream_app_count = downstream.len();
        summary.gbgf_tag_count = tags.len();
        summary
    }
}
