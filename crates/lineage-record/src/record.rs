//! Normalized lineage record
//!
//! A [`FlowRecord`] is one row of the lineage table after defaulting and
//! typing. Records are immutable once built; every later stage reads them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default for string fields that are missing or blank
pub const UNKNOWN: &str = "Unknown";

/// One typed, defaulted lineage row
///
/// Describes tables flowing from a source application (owned by a source
/// system) through the hub into one downstream application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    /// Owning source system
    pub source_system_id: String,
    /// Source application name
    pub source_application_name: String,
    /// Source application EIM id
    pub source_eim_id: String,
    /// System code (empty when absent)
    pub sys_code: String,
    /// Sub-system code (empty when absent)
    pub sub_sys_code: String,
    /// Consuming application name
    pub downstream_application_name: String,
    /// Consuming application EIM id
    pub downstream_eim_id: String,
    /// Business-unit tags, split once at normalization
    pub gbgf_tags: BTreeSet<String>,
    /// Tables held by the source
    pub source_table_count: u64,
    /// Tables ingested into the hub
    pub cdp_table_count: u64,
    /// Tables shared to the downstream application
    pub shared_table_count: u64,
}

impl FlowRecord {
    /// Check whether the record carries a GB/GF tag
    #[inline]
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.gbgf_tags.contains(tag)
    }

    /// Check whether either end of the flow has this EIM id
    #[inline]
    #[must_use]
    pub fn touches_eim_id(&self, eim_id: &str) -> bool {
        self.source_eim_id == eim_id || self.downstream_eim_id == eim_id
    }

    /// Check whether either end of the flow has this application name
    #[inline]
    #[must_use]
    pub fn touches_application(&self, name: &str) -> bool {
        self.source_application_name == name || self.downstream_application_name == name
    }

    /// EIM ids on both ends of the flow
    #[inline]
    pub fn eim_ids(&self) -> impl Iterator<Item = &str> {
        [self.source_eim_id.as_str(), self.downstream_eim_id.as_str()].into_iter()
    }

    /// Application names on both ends of the flow
    #[inline]
    pub fn application_names(&self) -> impl Iterator<Item = &str> {
        [
            self.source_application_name.as_str(),
            self.downstream_application_name.as_str(),
        ]
        .into_iter()
    }
}

impl Default for FlowRecord {
    fn default() -> Self {
        Self {
            source_system_id: UNKNOWN.to_string(),
            source_application_name: UNKNOWN.to_string(),
            source_eim_id: UNKNOWN.to_string(),
            sys_code: String::new(),
            sub_sys_code: String::new(),
            downstream_application_name: UNKNOWN.to_string(),
            downstream_eim_id: UNKNOWN.to_string(),
            gbgf_tags: BTreeSet::from([UNKNOWN.to_string()]),
            source_table_count: 0,
            cdp_table_count: 0,
            shared_table_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FlowRecord {
        FlowRecord {
            source_system_id: "SYS-A".to_string(),
            source_application_name: "Ledger".to_string(),
            source_eim_id: "EIM-1".to_string(),
            downstream_application_name: "Reporting".to_string(),
            downstream_eim_id: "EIM-9".to_string(),
            gbgf_tags: BTreeSet::from(["WPB".to_string(), "CMB".to_string()]),
            ..FlowRecord::default()
        }
    }

    #[test]
    fn default_record_uses_unknown() {
        let record = FlowRecord::default();
        assert_eq!(record.source_system_id, UNKNOWN);
        assert!(record.sys_code.is_empty());
        assert!(record.has_tag(UNKNOWN));
    }

    #[test]
    fn touches_either_end() {
        let record = sample();
        assert!(record.touches_eim_id("EIM-1"));
        assert!(record.touches_eim_id("EIM-9"));
        assert!(!record.touches_eim_id("EIM-2"));
        assert!(record.touches_application("Reporting"));
        assert!(!record.touches_application("Billing"));
    }

    #[test]
    fn tags_are_sorted() {
        let record = sample();
        let tags: Vec<_> = record.gbgf_tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["CMB", "WPB"]);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["sourceSystemId"], "SYS-A");
        assert_eq!(json["gbgfTags"][0], "CMB");
    }
}
