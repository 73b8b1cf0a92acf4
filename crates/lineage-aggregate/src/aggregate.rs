//! Record aggregation
//!
//! [`aggregate`] is a pure function from a record slice and a filter state to
//! per-source-system and per-downstream-application totals.
//!
//! Source aggregates are keyed by source system, with detail per source EIM
//! id. Downstream aggregates are keyed by application name, with detail per
//! `(source EIM id, downstream EIM id)` pair so distinct contributors are never
//! collapsed. Counts are summed; for identifying fields the first value seen
//! is kept and any later, different value raises an [`AggregationWarning`].

use crate::filter::FilterState;
use crate::overflow::Bucketable;
use lineage_record::FlowRecord;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

/// Per source EIM id detail of a source system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDetail {
    /// First-seen application name
    pub application_name: String,
    /// First-seen system code
    pub sys_code: String,
    /// First-seen sub-system code
    pub sub_sys_code: String,
    /// Summed source tables
    pub tables: u64,
    /// Summed hub-ingested tables
    pub cdp_tables: u64,
    /// Union of GB/GF tags
    pub gbgf_tags: BTreeSet<String>,
}

/// Totals for one source system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSystemAggregate {
    /// Source system id
    pub id: String,
    /// Summed source tables (display value)
    pub total_source_tables: u64,
    /// Summed hub-ingested tables (hub-bound link value)
    pub total_cdp_tables: u64,
    /// Detail keyed by source EIM id
    pub details: BTreeMap<String, SourceDetail>,
}

impl SourceSystemAggregate {
    /// Empty aggregate for a source system
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_source_tables: 0,
            total_cdp_tables: 0,
            details: BTreeMap::new(),
        }
    }

    /// Ranking value: tables ingested into the hub
    #[inline]
    #[must_use]
    pub fn value(&self) -> u64 {
        self.total_cdp_tables
    }

    fn absorb(&mut self, record: &FlowRecord, warnings: &mut Warnings) {
        self.total_source_tables += record.source_table_count;
        self.total_cdp_tables += record.cdp_table_count;

        let detail = self
            .details
            .entry(record.source_eim_id.clone())
            .or_insert_with(|| SourceDetail {
                application_name: record.source_application_name.clone(),
                sys_code: record.sys_code.clone(),
                sub_sys_code: record.sub_sys_code.clone(),
                tables: 0,
                cdp_tables: 0,
                gbgf_tags: BTreeSet::new(),
            });

        if detail.application_name != record.source_application_name {
            warnings.raise(AggregationWarning::ConflictingSourceApplicationName {
                source_system: self.id.clone(),
                source_eim_id: record.source_eim_id.clone(),
                kept: detail.application_name.clone(),
                ignored: record.source_application_name.clone(),
            });
        }

        detail.tables += record.source_table_count;
        detail.cdp_tables += record.cdp_table_count;
        detail
            .gbgf_tags
            .extend(record.gbgf_tags.iter().cloned());
    }
}

impl Bucketable for SourceSystemAggregate {
    fn bucket_id(&self) -> &str {
        &self.id
    }

    fn bucket_name(&self) -> &str {
        &self.id
    }

    fn bucket_value(&self) -> u64 {
        self.value()
    }

    fn overflow(label: &str, members: &[Self]) -> Self {
        let mut other = Self::new(label);
        for member in members {
            other.total_source_tables += member.total_source_tables;
            other.total_cdp_tables += member.total_cdp_tables;
        }
        other
    }
}

/// Composite key of a downstream detail entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailKey {
    /// Contributing source EIM id
    pub source_eim_id: String,
    /// Receiving downstream EIM id
    pub downstream_eim_id: String,
}

impl DetailKey {
    /// Create key
    #[inline]
    #[must_use]
    pub fn new(source_eim_id: impl Into<String>, downstream_eim_id: impl Into<String>) -> Self {
        Self {
            source_eim_id: source_eim_id.into(),
            downstream_eim_id: downstream_eim_id.into(),
        }
    }

    /// Separator between the two ids in the text form
    pub const SEPARATOR: char = '|';

    /// Read the text form written by `Display`
    ///
    /// Returns `None` when there is no unescaped separator, more than one,
    /// or a dangling escape.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = vec![String::new()];
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => parts.last_mut()?.push(chars.next()?),
                Self::SEPARATOR => parts.push(String::new()),
                c => parts.last_mut()?.push(c),
            }
        }

        let [source, downstream]: [String; 2] = parts.try_into().ok()?;
        Some(Self::new(source, downstream))
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, id: &str) -> fmt::Result {
    for c in id.chars() {
        if c == '\\' || c == DetailKey::SEPARATOR {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

/// `source|downstream`, with `\` and `|` inside ids escaped by `\`
impl fmt::Display for DetailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.source_eim_id)?;
        write!(f, "{}", Self::SEPARATOR)?;
        write_escaped(f, &self.downstream_eim_id)
    }
}

/// One contributing source of a downstream application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamDetail {
    /// First-seen source system
    pub source_system: String,
    /// First-seen source application name
    pub source_application_name: String,
    /// Summed shared tables
    pub shared_tables: u64,
}

/// Totals for one downstream application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownstreamAppAggregate {
    /// Downstream application name
    pub id: String,
    /// Summed shared tables
    pub total_shared_tables: u64,
    /// First-seen downstream EIM id
    pub eim_id: String,
    /// Contributors keyed by (source EIM id, downstream EIM id)
    #[serde(serialize_with = "serialize_details")]
    pub details: BTreeMap<DetailKey, DownstreamDetail>,
}

impl DownstreamAppAggregate {
    /// Empty aggregate for a downstream application
    #[must_use]
    pub fn new(id: impl Into<String>, eim_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            total_shared_tables: 0,
            eim_id: eim_id.into(),
            details: BTreeMap::new(),
        }
    }

    /// Ranking value: tables shared downstream
    #[inline]
    #[must_use]
    pub fn value(&self) -> u64 {
        self.total_shared_tables
    }

    fn absorb(&mut self, record: &FlowRecord, warnings: &mut Warnings) {
        if self.eim_id != record.downstream_eim_id {
            warnings.raise(AggregationWarning::ConflictingDownstreamEimId {
                application: self.id.clone(),
                kept: self.eim_id.clone(),
                ignored: record.downstream_eim_id.clone(),
            });
        }

        self.total_shared_tables += record.shared_table_count;

        let key = DetailKey::new(&record.source_eim_id, &record.downstream_eim_id);
        self.details
            .entry(key)
            .or_insert_with(|| DownstreamDetail {
                source_system: record.source_system_id.clone(),
                source_application_name: record.source_application_name.clone(),
                shared_tables: 0,
            })
            .shared_tables += record.shared_table_count;
    }
}

impl Bucketable for DownstreamAppAggregate {
    fn bucket_id(&self) -> &str {
        &self.id
    }

    fn bucket_name(&self) -> &str {
        &self.id
    }

    fn bucket_value(&self) -> u64 {
        self.value()
    }

    fn overflow(label: &str, members: &[Self]) -> Self {
        let mut other = Self::new(label, "");
        other.total_shared_tables = members.iter().map(Self::value).sum();
        other
    }
}

fn serialize_details<S: Serializer>(
    details: &BTreeMap<DetailKey, DownstreamDetail>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Entry<'a> {
        #[serde(flatten)]
        key: &'a DetailKey,
        #[serde(flatten)]
        detail: &'a DownstreamDetail,
    }

    serializer.collect_seq(details.iter().map(|(key, detail)| Entry { key, detail }))
}

/// Non-fatal conflict found while aggregating
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AggregationWarning {
    /// One downstream application seen with several EIM ids
    #[serde(rename_all = "camelCase")]
    ConflictingDownstreamEimId {
        /// Downstream application name
        application: String,
        /// EIM id retained
        kept: String,
        /// EIM id ignored
        ignored: String,
    },

    /// One source EIM id seen with several application names
    #[serde(rename_all = "camelCase")]
    ConflictingSourceApplicationName {
        /// Owning source system
        source_system: String,
        /// Source EIM id
        source_eim_id: String,
        /// Name retained
        kept: String,
        /// Name ignored
        ignored: String,
    },
}

impl fmt::Display for AggregationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConflictingDownstreamEimId {
                application,
                kept,
                ignored,
            } => write!(
                f,
                "downstream application '{application}' has EIM id '{ignored}', keeping '{kept}'"
            ),
            Self::ConflictingSourceApplicationName {
                source_system,
                source_eim_id,
                kept,
                ignored,
            } => write!(
                f,
                "source EIM id '{source_eim_id}' in '{source_system}' is named '{ignored}', keeping '{kept}'"
            ),
        }
    }
}

/// Deduplicating warning sink
#[derive(Default)]
struct Warnings {
    seen: HashSet<AggregationWarning>,
    ordered: Vec<AggregationWarning>,
}

impl Warnings {
    fn raise(&mut self, warning: AggregationWarning) {
        if self.seen.insert(warning.clone()) {
            tracing::warn!(%warning, "aggregation conflict");
            self.ordered.push(warning);
        }
    }
}

/// Output of [`aggregate`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Source systems, value descending then id ascending
    pub sources: Vec<SourceSystemAggregate>,
    /// Downstream applications, value descending then id ascending
    pub downstream: Vec<DownstreamAppAggregate>,
    /// Conflicts, in the order first seen
    pub warnings: Vec<AggregationWarning>,
    /// Records that passed the filter
    pub record_count: usize,
}

impl Aggregation {
    /// Check if no record passed the filter
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.downstream.is_empty()
    }

    /// Find a source aggregate by id
    #[must_use]
    pub fn source(&self, id: &str) -> Option<&SourceSystemAggregate> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Find a downstream aggregate by id
    #[must_use]
    pub fn downstream_app(&self, id: &str) -> Option<&DownstreamAppAggregate> {
        self.downstream.iter().find(|d| d.id == id)
    }

    /// Sum of hub-ingested tables over all sources
    #[must_use]
    pub fn total_cdp_tables(&self) -> u64 {
        self.sources.iter().map(|s| s.total_cdp_tables).sum()
    }

    /// Sum of shared tables over all downstream applications
    #[must_use]
    pub fn total_shared_tables(&self) -> u64 {
        self.downstream.iter().map(|d| d.total_shared_tables).sum()
    }
}

/// Aggregate the records accepted by `state`
#[must_use]
pub fn aggregate(records: &[FlowRecord], state: &FilterState) -> Aggregation {
    let mut sources: HashMap<&str, SourceSystemAggregate> = HashMap::new();
    let mut downstream: HashMap<&str, DownstreamAppAggregate> = HashMap::new();
    let mut warnings = Warnings::default();
    let mut record_count = 0;

    for record in records.iter().filter(|r| state.matches(r)) {
        record_count += 1;

        sources
            .entry(record.source_system_id.as_str())
            .or_insert_with(|| SourceSystemAggregate::new(&record.source_system_id))
            .absorb(record, &mut warnings);

        downstream
            .entry(record.downstream_application_name.as_str())
            .or_insert_with(|| {
                DownstreamAppAggregate::new(
                    &record.downstream_application_name,
                    &record.downstream_eim_id,
                )
            })
            .absorb(record, &mut warnings);
    }

    let mut sources: Vec<_> = sources.into_values().collect();
    sources.sort_by(|a, b| b.value().cmp(&a.value()).then_with(|| a.id.cmp(&b.id)));

    let mut downstream: Vec<_> = downstream.into_values().collect();
    downstream.sort_by(|a, b| b.value().cmp(&a.value()).then_with(|| a.id.cmp(&b.id)));

    tracing::debug!(
        records = record_count,
        sources = sources.len(),
        downstream = downstream.len(),
        warnings = warnings.ordered.len(),
        "aggregated"
    );

    Aggregation {
        sources,
        downstream,
        warnings: warnings.ordered,
        record_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterField;
    use lineage_test_utils::RecordBuilder;
    use pretty_assertions::assert_eq;

    fn scenario_a() -> Vec<FlowRecord> {
        vec![
            RecordBuilder::new("A", "X").counts(90, 80, 100).build(),
            RecordBuilder::new("B", "X").counts(45, 40, 50).build(),
        ]
    }

    #[test]
    fn groups_and_sums() {
        let agg = aggregate(&scenario_a(), &FilterState::new());

        assert_eq!(agg.record_count, 2);
        assert_eq!(agg.sources.len(), 2);
        assert_eq!(agg.sources[0].id, "A");
        assert_eq!(agg.sources[0].total_cdp_tables, 80);
        assert_eq!(agg.sources[0].total_source_tables, 90);
        assert_eq!(agg.downstream.len(), 1);
        assert_eq!(agg.downstream[0].total_shared_tables, 150);
        assert_eq!(agg.total_cdp_tables(), 120);
        assert!(agg.warnings.is_empty());
    }

    #[test]
    fn source_detail_keyed_by_eim_id() {
        let records = vec![
            RecordBuilder::new("SYS", "X").source_app("Ledger", "E1").counts(5, 3, 1).tags("WPB").build(),
            RecordBuilder::new("SYS", "Y").source_app("Ledger", "E1").counts(5, 3, 1).tags("CMB").build(),
            RecordBuilder::new("SYS", "X").source_app("Cards", "E2").counts(1, 1, 1).build(),
        ];
        let agg = aggregate(&records, &FilterState::new());
        let sys = agg.source("SYS").unwrap();

        assert_eq!(sys.details.len(), 2);
        let e1 = &sys.details["E1"];
        assert_eq!((e1.tables, e1.cdp_tables), (10, 6));
        assert_eq!(e1.gbgf_tags.len(), 2);
        assert_eq!(sys.total_cdp_tables, 7);
    }

    #[test]
    fn downstream_detail_keeps_distinct_contributors() {
        let records = vec![
            RecordBuilder::new("S1", "X").source_app("Ledger", "E1").downstream_eim("D1").counts(0, 0, 4).build(),
            RecordBuilder::new("S2", "X").source_app("Ledger", "E1").downstream_eim("D2").counts(0, 0, 6).build(),
            RecordBuilder::new("S1", "X").source_app("Ledger", "E1").downstream_eim("D1").counts(0, 0, 1).build(),
        ];
        let agg = aggregate(&records, &FilterState::new());
        let x = agg.downstream_app("X").unwrap();

        assert_eq!(x.details.len(), 2);
        assert_eq!(x.details[&DetailKey::new("E1", "D1")].shared_tables, 5);
        assert_eq!(x.details[&DetailKey::new("E1", "D2")].source_system, "S2");
        assert_eq!(x.total_shared_tables, 11);
    }

    #[test]
    fn conflicting_downstream_eim_id_warns_and_keeps_first() {
        let records = vec![
            RecordBuilder::new("S1", "X").downstream_eim("D1").build(),
            RecordBuilder::new("S2", "X").downstream_eim("D2").build(),
            RecordBuilder::new("S3", "X").downstream_eim("D2").build(),
        ];
        let agg = aggregate(&records, &FilterState::new());

        assert_eq!(agg.downstream_app("X").unwrap().eim_id, "D1");
        assert_eq!(
            agg.warnings,
            vec![AggregationWarning::ConflictingDownstreamEimId {
                application: "X".to_string(),
                kept: "D1".to_string(),
                ignored: "D2".to_string(),
            }]
        );
    }

    #[test]
    fn conflicting_source_name_warns() {
        let records = vec![
            RecordBuilder::new("S1", "X").source_app("Ledger", "E1").build(),
            RecordBuilder::new("S1", "X").source_app("Ledger v2", "E1").build(),
        ];
        let agg = aggregate(&records, &FilterState::new());

        assert_eq!(agg.source("S1").unwrap().details["E1"].application_name, "Ledger");
        assert_eq!(agg.warnings.len(), 1);
        assert!(agg.warnings[0].to_string().contains("Ledger v2"));
    }

    #[test]
    fn filter_applies_before_grouping() {
        let records = vec![
            RecordBuilder::new("A", "X").tags("WPB").counts(1, 1, 1).build(),
            RecordBuilder::new("B", "Y").tags("CMB").counts(1, 1, 1).build(),
        ];
        let state = FilterState::new().with(FilterField::Gbgf, "CMB");
        let agg = aggregate(&records, &state);

        assert_eq!(agg.record_count, 1);
        assert_eq!(agg.sources[0].id, "B");
        assert_eq!(agg.downstream[0].id, "Y");
    }

    #[test]
    fn empty_input() {
        let agg = aggregate(&[], &FilterState::new());
        assert!(agg.is_empty());
        assert_eq!(agg, Aggregation::default());
    }

    #[test]
    fn order_is_value_then_id() {
        let records = vec![
            RecordBuilder::new("b", "X").counts(0, 5, 0).build(),
            RecordBuilder::new("a", "X").counts(0, 5, 0).build(),
            RecordBuilder::new("c", "X").counts(0, 9, 0).build(),
        ];
        let agg = aggregate(&records, &FilterState::new());
        let ids: Vec<_> = agg.sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn source_details_keep_first_codes_and_union_tags() {
        let records = vec![
            RecordBuilder::new("A", "X")
                .source_app("Ledger", "E1")
                .sys_codes("SYS01", "SUB1")
                .tags("WPB")
                .counts(10, 8, 2)
                .build(),
            RecordBuilder::new("A", "Y")
                .source_app("Ledger", "E1")
                .sys_codes("SYS99", "SUB9")
                .tags("CMB")
                .counts(5, 4, 1)
                .build(),
        ];
        let agg = aggregate(&records, &FilterState::new());
        let detail = &agg.source("A").unwrap().details["E1"];

        assert_eq!(detail.sys_code, "SYS01");
        assert_eq!(detail.sub_sys_code, "SUB1");
        assert_eq!((detail.tables, detail.cdp_tables), (15, 12));
        assert_eq!(detail.gbgf_tags.len(), 2);
    }

    #[test]
    fn detail_key_text_form_escapes_separator() {
        let plain = DetailKey::new("E1", "D1");
        assert_eq!(plain.to_string(), "E1|D1");
        assert_eq!(DetailKey::parse("E1|D1"), Some(plain));

        let left = DetailKey::new("a|b", "c");
        let right = DetailKey::new("a", "b|c");
        assert_ne!(left.to_string(), right.to_string());
        assert_eq!(left.to_string(), r"a\|b|c");

        for key in [left, right, DetailKey::new(r"x\", r"\|y"), DetailKey::new("", "")] {
            assert_eq!(DetailKey::parse(&key.to_string()), Some(key));
        }

        assert_eq!(DetailKey::parse("no-separator"), None);
        assert_eq!(DetailKey::parse("a|b|c"), None);
        assert_eq!(DetailKey::parse(r"a|b\"), None);
    }

    #[test]
    fn downstream_details_serialize_as_entries() {
        let agg = aggregate(&scenario_a(), &FilterState::new());
        let json = serde_json::to_value(&agg.downstream[0]).unwrap();
        let entries = json["details"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["sourceEimId"], "A");
        assert_eq!(entries[0]["sharedTables"], 100);
        assert_eq!(entries[1]["sourceEimId"], "B");
        assert_eq!(entries[1]["sharedTables"], 50);
    }
}
