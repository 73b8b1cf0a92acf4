//! Testing utilities for the lineage workspace
//!
//! Record builders, raw row helpers and small scenario datasets.

#![allow(missing_docs)]

use lineage_record::{columns, split_tags, FlowRecord, RawRow, UNKNOWN};

/// Fluent builder for [`FlowRecord`]
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    record: FlowRecord,
}

impl RecordBuilder {
    pub fn new(source_system: &str, downstream_app: &str) -> Self {
        Self {
            record: FlowRecord {
                source_system_id: source_system.to_string(),
                source_application_name: source_system.to_string(),
                source_eim_id: source_system.to_string(),
                downstream_application_name: downstream_app.to_string(),
                downstream_eim_id: UNKNOWN.to_string(),
                ..FlowRecord::default()
            },
        }
    }

    pub fn source_app(mut self, name: &str, eim_id: &str) -> Self {
        self.record.source_application_name = name.to_string();
        self.record.source_eim_id = eim_id.to_string();
        self
    }

    pub fn downstream_eim(mut self, eim_id: &str) -> Self {
        self.record.downstream_eim_id = eim_id.to_string();
        self
    }

    pub fn sys_codes(mut self, sys: &str, sub_sys: &str) -> Self {
        self.record.sys_code = sys.to_string();
        self.record.sub_sys_code = sub_sys.to_string();
        self
    }

    pub fn tags(mut self, cell: &str) -> Self {
        self.record.gbgf_tags = split_tags(Some(cell));
        self
    }

    pub fn counts(mut self, source: u64, cdp: u64, shared: u64) -> Self {
        self.record.source_table_count = source;
        self.record.cdp_table_count = cdp;
        self.record.shared_table_count = shared;
        self
    }

    pub fn build(self) -> FlowRecord {
        self.record
    }
}

/// Raw row with every required column blank
pub fn blank_row() -> RawRow {
    columns::REQUIRED
        .iter()
        .map(|column| ((*column).to_string(), String::new()))
        .collect()
}

/// Raw row carrying every required column
pub fn raw_row(source_system: &str, downstream_app: &str, gbgf: &str, cdp: &str, shared: &str) -> RawRow {
    let mut row = blank_row();
    row.insert(columns::SOURCE_SYSTEM.to_string(), source_system.to_string());
    row.insert(columns::SOURCE_APPLICATION_NAME.to_string(), format!("{source_system} App"));
    row.insert(columns::SOURCE_EIM_ID.to_string(), format!("{source_system}-EIM"));
    row.insert(columns::DOWNSTREAM_APPLICATION_NAME.to_string(), downstream_app.to_string());
    row.insert(columns::DOWNSTREAM_EIM_ID.to_string(), format!("{downstream_app}-EIM"));
    row.insert(columns::GBGF.to_string(), gbgf.to_string());
    row.insert(columns::SOURCE_TABLE_COUNT.to_string(), cdp.to_string());
    row.insert(columns::CDP_TABLE_COUNT.to_string(), cdp.to_string());
    row.insert(columns::SHARED_TABLE_COUNT.to_string(), shared.to_string());
    row
}

/// Two sources feeding one downstream application
///
/// Hub inbound 80 + 40, downstream X receives 150.
pub fn scenario_two_sources() -> Vec<FlowRecord> {
    vec![
        RecordBuilder::new("A", "X").counts(90, 80, 100).build(),
        RecordBuilder::new("B", "X").counts(45, 40, 50).build(),
    ]
}

/// `n` distinct source systems with values 1..=n, all feeding "X"
pub fn many_sources(n: u64) -> Vec<FlowRecord> {
    (1..=n)
        .map(|i| {
            RecordBuilder::new(&format!("S{i:03}"), "X")
                .counts(i, i, i)
                .build()
        })
        .collect()
}

/// `n` distinct sources feeding `target` through distinct EIM pairs
pub fn many_contributors(target: &str, n: u64) -> Vec<FlowRecord> {
    (1..=n)
        .map(|i| {
            RecordBuilder::new(&format!("S{i:03}"), target)
                .source_app(&format!("App {i:03}"), &format!("E{i:03}"))
                .downstream_eim("D001")
                .counts(i, i, i)
                .build()
        })
        .collect()
}

/// Small multi-tag dataset used across filter tests
pub fn tagged_dataset() -> Vec<FlowRecord> {
    vec![
        RecordBuilder::new("Core", "Ledger")
            .source_app("Core Banking", "E100")
            .downstream_eim("D200")
            .tags("WPB")
            .counts(10, 8, 6)
            .build(),
        RecordBuilder::new("Cards", "Marketing")
            .source_app("Card Platform", "E101")
            .downstream_eim("D201")
            .tags("CMB,GBM")
            .counts(20, 15, 12)
            .build(),
        RecordBuilder::new("Cards", "Risk")
            .source_app("Card Platform", "E101")
            .downstream_eim("D202")
            .tags("GBM")
            .counts(5, 5, 4)
            .build(),
    ]
}
