//! Dashboard session tests
//!
//! Filter/view interplay, atomic loads and file-backed inputs.

use lineage_aggregate::{FilterField, Selection};
use lineage_core::{
    ConfigError, Dashboard, EngineConfig, EngineError, FixtureError, JsonFileFixture,
    StaticFixture, SyntheticConfig, SyntheticFixture,
};
use lineage_graph::{FlowGraph, FlowView, Tier, ViewState, HUB_ID};
use lineage_record::{columns, RawRow, RecordError};
use lineage_test_utils::{blank_row, raw_row};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Write;

fn rows() -> Vec<RawRow> {
    vec![
        raw_row("A", "X", "WPB", "80", "100"),
        raw_row("B", "X", "CMB", "40", "50"),
        raw_row("C", "Z", "GBM", "30", "20"),
    ]
}

fn loaded() -> Dashboard {
    let mut dashboard = Dashboard::new(EngineConfig::default());
    dashboard.load(&rows()).unwrap();
    dashboard
}

#[test]
fn filter_change_in_detail_returns_to_overview() {
    let mut dashboard = loaded();
    dashboard.select("downstream:X").unwrap();
    assert_eq!(dashboard.view(), &ViewState::Detail("downstream:X".to_string()));

    let change = dashboard.set_filter(FilterField::Gbgf, Selection::parse("WPB"));
    assert!(change.is_change());
    assert_eq!(dashboard.view(), &ViewState::Overview);
    assert!(dashboard.detail().unwrap().is_none());
    assert!(matches!(dashboard.current().unwrap(), FlowView::Overview(_)));
}

#[test]
fn same_filter_value_keeps_detail() {
    let mut dashboard = loaded();
    dashboard.select("downstream:X").unwrap();

    let change = dashboard.set_filter(FilterField::Gbgf, Selection::All);
    assert!(!change.is_change());
    assert_eq!(dashboard.view().selected(), Some("downstream:X"));
}

#[test]
fn failed_load_keeps_previous_state() {
    let mut dashboard = loaded();
    dashboard.set_filter(FilterField::Gbgf, Selection::parse("CMB"));
    dashboard.select("downstream:X").unwrap();
    let before = dashboard.overview();

    let mut broken = rows();
    broken[0].remove(columns::GBGF);
    let err = dashboard.load(&broken).unwrap_err();

    assert!(matches!(err, EngineError::Record(RecordError::MissingColumns { .. })));
    assert_eq!(dashboard.records().len(), 3);
    assert_eq!(dashboard.filters().gbgf.value(), Some("CMB"));
    assert_eq!(dashboard.view().selected(), Some("downstream:X"));
    assert_eq!(dashboard.overview(), before);
}

#[test]
fn successful_load_resets_filters_and_view() {
    let mut dashboard = loaded();
    dashboard.set_filter(FilterField::ApplicationName, Selection::parse("X"));
    dashboard.select("downstream:X").unwrap();

    let report = dashboard.load(&[raw_row("Q", "W", "WPB", "5", "5")]).unwrap();
    assert_eq!(report.records, 1);
    assert!(dashboard.filters().is_unfiltered());
    assert_eq!(dashboard.view(), &ViewState::Overview);
    assert_eq!(dashboard.overview().nodes_in(Tier::Source).len(), 1);
}

#[test]
fn empty_load_is_accepted() {
    let mut dashboard = loaded();
    dashboard.load(&[]).unwrap();

    assert!(dashboard.records().is_empty());
    assert!(dashboard.overview().is_empty());
    for field in FilterField::FIELDS {
        assert_eq!(dashboard.options(field), vec!["ALL"]);
    }
}

#[test]
fn blank_rows_are_skipped() {
    let mut dashboard = Dashboard::default();
    let mut input = rows();
    input.push(blank_row());
    let report = dashboard.load(&input).unwrap();

    assert_eq!(report.blank_rows, 1);
    assert_eq!(dashboard.records().len(), 3);
}

#[test]
fn oversized_counts_are_coerced_before_graphs() {
    let huge = u64::MAX.to_string();
    let mut dashboard = Dashboard::default();
    let report = dashboard
        .load(&[
            raw_row("A", "X", "WPB", &huge, "1"),
            raw_row("B", "X", "WPB", "1", "1"),
        ])
        .unwrap();

    assert_eq!(report.rows_with_coercions, 1);
    assert_eq!(report.coerced_values, 2);

    let overview = dashboard.overview();
    assert_eq!(overview.inbound_total(HUB_ID), 1);
    assert_eq!(overview.outbound_total(HUB_ID), 2);
    assert_eq!(dashboard.summary().total_cdp_tables, 1);
}

#[test]
fn zero_value_and_overflow_nodes_cannot_be_selected() {
    let mut dashboard = Dashboard::new(EngineConfig::new().with_overflow_limit(1));
    dashboard.load(&rows()).unwrap();

    let overflow = Tier::Downstream.overflow_id();
    assert!(dashboard.overview().node(&overflow).is_some());
    let err = dashboard.select(&overflow).unwrap_err();
    assert!(err.is_rejected_selection());
    assert_eq!(dashboard.view(), &ViewState::Overview);
}

#[test]
fn detail_honors_info_tier_setting() {
    let mut dashboard = Dashboard::new(EngineConfig::new().with_info_tier(false));
    dashboard.load(&rows()).unwrap();
    dashboard.select("downstream:X").unwrap();

    let detail = dashboard.detail().unwrap().unwrap();
    assert!(detail.nodes_in(Tier::Info).is_empty());
    assert_eq!(detail.inbound_total(HUB_ID), 150);
}

#[test]
fn options_narrow_with_other_fields() {
    let mut dashboard = loaded();
    dashboard.set_filter(FilterField::Gbgf, Selection::parse("GBM"));

    assert_eq!(
        dashboard.options(FilterField::ApplicationName),
        vec!["ALL", "C App", "Z"]
    );
    assert_eq!(dashboard.options(FilterField::Gbgf).len(), 4);
}

#[test]
fn json_file_fixture_round_trip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"Source system":"A","Source EIM ID":"E1","Source Application Name":"Ledger",
            "SYS_CODE":null,"SUB_SYS_CODE":"","Downstream Application Name":"X",
            "Downstream EIM ID":"D1","GB/GF":"WPB, CMB","Source File/Table Count":12,
            "Total CDP Table Count":"10.7","Share to Downstream Table Count":4}}]"#
    )
    .unwrap();

    let mut dashboard = Dashboard::default();
    let report = dashboard.load_from(&JsonFileFixture::new(file.path())).unwrap();
    assert_eq!(report.records, 1);

    let record = &dashboard.records().as_slice()[0];
    assert_eq!(record.cdp_table_count, 10);
    assert_eq!(record.sys_code, "");
    assert_eq!(record.gbgf_tags.len(), 2);
}

#[test]
fn json_file_fixture_errors() {
    let missing = JsonFileFixture::new("/definitely/not/here.json");
    let mut dashboard = Dashboard::default();
    let err = dashboard.load_from(&missing).unwrap_err();
    assert!(matches!(err, EngineError::Fixture(FixtureError::Io { .. })));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{\"not\": \"an array\"}}").unwrap();
    let err = dashboard.load_from(&JsonFileFixture::new(file.path())).unwrap_err();
    assert!(matches!(err, EngineError::Fixture(FixtureError::InvalidRows { .. })));
}

#[test]
fn config_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();

    let toml_path = dir.path().join("engine.toml");
    std::fs::write(&toml_path, "overflow_limit = 2\nhub_label = \"Lake\"\n").unwrap();
    let config = EngineConfig::load(&toml_path).unwrap();
    assert_eq!(config.overflow_limit(), 2);
    assert_eq!(config.hub_label(), "Lake");

    let yaml_path = dir.path().join("engine.yml");
    std::fs::write(&yaml_path, "include_info_tier: false\nlayout:\n  width: 800.0\n").unwrap();
    let config = EngineConfig::load(&yaml_path).unwrap();
    assert!(!config.include_info_tier());
    assert_eq!(config.graph.layout.width, 800.0);

    let bad = dir.path().join("bad.toml");
    std::fs::write(&bad, "overflow_limit = \"many\"").unwrap();
    assert!(matches!(EngineConfig::load(&bad), Err(ConfigError::Toml { .. })));

    let invalid = dir.path().join("invalid.yaml");
    std::fs::write(&invalid, "layout:\n  width: -1.0\n").unwrap();
    assert!(matches!(EngineConfig::load(&invalid), Err(ConfigError::Invalid(_))));

    assert!(matches!(
        EngineConfig::load(dir.path().join("absent.toml")),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn configured_hub_label_reaches_graph() {
    let mut dashboard = Dashboard::new(EngineConfig::new().with_hub_label("Lake"));
    dashboard.load(&rows()).unwrap();
    assert_eq!(dashboard.overview().node(HUB_ID).unwrap().name, "Lake");
    assert_eq!(dashboard.tag_flow().node(HUB_ID).unwrap().name, "Lake");
}

#[test]
fn static_fixture_feeds_session() {
    let mut dashboard = Dashboard::default();
    dashboard
        .load_from(&StaticFixture::new("inline", rows()))
        .unwrap();
    assert_eq!(dashboard.summary().source_system_count, 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_synthetic_sessions_conserve_flow(seed in any::<u64>(), count in 0..150usize) {
        let fixture = SyntheticFixture::new(SyntheticConfig::default().with_seed(seed).with_rows(count));
        let mut dashboard = Dashboard::default();
        dashboard.load_from(&fixture).unwrap();

        let summary = dashboard.summary();
        let overview = dashboard.overview();
        prop_assert_eq!(summary.record_count, count);
        prop_assert_eq!(overview.inbound_total(HUB_ID), summary.total_cdp_tables);
        prop_assert_eq!(overview.outbound_total(HUB_ID), summary.total_shared_tables);
    }

    #[test]
    fn prop_malformed_cells_never_fail_load(seed in any::<u64>(), rate in 0.0..=1.0f64) {
        let config = SyntheticConfig::default().with_seed(seed).with_rows(40).with_malformed_rate(rate);
        let mut dashboard = Dashboard::default();
        let report = dashboard.load_from(&SyntheticFixture::new(config)).unwrap();
        prop_assert_eq!(report.records, 40);
    }
}
