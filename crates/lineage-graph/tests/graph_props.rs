use lineage_aggregate::{aggregate, FilterField, FilterState, OTHER_SOURCES};
use lineage_graph::{
    DetailFlowBuilder, FlowGraph, GraphBuilder, GraphConfig, LayoutConfig, SelectTarget, Tier,
    TagFlowBuilder, ViewEvent, ViewState, HUB_ID,
};
use lineage_record::FlowRecord;
use lineage_test_utils::{many_contributors, scenario_two_sources, RecordBuilder};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = FlowRecord> {
    (
        0..40u32,
        0..45u32,
        prop::sample::select(vec!["WPB", "CMB", "GBM,WPB"]),
        0..500u64,
        0..500u64,
    )
        .prop_map(|(source, target, tags, cdp, shared)| {
            RecordBuilder::new(&format!("S{source}"), &format!("T{target}"))
                .source_app(&format!("App{source}"), &format!("E{source}"))
                .downstream_eim(&format!("D{target}"))
                .tags(tags)
                .counts(cdp, cdp, shared)
                .build()
        })
}

/// A field and a value drawn from the same id spaces as [`arb_record`]
fn arb_narrowing() -> impl Strategy<Value = (FilterField, String)> {
    prop_oneof![
        prop::sample::select(vec!["WPB", "CMB", "GBM"])
            .prop_map(|tag| (FilterField::Gbgf, tag.to_string())),
        (0..40u32).prop_map(|i| (FilterField::EimId, format!("E{i}"))),
        (0..45u32).prop_map(|i| (FilterField::EimId, format!("D{i}"))),
        (0..40u32).prop_map(|i| (FilterField::ApplicationName, format!("App{i}"))),
        (0..45u32).prop_map(|i| (FilterField::ApplicationName, format!("T{i}"))),
    ]
}

proptest! {
    #[test]
    fn prop_overview_conserves_flow(
        records in proptest::collection::vec(arb_record(), 0..120),
        limit in 0..35usize,
    ) {
        let agg = aggregate(&records, &FilterState::new());
        let graph = GraphBuilder::new(GraphConfig::default().with_overflow_limit(limit)).build(&agg);

        if agg.is_empty() {
            prop_assert!(graph.is_empty());
        } else {
            let source_links: u64 = graph
                .links
                .iter()
                .filter(|l| l.target == HUB_ID)
                .map(|l| l.value)
                .sum();
            prop_assert_eq!(source_links, agg.total_cdp_tables());
            prop_assert_eq!(graph.node(HUB_ID).unwrap().value, source_links);
            prop_assert_eq!(graph.outbound_total(HUB_ID), agg.total_shared_tables());
            prop_assert!(graph.nodes_in(Tier::Source).len() <= limit + 1);
            prop_assert!(graph.nodes_in(Tier::Downstream).iter().all(|n| n.value > 0));
            prop_assert!(graph.links.iter().all(|l| l.width >= 1.0));
        }
    }

    #[test]
    fn prop_narrowing_never_adds_nodes(
        records in proptest::collection::vec(arb_record(), 0..80),
        base in arb_narrowing(),
        narrowing in arb_narrowing(),
    ) {
        let (base_field, base_value) = base;
        let (field, value) = narrowing;
        prop_assume!(base_field != field);

        let builder = GraphBuilder::default();
        let loose_state = FilterState::new().with(base_field, base_value);
        let tight_state = loose_state.clone().with(field, value);
        let loose = builder.build(&aggregate(&records, &loose_state));
        let tight = builder.build(&aggregate(&records, &tight_state));

        for tier in [Tier::Source, Tier::Downstream] {
            prop_assert!(tight.nodes_in(tier).len() <= loose.nodes_in(tier).len());
        }
    }

    #[test]
    fn prop_narrowing_each_field_from_all(
        records in proptest::collection::vec(arb_record(), 0..80),
        narrowing in arb_narrowing(),
    ) {
        let (field, value) = narrowing;
        let builder = GraphBuilder::default();
        let loose = builder.build(&aggregate(&records, &FilterState::new()));
        let tight = builder.build(&aggregate(&records, &FilterState::new().with(field, value)));

        for tier in [Tier::Source, Tier::Downstream] {
            prop_assert!(tight.nodes_in(tier).len() <= loose.nodes_in(tier).len());
        }
    }

    #[test]
    fn prop_detail_conserves_selected_value(
        records in proptest::collection::vec(arb_record(), 1..120),
        limit in 0..35usize,
    ) {
        let agg = aggregate(&records, &FilterState::new());
        let builder = DetailFlowBuilder::new(GraphConfig::default().with_overflow_limit(limit));

        for app in agg.downstream.iter().filter(|d| d.value() > 0) {
            let detail = builder.build(app);
            let sources: u64 = detail.nodes_in(Tier::Source).iter().map(|n| n.value).sum();
            prop_assert_eq!(sources, app.total_shared_tables);
            prop_assert_eq!(detail.inbound_total(HUB_ID), app.total_shared_tables);
            prop_assert_eq!(detail.inbound_total(&detail.selected), app.total_shared_tables);
        }
    }

    #[test]
    fn prop_node_size_monotonic(a in 0..10_000u64, b in 0..10_000u64, max in 1..10_000u64) {
        let layout = LayoutConfig::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(layout.node_size(lo, max) <= layout.node_size(hi, max));
        prop_assert!(layout.node_size(lo, max) >= layout.min_node_size);
    }

    #[test]
    fn prop_link_width_bounded(a in 0..u64::MAX, b in 0..u64::MAX) {
        let layout = LayoutConfig::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(layout.link_width(lo) <= layout.link_width(hi));
        prop_assert!(layout.link_width(hi) >= 1.0);
        prop_assert!(layout.link_width(hi) <= layout.max_link_width);
    }

    #[test]
    fn prop_positions_are_pure(count in 1..200usize, index in 0..200usize) {
        let index = index % count;
        let layout = LayoutConfig::default();
        for tier in [Tier::Source, Tier::Hub, Tier::Downstream, Tier::Info] {
            prop_assert_eq!(layout.position(tier, index, count), layout.position(tier, index, count));
            let (x, y) = layout.position(tier, index, count);
            prop_assert!((0.0..=layout.width).contains(&x));
            prop_assert!((0.0..=layout.height).contains(&y));
        }
    }

    #[test]
    fn prop_tag_flow_hub_matches_inbound(records in proptest::collection::vec(arb_record(), 0..60)) {
        let graph = TagFlowBuilder::default().build(&records, &FilterState::new());
        if let Some(hub) = graph.node(HUB_ID) {
            prop_assert_eq!(hub.value, graph.inbound_total(HUB_ID));
        }
    }
}

#[test]
fn two_sources_feed_one_downstream() {
    let graph = GraphBuilder::default().build(&aggregate(&scenario_two_sources(), &FilterState::new()));

    assert_eq!(graph.nodes_in(Tier::Source).len(), 2);
    assert_eq!(graph.nodes_in(Tier::Hub).len(), 1);
    let downstream = graph.nodes_in(Tier::Downstream);
    assert_eq!(downstream.len(), 1);
    assert_eq!(downstream[0].value, 150);
    assert_eq!(graph.inbound_total(HUB_ID), 120);
}

#[test]
fn drill_down_matches_value_used_to_enter() {
    let records = many_contributors("X", 45);
    let agg = aggregate(&records, &FilterState::new());
    let overview = GraphBuilder::default().build(&agg);
    let node = overview.node("downstream:X").unwrap();

    let mut view = ViewState::Overview;
    view.apply(&ViewEvent::Select(SelectTarget::from(node))).unwrap();
    assert_eq!(view.selected(), Some("downstream:X"));

    let app = agg.downstream_app("X").unwrap();
    let detail = DetailFlowBuilder::default().build(app);
    let sources = detail.nodes_in(Tier::Source);
    assert_eq!(sources.last().unwrap().name, OTHER_SOURCES);
    let total: u64 = sources.iter().map(|n| n.value).sum();
    assert_eq!(total, node.value);
}

#[test]
fn overview_serializes_for_renderer() {
    let graph = GraphBuilder::default().build(&aggregate(&scenario_two_sources(), &FilterState::new()));
    let json = serde_json::to_value(&graph).unwrap();

    let hub = json["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["id"] == HUB_ID)
        .unwrap();
    assert_eq!(hub["tier"], "hub");
    assert_eq!(hub["value"], 120);
    assert!(hub.get("members").is_none());
    assert!(json["links"][0]["width"].as_f64().unwrap() >= 1.0);
}
