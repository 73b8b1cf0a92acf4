//! GB/GF flow graph
//!
//! `Source <tag>` → hub → `Downstream <tag>`. A record carrying several tags
//! counts once per tag, so totals here can exceed the overview's.

use crate::builder::{seeds, GraphConfig, NodeSeed, TierPlacer};
use crate::model::{GraphModel, Tier, HUB_ID};
use lineage_aggregate::{Bucketable, FilterState, OTHER_DOWNSTREAM, OTHER_SOURCES};
use lineage_record::FlowRecord;
use std::collections::BTreeMap;

/// Per-tag total on one side of the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTotal {
    /// Tag
    pub tag: String,
    /// Summed tables
    pub value: u64,
}

impl Bucketable for TagTotal {
    fn bucket_id(&self) -> &str {
        &self.tag
    }

    fn bucket_name(&self) -> &str {
        &self.tag
    }

    fn bucket_value(&self) -> u64 {
        self.value
    }

    fn overflow(label: &str, members: &[Self]) -> Self {
        Self {
            tag: label.to_string(),
            value: members.iter().map(|m| m.value).sum(),
        }
    }
}

/// Sum hub-ingested and shared tables per tag over the accepted records
#[must_use]
pub fn tag_totals(records: &[FlowRecord], state: &FilterState) -> (Vec<TagTotal>, Vec<TagTotal>) {
    let mut totals: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for record in records.iter().filter(|r| state.matches(r)) {
        for tag in &record.gbgf_tags {
            let entry = totals.entry(tag.as_str()).or_default();
            entry.0 += record.cdp_table_count;
            entry.1 += record.shared_table_count;
        }
    }

    let inbound = totals
        .iter()
        .map(|(tag, (cdp, _))| TagTotal {
            tag: (*tag).to_string(),
            value: *cdp,
        })
        .collect();
    let outbound = totals
        .iter()
        .filter(|(_, (_, shared))| *shared > 0)
        .map(|(tag, (_, shared))| TagTotal {
            tag: (*tag).to_string(),
            value: *shared,
        })
        .collect();

    (inbound, outbound)
}

/// Builds the GB/GF flow graph
#[derive(Debug, Clone, Default)]
pub struct TagFlowBuilder {
    config: GraphConfig,
}

impl TagFlowBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the GB/GF flow for the records accepted by `state`
    #[must_use]
    pub fn build(&self, records: &[FlowRecord], state: &FilterState) -> GraphModel {
        let (inbound, outbound) = tag_totals(records, state);
        if inbound.is_empty() {
            return GraphModel::empty();
        }

        let bucketer = self.config.bucketer();
        let source_seeds = seeds(Tier::Source, bucketer.bucket(inbound, OTHER_SOURCES), |t| {
            NodeSeed::new(Tier::Source.node_id(&t.tag), label("Source", &t.tag), t.value)
        });
        let downstream_seeds = seeds(
            Tier::Downstream,
            bucketer.bucket(outbound, OTHER_DOWNSTREAM),
            |t| NodeSeed::new(Tier::Downstream.node_id(&t.tag), label("Downstream", &t.tag), t.value),
        );

        let mut placer = TierPlacer::new(&self.config.layout);
        let total_in = placer.place(Tier::Source, source_seeds, HUB_ID, true);
        let total_out = placer.place(Tier::Downstream, downstream_seeds, HUB_ID, false);
        placer.hub(&self.config.hub_label, total_in);
        let (nodes, links) = placer.finish();

        tracing::info!(nodes = nodes.len(), total_in, total_out, "tag flow built");
        GraphModel { nodes, links }
    }
}

fn label(side: &str, tag: &str) -> String {
    if tag == OTHER_SOURCES || tag == OTHER_DOWNSTREAM {
        tag.to_string()
    } else {
        format!("{side} {tag}")
    }
}
