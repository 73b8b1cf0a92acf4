//! Overview graph construction
//!
//! Source tier → hub → downstream tier. The hub's value is the sum of its
//! inbound links, so inbound flow is conserved by construction.

use crate::layout::LayoutConfig;
use crate::model::{GraphLink, GraphModel, GraphNode, Tier, HUB_ID};
use lineage_aggregate::{
    Aggregation, Bucketed, OverflowBucketer, OverflowMember, DEFAULT_LIMIT, OTHER_DOWNSTREAM,
    OTHER_SOURCES,
};
use serde::{Deserialize, Serialize};

/// Default hub label
pub const DEFAULT_HUB_LABEL: &str = "CDP";

/// Settings shared by every graph builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Entries kept per tier before overflow bucketing
    pub overflow_limit: usize,
    /// Hub display label
    pub hub_label: String,
    /// Append the downstream EIM id tier to drill-down graphs
    pub include_info_tier: bool,
    /// Layout constants
    pub layout: LayoutConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            overflow_limit: DEFAULT_LIMIT,
            hub_label: DEFAULT_HUB_LABEL.to_string(),
            include_info_tier: true,
            layout: LayoutConfig::default(),
        }
    }
}

impl GraphConfig {
    /// Set overflow limit
    #[inline]
    #[must_use]
    pub fn with_overflow_limit(mut self, limit: usize) -> Self {
        self.overflow_limit = limit;
        self
    }

    /// Set hub label
    #[inline]
    #[must_use]
    pub fn with_hub_label(mut self, label: impl Into<String>) -> Self {
        self.hub_label = label.into();
        self
    }

    /// Enable or disable the info tier
    #[inline]
    #[must_use]
    pub fn with_info_tier(mut self, include: bool) -> Self {
        self.include_info_tier = include;
        self
    }

    /// Set layout constants
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Bucketer honoring the configured limit
    #[inline]
    #[must_use]
    pub fn bucketer(&self) -> OverflowBucketer {
        OverflowBucketer::new(self.overflow_limit)
    }
}

/// Node before layout
#[derive(Debug, Clone)]
pub(crate) struct NodeSeed {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) value: u64,
    pub(crate) link_value: u64,
    pub(crate) members: Vec<OverflowMember>,
    pub(crate) eim_id: Option<String>,
}

impl NodeSeed {
    pub(crate) fn new(id: String, name: impl Into<String>, value: u64) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            link_value: value,
            members: Vec::new(),
            eim_id: None,
        }
    }

    pub(crate) fn link_value(mut self, value: u64) -> Self {
        self.link_value = value;
        self
    }

    pub(crate) fn members(mut self, members: Vec<OverflowMember>) -> Self {
        self.members = members;
        self
    }

    pub(crate) fn eim_id(mut self, eim_id: impl Into<String>) -> Self {
        self.eim_id = Some(eim_id.into());
        self
    }
}

/// Kept entries then the overflow bucket, as seeds
pub(crate) fn seeds<T>(
    tier: Tier,
    bucketed: Bucketed<T>,
    seed: impl Fn(&T) -> NodeSeed,
) -> Vec<NodeSeed> {
    let mut out: Vec<NodeSeed> = bucketed.kept.iter().map(&seed).collect();
    if let Some(other) = bucketed.other {
        let mut overflow = seed(&other.aggregate).members(other.members);
        overflow.id = tier.overflow_id();
        overflow.eim_id = None;
        out.push(overflow);
    }
    out
}

/// Lay out one tier and link every node to or from the hub
pub(crate) struct TierPlacer<'a> {
    pub(crate) layout: &'a LayoutConfig,
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) links: Vec<GraphLink>,
}

impl<'a> TierPlacer<'a> {
    pub(crate) fn new(layout: &'a LayoutConfig) -> Self {
        Self {
            layout,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub(crate) fn link(&mut self, source: &str, target: &str, value: u64) {
        self.links.push(GraphLink {
            source: source.to_string(),
            target: target.to_string(),
            value,
            width: self.layout.link_width(value),
        });
    }

    /// Place seeds in `tier`, linking each into `anchor` when `into_anchor`
    /// and out of it otherwise. Returns the summed link value.
    pub(crate) fn place(&mut self, tier: Tier, seeds: Vec<NodeSeed>, anchor: &str, into_anchor: bool) -> u64 {
        let count = seeds.len();
        let max = seeds.iter().map(|s| s.value).max().unwrap_or(0);
        let mut total = 0;

        for (index, seed) in seeds.into_iter().enumerate() {
            let (x, y) = self.layout.position(tier, index, count);
            if into_anchor {
                self.link(&seed.id, anchor, seed.link_value);
            } else {
                self.link(anchor, &seed.id, seed.link_value);
            }
            total += seed.link_value;

            self.nodes.push(GraphNode {
                size: self.layout.node_size(seed.value, max),
                id: seed.id,
                name: seed.name,
                tier,
                value: seed.value,
                x,
                y,
                members: seed.members,
                eim_id: seed.eim_id,
            });
        }

        total
    }

    pub(crate) fn hub(&mut self, label: &str, value: u64) {
        let (x, y) = self.layout.position(Tier::Hub, 0, 1);
        self.nodes.push(GraphNode {
            id: HUB_ID.to_string(),
            name: label.to_string(),
            tier: Tier::Hub,
            value,
            size: self.layout.hub_size,
            x,
            y,
            members: Vec::new(),
            eim_id: None,
        });
    }

    /// Nodes ordered source, hub, downstream, info
    pub(crate) fn finish(mut self) -> (Vec<GraphNode>, Vec<GraphLink>) {
        self.nodes.sort_by_key(|n| n.tier);
        (self.nodes, self.links)
    }
}

/// Builds the overview graph from an aggregation
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
}

impl GraphBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Builder settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Build the overview graph
    ///
    /// An aggregation with no source and no downstream entries yields an
    /// empty graph without a hub. Downstream applications with no shared
    /// tables are left out.
    #[must_use]
    pub fn build(&self, aggregation: &Aggregation) -> GraphModel {
        if aggregation.is_empty() {
            tracing::debug!("empty aggregation, empty overview");
            return GraphModel::empty();
        }

        let bucketer = self.config.bucketer();
        let sources = bucketer.bucket(aggregation.sources.clone(), OTHER_SOURCES);
        let downstream = bucketer.bucket(
            aggregation
                .downstream
                .iter()
                .filter(|d| d.value() > 0)
                .cloned()
                .collect(),
            OTHER_DOWNSTREAM,
        );

        let source_seeds = seeds(Tier::Source, sources, |s| {
            NodeSeed::new(Tier::Source.node_id(&s.id), &s.id, s.total_source_tables)
                .link_value(s.total_cdp_tables)
        });
        let downstream_seeds = seeds(Tier::Downstream, downstream, |d| {
            NodeSeed::new(Tier::Downstream.node_id(&d.id), &d.id, d.total_shared_tables)
                .eim_id(&d.eim_id)
        });

        let mut placer = TierPlacer::new(&self.config.layout);
        let inbound = placer.place(Tier::Source, source_seeds, HUB_ID, true);
        let outbound = placer.place(Tier::Downstream, downstream_seeds, HUB_ID, false);
        placer.hub(&self.config.hub_label, inbound);
        let (nodes, links) = placer.finish();

        tracing::info!(
            nodes = nodes.len(),
            links = links.len(),
            inbound,
            outbound,
            "overview built"
        );

        GraphModel { nodes, links }
    }
}
