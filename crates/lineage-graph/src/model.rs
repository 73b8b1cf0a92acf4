//! Graph model handed to the rendering layer
//!
//! Plain node/link data. Node ids are tier-prefixed (`source:<key>`, `hub`,
//! `downstream:<key>`, `info:<key>`) so equal names in different tiers never
//! collide; overflow buckets use `<tier>#other`.

use lineage_aggregate::OverflowMember;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the hub node
pub const HUB_ID: &str = "hub";

/// Column a node is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Systems feeding the hub
    Source,
    /// The aggregation platform
    Hub,
    /// Applications fed by the hub
    Downstream,
    /// Downstream EIM id, drill-down only
    Info,
}

impl Tier {
    /// Every tier, left to right
    pub const TIERS: [Self; 4] = [Self::Source, Self::Hub, Self::Downstream, Self::Info];

    /// Lowercase tier name, also the node id prefix
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Hub => "hub",
            Self::Downstream => "downstream",
            Self::Info => "info",
        }
    }

    /// Node id for `key` in this tier
    #[must_use]
    pub fn node_id(self, key: &str) -> String {
        match self {
            Self::Hub => HUB_ID.to_string(),
            _ => format!("{}:{key}", self.as_str()),
        }
    }

    /// Node id of this tier's overflow bucket
    #[must_use]
    pub fn overflow_id(self) -> String {
        format!("{}#other", self.as_str())
    }

    /// Key part of a node id in this tier
    #[must_use]
    pub fn key_of(self, node_id: &str) -> Option<&str> {
        node_id
            .strip_prefix(self.as_str())
            .and_then(|rest| rest.strip_prefix(':'))
    }

    /// Tier of a well-formed node id, `None` for any other text
    #[must_use]
    pub fn of_node_id(node_id: &str) -> Option<Self> {
        if node_id == HUB_ID {
            return Some(Self::Hub);
        }
        Self::TIERS.into_iter().find(|tier| {
            *tier != Self::Hub && (tier.key_of(node_id).is_some() || node_id == tier.overflow_id())
        })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a flow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Tier-prefixed id
    pub id: String,
    /// Display label
    pub name: String,
    /// Tier
    pub tier: Tier,
    /// Display value
    pub value: u64,
    /// Rendered size
    pub size: f64,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Entries absorbed by an overflow node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<OverflowMember>,
    /// EIM id of a downstream application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eim_id: Option<String>,
}

impl GraphNode {
    /// Check if this node is a synthetic overflow bucket
    #[inline]
    #[must_use]
    pub fn is_overflow(&self) -> bool {
        !self.members.is_empty()
    }
}

/// Directed, weighted link between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    /// Source node id
    pub source: String,
    /// Target node id
    pub target: String,
    /// Flow carried
    pub value: u64,
    /// Rendered width
    pub width: f64,
}

/// Read access shared by every flow graph
pub trait FlowGraph {
    /// All nodes
    fn nodes(&self) -> &[GraphNode];

    /// All links
    fn links(&self) -> &[GraphLink];

    /// Find node by id
    fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes().iter().find(|n| n.id == id)
    }

    /// Nodes of one tier, in layout order
    fn nodes_in(&self, tier: Tier) -> Vec<&GraphNode> {
        self.nodes().iter().filter(|n| n.tier == tier).collect()
    }

    /// Sum of link values ending at `id`
    fn inbound_total(&self, id: &str) -> u64 {
        self.links()
            .iter()
            .filter(|l| l.target == id)
            .map(|l| l.value)
            .sum()
    }

    /// Sum of link values starting at `id`
    fn outbound_total(&self, id: &str) -> u64 {
        self.links()
            .iter()
            .filter(|l| l.source == id)
            .map(|l| l.value)
            .sum()
    }

    /// Check if the graph has no nodes
    fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }
}

/// Three-tier overview graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphModel {
    /// Nodes, grouped by tier
    pub nodes: Vec<GraphNode>,
    /// Links
    pub links: Vec<GraphLink>,
}

impl GraphModel {
    /// Graph with no nodes and no links
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl FlowGraph for GraphModel {
    fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    fn links(&self) -> &[GraphLink] {
        &self.links
    }
}

/// Drill-down graph for one downstream application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFlowModel {
    /// Id of the overview node drilled into
    pub selected: String,
    /// Shared tables of the selected application
    pub total_shared_tables: u64,
    /// Nodes, grouped by tier
    pub nodes: Vec<GraphNode>,
    /// Links
    pub links: Vec<GraphLink>,
}

impl FlowGraph for DetailFlowModel {
    fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    fn links(&self) -> &[GraphLink] {
        &self.links
    }
}

/// Whichever graph the view currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum FlowView {
    /// Overview graph
    Overview(GraphModel),
    /// Drill-down graph
    Detail(DetailFlowModel),
}

impl FlowGraph for FlowView {
    fn nodes(&self) -> &[GraphNode] {
        match self {
            Self::Overview(graph) => graph.nodes(),
            Self::Detail(graph) => graph.nodes(),
        }
    }

    fn links(&self) -> &[GraphLink] {
        match self {
            Self::Overview(graph) => graph.links(),
            Self::Detail(graph) => graph.links(),
        }
    }
}
