//! Lineage Graphs
//!
//! Turns aggregations into plain node/link graphs for the rendering layer.
//!
//! # Core Concepts
//!
//! - [`GraphBuilder`]: source tier → hub → downstream tier overview
//! - [`DetailFlowBuilder`]: contributors of one downstream application
//! - [`TagFlowBuilder`]: GB/GF tag → hub → GB/GF tag
//! - [`LayoutConfig`]: deterministic staggered-grid layout
//! - [`ViewState`]: overview / drill-down state machine
//!
//! # Example
//!
//! ```rust
//! use lineage_aggregate::{aggregate, FilterState};
//! use lineage_graph::{FlowGraph, GraphBuilder, HUB_ID};
//! use lineage_record::FlowRecord;
//!
//! let mut record = FlowRecord::default();
//! record.cdp_table_count = 7;
//! record.shared_table_count = 3;
//!
//! let graph = GraphBuilder::default().build(&aggregate(&[record], &FilterState::new()));
//! assert_eq!(graph.inbound_total(HUB_ID), 7);
//! assert_eq!(graph.outbound_total(HUB_ID), 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod builder;
mod detail;
mod error;
mod layout;
mod model;
mod tag_flow;
mod view;

// Re-exports
pub use builder::{GraphBuilder, GraphConfig, DEFAULT_HUB_LABEL};
pub use detail::{DetailEntry, DetailFlowBuilder};
pub use error::{GraphError, GraphResult};
pub use layout::{grid, Band, LayoutConfig};
pub use model::{DetailFlowModel, FlowGraph, FlowView, GraphLink, GraphModel, GraphNode, Tier, HUB_ID};
pub use tag_flow::{tag_totals, TagFlowBuilder, TagTotal};
pub use view::{allowed_events, transition, SelectTarget, ViewEvent, ViewEventKind, ViewState};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
