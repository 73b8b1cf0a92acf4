//! Drill-down graph for one downstream application
//!
//! Contributing sources (bucketed) → hub → the application, optionally
//! followed by its EIM id. Every contributor's shared tables flow through the
//! hub, so the hub and the selected node both carry `totalSharedTables`.

use crate::builder::{seeds, GraphConfig, NodeSeed, TierPlacer};
use crate::model::{DetailFlowModel, Tier, HUB_ID};
use lineage_aggregate::{Bucketable, DetailKey, DownstreamAppAggregate, OTHER_SOURCES};

/// One contributor of the selected application, rankable for bucketing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailEntry {
    /// [`DetailKey`] text form, `"<source EIM id>|<downstream EIM id>"`
    pub id: String,
    /// Source application name
    pub name: String,
    /// Source system
    pub source_system: String,
    /// Shared tables
    pub shared_tables: u64,
}

impl DetailEntry {
    /// Entries of an aggregate, zero-value contributors dropped
    #[must_use]
    pub fn from_aggregate(app: &DownstreamAppAggregate) -> Vec<Self> {
        app.details
            .iter()
            .filter(|(_, detail)| detail.shared_tables > 0)
            .map(|(key, detail)| Self {
                id: key.to_string(),
                name: detail.source_application_name.clone(),
                source_system: detail.source_system.clone(),
                shared_tables: detail.shared_tables,
            })
            .collect()
    }

    /// Rebuild the composite key; `None` for the overflow entry
    #[must_use]
    pub fn key(&self) -> Option<DetailKey> {
        DetailKey::parse(&self.id)
    }
}

impl Bucketable for DetailEntry {
    fn bucket_id(&self) -> &str {
        &self.id
    }

    fn bucket_name(&self) -> &str {
        &self.name
    }

    fn bucket_value(&self) -> u64 {
        self.shared_tables
    }

    fn overflow(label: &str, members: &[Self]) -> Self {
        Self {
            id: label.to_string(),
            name: label.to_string(),
            source_system: String::new(),
            shared_tables: members.iter().map(|m| m.shared_tables).sum(),
        }
    }
}

/// Builds drill-down graphs
#[derive(Debug, Clone, Default)]
pub struct DetailFlowBuilder {
    config: GraphConfig,
}

impl DetailFlowBuilder {
    /// Create builder
    #[inline]
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self { config }
    }

    /// Build the drill-down graph for `app`
    #[must_use]
    pub fn build(&self, app: &DownstreamAppAggregate) -> DetailFlowModel {
        let selected = Tier::Downstream.node_id(&app.id);
        let bucketed = self
            .config
            .bucketer()
            .bucket(DetailEntry::from_aggregate(app), OTHER_SOURCES);

        let source_seeds = seeds(Tier::Source, bucketed, |entry| {
            NodeSeed::new(Tier::Source.node_id(&entry.id), &entry.name, entry.shared_tables)
        });

        let mut placer = TierPlacer::new(&self.config.layout);
        let inbound = placer.place(Tier::Source, source_seeds, HUB_ID, true);
        placer.hub(&self.config.hub_label, inbound);

        let target = NodeSeed::new(selected.clone(), &app.id, app.total_shared_tables)
            .eim_id(&app.eim_id);
        placer.place(Tier::Downstream, vec![target], HUB_ID, false);

        if self.config.include_info_tier {
            let info = NodeSeed::new(Tier::Info.node_id(&app.eim_id), &app.eim_id, app.total_shared_tables);
            placer.place(Tier::Info, vec![info], &selected, false);
        }

        let (nodes, links) = placer.finish();
        tracing::info!(
            selected = %selected,
            nodes = nodes.len(),
            inbound,
            "detail flow built"
        );

        DetailFlowModel {
            selected,
            total_shared_tables: app.total_shared_tables,
            nodes,
            links,
        }
    }
}
