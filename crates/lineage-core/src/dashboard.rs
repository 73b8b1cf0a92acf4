//! Dashboard session
//!
//! Single owner of the loaded record set, the filter state and the view
//! state. Every derived structure is recomputed from those three on request;
//! nothing derived is cached.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::fixture::FixtureProvider;
use lineage_aggregate::{
    aggregate, Aggregation, FilterChange, FilterEngine, FilterField, FilterState, FlowSummary,
    Selection,
};
use lineage_graph::{
    DetailFlowBuilder, DetailFlowModel, FlowGraph, FlowView, GraphBuilder, GraphError, GraphModel,
    SelectTarget, TagFlowBuilder, Tier, ViewEvent, ViewState,
};
use lineage_record::{LoadReport, RawRow, RecordSet};

/// Interactive lineage session
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    config: EngineConfig,
    records: RecordSet,
    filters: FilterEngine,
    view: ViewState,
}

impl Dashboard {
    /// Create an empty session
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            records: RecordSet::empty(),
            filters: FilterEngine::new(),
            view: ViewState::Overview,
        }
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Loaded records
    #[inline]
    #[must_use]
    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Current filter selections
    #[inline]
    #[must_use]
    pub fn filters(&self) -> &FilterState {
        self.filters.state()
    }

    /// Current view
    #[inline]
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Replace the record set
    ///
    /// On success filters reset to `ALL` and the view returns to the
    /// overview. On failure nothing changes.
    ///
    /// # Errors
    /// Returns [`crate::EngineError::Record`] when the header contract is broken.
    pub fn load(&mut self, rows: &[RawRow]) -> EngineResult<LoadReport> {
        let (records, report) = match RecordSet::load(rows) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(error = %e, "load rejected, keeping previous records");
                return Err(e.into());
            }
        };

        self.records = records;
        self.filters.reset();
        self.fire(&ViewEvent::DataLoaded);
        Ok(report)
    }

    /// Pull every row from `provider`, then [`Self::load`]
    ///
    /// # Errors
    /// Returns fixture or record errors; the session is unchanged.
    pub fn load_from(&mut self, provider: &dyn FixtureProvider) -> EngineResult<LoadReport> {
        let rows = match provider.rows() {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(provider = provider.name(), error = %e, "fixture failed");
                return Err(e.into());
            }
        };
        tracing::info!(provider = provider.name(), rows = rows.len(), "rows fetched");
        self.load(&rows)
    }

    /// Set one filter field; returns to the overview when anything changed
    pub fn set_filter(&mut self, field: FilterField, selection: Selection) -> FilterChange {
        let change = self.filters.select(self.records.as_slice(), field, selection);
        if change.is_change() {
            self.fire(&ViewEvent::FilterChanged);
        }
        change
    }

    /// Options for a field, `"ALL"` first
    #[must_use]
    pub fn options(&self, field: FilterField) -> Vec<String> {
        self.filters.options(self.records.as_slice(), field)
    }

    /// Aggregation under the current filters
    #[must_use]
    pub fn aggregation(&self) -> Aggregation {
        aggregate(self.records.as_slice(), self.filters.state())
    }

    /// Headline figures under the current filters
    #[must_use]
    pub fn summary(&self) -> FlowSummary {
        FlowSummary::compute(self.records.as_slice(), self.filters.state())
    }

    /// Overview graph under the current filters
    #[must_use]
    pub fn overview(&self) -> GraphModel {
        GraphBuilder::new(self.config.graph.clone()).build(&self.aggregation())
    }

    /// GB/GF flow graph under the current filters
    #[must_use]
    pub fn tag_flow(&self) -> GraphModel {
        TagFlowBuilder::new(self.config.graph.clone())
            .build(self.records.as_slice(), self.filters.state())
    }

    /// Drill-down graph of the selected node, if a detail view is open
    ///
    /// # Errors
    /// Returns [`GraphError::NodeNotFound`] if the selection no longer
    /// exists in the aggregation.
    pub fn detail(&self) -> EngineResult<Option<DetailFlowModel>> {
        let Some(selected) = self.view.selected() else {
            return Ok(None);
        };

        let aggregation = self.aggregation();
        let app = Tier::Downstream
            .key_of(selected)
            .and_then(|key| aggregation.downstream_app(key))
            .ok_or_else(|| GraphError::NodeNotFound(selected.to_string()))?;

        Ok(Some(DetailFlowBuilder::new(self.config.graph.clone()).build(app)))
    }

    /// Whatever the view currently shows
    ///
    /// # Errors
    /// See [`Self::detail`].
    pub fn current(&self) -> EngineResult<FlowView> {
        Ok(match self.detail()? {
            Some(detail) => FlowView::Detail(detail),
            None => FlowView::Overview(self.overview()),
        })
    }

    /// Drill into an overview node
    ///
    /// # Errors
    /// Returns the rejection reason for unknown, non-downstream, zero-value
    /// or overflow nodes, or when a detail view is already open. The view is
    /// unchanged on error.
    pub fn select(&mut self, node_id: &str) -> EngineResult<&ViewState> {
        let overview = self.overview();
        let result = overview
            .node(node_id)
            .map(SelectTarget::from)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
            .and_then(|target| self.view.apply(&ViewEvent::Select(target)));

        match result {
            Ok(()) => {
                tracing::info!(node = node_id, "detail opened");
                Ok(&self.view)
            }
            Err(e) => {
                tracing::debug!(node = node_id, reason = %e, "selection ignored");
                Err(e.into())
            }
        }
    }

    /// Return to the overview
    pub fn back(&mut self) -> &ViewState {
        self.fire(&ViewEvent::Back);
        &self.view
    }

    fn fire(&mut self, event: &ViewEvent) {
        let before = self.view.clone();
        if let Err(e) = self.view.apply(event) {
            tracing::debug!(event = ?event.kind(), reason = %e, "view event ignored");
        } else if before != self.view {
            tracing::debug!(event = ?event.kind(), from = ?before, to = ?self.view, "view changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::StaticFixture;
    use lineage_test_utils::raw_row;

    fn rows() -> Vec<RawRow> {
        vec![
            raw_row("A", "X", "WPB", "80", "100"),
            raw_row("B", "X", "CMB", "40", "50"),
            raw_row("B", "Y", "CMB", "10", "0"),
        ]
    }

    fn loaded() -> Dashboard {
        let mut dashboard = Dashboard::default();
        dashboard.load(&rows()).unwrap();
        dashboard
    }

    #[test]
    fn starts_empty() {
        let dashboard = Dashboard::default();
        assert!(dashboard.records().is_empty());
        assert!(dashboard.overview().is_empty());
        assert_eq!(dashboard.options(FilterField::Gbgf), vec!["ALL"]);
        assert_eq!(dashboard.view(), &ViewState::Overview);
    }

    #[test]
    fn overview_after_load() {
        let dashboard = loaded();
        let graph = dashboard.overview();
        assert_eq!(graph.inbound_total(lineage_graph::HUB_ID), 130);
        assert!(graph.node("downstream:Y").is_none());
        assert_eq!(dashboard.summary().record_count, 3);
    }

    #[test]
    fn select_and_back() {
        let mut dashboard = loaded();
        dashboard.select("downstream:X").unwrap();

        let detail = dashboard.detail().unwrap().unwrap();
        assert_eq!(detail.total_shared_tables, 150);
        assert!(matches!(dashboard.current().unwrap(), FlowView::Detail(_)));

        assert_eq!(dashboard.back(), &ViewState::Overview);
        assert!(dashboard.detail().unwrap().is_none());
    }

    #[test]
    fn rejected_selections_keep_view() {
        let mut dashboard = loaded();

        let err = dashboard.select("downstream:Nope").unwrap_err();
        assert!(err.is_rejected_selection());
        assert!(dashboard.select("source:A").is_err());
        assert_eq!(dashboard.view(), &ViewState::Overview);

        dashboard.select("downstream:X").unwrap();
        assert!(dashboard.select("downstream:X").is_err());
        assert_eq!(dashboard.view().selected(), Some("downstream:X"));
    }

    #[test]
    fn load_from_provider() {
        let mut dashboard = Dashboard::default();
        let report = dashboard
            .load_from(&StaticFixture::new("rows", rows()))
            .unwrap();
        assert_eq!(report.records, 3);
        assert_eq!(dashboard.records().len(), 3);
    }
}
