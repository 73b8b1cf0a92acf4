//! View state machine
//!
//! ```text
//! Overview --select(downstream, value > 0)--> Detail(node)
//! Detail   --back-->                          Overview
//! *        --filterChanged | dataLoaded-->    Overview
//! ```
//!
//! A rejected event leaves the state unchanged.

use crate::error::{GraphError, GraphResult};
use crate::model::{GraphNode, Tier};
use serde::{Deserialize, Serialize};

/// What the dashboard is showing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "view", content = "node", rename_all = "camelCase")]
pub enum ViewState {
    /// Overview graph
    #[default]
    Overview,
    /// Drill-down of one downstream node
    Detail(String),
}

impl ViewState {
    /// Selected node, if in detail
    #[inline]
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        match self {
            Self::Overview => None,
            Self::Detail(id) => Some(id),
        }
    }

    /// Apply an event in place
    ///
    /// # Errors
    /// Returns the rejection reason; `self` is unchanged.
    pub fn apply(&mut self, event: &ViewEvent) -> GraphResult<()> {
        *self = transition(self, event)?;
        Ok(())
    }
}

/// The facts of a node needed to decide a selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectTarget {
    /// Node id
    pub id: String,
    /// Node tier
    pub tier: Tier,
    /// Node value
    pub value: u64,
    /// Node is an overflow bucket
    pub overflow: bool,
}

impl From<&GraphNode> for SelectTarget {
    fn from(node: &GraphNode) -> Self {
        Self {
            id: node.id.clone(),
            tier: node.tier,
            value: node.value,
            overflow: node.is_overflow(),
        }
    }
}

/// Input to the view state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A node was clicked
    Select(SelectTarget),
    /// Return to the overview
    Back,
    /// A filter field changed
    FilterChanged,
    /// A new record set was loaded
    DataLoaded,
}

/// Discriminant of [`ViewEvent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewEventKind {
    /// [`ViewEvent::Select`]
    Select,
    /// [`ViewEvent::Back`]
    Back,
    /// [`ViewEvent::FilterChanged`]
    FilterChanged,
    /// [`ViewEvent::DataLoaded`]
    DataLoaded,
}

impl ViewEvent {
    /// Discriminant
    #[must_use]
    pub fn kind(&self) -> ViewEventKind {
        match self {
            Self::Select(_) => ViewEventKind::Select,
            Self::Back => ViewEventKind::Back,
            Self::FilterChanged => ViewEventKind::FilterChanged,
            Self::DataLoaded => ViewEventKind::DataLoaded,
        }
    }
}

/// Next state for `event` in `from`
///
/// # Errors
/// Rejects selections of non-downstream, zero-value or overflow nodes, and
/// any selection while a detail view is open.
pub fn transition(from: &ViewState, event: &ViewEvent) -> GraphResult<ViewState> {
    match (from, event) {
        (_, ViewEvent::Back | ViewEvent::FilterChanged | ViewEvent::DataLoaded) => {
            Ok(ViewState::Overview)
        }
        (ViewState::Detail(current), ViewEvent::Select(_)) => {
            Err(GraphError::AlreadyInDetail(current.clone()))
        }
        (ViewState::Overview, ViewEvent::Select(target)) => {
            check_selectable(target)?;
            Ok(ViewState::Detail(target.id.clone()))
        }
    }
}

/// Event kinds [`transition`] accepts in `from`
///
/// `Back` in the overview is accepted and leaves the state unchanged.
#[must_use]
pub fn allowed_events(from: &ViewState) -> Vec<ViewEventKind> {
    use ViewEventKind::{Back, DataLoaded, FilterChanged, Select};
    match from {
        ViewState::Overview => vec![Select, Back, FilterChanged, DataLoaded],
        ViewState::Detail(_) => vec![Back, FilterChanged, DataLoaded],
    }
}

fn check_selectable(target: &SelectTarget) -> GraphResult<()> {
    if target.tier != Tier::Downstream {
        return Err(GraphError::not_downstream(&target.id, target.tier));
    }
    if target.overflow {
        return Err(GraphError::OverflowSelection(target.id.clone()));
    }
    if target.value == 0 {
        return Err(GraphError::ZeroValueSelection(target.id.clone()));
    }
    Ok(())
}
