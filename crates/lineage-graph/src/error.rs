//! Error types for graph construction and view transitions

use crate::model::Tier;

/// Errors raised while building graphs or driving the view
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No node with this id in the current overview
    #[error("node not found: '{0}'")]
    NodeNotFound(String),

    /// Node carries no flow and cannot be drilled into
    #[error("node '{0}' has no flow to drill into")]
    ZeroValueSelection(String),

    /// Synthetic overflow node cannot be drilled into
    #[error("node '{0}' is an overflow bucket")]
    OverflowSelection(String),

    /// Only downstream nodes can be drilled into
    #[error("node '{id}' is in the {tier} tier, expected downstream")]
    NotDownstream {
        /// Selected node
        id: String,
        /// Its tier
        tier: Tier,
    },

    /// A detail view is already open
    #[error("already viewing detail of '{0}'")]
    AlreadyInDetail(String),

    /// Layout constants are unusable
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
}

impl GraphError {
    /// Create not-downstream error
    pub fn not_downstream(id: impl Into<String>, tier: Tier) -> Self {
        Self::NotDownstream {
            id: id.into(),
            tier,
        }
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: impl Into<String>) -> Self {
        Self::InvalidLayout(reason.into())
    }

    /// Check if this error is a rejected selection (state left unchanged)
    #[must_use]
    pub fn is_rejected_selection(&self) -> bool {
        matches!(
            self,
            Self::NodeNotFound(_)
                | Self::ZeroValueSelection(_)
                | Self::OverflowSelection(_)
                | Self::NotDownstream { .. }
                | Self::AlreadyInDetail(_)
        )
    }
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
