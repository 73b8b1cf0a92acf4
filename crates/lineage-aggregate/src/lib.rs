//! Lineage Aggregation
//!
//! Filtering, grouping and overflow bucketing over a record slice.
//!
//! # Core Concepts
//!
//! - [`FilterEngine`]: three-field filter with cross-consistent option lists
//! - [`aggregate`]: pure records + filter → per-source and per-downstream totals
//! - [`OverflowBucketer`]: caps a tier and folds the tail into "Other"
//! - [`FlowSummary`]: headline counts for the overview
//!
//! # Example
//!
//! ```rust
//! use lineage_aggregate::{aggregate, FilterField, FilterState, OverflowBucketer, OTHER_SOURCES};
//! use lineage_record::FlowRecord;
//!
//! let records = vec![FlowRecord::default()];
//! let state = FilterState::new().with(FilterField::Gbgf, "Unknown");
//!
//! let aggregation = aggregate(&records, &state);
//! assert_eq!(aggregation.record_count, 1);
//!
//! let bucketed = OverflowBucketer::default().bucket(aggregation.sources, OTHER_SOURCES);
//! assert!(bucketed.other.is_none());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod aggregate;
mod filter;
mod overflow;
mod summary;

// Re-exports
pub use aggregate::{
    aggregate, Aggregation, AggregationWarning, DetailKey, DownstreamAppAggregate,
    DownstreamDetail, SourceDetail, SourceSystemAggregate,
};
pub use filter::{
    compute_options, FilterChange, FilterEngine, FilterField, FilterState, Selection,
    UnknownField, ALL,
};
pub use overflow::{
    Bucketable, Bucketed, OverflowBucket, OverflowBucketer, OverflowMember, DEFAULT_LIMIT,
    OTHER_DOWNSTREAM, OTHER_SOURCES,
};
pub use summary::FlowSummary;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
