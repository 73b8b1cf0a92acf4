//! Lineage Records
//!
//! Typed lineage rows and the load contract that produces them.
//!
//! # Core Concepts
//!
//! - [`FlowRecord`]: one normalized row (source → hub → downstream)
//! - [`RecordNormalizer`]: raw row → record, never fails
//! - [`RecordSet`]: immutable set produced by one atomic load
//! - [`columns`]: the exact column names the first row must carry
//!
//! # Example
//!
//! ```rust
//! use lineage_record::{columns, RawRow, RecordSet};
//!
//! let row: RawRow = columns::REQUIRED
//!     .iter()
//!     .map(|c| ((*c).to_string(), "1".to_string()))
//!     .collect();
//!
//! let (records, report) = RecordSet::load(&[row]).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(report.coerced_values, 0);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod columns;
mod error;
mod json;
mod normalize;
mod record;
mod set;

// Re-exports
pub use columns::RawRow;
pub use error::{RecordError, RecordResult};
pub use json::{rows_from_json, rows_from_value};
pub use normalize::{split_tags, Count, Normalized, RecordNormalizer, MAX_COUNT, TAG_SEPARATOR};
pub use record::{FlowRecord, UNKNOWN};
pub use set::{LoadReport, RecordSet};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
