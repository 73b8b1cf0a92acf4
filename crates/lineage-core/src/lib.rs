//! Lineage Core
//!
//! Session, configuration and row sources around the lineage engine.
//!
//! # Core Concepts
//!
//! - [`Dashboard`]: owns records, filters and view; recomputes graphs on request
//! - [`EngineConfig`]: overflow limit, hub label, info tier and layout
//! - [`FixtureProvider`]: injectable row source (static, JSON file, synthetic)
//!
//! # Example
//!
//! ```rust
//! use lineage_core::{Dashboard, EngineConfig, SyntheticConfig, SyntheticFixture};
//! use lineage_aggregate::FilterField;
//!
//! let mut dashboard = Dashboard::new(EngineConfig::new().with_overflow_limit(10));
//! let fixture = SyntheticFixture::new(SyntheticConfig::default().with_rows(50));
//! dashboard.load_from(&fixture).unwrap();
//!
//! assert_eq!(dashboard.options(FilterField::Gbgf)[0], "ALL");
//! assert_eq!(dashboard.summary().record_count, 50);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod config;
mod dashboard;
mod error;
mod fixture;

// Re-exports
pub use config::EngineConfig;
pub use dashboard::Dashboard;
pub use error::{ConfigError, EngineError, EngineResult, FixtureError};
pub use fixture::{
    FixtureProvider, JsonFileFixture, StaticFixture, SyntheticConfig, SyntheticFixture,
    MALFORMED_VALUE,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
