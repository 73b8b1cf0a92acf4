//! Error types for the lineage engine
//!
//! Provides error handling for:
//! - Configuration loading (file → `EngineConfig`)
//! - Fixture providers (source → raw rows)
//! - Dashboard operations, wrapping record and graph errors

use lineage_graph::GraphError;
use lineage_record::RecordError;
use std::path::PathBuf;

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Malformed YAML
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Extension is neither TOML nor YAML
    #[error("unsupported config format: {0} (expected .toml, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    /// Values parse but cannot be used
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by fixture providers
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// IO error during file read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not a row array
    #[error("invalid rows in {path}: {source}")]
    InvalidRows {
        path: PathBuf,
        #[source]
        source: RecordError,
    },

    /// Generator settings out of range
    #[error("invalid fixture settings: {0}")]
    InvalidSettings(String),
}

impl FixtureError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid rows error for path
    pub fn invalid_rows(path: impl Into<PathBuf>, source: RecordError) -> Self {
        Self::InvalidRows {
            path: path.into(),
            source,
        }
    }
}

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Load contract broken
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Graph or view error
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fixture error
    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),
}

impl EngineError {
    /// Check if this is a rejected selection that left the view unchanged
    #[inline]
    #[must_use]
    pub fn is_rejected_selection(&self) -> bool {
        matches!(self, Self::Graph(err) if err.is_rejected_selection())
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
