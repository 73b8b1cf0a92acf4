//! Engine configuration
//!
//! Every field has a default. Files are read as TOML or YAML depending on
//! their extension.
//!
//! ```toml
//! overflow_limit = 20
//! hub_label = "CDP"
//! include_info_tier = false
//! input = "data/lineage.json"
//!
//! [layout]
//! width = 1200.0
//! ```

use crate::error::ConfigError;
use lineage_graph::{GraphConfig, LayoutConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Graph settings: overflow limit, hub label, info tier, layout
    #[serde(flatten)]
    pub graph: GraphConfig,
    /// Default row file for the CLI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With overflow limit
    #[inline]
    #[must_use]
    pub fn with_overflow_limit(mut self, limit: usize) -> Self {
        self.graph.overflow_limit = limit;
        self
    }

    /// With hub label
    #[inline]
    #[must_use]
    pub fn with_hub_label(mut self, label: impl Into<String>) -> Self {
        self.graph.hub_label = label.into();
        self
    }

    /// With or without the info tier
    #[inline]
    #[must_use]
    pub fn with_info_tier(mut self, include: bool) -> Self {
        self.graph.include_info_tier = include;
        self
    }

    /// With layout constants
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.graph.layout = layout;
        self
    }

    /// With default input file
    #[inline]
    #[must_use]
    pub fn with_input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Overflow limit
    #[inline]
    #[must_use]
    pub fn overflow_limit(&self) -> usize {
        self.graph.overflow_limit
    }

    /// Hub label
    #[inline]
    #[must_use]
    pub fn hub_label(&self) -> &str {
        &self.graph.hub_label
    }

    /// Whether drill-downs carry the info tier
    #[inline]
    #[must_use]
    pub fn include_info_tier(&self) -> bool {
        self.graph.include_info_tier
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns [`ConfigError`] on unreadable, unsupported, malformed or
    /// invalid files.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str, &Path) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = parse(&text, path)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse TOML text; `origin` is used in error messages
    ///
    /// # Errors
    /// Returns [`ConfigError::Toml`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text; `origin` is used in error messages
    ///
    /// # Errors
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn from_yaml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values are usable
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a blank hub label or bad layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.hub_label.trim().is_empty() {
            return Err(ConfigError::Invalid("hub_label must not be blank".to_string()));
        }
        self.graph
            .layout
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
