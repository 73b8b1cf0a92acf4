//! Deterministic node layout
//!
//! Every tier is drawn in a vertical band of the canvas. Inside a band, nodes
//! sit on a staggered grid:
//!
//! ```text
//! rows = ceil(sqrt(1.5 * count))
//! cols = ceil(count / rows)
//! odd rows shifted by half a cell
//! ```
//!
//! Positions depend only on `(tier, index, count)`, sizes only on
//! `(value, tier max)`, widths only on the link value.

use crate::error::{GraphError, GraphResult};
use crate::model::Tier;
use serde::{Deserialize, Serialize};

/// Horizontal band as fractions of the canvas width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Left edge, 0.0..=1.0
    pub start: f64,
    /// Right edge, 0.0..=1.0
    pub end: f64,
}

impl Band {
    /// Create band
    #[inline]
    #[must_use]
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    fn is_valid(self) -> bool {
        (0.0..=1.0).contains(&self.start) && (0.0..=1.0).contains(&self.end) && self.start < self.end
    }
}

/// Layout constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Canvas width
    pub width: f64,
    /// Canvas height
    pub height: f64,
    /// Source tier band
    pub source_band: Band,
    /// Downstream tier band
    pub downstream_band: Band,
    /// Info tier band
    pub info_band: Band,
    /// Smallest node size
    pub min_node_size: f64,
    /// Size of the largest node in a tier
    pub node_scale: f64,
    /// Size of the hub
    pub hub_size: f64,
    /// Widest link
    pub max_link_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 900.0,
            source_band: Band::new(0.0, 0.4),
            downstream_band: Band::new(0.6, 0.86),
            info_band: Band::new(0.88, 1.0),
            min_node_size: 6.0,
            node_scale: 40.0,
            hub_size: 60.0,
            max_link_width: 12.0,
        }
    }
}

impl LayoutConfig {
    /// Set canvas size
    #[inline]
    #[must_use]
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set node size bounds
    #[inline]
    #[must_use]
    pub fn with_node_sizes(mut self, min_node_size: f64, node_scale: f64) -> Self {
        self.min_node_size = min_node_size;
        self.node_scale = node_scale;
        self
    }

    /// Set widest link
    #[inline]
    #[must_use]
    pub fn with_max_link_width(mut self, max_link_width: f64) -> Self {
        self.max_link_width = max_link_width;
        self
    }

    /// Check the constants can produce a layout
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidLayout`] naming the first bad constant.
    pub fn validate(&self) -> GraphResult<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("min_node_size", self.min_node_size),
            ("node_scale", self.node_scale),
            ("hub_size", self.hub_size),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(GraphError::invalid_layout(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        if !(self.max_link_width.is_finite() && self.max_link_width >= 1.0) {
            return Err(GraphError::invalid_layout(format!(
                "max_link_width must be at least 1, got {}",
                self.max_link_width
            )));
        }

        let bands = [
            ("source_band", self.source_band),
            ("downstream_band", self.downstream_band),
            ("info_band", self.info_band),
        ];
        for (name, band) in bands {
            if !band.is_valid() {
                return Err(GraphError::invalid_layout(format!(
                    "{name} must satisfy 0 <= start < end <= 1, got {}..{}",
                    band.start, band.end
                )));
            }
        }

        Ok(())
    }

    fn band(&self, tier: Tier) -> Option<Band> {
        match tier {
            Tier::Source => Some(self.source_band),
            Tier::Downstream => Some(self.downstream_band),
            Tier::Info => Some(self.info_band),
            Tier::Hub => None,
        }
    }

    /// Position of node `index` out of `count` in `tier`
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn position(&self, tier: Tier, index: usize, count: usize) -> (f64, f64) {
        let Some(band) = self.band(tier) else {
            return (self.width / 2.0, self.height / 2.0);
        };

        let (rows, cols) = grid(count);
        let row = index / cols;
        let col = index % cols;

        let cell_w = (band.end - band.start) * self.width / cols as f64;
        let cell_h = self.height / rows as f64;
        let stagger = if row % 2 == 1 { 0.5 } else { 0.0 };

        let x = band.start * self.width + cell_w * (col as f64 + 0.25 + stagger);
        let y = cell_h * (row as f64 + 0.5);
        (x, y)
    }

    /// Size of a node with `value` in a tier whose largest value is `max`
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn node_size(&self, value: u64, max: u64) -> f64 {
        if max == 0 {
            return self.min_node_size;
        }
        let ratio = value.min(max) as f64 / max as f64;
        (ratio.sqrt() * self.node_scale).max(self.min_node_size)
    }

    /// Width of a link carrying `value`
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn link_width(&self, value: u64) -> f64 {
        (value as f64)
            .ln()
            .max(1.0)
            .min(self.max_link_width.max(1.0))
    }
}

/// Rows and columns of the staggered grid for `count` nodes
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn grid(count: usize) -> (usize, usize) {
    let count = count.max(1);
    let rows = ((1.5 * count as f64).sqrt().ceil() as usize).max(1);
    let cols = count.div_ceil(rows);
    (rows, cols)
}
