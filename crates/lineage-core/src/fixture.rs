//! Row sources
//!
//! The engine never embeds data. Rows come from a [`FixtureProvider`]:
//! in-memory rows, a JSON file, or a seeded synthetic generator.

use crate::error::FixtureError;
use lineage_record::{columns, rows_from_json, RawRow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};

/// Supplies the raw rows of one load
pub trait FixtureProvider {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Produce every row
    ///
    /// # Errors
    /// Returns [`FixtureError`] when the rows cannot be produced.
    fn rows(&self) -> Result<Vec<RawRow>, FixtureError>;
}

/// Rows held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticFixture {
    name: String,
    rows: Vec<RawRow>,
}

impl StaticFixture {
    /// Create fixture
    #[must_use]
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

impl FixtureProvider for StaticFixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&self) -> Result<Vec<RawRow>, FixtureError> {
        Ok(self.rows.clone())
    }
}

/// JSON array of row objects on disk
#[derive(Debug, Clone)]
pub struct JsonFileFixture {
    name: String,
    path: PathBuf,
}

impl JsonFileFixture {
    /// Create fixture reading `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: path.display().to_string(),
            path,
        }
    }

    /// File read by this fixture
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FixtureProvider for JsonFileFixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn rows(&self) -> Result<Vec<RawRow>, FixtureError> {
        let text = std::fs::read_to_string(&self.path)
            .map_err(|e| FixtureError::io_error(&self.path, e))?;
        rows_from_json(&text).map_err(|e| FixtureError::invalid_rows(&self.path, e))
    }
}

const SOURCE_APPS: [&str; 8] = [
    "CRM System",
    "Website Analytics",
    "Mobile App",
    "Email Platform",
    "POS System",
    "Core Banking",
    "Card Platform",
    "Payments Hub",
];

const DOWNSTREAM_APPS: [&str; 8] = [
    "Marketing Automation",
    "Analytics Platform",
    "Personalization Engine",
    "Campaign Management",
    "Risk Engine",
    "Regulatory Reporting",
    "Customer 360",
    "Fraud Detection",
];

/// Value written into a numeric cell chosen for corruption
pub const MALFORMED_VALUE: &str = "n/a";

/// Settings of [`SyntheticFixture`]
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// RNG seed
    pub seed: u64,
    /// Rows to produce
    pub rows: usize,
    /// Distinct source systems
    pub source_systems: usize,
    /// Applications per source system
    pub apps_per_system: usize,
    /// Distinct downstream applications
    pub downstream_apps: usize,
    /// GB/GF vocabulary
    pub tags: Vec<String>,
    /// Chance of one malformed numeric cell per row, 0.0..=1.0
    pub malformed_rate: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            rows: 200,
            source_systems: 12,
            apps_per_system: 2,
            downstream_apps: 10,
            tags: ["WPB", "CMB", "GBM", "GPB"].map(String::from).to_vec(),
            malformed_rate: 0.0,
        }
    }
}

impl SyntheticConfig {
    /// With seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// With row count
    #[inline]
    #[must_use]
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// With entity counts
    #[inline]
    #[must_use]
    pub fn with_entities(mut self, source_systems: usize, downstream_apps: usize) -> Self {
        self.source_systems = source_systems;
        self.downstream_apps = downstream_apps;
        self
    }

    /// With malformed numeric rate
    #[inline]
    #[must_use]
    pub fn with_malformed_rate(mut self, rate: f64) -> Self {
        self.malformed_rate = rate;
        self
    }

    fn validate(&self) -> Result<(), FixtureError> {
        if self.source_systems == 0 || self.apps_per_system == 0 || self.downstream_apps == 0 {
            return Err(FixtureError::InvalidSettings(
                "source_systems, apps_per_system and downstream_apps must be positive".to_string(),
            ));
        }
        if self.tags.is_empty() {
            return Err(FixtureError::InvalidSettings("tag vocabulary is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.malformed_rate) {
            return Err(FixtureError::InvalidSettings(format!(
                "malformed_rate must be within 0..=1, got {}",
                self.malformed_rate
            )));
        }
        Ok(())
    }
}

/// Deterministic generator of plausible lineage rows
#[derive(Debug, Clone, Default)]
pub struct SyntheticFixture {
    config: SyntheticConfig,
}

impl SyntheticFixture {
    /// Create generator
    #[must_use]
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Generator settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    fn row(&self, rng: &mut StdRng) -> RawRow {
        let cfg = &self.config;
        let system = rng.random_range(0..cfg.source_systems);
        let app = rng.random_range(0..cfg.apps_per_system);
        let target = rng.random_range(0..cfg.downstream_apps);

        let app_index = system * cfg.apps_per_system + app;
        let source_app = numbered(&SOURCE_APPS, app_index);
        let downstream_app = numbered(&DOWNSTREAM_APPS, target);

        let first_tag = rng.random_range(0..cfg.tags.len());
        let mut tags = vec![cfg.tags[first_tag].as_str()];
        if cfg.tags.len() > 1 && rng.random_bool(0.3) {
            let second = (first_tag + rng.random_range(1..cfg.tags.len())) % cfg.tags.len();
            tags.push(cfg.tags[second].as_str());
        }

        let source_tables: u64 = rng.random_range(1..=200);
        let cdp_tables = rng.random_range(0..=source_tables);
        let shared_tables = rng.random_range(0..=cdp_tables);

        let mut row = RawRow::new();
        let mut put = |column: &str, value: String| {
            row.insert(column.to_string(), value);
        };
        put(columns::SOURCE_SYSTEM, format!("SRC-{system:03}"));
        put(columns::SOURCE_EIM_ID, format!("EIM{:05}", 10_000 + app_index));
        put(columns::SOURCE_APPLICATION_NAME, source_app);
        put(columns::SYS_CODE, format!("SYS{system:02}"));
        put(columns::SUB_SYS_CODE, format!("SUB{app}"));
        put(columns::DOWNSTREAM_APPLICATION_NAME, downstream_app);
        put(columns::DOWNSTREAM_EIM_ID, format!("EIM{:05}", 50_000 + target));
        put(columns::GBGF, tags.join(","));
        put(columns::SOURCE_TABLE_COUNT, source_tables.to_string());
        put(columns::CDP_TABLE_COUNT, cdp_tables.to_string());
        put(columns::SHARED_TABLE_COUNT, shared_tables.to_string());

        if cfg.malformed_rate > 0.0 && rng.random_bool(cfg.malformed_rate) {
            let column = columns::NUMERIC[rng.random_range(0..columns::NUMERIC.len())];
            row.insert(column.to_string(), MALFORMED_VALUE.to_string());
        }

        row
    }
}

impl FixtureProvider for SyntheticFixture {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn rows(&self) -> Result<Vec<RawRow>, FixtureError> {
        self.config.validate()?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let rows: Vec<RawRow> = (0..self.config.rows).map(|_| self.row(&mut rng)).collect();

        tracing::debug!(
            seed = self.config.seed,
            rows = rows.len(),
            "synthetic rows generated"
        );
        Ok(rows)
    }
}

/// `names[i]`, suffixed with a round number once the list wraps
fn numbered(names: &[&str], index: usize) -> String {
    let name = names[index % names.len()];
    match index / names.len() {
        0 => name.to_string(),
        round => format!("{name} {}", round + 1),
    }
}
