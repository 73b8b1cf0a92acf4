//! Multi-field record filtering
//!
//! Three fields can be constrained: GB/GF tag, EIM id and application name.
//! Each is either [`Selection::All`] or one observed value. Option lists for a
//! field are computed under every *other* field's constraint, so the choices
//! offered for one field are always consistent with the rest.

use lineage_record::FlowRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Sentinel meaning "no constraint"
pub const ALL: &str = "ALL";

/// A filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    /// Business-unit tag
    Gbgf,
    /// Source or downstream EIM id
    EimId,
    /// Source or downstream application name
    ApplicationName,
}

impl FilterField {
    /// Every field, in display order
    pub const FIELDS: [Self; 3] = [Self::Gbgf, Self::EimId, Self::ApplicationName];

    /// Canonical name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gbgf => "gbgf",
            Self::EimId => "eimId",
            Self::ApplicationName => "applicationName",
        }
    }

    /// The fields other than this one
    pub fn others(self) -> impl Iterator<Item = Self> {
        Self::FIELDS.into_iter().filter(move |f| *f != self)
    }

    /// Check whether a record satisfies `value` for this field
    #[must_use]
    pub fn matches(self, record: &FlowRecord, value: &str) -> bool {
        match self {
            Self::Gbgf => record.has_tag(value),
            Self::EimId => record.touches_eim_id(value),
            Self::ApplicationName => record.touches_application(value),
        }
    }

    /// Values this field can observe on a record
    #[must_use]
    pub fn values(self, record: &FlowRecord) -> Vec<&str> {
        match self {
            Self::Gbgf => record.gbgf_tags.iter().map(String::as_str).collect(),
            Self::EimId => record.eim_ids().collect(),
            Self::ApplicationName => record.application_names().collect(),
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized filter field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter field: '{0}' (expected gbgf, eimId or applicationName)")]
pub struct UnknownField(pub String);

impl FromStr for FilterField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match folded.as_str() {
            "gbgf" => Ok(Self::Gbgf),
            "eimid" | "eim" => Ok(Self::EimId),
            "applicationname" | "application" | "app" | "appname" => Ok(Self::ApplicationName),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

/// Selected value for one field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    /// No constraint
    #[default]
    All,
    /// Exactly this value
    Only(String),
}

impl Selection {
    /// Parse user text; `"ALL"` and blank mean no constraint
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == ALL {
            Self::All
        } else {
            Self::Only(text.to_string())
        }
    }

    /// Selected value, if constrained
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Only(v) => Some(v),
        }
    }

    /// Display text (`"ALL"` when unconstrained)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.value().unwrap_or(ALL)
    }

    /// Check if unconstrained
    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Selection> for String {
    fn from(value: Selection) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current selection for every field
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// GB/GF tag
    pub gbgf: Selection,
    /// EIM id
    pub eim_id: Selection,
    /// Application name
    pub application_name: Selection,
}

impl FilterState {
    /// Unconstrained state
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With one field set
    #[inline]
    #[must_use]
    pub fn with(mut self, field: FilterField, selection: impl Into<Selection>) -> Self {
        self.set(field, selection.into());
        self
    }

    /// Selection for a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: FilterField) -> &Selection {
        match field {
            FilterField::Gbgf => &self.gbgf,
            FilterField::EimId => &self.eim_id,
            FilterField::ApplicationName => &self.application_name,
        }
    }

    /// Replace a field's selection, returning the previous one
    pub fn set(&mut self, field: FilterField, selection: Selection) -> Selection {
        let slot = match field {
            FilterField::Gbgf => &mut self.gbgf,
            FilterField::EimId => &mut self.eim_id,
            FilterField::ApplicationName => &mut self.application_name,
        };
        std::mem::replace(slot, selection)
    }

    /// Check if no field is constrained
    #[inline]
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        FilterField::FIELDS.iter().all(|f| self.get(*f).is_all())
    }

    /// Inclusion predicate over every field
    #[inline]
    #[must_use]
    pub fn matches(&self, record: &FlowRecord) -> bool {
        FilterField::FIELDS
            .iter()
            .all(|f| self.field_matches(*f, record))
    }

    /// Inclusion predicate over every field except `ignored`
    #[inline]
    #[must_use]
    pub fn matches_ignoring(&self, record: &FlowRecord, ignored: FilterField) -> bool {
        ignored.others().all(|f| self.field_matches(f, record))
    }

    fn field_matches(&self, field: FilterField, record: &FlowRecord) -> bool {
        self.get(field)
            .value()
            .map_or(true, |value| field.matches(record, value))
    }
}

/// Options offered for `field`, `"ALL"` first then sorted observed values
///
/// Values are collected from records that satisfy every other field's
/// selection; the field's own selection does not constrain its options.
#[must_use]
pub fn compute_options(records: &[FlowRecord], state: &FilterState, field: FilterField) -> Vec<String> {
    let observed: BTreeSet<&str> = records
        .iter()
        .filter(|record| state.matches_ignoring(record, field))
        .flat_map(|record| field.values(record))
        .filter(|value| *value != ALL)
        .collect();

    std::iter::once(ALL)
        .chain(observed)
        .map(str::to_string)
        .collect()
}

/// Result of changing one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    /// Field that was set
    pub field: FilterField,
    /// Selection before the change
    pub previous: Selection,
    /// Selection after the change
    pub current: Selection,
    /// Other fields reset to `ALL` because their value became unavailable
    pub reset: Vec<FilterField>,
}

impl FilterChange {
    /// Check if anything in the filter state changed
    #[inline]
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.previous != self.current || !self.reset.is_empty()
    }
}

/// Holds the filter state and keeps it mutually consistent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterEngine {
    state: FilterState,
}

impl FilterEngine {
    /// Unconstrained engine
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine starting from a given state
    #[inline]
    #[must_use]
    pub fn with_state(state: FilterState) -> Self {
        Self { state }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// Options for a field under the current state
    #[inline]
    #[must_use]
    pub fn options(&self, records: &[FlowRecord], field: FilterField) -> Vec<String> {
        compute_options(records, &self.state, field)
    }

    /// Set one field, resetting other fields whose value is no longer offered
    pub fn select(
        &mut self,
        records: &[FlowRecord],
        field: FilterField,
        selection: Selection,
    ) -> FilterChange {
        let previous = self.state.set(field, selection.clone());

        let mut reset = Vec::new();
        for other in field.others() {
            let stale = match self.state.get(other) {
                Selection::All => false,
                Selection::Only(value) => !compute_options(records, &self.state, other)
                    .iter()
                    .any(|option| option == value),
            };

            if stale {
                let dropped = self.state.set(other, Selection::All);
                tracing::debug!(field = %other, value = %dropped, "filter reset to ALL");
                reset.push(other);
            }
        }

        FilterChange {
            field,
            previous,
            current: selection,
            reset,
        }
    }

    /// Reset every field to `ALL`
    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }
}
