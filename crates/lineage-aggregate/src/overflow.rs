//! Overflow bucketing
//!
//! Caps a tier to `limit` entries. The remainder is folded into one synthetic
//! "Other" entry whose value is the sum of what it absorbed, so totals are
//! preserved across bucketing.

use serde::{Deserialize, Serialize};

/// Default number of entries kept per tier
pub const DEFAULT_LIMIT: usize = 30;

/// Label of the overflow source entry
pub const OTHER_SOURCES: &str = "Other Sources";

/// Label of the overflow downstream entry
pub const OTHER_DOWNSTREAM: &str = "Other Downstream Systems";

/// Something that can be ranked and folded into an overflow bucket
pub trait Bucketable: Sized {
    /// Stable identifier, used to break value ties
    fn bucket_id(&self) -> &str;

    /// Display name
    fn bucket_name(&self) -> &str;

    /// Ranking value
    fn bucket_value(&self) -> u64;

    /// Build the synthetic entry that absorbs `members`
    fn overflow(label: &str, members: &[Self]) -> Self;
}

/// Summary of one entry absorbed by an overflow bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverflowMember {
    /// Identifier of the absorbed entry
    pub id: String,
    /// Display name of the absorbed entry
    pub name: String,
    /// Value of the absorbed entry
    pub value: u64,
}

/// Synthetic overflow entry plus what it absorbed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowBucket<T> {
    /// Aggregated entry
    pub aggregate: T,
    /// Absorbed entries, in rank order
    pub members: Vec<OverflowMember>,
}

/// Result of bucketing one tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucketed<T> {
    /// Top entries, value descending then id ascending
    pub kept: Vec<T>,
    /// Present only when something overflowed
    pub other: Option<OverflowBucket<T>>,
}

impl<T: Bucketable> Bucketed<T> {
    /// Total value across kept entries and the bucket
    #[must_use]
    pub fn total_value(&self) -> u64 {
        self.kept.iter().map(Bucketable::bucket_value).sum::<u64>()
            + self
                .other
                .as_ref()
                .map_or(0, |other| other.aggregate.bucket_value())
    }

    /// Number of entries including the bucket
    #[must_use]
    pub fn len(&self) -> usize {
        self.kept.len() + usize::from(self.other.is_some())
    }

    /// Check if nothing was bucketed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ranks entries and folds the tail into an overflow bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowBucketer {
    limit: usize,
}

impl Default for OverflowBucketer {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl OverflowBucketer {
    /// Create bucketer keeping at most `limit` entries
    ///
    /// A limit of 0 sends every entry to the bucket.
    #[inline]
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Configured limit
    #[inline]
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Rank `items` and split them at the limit
    #[must_use]
    pub fn bucket<T: Bucketable>(&self, mut items: Vec<T>, label: &str) -> Bucketed<T> {
        items.sort_by(|a, b| {
            b.bucket_value()
                .cmp(&a.bucket_value())
                .then_with(|| a.bucket_id().cmp(b.bucket_id()))
        });

        if items.len() <= self.limit {
            return Bucketed {
                kept: items,
                other: None,
            };
        }

        let overflow = items.split_off(self.limit);
        let members = overflow
            .iter()
            .map(|item| OverflowMember {
                id: item.bucket_id().to_string(),
                name: item.bucket_name().to_string(),
                value: item.bucket_value(),
            })
            .collect();
        let aggregate = T::overflow(label, &overflow);

        tracing::debug!(
            label,
            kept = items.len(),
            absorbed = overflow.len(),
            value = aggregate.bucket_value(),
            "overflow bucket built"
        );

        Bucketed {
            kept: items,
            other: Some(OverflowBucket { aggregate, members }),
        }
    }
}
