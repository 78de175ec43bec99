//! Content dependency tags and expiry accumulation.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point in time after which a fragment must be recomputed.
///
/// `None` means the fragment only goes away through tag invalidation.
pub type Expiry = Option<DateTime<Utc>>;

/// Opaque marker for a piece of source data a fragment depends on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from a raw string.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag for a domain item, e.g. `product-42`.
    pub fn item(domain: &str, id: &str) -> Self {
        Self(format!("{}-{}", domain.replace('/', "."), id))
    }

    /// Get the tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Return the earlier of two expiries, treating `None` as "never".
pub fn earliest(a: Expiry, b: Expiry) -> Expiry {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

/// Accumulates tags (set union) and the earliest expiry over a render subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCollector {
    tags: BTreeSet<Tag>,
    expiry: Expiry,
}

impl TagCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single tag.
    pub fn add_tag(&mut self, tag: impl Into<Tag>) {
        self.tags.insert(tag.into());
    }

    /// Add several tags.
    pub fn add_tags<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
    }

    /// Lower the expiry to `at` if it is sooner than the current one.
    pub fn expire_at(&mut self, at: Expiry) {
        self.expiry = earliest(self.expiry, at);
    }

    /// Merge another collector into this one.
    pub fn merge(&mut self, other: &TagCollector) {
        self.tags.extend(other.tags.iter().cloned());
        self.expire_at(other.expiry);
    }

    /// Collected tags.
    pub fn tags(&self) -> &BTreeSet<Tag> {
        &self.tags
    }

    /// Earliest collected expiry.
    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// True when neither tags nor an expiry were collected.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.expiry.is_none()
    }

    /// Split into the raw parts.
    pub fn into_parts(self) -> (BTreeSet<Tag>, Expiry) {
        (self.tags, self.expiry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_item_tag_format() {
        assert_eq!(Tag::item("product", "42").as_str(), "product-42");
        assert_eq!(Tag::item("product/list", "7").as_str(), "product.list-7");
    }

    #[test]
    fn test_earliest_treats_none_as_infinity() {
        assert_eq!(earliest(None, None), None);
        assert_eq!(earliest(Some(at(5)), None), Some(at(5)));
        assert_eq!(earliest(None, Some(at(5))), Some(at(5)));
        assert_eq!(earliest(Some(at(9)), Some(at(5))), Some(at(5)));
    }

    #[test]
    fn test_collector_merge_is_union_and_min() {
        let mut parent = TagCollector::new();
        parent.add_tag("product-1");
        parent.expire_at(Some(at(100)));

        let mut child = TagCollector::new();
        child.add_tags(["attribute-3", "product-1"]);
        child.expire_at(Some(at(10)));

        parent.merge(&child);

        let tags: Vec<_> = parent.tags().iter().map(Tag::as_str).collect();
        assert_eq!(tags, vec!["attribute-3", "product-1"]);
        assert_eq!(parent.expiry(), Some(at(10)));
    }

    #[test]
    fn test_collector_ignores_later_expiry() {
        let mut collector = TagCollector::new();
        collector.expire_at(Some(at(10)));
        collector.expire_at(Some(at(50)));
        collector.expire_at(None);

        assert_eq!(collector.expiry(), Some(at(10)));
    }

    #[test]
    fn test_collector_empty() {
        let mut collector = TagCollector::new();
        assert!(collector.is_empty());
        collector.add_tag("x");
        assert!(!collector.is_empty());
    }
}
