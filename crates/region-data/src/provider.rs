//! Data provider interface and in-memory implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;

use crate::criteria::Criteria;
use crate::error::DataError;
use crate::item::Item;

/// Query interface the regions read domain data through.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Items matching the criteria, in sort order.
    async fn find(&self, criteria: &Criteria) -> Result<Vec<Item>, DataError>;

    /// A single item with references restricted to `domains`.
    async fn get_by_id(&self, domain: &str, id: &str, domains: &[String])
        -> Result<Item, DataError>;
}

/// In-memory provider backed by a list of items per domain.
///
/// Counts calls so callers can verify that cached output skipped the
/// data layer, and can be told to fail for a domain.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    items: RwLock<HashMap<String, Vec<Item>>>,
    failures: RwLock<HashMap<String, String>>,
    calls: AtomicUsize,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `items`.
    pub fn with_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let provider = Self::new();
        for item in items {
            provider.insert(item);
        }
        provider
    }

    /// Parse a JSON array of items.
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let items: Vec<Item> =
            serde_json::from_str(content).context("Failed to parse item fixture")?;
        Ok(Self::with_items(items))
    }

    /// Load a JSON item fixture from a file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read item fixture: {}", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Insert or replace an item.
    pub fn insert(&self, item: Item) {
        let mut items = match self.items.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let list = items.entry(item.domain.clone()).or_default();

        match list.iter_mut().find(|i| i.id == item.id) {
            Some(existing) => *existing = item,
            None => list.push(item),
        }
    }

    /// Make every call for `domain` fail with a backend error.
    pub fn fail_domain(&self, domain: impl Into<String>, message: impl Into<String>) {
        if let Ok(mut failures) = self.failures.write() {
            failures.insert(domain.into(), message.into());
        }
    }

    /// Stop failing calls for `domain`.
    pub fn recover_domain(&self, domain: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.remove(domain);
        }
    }

    /// Number of calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self, domain: &str) -> Result<(), DataError> {
        let failures = self
            .failures
            .read()
            .map_err(|e| DataError::Backend(e.to_string()))?;

        match failures.get(domain) {
            Some(message) => Err(DataError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DataProvider for MemoryProvider {
    async fn find(&self, criteria: &Criteria) -> Result<Vec<Item>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(&criteria.domain)?;

        let items = self
            .items
            .read()
            .map_err(|e| DataError::Backend(e.to_string()))?;

        Ok(items
            .get(&criteria.domain)
            .map(|list| criteria.apply(list))
            .unwrap_or_default())
    }

    async fn get_by_id(
        &self,
        domain: &str,
        id: &str,
        domains: &[String],
    ) -> Result<Item, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure(domain)?;

        let items = self
            .items
            .read()
            .map_err(|e| DataError::Backend(e.to_string()))?;

        items
            .get(domain)
            .and_then(|list| list.iter().find(|i| i.id == id))
            .map(|item| item.restricted_to(domains))
            .ok_or_else(|| DataError::NotFound {
                domain: domain.to_string(),
                id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> MemoryProvider {
        MemoryProvider::with_items([
            Item::new("product", "1")
                .with_label("Shirt")
                .with_ref("attribute", "10", "default", 0)
                .with_ref("price", "3", "default", 0),
            Item::new("product", "2").with_label("Socks"),
            Item::new("attribute", "10").with_label("Blue"),
        ])
    }

    #[tokio::test]
    async fn test_get_by_id_restricts_refs() {
        let provider = provider();
        let item = provider
            .get_by_id("product", "1", &["attribute".to_string()])
            .await
            .unwrap();

        assert_eq!(item.label, "Shirt");
        assert_eq!(item.refs.len(), 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let err = provider().get_by_id("product", "99", &[]).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_applies_criteria() {
        let provider = provider();
        let found = provider
            .find(&Criteria::new("product").compare_in("id", ["2"]))
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label, "Socks");
    }

    #[tokio::test]
    async fn test_insert_replaces_existing() {
        let provider = provider();
        provider.insert(Item::new("product", "2").with_label("Wool socks"));

        let item = provider.get_by_id("product", "2", &[]).await.unwrap();
        assert_eq!(item.label, "Wool socks");
    }

    #[tokio::test]
    async fn test_failing_domain() {
        let provider = provider();
        provider.fail_domain("attribute", "index offline");

        let err = provider.find(&Criteria::new("attribute")).await.unwrap_err();
        assert!(matches!(err, DataError::Backend(_)));

        provider.recover_domain("attribute");
        assert!(provider.find(&Criteria::new("attribute")).await.is_ok());
    }

    #[test]
    fn test_from_json_fixture() {
        let provider = MemoryProvider::from_json_str(
            r#"[{"id": "1", "domain": "product", "label": "Shirt"}]"#,
        )
        .unwrap();
        assert_eq!(provider.items.read().unwrap()["product"].len(), 1);
    }
}
