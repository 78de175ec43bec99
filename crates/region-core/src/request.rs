//! Page and render requests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{Map, Value};

use crate::tag::{Expiry, Tag, TagCollector};

/// Unique request identifier for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        let id = format!(
            "{:x}-{:x}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        );
        Self(id)
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request parameters (query string and route parameters).
pub type Params = BTreeMap<String, String>;

/// Inputs of one page render, shared by every region rendered in the pass.
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Unique request identifier.
    pub request_id: RequestId,
    /// Request parameters, e.g. `d_prodid` or `l_pos`.
    pub params: Params,
    /// Locale discriminator (e.g. "en").
    pub locale: Option<String>,
    /// Currency discriminator (e.g. "EUR").
    pub currency: Option<String>,
    /// View variables provided by the caller (e.g. `relatedBasket`).
    pub vars: Map<String, Value>,
}

impl PageRequest {
    /// Create an empty page request.
    pub fn new() -> Self {
        Self {
            request_id: RequestId::generate(),
            params: Params::new(),
            locale: None,
            currency: None,
            vars: Map::new(),
        }
    }

    /// Add a request parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Set the locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Add a view variable.
    pub fn with_var(mut self, name: impl Into<String>, value: Value) -> Self {
        self.vars.insert(name.into(), value);
        self
    }

    /// Get a request parameter by name.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(|s| s.as_str())
    }

    /// All parameters whose name starts with one of `prefixes` followed by `_`.
    pub fn params_with_prefixes(&self, prefixes: &[&str]) -> Params {
        self.params
            .iter()
            .filter(|(name, _)| {
                prefixes.iter().any(|p| {
                    name.strip_prefix(p)
                        .map_or(false, |rest| rest.starts_with('_'))
                })
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulator passed by mutable reference down the region tree.
///
/// Children append their tags and expiry so the parent can store a cache
/// entry that covers all content it contains.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    instance_id: String,
    collector: TagCollector,
}

impl RenderRequest {
    /// Create a request for the given instance id.
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            collector: TagCollector::new(),
        }
    }

    /// Seed the accumulator with tags and an expiry from earlier output.
    pub fn with_prior<I, T>(mut self, tags: I, expiry: Expiry) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.collector.add_tags(tags);
        self.collector.expire_at(expiry);
        self
    }

    /// A fresh accumulator for the same instance, used to collect a subtree.
    pub fn scoped(&self) -> Self {
        Self::new(self.instance_id.clone())
    }

    /// The instance id distinguishing repeated regions on one page.
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Merge collected tags and expiry into this request.
    pub fn merge(&mut self, collector: &TagCollector) {
        self.collector.merge(collector);
    }

    /// Collected tags and expiry.
    pub fn collector(&self) -> &TagCollector {
        &self.collector
    }

    /// Mutable access to the accumulator.
    pub fn collector_mut(&mut self) -> &mut TagCollector {
        &mut self.collector
    }

    /// Consume the request and return the collected tags and expiry.
    pub fn into_collector(self) -> TagCollector {
        self.collector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_params_with_prefixes() {
        let page = PageRequest::new()
            .with_param("d_prodid", "42")
            .with_param("d_name", "shirt")
            .with_param("dx", "ignored")
            .with_param("l_pos", "3");

        let params = page.params_with_prefixes(&["d"]);
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("d_prodid").map(String::as_str), Some("42"));
        assert!(!params.contains_key("dx"));
        assert!(!params.contains_key("l_pos"));
    }

    #[test]
    fn test_scoped_keeps_instance_but_not_tags() {
        let request = RenderRequest::new("slot-2").with_prior(["product-1"], None);
        let scoped = request.scoped();

        assert_eq!(scoped.instance_id(), "slot-2");
        assert!(scoped.collector().is_empty());
        assert_eq!(request.collector().tags().len(), 1);
    }

    #[test]
    fn test_merge_appends_upward() {
        let mut parent = RenderRequest::new("");
        let mut child = parent.scoped();
        child.collector_mut().add_tag("media-9");

        parent.merge(child.collector());

        assert!(parent.collector().tags().contains(&Tag::new("media-9")));
    }
}
