//! Region-level cache policies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::key::FragmentKeyBuilder;

/// Request discriminator a cached fragment varies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VaryRule {
    /// Every parameter named `<prefix>_*`.
    ParamPrefix(String),
    /// A single request parameter.
    Param(String),
    /// The page locale.
    Locale,
    /// The page currency.
    Currency,
    /// Custom static value.
    Custom(String),
}

impl VaryRule {
    /// Vary on all parameters with the given prefix.
    pub fn param_prefix(prefix: impl Into<String>) -> Self {
        Self::ParamPrefix(prefix.into())
    }

    /// Vary on a single parameter.
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param(name.into())
    }
}

/// Fragment cache configuration of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentPolicy {
    /// Whether the region output is cached.
    pub enabled: bool,
    /// Upper bound on the lifetime of an entry, on top of data expiry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Duration>,
    /// Key discriminators.
    pub vary: Vec<VaryRule>,
    /// Tags attached to every entry of the region.
    pub tags: Vec<String>,
}

impl Default for FragmentPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl: None,
            vary: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl FragmentPolicy {
    /// Cached policy varying on locale and currency.
    pub fn new() -> Self {
        Self {
            enabled: true,
            vary: vec![VaryRule::Locale, VaryRule::Currency],
            ..Default::default()
        }
    }

    /// Policy for live regions that are never cached.
    pub fn none() -> Self {
        Self::default()
    }

    /// Set the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Add a vary rule.
    pub fn vary_on(mut self, rule: VaryRule) -> Self {
        if !self.vary.contains(&rule) {
            self.vary.push(rule);
        }
        self
    }

    /// Add a static tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Enable or disable caching.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Key builder for the vary rules.
    pub fn key_builder(&self) -> FragmentKeyBuilder {
        FragmentKeyBuilder::from_vary_rules(&self.vary)
    }
}
