//! Fragment key composition.

use std::hash::{Hash, Hasher};

use region_core::PageRequest;
use serde::{Deserialize, Serialize};

use crate::policy::VaryRule;

/// Which output of a region an entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Body,
    Header,
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Body => write!(f, "body"),
            Self::Header => write!(f, "header"),
        }
    }
}

/// Composite key of a cached fragment.
///
/// The region path, part and instance id stay readable; the request
/// discriminators are hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentKey {
    /// Region path (e.g. "catalog/detail").
    pub region: String,
    /// Body or header.
    pub part: Part,
    /// Instance id of the region on the page.
    pub instance_id: String,
    /// Hash of the request discriminators.
    hash: String,
    /// Components that make up the hash (for debugging).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl FragmentKey {
    /// Get the full key string.
    pub fn as_str(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.region, self.part, self.instance_id, self.hash
        )
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }
}

impl std::fmt::Display for FragmentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Component of a fragment key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyComponent {
    /// Parameters with one of the prefixes.
    ParamPrefixes(Vec<String>),
    /// Specific parameters.
    Params(Vec<String>),
    /// Locale.
    Locale,
    /// Currency.
    Currency,
    /// Custom static value.
    Custom(String),
}

/// Builder for composing fragment keys.
#[derive(Debug, Clone, Default)]
pub struct FragmentKeyBuilder {
    components: Vec<KeyComponent>,
}

impl FragmentKeyBuilder {
    /// Create a new key builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include all parameters named `<prefix>_*` for each prefix.
    pub fn param_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.components.push(KeyComponent::ParamPrefixes(
            prefixes.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Include specific parameters.
    pub fn params(mut self, names: &[&str]) -> Self {
        self.components.push(KeyComponent::Params(
            names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Include the locale.
    pub fn locale(mut self) -> Self {
        self.components.push(KeyComponent::Locale);
        self
    }

    /// Include the currency.
    pub fn currency(mut self) -> Self {
        self.components.push(KeyComponent::Currency);
        self
    }

    /// Include a custom static value.
    pub fn custom(mut self, value: impl Into<String>) -> Self {
        self.components.push(KeyComponent::Custom(value.into()));
        self
    }

    /// Build from vary rules.
    pub fn from_vary_rules(rules: &[VaryRule]) -> Self {
        rules.iter().fold(Self::new(), |builder, rule| match rule {
            VaryRule::ParamPrefix(p) => builder.param_prefixes(&[p.as_str()]),
            VaryRule::Param(name) => builder.params(&[name.as_str()]),
            VaryRule::Locale => builder.locale(),
            VaryRule::Currency => builder.currency(),
            VaryRule::Custom(c) => builder.custom(c),
        })
    }

    /// Build the key for a region part from the page request.
    pub fn build(
        &self,
        region: &str,
        part: Part,
        instance_id: &str,
        page: &PageRequest,
    ) -> FragmentKey {
        let mut parts = Vec::new();

        for component in &self.components {
            match component {
                KeyComponent::ParamPrefixes(prefixes) => {
                    let prefixes: Vec<&str> = prefixes.iter().map(String::as_str).collect();
                    for (name, value) in page.params_with_prefixes(&prefixes) {
                        parts.push(format!("p:{}={}", name, value));
                    }
                }
                KeyComponent::Params(names) => {
                    for name in names {
                        if let Some(value) = page.param(name) {
                            parts.push(format!("p:{}={}", name, value));
                        }
                    }
                }
                KeyComponent::Locale => {
                    if let Some(locale) = &page.locale {
                        parts.push(format!("locale:{}", locale));
                    }
                }
                KeyComponent::Currency => {
                    if let Some(currency) = &page.currency {
                        parts.push(format!("currency:{}", currency));
                    }
                }
                KeyComponent::Custom(value) => {
                    parts.push(format!("custom:{}", value));
                }
            }
        }

        // Hashed as a sequence so values cannot spill into the next part
        let hash = format!("{:x}", simple_hash(&parts));

        FragmentKey {
            region: region.to_string(),
            part,
            instance_id: instance_id.to_string(),
            hash,
            components: parts,
        }
    }
}

// Simple non-cryptographic hash for fragment keys
fn simple_hash(parts: &[String]) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    parts.hash(&mut hasher);
    hasher.finish()
}
