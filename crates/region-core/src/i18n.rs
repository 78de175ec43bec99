//! Translation of user-facing messages.

use std::collections::HashMap;

/// Translates messages within a domain.
pub trait Translator: Send + Sync {
    /// Translate `message`. Unknown messages are returned unchanged.
    fn translate(&self, domain: &str, message: &str) -> String;
}

/// Message catalog keyed by (domain, message).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<(String, String), String>,
}

impl Catalog {
    /// Create an empty catalog, which translates every message to itself.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a translation.
    pub fn with(
        mut self,
        domain: impl Into<String>,
        message: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.insert(domain, message, translation);
        self
    }

    /// Add a translation in place.
    pub fn insert(
        &mut self,
        domain: impl Into<String>,
        message: impl Into<String>,
        translation: impl Into<String>,
    ) {
        self.entries
            .insert((domain.into(), message.into()), translation.into());
    }
}

impl Translator for Catalog {
    fn translate(&self, domain: &str, message: &str) -> String {
        self.entries
            .get(&(domain.to_string(), message.to_string()))
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_falls_back_to_message() {
        let catalog = Catalog::new().with("client", "Hello", "Hallo");

        assert_eq!(catalog.translate("client", "Hello"), "Hallo");
        assert_eq!(catalog.translate("storage", "Hello"), "Hello");
        assert_eq!(catalog.translate("client", "Bye"), "Bye");
    }
}
