//! Process-wide configuration addressed by `/`-separated paths.

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Read-only configuration tree loaded once at startup.
///
/// Paths such as `client/html/catalog/detail/default/subparts` walk nested
/// tables, so the TOML form is
///
/// ```toml
/// [client.html.catalog.detail.default]
/// subparts = ["image", "basic"]
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    root: Map<String, Value>,
}

impl Config {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Non-object values yield an empty config.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Parse TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let value: Value = toml::from_str(content).context("Failed to parse TOML config")?;
        Ok(Self::from_value(value))
    }

    /// Parse JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content).context("Failed to parse JSON config")?;
        Ok(Self::from_value(value))
    }

    /// Load config from a file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().map_or(false, |e| e == "json") {
            Self::from_json_str(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))
        } else {
            Self::from_toml_str(&content)
                .with_context(|| format!("Invalid config: {}", path.display()))
        }
    }

    /// Raw value at `path`, if present.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = self.root.get(first)?;

        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }

        Some(current)
    }

    /// Value at `path` converted to `T`, or `default` when missing or mistyped.
    pub fn get<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.lookup(path)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    /// Set a value, creating intermediate tables.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }

        current.insert(last.to_string(), value.into());
    }

    /// Builder form of [`Config::set`].
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.set(path, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_nested_toml_path() {
        let config = Config::from_toml_str(
            r#"
            [client.html.catalog.detail.default]
            subparts = ["image", "basic"]
            template-body = "custom/body.html"
            "#,
        )
        .unwrap();

        let parts: Vec<String> =
            config.get("client/html/catalog/detail/default/subparts", Vec::new());
        assert_eq!(parts, vec!["image", "basic"]);
        assert_eq!(
            config.get("client/html/catalog/detail/default/template-body", String::new()),
            "custom/body.html"
        );
    }

    #[test]
    fn test_get_returns_default_when_missing_or_mistyped() {
        let config = Config::new().with("client/html/basket/related/bought/default/limit", "six");

        assert_eq!(config.get("client/html/missing", 3u32), 3);
        assert_eq!(
            config.get("client/html/basket/related/bought/default/limit", 6u32),
            6
        );
    }

    #[test]
    fn test_set_overwrites_scalar_with_table() {
        let mut config = Config::new().with("a/b", 1);
        config.set("a/b/c", json!(true));

        assert!(config.get("a/b/c", false));
    }

    #[test]
    fn test_from_json_str() {
        let config = Config::from_json_str(r#"{"client": {"html": {"limit": 4}}}"#).unwrap();
        assert_eq!(config.get("client/html/limit", 0u32), 4);
        assert!(Config::from_json_str("[1, 2]").unwrap().lookup("x").is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(Config::from_toml_str("this is = = not toml").is_err());
    }
}
