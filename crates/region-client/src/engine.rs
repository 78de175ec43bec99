//! Template engine backed by Tera.

use std::path::Path;

use anyhow::Context as _;
use region_core::{RenderError, RenderResult, TemplateEngine};
use serde_json::{Map, Value};
use tera::{Context, Tera};

/// Tera templates addressed by path, e.g. `catalog/detail/body-default.html`.
///
/// Templates ending in `.html` are autoescaped, so nested region output has
/// to be emitted with the `safe` filter.
#[derive(Debug, Default)]
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    /// Create an engine without templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a template.
    pub fn with_template(mut self, path: &str, content: &str) -> anyhow::Result<Self> {
        self.tera
            .add_raw_template(path, content)
            .with_context(|| format!("Failed to parse template: {}", path))?;
        Ok(self)
    }

    /// Add or replace several templates at once.
    pub fn with_templates<'a, I>(mut self, templates: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let templates: Vec<(&str, &str)> = templates.into_iter().collect();
        self.tera
            .add_raw_templates(templates)
            .context("Failed to parse templates")?;
        Ok(self)
    }

    /// Load every file below `dir`, named by its relative path.
    ///
    /// Loaded templates take precedence over the ones already registered.
    pub fn with_dir(self, dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let glob = format!("{}/**/*", dir.display());
        let mut tera = Tera::new(&glob)
            .with_context(|| format!("Failed to load templates from {}", dir.display()))?;

        // Existing names are kept, so the directory wins.
        tera.extend(&self.tera)
            .context("Failed to merge default templates")?;
        Ok(Self { tera })
    }

    /// Names of all registered templates, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tera.get_template_names().map(String::from).collect();
        names.sort();
        names
    }
}

impl TemplateEngine for TeraEngine {
    fn render(&self, path: &str, vars: &Map<String, Value>) -> RenderResult<String> {
        let mut context = Context::new();
        for (name, value) in vars {
            context.insert(name.as_str(), value);
        }

        self.tera.render(path, &context).map_err(|e| {
            let err = anyhow::Error::new(e);
            RenderError::Template(format!("{:#}", err))
        })
    }

    fn has_template(&self, path: &str) -> bool {
        self.tera.get_template_names().any(|name| name == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_render_with_variables() {
        let engine = TeraEngine::new()
            .with_template("greeting.html", "<p>{{ name }}</p>")
            .unwrap();

        let html = engine
            .render("greeting.html", &vars(json!({"name": "Shirt & Tie"})))
            .unwrap();
        assert_eq!(html, "<p>Shirt &amp; Tie</p>");
    }

    #[test]
    fn test_safe_filter_keeps_markup() {
        let engine = TeraEngine::new()
            .with_template("outer.html", "<div>{{ body | safe }}</div>")
            .unwrap();

        let html = engine
            .render("outer.html", &vars(json!({"body": "<b>x</b>"})))
            .unwrap();
        assert_eq!(html, "<div><b>x</b></div>");
    }

    #[test]
    fn test_missing_template_is_template_error() {
        let err = TeraEngine::new().render("nope.html", &Map::new()).unwrap_err();
        assert!(matches!(err, RenderError::Template(_)));
    }

    #[test]
    fn test_has_template() {
        let engine = TeraEngine::new()
            .with_templates([("a.html", "a"), ("b.html", "b")])
            .unwrap();

        assert!(engine.has_template("a.html"));
        assert!(!engine.has_template("c.html"));
        assert_eq!(engine.template_names(), vec!["a.html", "b.html"]);
    }

    #[test]
    fn test_directory_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("region-client-tpl-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("catalog")).unwrap();
        std::fs::write(dir.join("catalog/body.html"), "custom").unwrap();

        let engine = TeraEngine::new()
            .with_templates([("catalog/body.html", "default"), ("other.html", "other")])
            .unwrap()
            .with_dir(&dir)
            .unwrap();

        assert_eq!(engine.render("catalog/body.html", &Map::new()).unwrap(), "custom");
        assert_eq!(engine.render("other.html", &Map::new()).unwrap(), "other");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
