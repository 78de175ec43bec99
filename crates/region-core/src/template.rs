//! Template engine interface.

use serde_json::{Map, Value};

use crate::error::RenderResult;

/// Renders a named template with bound variables.
///
/// Implementations are treated as pure functions from variables to HTML.
pub trait TemplateEngine: Send + Sync {
    /// Render the template at `path`.
    fn render(&self, path: &str, vars: &Map<String, Value>) -> RenderResult<String>;

    /// Check whether a template is available.
    fn has_template(&self, path: &str) -> bool;
}
