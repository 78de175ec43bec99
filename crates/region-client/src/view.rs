//! Pass-scoped view state.

use std::collections::HashMap;
use std::sync::Arc;

use region_core::{PageRequest, Params, TagCollector};
use serde_json::{Map, Value};

use crate::region::ViewVars;

/// Data a region prepared in this pass, with the tags it collected.
#[derive(Debug, Clone, Default)]
pub struct ViewData {
    pub vars: ViewVars,
    pub collector: TagCollector,
}

/// State shared by all nodes of one render pass.
///
/// Prepared view data is memoized per region instance, so a region's data
/// is fetched once even when both header and body are rendered. Variables
/// of enclosing regions are visible to their children through the scope.
#[derive(Debug, Clone)]
pub struct ViewContext {
    page: Arc<PageRequest>,
    scope: ViewVars,
    session: Map<String, Value>,
    memo: HashMap<String, ViewData>,
    errors: HashMap<String, Vec<String>>,
    failures: usize,
}

impl ViewContext {
    /// Create the context for a page request.
    pub fn new(page: PageRequest) -> Self {
        Self {
            page: Arc::new(page),
            scope: ViewVars::new(),
            session: Map::new(),
            memo: HashMap::new(),
            errors: HashMap::new(),
            failures: 0,
        }
    }

    /// Same request and session, nothing memoized.
    ///
    /// Used to re-render live regions independently of the pass that
    /// produced the cached output around them.
    pub fn fresh(&self) -> Self {
        Self {
            page: Arc::clone(&self.page),
            scope: ViewVars::new(),
            session: self.session.clone(),
            memo: HashMap::new(),
            errors: HashMap::new(),
            failures: 0,
        }
    }

    /// The page request.
    pub fn page(&self) -> &PageRequest {
        &self.page
    }

    /// A request parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.page.param(name)
    }

    /// Request parameters named `<prefix>_*`.
    pub fn params_with_prefixes(&self, prefixes: &[&str]) -> Params {
        self.page.params_with_prefixes(prefixes)
    }

    /// A view variable: enclosing regions first, then the page.
    pub fn var(&self, name: &str) -> Option<&Value> {
        self.scope.get(name).or_else(|| self.page.vars.get(name))
    }

    /// Variables inherited from enclosing regions.
    pub fn scope(&self) -> &ViewVars {
        &self.scope
    }

    /// Page variables overlaid with those of enclosing regions.
    pub fn visible_vars(&self) -> ViewVars {
        let mut vars = self.page.vars.clone();
        vars.extend(self.scope.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }

    /// Make `vars` visible to nested regions; returns the previous scope.
    pub fn enter_scope(&mut self, vars: &ViewVars) -> ViewVars {
        let mut scope = self.scope.clone();
        scope.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        std::mem::replace(&mut self.scope, scope)
    }

    /// Restore the scope returned by [`ViewContext::enter_scope`].
    pub fn leave_scope(&mut self, previous: ViewVars) {
        self.scope = previous;
    }

    /// Memoized view data of a region instance.
    pub fn params_for(&self, node: &str) -> Option<&ViewData> {
        self.memo.get(node)
    }

    /// Remember the view data of a region instance for the rest of the pass.
    pub fn memoize(&mut self, node: impl Into<String>, data: ViewData) {
        self.memo.insert(node.into(), data);
    }

    /// Session value.
    pub fn session_get(&self, key: &str) -> Option<&Value> {
        self.session.get(key)
    }

    /// Store a session value.
    pub fn session_set(&mut self, key: impl Into<String>, value: Value) {
        self.session.insert(key.into(), value);
    }

    /// The whole session.
    pub fn session(&self) -> &Map<String, Value> {
        &self.session
    }

    /// Record a user-facing error for a region instance.
    pub fn add_error(&mut self, node: &str, message: String) {
        self.errors.entry(node.to_string()).or_default().push(message);
        self.failures += 1;
    }

    /// Count a failure that is logged only.
    pub fn note_failure(&mut self) {
        self.failures += 1;
    }

    /// Number of failures in this pass so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Errors recorded for a region instance so far.
    pub fn errors(&self, node: &str) -> &[String] {
        self.errors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for ViewContext {
    fn default() -> Self {
        Self::new(PageRequest::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_nesting() {
        let mut view = ViewContext::new(PageRequest::new().with_var("site", json!("main")));

        let mut outer = ViewVars::new();
        outer.insert("product".to_string(), json!({"id": "1"}));
        let saved = view.enter_scope(&outer);

        assert_eq!(view.var("product"), Some(&json!({"id": "1"})));
        assert_eq!(view.var("site"), Some(&json!("main")));

        assert_eq!(view.visible_vars().len(), 2);

        view.leave_scope(saved);
        assert!(view.var("product").is_none());
    }

    #[test]
    fn test_memo_is_per_node() {
        let mut view = ViewContext::default();
        let mut data = ViewData::default();
        data.collector.add_tag("product-1");
        view.memoize("catalog/detail#", data);

        assert!(view.params_for("catalog/detail#").is_some());
        assert!(view.params_for("catalog/detail#cd2").is_none());
    }

    #[test]
    fn test_fresh_keeps_request_and_session() {
        let mut view = ViewContext::new(PageRequest::new().with_param("d_prodid", "7"));
        view.session_set("last", json!("7"));
        view.memoize("catalog/detail#", ViewData::default());
        view.add_error("catalog/detail#", "failed".to_string());

        let fresh = view.fresh();
        assert_eq!(fresh.param("d_prodid"), Some("7"));
        assert_eq!(fresh.session_get("last"), Some(&json!("7")));
        assert!(fresh.params_for("catalog/detail#").is_none());
        assert!(fresh.errors("catalog/detail#").is_empty());
    }

    #[test]
    fn test_errors_accumulate() {
        let mut view = ViewContext::default();
        view.add_error("a", "one".to_string());
        view.add_error("a", "two".to_string());

        view.note_failure();

        assert_eq!(view.errors("a"), ["one", "two"]);
        assert!(view.errors("b").is_empty());
        assert_eq!(view.failures(), 3);
    }
}
