//! The generic renderer node.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use region_cache::{FragmentKey, FragmentPolicy, Part};
use region_core::{RenderError, RenderRequest, RenderResult, TagCollector};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::fallback::error_markup;
use crate::patch;
use crate::region::{Region, ViewVars};
use crate::registry::DEFAULT_IMPL;
use crate::services::Services;
use crate::view::{ViewContext, ViewData};

/// One region in the render tree.
///
/// Children are resolved from configuration when they are needed, so a
/// node is cheap to create and holds no per-pass state.
#[derive(Clone)]
pub struct RendererNode {
    region: Arc<dyn Region>,
    services: Arc<Services>,
}

impl RendererNode {
    /// Create a node for a region.
    pub fn new(region: Arc<dyn Region>, services: Arc<Services>) -> Self {
        Self { region, services }
    }

    /// Region path.
    pub fn path(&self) -> &str {
        self.region.path()
    }

    /// Configured child names, in render order.
    pub fn subparts(&self) -> Vec<String> {
        self.services.region_config(
            self.path(),
            "default/subparts",
            self.region.default_subparts(),
        )
    }

    /// Resolve a child by name.
    ///
    /// `client/html/<path>/<name>/name` selects the implementation.
    pub fn child(&self, name: &str) -> RenderResult<RendererNode> {
        let impl_name: String = self.services.region_config(
            self.path(),
            &format!("{}/name", name),
            DEFAULT_IMPL.to_string(),
        );
        let child_path = format!("{}/{}", self.path(), name);

        self.services
            .registry
            .create(&child_path, &impl_name)
            .map(|region| RendererNode::new(region, Arc::clone(&self.services)))
            .ok_or_else(|| {
                RenderError::client(format!(
                    "Sub-client \"{}\" with name \"{}\" is not available",
                    child_path, impl_name
                ))
            })
    }

    /// Region policy with configuration overrides applied.
    pub fn cache_policy(&self) -> FragmentPolicy {
        let mut policy = self.region.cache_policy();
        policy.enabled = self
            .services
            .region_config(self.path(), "cache/enabled", policy.enabled);

        let ttl: Option<u64> = self.services.region_config(self.path(), "cache/ttl", None);
        if let Some(secs) = ttl {
            policy.ttl = Some(Duration::from_secs(secs));
        }
        policy
    }

    /// Template path for a part.
    pub fn template(&self, part: Part) -> String {
        match part {
            Part::Body => self.services.region_config(
                self.path(),
                "default/template-body",
                self.region.body_template(),
            ),
            Part::Header => self.services.region_config(
                self.path(),
                "default/template-header",
                self.region.header_template(),
            ),
        }
    }

    /// Cache key of a part for the current request.
    pub fn cache_key(&self, part: Part, instance_id: &str, view: &ViewContext) -> FragmentKey {
        self.cache_policy()
            .key_builder()
            .build(self.path(), part, instance_id, view.page())
    }

    fn node_id(&self, instance_id: &str) -> String {
        format!("{}#{}", self.path(), instance_id)
    }

    /// Run the input phase of this region and all its children.
    pub fn process<'a>(
        &'a self,
        view: &'a mut ViewContext,
        instance_id: &'a str,
    ) -> BoxFuture<'a, ()> {
        async move {
            if let Err(err) = self.region.process(view, &self.services).await {
                let node = self.node_id(instance_id);
                self.record_error(view, &node, &err);
            }

            // Unresolvable children are reported once, by the body render.
            for name in self.subparts() {
                if let Ok(child) = self.child(&name) {
                    child.process(view, instance_id).await;
                }
            }
        }
        .boxed()
    }

    /// Render the body, merging its tags and expiry into `req`.
    ///
    /// Served from cache when possible; cached output gets its live
    /// sections re-rendered and tags of a cache hit are not merged.
    pub fn render_body<'a>(
        &'a self,
        view: &'a mut ViewContext,
        req: &'a mut RenderRequest,
    ) -> BoxFuture<'a, String> {
        async move {
            let uid = req.instance_id().to_string();
            let policy = self.cache_policy();
            let key = self.cache_key(Part::Body, &uid, view);
            let cache = &self.services.cache;

            if let Some(entry) = cache.get(&key, &policy).await.entry {
                return self.modify_body(entry.html, view, &uid).await;
            }

            let flight = if policy.enabled {
                Some(cache.acquire(&key).await)
            } else {
                None
            };
            if flight.is_some() {
                if let Some(entry) = cache.peek(&key, &policy).await {
                    return self.modify_body(entry.html, view, &uid).await;
                }
            }

            let mut scoped = req.scoped();
            let (html, clean) = self.compose_body(view, &mut scoped).await;

            if clean {
                if let Err(e) = cache.put(&key, html.as_str(), scoped.collector(), &policy).await {
                    warn!(region = self.path(), key = %key, error = %e, "Failed to cache body");
                }
            } else if policy.enabled {
                debug!(region = self.path(), key = %key, "Not caching body rendered with errors");
            }

            req.merge(scoped.collector());
            html
        }
        .boxed()
    }

    /// Render the header, merging its tags and expiry into `req`.
    ///
    /// Failures are logged and yield `None`.
    pub fn render_header<'a>(
        &'a self,
        view: &'a mut ViewContext,
        req: &'a mut RenderRequest,
    ) -> BoxFuture<'a, Option<String>> {
        async move {
            let uid = req.instance_id().to_string();
            let policy = self.cache_policy();
            let key = self.cache_key(Part::Header, &uid, view);
            let cache = &self.services.cache;

            if let Some(entry) = cache.get(&key, &policy).await.entry {
                return Some(self.modify_header(entry.html, view, &uid).await);
            }

            let flight = if policy.enabled {
                Some(cache.acquire(&key).await)
            } else {
                None
            };
            if flight.is_some() {
                if let Some(entry) = cache.peek(&key, &policy).await {
                    return Some(self.modify_header(entry.html, view, &uid).await);
                }
            }

            let before = view.failures();
            let mut scoped = req.scoped();
            let html = match self.compose_header(view, &mut scoped).await {
                Ok(html) => html,
                Err(err) => {
                    self.log_failure(view, &err, "Header rendering failed");
                    return None;
                }
            };

            if let Some(html) = &html {
                if view.failures() == before {
                    if let Err(e) = cache.put(&key, html.as_str(), scoped.collector(), &policy).await {
                        warn!(region = self.path(), key = %key, error = %e, "Failed to cache header");
                    }
                }
            }

            req.merge(scoped.collector());
            html
        }
        .boxed()
    }

    /// Re-render live sections inside cached output.
    ///
    /// Each live region below this node is rendered against a fresh view
    /// and spliced in between its markers.
    pub fn modify_body<'a>(
        &'a self,
        html: String,
        view: &'a mut ViewContext,
        instance_id: &'a str,
    ) -> BoxFuture<'a, String> {
        async move {
            let mut html = html;

            for name in self.subparts() {
                if let Ok(child) = self.child(&name) {
                    html = child.modify_body(html, view, instance_id).await;
                }
            }

            if let Some(marker) = self.region.marker() {
                let mut fresh_view = view.fresh();
                let mut req = RenderRequest::new(instance_id);
                let (fresh, _) = self.compose_body(&mut fresh_view, &mut req).await;

                debug!(region = self.path(), marker, "Patched live section");
                html = patch::patch(&html, &fresh, marker);
            }

            html
        }
        .boxed()
    }

    /// Header counterpart of [`modify_body`](Self::modify_body).
    ///
    /// A live region whose header fails is spliced in as empty.
    pub fn modify_header<'a>(
        &'a self,
        html: String,
        view: &'a mut ViewContext,
        instance_id: &'a str,
    ) -> BoxFuture<'a, String> {
        async move {
            let mut html = html;

            for name in self.subparts() {
                if let Ok(child) = self.child(&name) {
                    html = child.modify_header(html, view, instance_id).await;
                }
            }

            if let Some(marker) = self.region.marker() {
                let mut fresh_view = view.fresh();
                let mut req = RenderRequest::new(instance_id);
                let fresh = match self.compose_header(&mut fresh_view, &mut req).await {
                    Ok(fresh) => fresh.unwrap_or_default(),
                    Err(err) => {
                        self.log_failure(&mut fresh_view, &err, "Header rendering failed");
                        String::new()
                    }
                };

                debug!(region = self.path(), marker, "Patched live header section");
                html = patch::patch(&html, &fresh, marker);
            }

            html
        }
        .boxed()
    }

    /// Render data, children and own template. Returns the HTML and whether
    /// the subtree rendered without errors.
    async fn compose_body(&self, view: &mut ViewContext, req: &mut RenderRequest) -> (String, bool) {
        let uid = req.instance_id().to_string();
        let node = self.node_id(&uid);
        let before = view.failures();

        let vars = match self.view_data(view, &node).await {
            Ok(data) => {
                req.merge(&data.collector);
                data.vars
            }
            Err(err) => {
                self.record_error(view, &node, &err);
                ViewVars::new()
            }
        };

        let saved = view.enter_scope(&vars);
        let mut body = String::new();
        for name in self.subparts() {
            match self.child(&name) {
                Ok(child) => body.push_str(&child.render_body(view, req).await),
                Err(err) => self.record_error(view, &node, &err),
            }
        }
        view.leave_scope(saved);

        let mut tvars = view.visible_vars();
        tvars.extend(vars);
        tvars.insert("body".to_string(), Value::String(body.clone()));
        tvars.insert("instance_id".to_string(), Value::String(uid.clone()));
        tvars.insert("errors".to_string(), serde_json::json!(view.errors(&node)));

        let html = match self.services.engine.render(&self.template(Part::Body), &tvars) {
            Ok(html) => html,
            Err(err) => {
                self.record_error(view, &node, &err);
                format!("{}{}", error_markup(view.errors(&node)), body)
            }
        };

        let html = match self.region.marker() {
            Some(marker) => patch::wrap(&html, marker),
            None => html,
        };

        let clean = view.failures() == before && view.errors(&node).is_empty();
        (html, clean)
    }

    async fn compose_header(
        &self,
        view: &mut ViewContext,
        req: &mut RenderRequest,
    ) -> RenderResult<Option<String>> {
        let uid = req.instance_id().to_string();
        let data = self.view_data(view, &self.node_id(&uid)).await?;
        req.merge(&data.collector);

        let saved = view.enter_scope(&data.vars);
        let mut header = String::new();
        for name in self.subparts() {
            match self.child(&name) {
                Ok(child) => {
                    if let Some(html) = child.render_header(view, req).await {
                        header.push_str(&html);
                    }
                }
                Err(err) => self.log_failure(view, &err, "Header child unavailable"),
            }
        }
        view.leave_scope(saved);

        let template = self.template(Part::Header);
        let html = if self.services.engine.has_template(&template) {
            let mut tvars = view.visible_vars();
            tvars.extend(data.vars);
            tvars.insert("header".to_string(), Value::String(header));
            tvars.insert("instance_id".to_string(), Value::String(uid));

            Some(self.services.engine.render(&template, &tvars)?)
        } else {
            (!header.is_empty()).then_some(header)
        };

        Ok(match (html, self.region.marker()) {
            (Some(html), Some(marker)) => Some(patch::wrap(&html, marker)),
            (html, _) => html,
        })
    }

    /// Prepared view data, computed once per region instance and pass.
    async fn view_data(&self, view: &mut ViewContext, node: &str) -> RenderResult<ViewData> {
        if let Some(data) = view.params_for(node) {
            return Ok(data.clone());
        }

        let mut collector = TagCollector::new();
        let vars = self
            .region
            .prepare(view, &self.services, &mut collector)
            .await?;

        let data = ViewData { vars, collector };
        view.memoize(node, data.clone());
        Ok(data)
    }

    /// Log an error and add its user-facing message to the region's list.
    fn record_error(&self, view: &mut ViewContext, node: &str, err: &RenderError) {
        if err.is_recoverable() {
            warn!(region = self.path(), error = %err, "Region rendered with errors");
        } else {
            error!(region = self.path(), error = %format!("{:#}", err), "Region rendering failed");
        }
        view.add_error(node, err.user_message(self.services.translator.as_ref()));
    }

    fn log_failure(&self, view: &mut ViewContext, err: &RenderError, message: &str) {
        error!(region = self.path(), error = %format!("{:#}", err), "{}", message);
        view.note_failure();
    }
}

impl std::fmt::Debug for RendererNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererNode")
            .field("path", &self.path())
            .finish_non_exhaustive()
    }
}
