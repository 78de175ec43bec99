//! Region rendering entry point.

use std::collections::BTreeSet;
use std::sync::Arc;

use region_cache::{CacheResult, CacheStats};
use region_core::{Expiry, PageRequest, RenderError, RenderRequest, RenderResult, Tag};
use serde::Serialize;
use tracing::debug;

use crate::node::RendererNode;
use crate::registry::DEFAULT_IMPL;
use crate::services::Services;
use crate::view::ViewContext;

/// Output of one region render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionOutput {
    /// Body HTML.
    pub body: String,
    /// Header HTML, `None` when the region has none or it failed.
    pub header: Option<String>,
    /// Tags of all freshly rendered content.
    pub tags: BTreeSet<Tag>,
    /// Earliest expiry of all freshly rendered content.
    pub expiry: Expiry,
}

/// Renders top-level regions by path.
#[derive(Debug, Clone)]
pub struct HtmlClient {
    services: Arc<Services>,
}

impl HtmlClient {
    /// Create a client over shared services.
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    /// Shared services.
    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    /// Node for a top-level region.
    ///
    /// `client/html/<path>/name` selects the implementation.
    pub fn node(&self, path: &str) -> RenderResult<RendererNode> {
        let name: String = self
            .services
            .region_config(path, "name", DEFAULT_IMPL.to_string());

        self.services
            .registry
            .create(path, &name)
            .map(|region| RendererNode::new(region, Arc::clone(&self.services)))
            .ok_or_else(|| {
                RenderError::client(format!(
                    "Client \"{}\" with name \"{}\" is not available",
                    path, name
                ))
            })
    }

    /// Render a region for a page request in its own pass.
    pub async fn render(&self, path: &str, page: PageRequest) -> RenderResult<RegionOutput> {
        let mut view = ViewContext::new(page);
        self.render_view(path, "", &mut view).await
    }

    /// Render one instance of a region within an existing pass.
    ///
    /// Runs the input phase, then the header, then the body, sharing the
    /// view so data is fetched once.
    pub async fn render_view(
        &self,
        path: &str,
        instance_id: &str,
        view: &mut ViewContext,
    ) -> RenderResult<RegionOutput> {
        let node = self.node(path)?;
        debug!(region = path, instance_id, request_id = %view.page().request_id, "Rendering region");

        node.process(view, instance_id).await;

        let mut req = RenderRequest::new(instance_id);
        let header = node.render_header(view, &mut req).await;
        let body = node.render_body(view, &mut req).await;

        let (tags, expiry) = req.into_collector().into_parts();
        Ok(RegionOutput {
            body,
            header,
            tags,
            expiry,
        })
    }

    /// Drop cached output depending on any of the tags.
    pub async fn invalidate(&self, tags: &[Tag]) -> CacheResult<u64> {
        self.services.cache.invalidate(tags).await
    }

    /// Cache counters.
    pub async fn cache_stats(&self) -> CacheStats {
        self.services.cache.stats().await
    }
}
