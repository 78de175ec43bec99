//! Per-region rendering strategy.

use async_trait::async_trait;
use region_cache::FragmentPolicy;
use region_core::{RenderResult, TagCollector};
use serde_json::{Map, Value};

use crate::services::Services;
use crate::view::ViewContext;

/// Variables a region exposes to its own and its children's templates.
pub type ViewVars = Map<String, Value>;

/// What makes one region different from another.
///
/// The generic [`RendererNode`](crate::RendererNode) drives every region
/// through the same composition, caching and error handling; a region only
/// describes its templates, children, data and cache behaviour.
#[async_trait]
pub trait Region: Send + Sync {
    /// Region path, e.g. `catalog/detail`. Also the configuration prefix
    /// below `client/html/`.
    fn path(&self) -> &str;

    /// Ordered child names used when the configuration names none.
    fn default_subparts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Body template used when the configuration names none.
    fn body_template(&self) -> String {
        format!("{}/body-default.html", self.path())
    }

    /// Header template used when the configuration names none.
    fn header_template(&self) -> String {
        format!("{}/header-default.html", self.path())
    }

    /// Fragment cache behaviour. Regions are not cached unless they opt in.
    fn cache_policy(&self) -> FragmentPolicy {
        FragmentPolicy::none()
    }

    /// Section name for live regions patched into cached output.
    fn marker(&self) -> Option<&str> {
        None
    }

    /// Handle request input before anything is rendered.
    async fn process(&self, _view: &mut ViewContext, _services: &Services) -> RenderResult<()> {
        Ok(())
    }

    /// Fetch data and build the template variables.
    ///
    /// Every item whose content ends up in the output must be recorded on
    /// `tags`. Called at most once per region and instance within a pass.
    async fn prepare(
        &self,
        _view: &ViewContext,
        _services: &Services,
        _tags: &mut TagCollector,
    ) -> RenderResult<ViewVars> {
        Ok(ViewVars::new())
    }
}

/// Region without data of its own, rendering its template and children.
#[derive(Debug, Clone)]
pub struct TemplateRegion {
    path: String,
    subparts: Vec<String>,
    policy: FragmentPolicy,
}

impl TemplateRegion {
    /// Create a template-only region at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            subparts: Vec::new(),
            policy: FragmentPolicy::none(),
        }
    }

    /// Set the default children.
    pub fn with_subparts(mut self, subparts: &[&str]) -> Self {
        self.subparts = subparts.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the cache policy.
    pub fn with_policy(mut self, policy: FragmentPolicy) -> Self {
        self.policy = policy;
        self
    }
}

#[async_trait]
impl Region for TemplateRegion {
    fn path(&self) -> &str {
        &self.path
    }

    fn default_subparts(&self) -> Vec<String> {
        self.subparts.clone()
    }

    fn cache_policy(&self) -> FragmentPolicy {
        self.policy.clone()
    }
}
