//! Collaborators shared by every node of a render pass.

use std::sync::Arc;

use region_cache::FragmentCache;
use region_core::{Catalog, Config, TemplateEngine, Translator};
use region_data::DataProvider;

use crate::registry::Registry;

/// Process-wide collaborators. Safe for concurrent render passes.
#[derive(Clone)]
pub struct Services {
    /// Read-only configuration.
    pub config: Arc<Config>,
    /// Domain data access.
    pub provider: Arc<dyn DataProvider>,
    /// Template rendering.
    pub engine: Arc<dyn TemplateEngine>,
    /// Message translation.
    pub translator: Arc<dyn Translator>,
    /// Shared fragment cache.
    pub cache: Arc<FragmentCache>,
    /// Region factories.
    pub registry: Arc<Registry>,
}

impl Services {
    /// Create services with an untranslated catalog, an in-memory cache and
    /// an empty registry.
    pub fn new(
        config: Config,
        provider: Arc<dyn DataProvider>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            engine,
            translator: Arc::new(Catalog::new()),
            cache: Arc::new(FragmentCache::in_memory()),
            registry: Arc::new(Registry::new()),
        }
    }

    /// Set the translator.
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Set the fragment cache.
    pub fn with_cache(mut self, cache: Arc<FragmentCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Set the region registry.
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Configuration value below `client/html/<region>/`.
    pub fn region_config<T: serde::de::DeserializeOwned>(
        &self,
        region: &str,
        key: &str,
        default: T,
    ) -> T {
        self.config
            .get(&format!("client/html/{}/{}", region, key), default)
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
