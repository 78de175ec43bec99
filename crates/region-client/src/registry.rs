//! Region factories by path and implementation name.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::region::Region;

/// Implementation name used when the configuration names none.
pub const DEFAULT_IMPL: &str = "default";

/// Creates a region instance.
pub type RegionFactory = Arc<dyn Fn() -> Arc<dyn Region> + Send + Sync>;

/// Maps (region path, implementation name) to a factory.
///
/// Built at startup; entries can be replaced while the process runs.
#[derive(Default)]
pub struct Registry {
    factories: RwLock<HashMap<(String, String), RegionFactory>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named implementation for a path, replacing any previous one.
    pub fn register<F>(&self, path: &str, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Region> + Send + Sync + 'static,
    {
        let mut factories = match self.factories.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        factories.insert((path.to_string(), name.to_string()), Arc::new(factory));
    }

    /// Register the default implementation for a path.
    pub fn register_default<F>(&self, path: &str, factory: F)
    where
        F: Fn() -> Arc<dyn Region> + Send + Sync + 'static,
    {
        self.register(path, DEFAULT_IMPL, factory);
    }

    /// Builder form of [`Registry::register`].
    pub fn with<F>(self, path: &str, name: &str, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Region> + Send + Sync + 'static,
    {
        self.register(path, name, factory);
        self
    }

    /// Remove an implementation.
    pub fn unregister(&self, path: &str, name: &str) -> bool {
        let mut factories = match self.factories.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        factories
            .remove(&(path.to_string(), name.to_string()))
            .is_some()
    }

    /// Instantiate an implementation.
    pub fn create(&self, path: &str, name: &str) -> Option<Arc<dyn Region>> {
        let key = (path.to_string(), name.to_string());
        let factory = {
            let factories = match self.factories.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let factory = factories.get(&key).cloned();
            factory
        }?;
        Some(factory())
    }

    /// Check whether an implementation is registered.
    pub fn contains(&self, path: &str, name: &str) -> bool {
        match self.factories.read() {
            Ok(f) => f.contains_key(&(path.to_string(), name.to_string())),
            Err(poisoned) => poisoned
                .into_inner()
                .contains_key(&(path.to_string(), name.to_string())),
        }
    }

    /// Registered (path, implementation names) pairs, sorted by path.
    pub fn entries(&self) -> Vec<(String, Vec<String>)> {
        let factories = match self.factories.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let mut by_path: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for (path, name) in factories.keys() {
            by_path.entry(path.as_str()).or_default().insert(name.as_str());
        }

        let mut entries: Vec<(String, Vec<String>)> = by_path
            .into_iter()
            .map(|(path, names)| {
                (
                    path.to_string(),
                    names.into_iter().map(String::from).collect(),
                )
            })
            .collect();
        entries.sort();
        entries
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.entries())
            .finish()
    }
}
