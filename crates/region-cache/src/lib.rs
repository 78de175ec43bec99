//! Fragment cache for rendered regions.
//!
//! This crate provides:
//! - `FragmentKey` / `FragmentKeyBuilder` - Composite keys from region, instance and request discriminators
//! - `FragmentPolicy` - Per-region cache configuration
//! - `FragmentStore` / `MemoryStore` - Tag-indexed entry storage
//! - `FragmentCache` - Expiry handling, tag invalidation, single-flight and statistics
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use region_cache::{FragmentCache, FragmentPolicy, Part, VaryRule};
//!
//! let policy = FragmentPolicy::new()
//!     .with_ttl(Duration::from_secs(3600))
//!     .vary_on(VaryRule::param_prefix("d"))
//!     .vary_on(VaryRule::Locale);
//!
//! let key = policy.key_builder().build("catalog/detail", Part::Body, "", &page);
//! let cache = FragmentCache::in_memory();
//! let lookup = cache.get(&key, &policy).await;
//! ```

mod fragment;
mod key;
mod policy;
mod store;

pub use fragment::*;
pub use key::*;
pub use policy::*;
pub use store::*;
