//! Recursive rendering of cacheable storefront HTML regions.
//!
//! This crate provides:
//! - `Region` - Per-region strategy (templates, children, data fetch, cache policy)
//! - `Registry` - Region path and implementation name to factory
//! - `ViewContext` - Pass-scoped parameters, memoized view data and session
//! - `RendererNode` - The generic node rendering a region and its children
//! - `patch` - Marker-delimited content substitution on cache hits
//! - `TeraEngine` - Template engine backed by Tera
//! - `HtmlClient` - Entry point returning body, header, tags and expiry
//!
//! # Example
//!
//! ```ignore
//! let client = HtmlClient::new(Arc::new(services));
//! let output = client
//!     .render("catalog/detail", PageRequest::new().with_param("d_prodid", "1"))
//!     .await?;
//! println!("{}", output.body);
//! ```

mod client;
mod engine;
mod fallback;
mod node;
pub mod patch;
mod region;
mod registry;
mod services;
mod view;

pub use client::*;
pub use engine::*;
pub use fallback::*;
pub use node::*;
pub use region::*;
pub use registry::*;
pub use services::*;
pub use view::*;
