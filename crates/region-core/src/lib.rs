//! Core abstractions for cacheable storefront HTML regions.
//!
//! This crate provides the fundamental types and traits:
//! - `Tag` / `TagCollector` - Content dependency tracking with earliest expiry
//! - `RenderRequest` - Per-render accumulator handed down the region tree
//! - `PageRequest` - Request parameters shared by one render pass
//! - `RenderError` - Recoverable vs unexpected render failures
//! - `Config` - Process-wide, path-addressed configuration
//! - `Translator` / `TemplateEngine` - External collaborator interfaces

mod config;
mod error;
mod i18n;
mod request;
mod tag;
mod template;

pub use config::*;
pub use error::*;
pub use i18n::*;
pub use request::*;
pub use tag::*;
pub use template::*;
