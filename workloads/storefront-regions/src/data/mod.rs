//! View data models for the storefront regions.

mod basket;
mod view;

pub use basket::*;
pub use view::*;
