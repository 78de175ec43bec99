//! Data provider interface with query criteria and dependency tagging.
//!
//! This crate provides:
//! - `Item` / `ListRef` - Generic domain items and their list references
//! - `Criteria` - Equality/membership predicates, sorting and slicing
//! - `DataProvider` - The query interface regions read through
//! - `MemoryProvider` - In-memory provider for fixtures and tests
//! - `add_meta_item` - Record an item's tag and expiry on a collector

mod criteria;
mod error;
mod item;
mod meta;
mod provider;

pub use criteria::*;
pub use error::*;
pub use item::*;
pub use meta::*;
pub use provider::*;
