//! Storefront region implementations.

mod bought;
mod detail;
mod email;
mod navigator;

pub use bought::*;
pub use detail::*;
pub use email::*;
pub use navigator::*;
