//! Shared utilities.

pub mod glob;
pub mod path;
pub mod plural;

pub use plural::{plural_count, plural_s};
