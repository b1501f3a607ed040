//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the crate.
//! Types here carry no rendering or persistence concerns.

pub mod annotation;
pub mod geometry;
pub mod view;

pub use annotation::*;
pub use geometry::*;
pub use view::*;
