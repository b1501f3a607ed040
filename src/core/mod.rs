//! Core viewer module
//!
//! This module contains:
//! - The view controller owning the rendered frame and the annotations
//! - Visibility and sight checks run on every render
//! - Source-resolution crops of annotations

pub mod crop;
pub mod viewer;
pub mod visibility;

pub use viewer::PanoramaViewer;
pub use visibility::{Sight, is_visible};
