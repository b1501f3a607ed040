//! Overlay rendering module
//!
//! This module contains:
//! - Colours and pixel math shared by the overlay
//! - Image rendering using tiny-skia (preview export)

pub mod geometry;
pub mod image;

pub use self::image::{compose, draw_overlay};
