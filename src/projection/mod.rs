//! Panorama projection engine
//!
//! This module provides:
//! - The camera and equirectangular pixel model shared by every path
//! - The pixel kernel rendering a view from a panorama
//! - Point mapping between panorama and view frames

pub mod camera;
pub mod kernel;
pub mod point;

pub use kernel::{Interpolation, Window, project, project_region};
pub use point::{PointClass, map_point, reproject_point, unmap_point};
