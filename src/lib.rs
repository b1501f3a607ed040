//! Projection-aware annotation of spherical panoramas
//!
//! A [`PanoramaViewer`] shows an equirectangular panorama through a
//! rectilinear virtual camera and lets an operator mark regions on it.
//! Each region remembers the camera frame it was drawn in, so it can be
//! carried into any later view of the same panorama.

pub mod codec;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod panorama;
pub mod projection;
pub mod render;
pub mod session;

pub use crate::config::ViewerConfig;
pub use crate::core::PanoramaViewer;
pub use crate::error::{CodecError, ViewerError};
pub use crate::panorama::PanoramaImage;
