//! Source panorama type

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::ViewerError;

/// A decoded equirectangular panorama and the path it came from
#[derive(Clone, Debug)]
pub struct PanoramaImage {
    pub rgba: RgbaImage,
    pub path: PathBuf,
}

impl PanoramaImage {
    /// Load and decode a panorama from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ViewerError> {
        let path = path.as_ref();
        let rgba = image::open(path)
            .map_err(|source| ViewerError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .into_rgba8();
        Self::from_image(rgba, path)
    }

    /// Wrap an already decoded image, rejecting empty ones
    pub fn from_image(rgba: RgbaImage, path: impl Into<PathBuf>) -> Result<Self, ViewerError> {
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(ViewerError::InvalidSource {
                width: rgba.width(),
                height: rgba.height(),
            });
        }
        let path = path.into();
        log::debug!(
            "Panorama loaded: {}x{} pixels from {}",
            rgba.width(),
            rgba.height(),
            path.display()
        );
        Ok(Self { rgba, path })
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}
