//! Error types for the projection engine and the annotation codec

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the projection kernel and the view controller
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("invalid source panorama: {width}x{height} pixels")]
    InvalidSource { width: u32, height: u32 },

    #[error("aperture {0} rad is outside the open range (0, π)")]
    InvalidAperture(f64),

    #[error("crop region is empty after removing the border")]
    EmptyRegion,

    #[error("crop of {width}x{height} pixels exceeds the {max} pixel limit per side")]
    CropTooLarge { width: u64, height: u64, max: u32 },

    #[error("no panorama loaded")]
    NoPanorama,

    #[error("failed to load panorama {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failures reading or writing annotation documents
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize annotations: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
