//! Configuration persistence for panoview settings

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::projection::Interpolation;

/// Viewer configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Destination buffer size relative to the widget (0.1-1.0)
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// Narrowest field of view reachable with the wheel, in degrees
    #[serde(default = "default_zoom_min")]
    pub zoom_min: f64,
    /// Widest field of view reachable with the wheel, in degrees
    #[serde(default = "default_zoom_max")]
    pub zoom_max: f64,
    /// Field of view when a panorama is opened, in degrees
    #[serde(default = "default_zoom_default")]
    pub zoom_default: f64,
    /// Row bands rendered concurrently by the projection kernel
    #[serde(default = "default_threads")]
    pub threads: usize,
    /// Side of the sight square before scaling, in pixels
    #[serde(default = "default_sight_width")]
    pub sight_width: f64,
    /// Distance from the bottom-right corner that starts a resize, in pixels
    #[serde(default = "default_resize_handle_margin")]
    pub resize_handle_margin: f64,
    /// Smallest width and height of a drawn annotation, in pixels
    #[serde(default = "default_min_annotation_size")]
    pub min_annotation_size: f64,
    /// Degrees of zoom per wheel notch
    #[serde(default = "default_wheel_zoom_step")]
    pub wheel_zoom_step: f64,
    /// Scale factor change per wheel notch with Control held
    #[serde(default = "default_wheel_scale_step")]
    pub wheel_scale_step: f64,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Pixelation block size for blurred annotations in previews
    #[serde(default = "default_pixelation_block_size")]
    pub pixelation_block_size: u32,
    /// Border trimmed from new annotations when cropping, in pixels
    #[serde(default)]
    pub default_border_width: f64,
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_zoom_min() -> f64 {
    20.0
}

fn default_zoom_max() -> f64 {
    120.0
}

fn default_zoom_default() -> f64 {
    100.0
}

fn default_threads() -> usize {
    1
}

fn default_sight_width() -> f64 {
    800.0
}

fn default_resize_handle_margin() -> f64 {
    8.0
}

fn default_min_annotation_size() -> f64 {
    4.0
}

fn default_wheel_zoom_step() -> f64 {
    1.5
}

fn default_wheel_scale_step() -> f64 {
    0.02
}

fn default_pixelation_block_size() -> u32 {
    16
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            zoom_min: default_zoom_min(),
            zoom_max: default_zoom_max(),
            zoom_default: default_zoom_default(),
            threads: default_threads(),
            sight_width: default_sight_width(),
            resize_handle_margin: default_resize_handle_margin(),
            min_annotation_size: default_min_annotation_size(),
            wheel_zoom_step: default_wheel_zoom_step(),
            wheel_scale_step: default_wheel_scale_step(),
            interpolation: Interpolation::default(),
            pixelation_block_size: default_pixelation_block_size(),
            default_border_width: 0.0,
        }
    }
}

impl ViewerConfig {
    /// Directory name under the user configuration directory
    pub const APP_DIR: &'static str = "panoview";
    const FILE_NAME: &'static str = "config.json";

    /// Default location of the configuration file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No configuration directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Could not read config {}, using defaults: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config {}, using defaults: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> io::Result<()> {
        let path = Self::path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no configuration directory"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, text)?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }
}
