//! Virtual camera view state and angle helpers
//!
//! Angles are radians everywhere except the user-facing zoom value
//! (`aperture_delta`) and the pan arithmetic, which work in degrees.

use std::f64::consts::PI;

/// Degrees in one full turn
pub const FULL_TURN_DEG: f64 = 360.0;

/// Azimuth range accepted before wrapping, in degrees
pub const AZIMUTH_RANGE_DEG: (f64, f64) = (-360.0, 360.0);

/// Elevation range, in degrees
pub const ELEVATION_RANGE_DEG: (f64, f64) = (-90.0, 90.0);

#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

#[inline]
pub fn rad_to_deg(rad: f64) -> f64 {
    rad / (PI / 180.0)
}

/// Wrap `value` back into `[min, max]` by whole turns
pub fn wrap_angle(value: f64, min: f64, max: f64, full_turn: f64) -> f64 {
    if value > max {
        value - full_turn * ((value - max) / full_turn).ceil()
    } else if value < min {
        value + full_turn * ((min - value) / full_turn).ceil()
    } else {
        value
    }
}

/// Azimuth wraps: 370° in [-360°, 360°] becomes 10°
pub fn clamp_azimuth(deg: f64, min: f64, max: f64) -> f64 {
    wrap_angle(deg, min, max, FULL_TURN_DEG)
}

/// Elevation is a hard clamp: the camera cannot look past a pole
pub fn clamp_elevation(deg: f64) -> f64 {
    deg.clamp(ELEVATION_RANGE_DEG.0, ELEVATION_RANGE_DEG.1)
}

/// Same as [`clamp_azimuth`] over the default range, for radians.
/// Values already in range are returned bit-for-bit unchanged.
pub fn wrap_azimuth_rad(rad: f64) -> f64 {
    let bound = deg_to_rad(AZIMUTH_RANGE_DEG.1);
    wrap_angle(rad, -bound, bound, 2.0 * PI)
}

/// Radian counterpart of [`clamp_elevation`]
pub fn clamp_elevation_rad(rad: f64) -> f64 {
    rad.clamp(-PI / 2.0, PI / 2.0)
}

/// A projection frame: camera orientation, field of view and output size.
///
/// Annotations keep the frame they were drawn in so they can be mapped
/// into whatever frame is displayed later.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectionParams {
    pub azimuth: f64,
    pub elevation: f64,
    pub aperture: f64,
    pub width: u32,
    pub height: u32,
}

impl ProjectionParams {
    pub fn new(azimuth: f64, elevation: f64, aperture: f64, width: u32, height: u32) -> Self {
        Self {
            azimuth,
            elevation,
            aperture,
            width,
            height,
        }
    }

    /// Exact orientation and zoom match; output size is not compared
    pub fn same_view(&self, other: &ProjectionParams) -> bool {
        self.azimuth == other.azimuth
            && self.elevation == other.elevation
            && self.aperture == other.aperture
    }

    /// The same view rendered at another output size
    pub fn with_size(self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self
        }
    }
}

/// Camera state of one open panorama
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    azimuth: f64,
    elevation: f64,
    aperture: f64,
    aperture_delta: f64,
    scale_factor: f64,
    widget_width: u32,
    widget_height: u32,
    old_azimuth: f64,
    old_elevation: f64,
    old_aperture: f64,
    old_width: u32,
    old_height: u32,
}

impl ViewState {
    pub const SCALE_RANGE: (f64, f64) = (0.1, 1.0);

    pub fn new(zoom_deg: f64, scale_factor: f64) -> Self {
        let aperture = deg_to_rad(zoom_deg);
        Self {
            azimuth: 0.0,
            elevation: 0.0,
            aperture,
            aperture_delta: zoom_deg,
            scale_factor: scale_factor.clamp(Self::SCALE_RANGE.0, Self::SCALE_RANGE.1),
            widget_width: 0,
            widget_height: 0,
            old_azimuth: 0.0,
            old_elevation: 0.0,
            old_aperture: aperture,
            old_width: 0,
            old_height: 0,
        }
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Field of view in radians
    pub fn aperture(&self) -> f64 {
        self.aperture
    }

    /// Field of view in degrees
    pub fn aperture_delta(&self) -> f64 {
        self.aperture_delta
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn widget_size(&self) -> (u32, u32) {
        (self.widget_width, self.widget_height)
    }

    /// Destination buffer size: widget size times scale factor, truncated
    pub fn dest_size(&self) -> (u32, u32) {
        (
            (self.widget_width as f64 * self.scale_factor) as u32,
            (self.widget_height as f64 * self.scale_factor) as u32,
        )
    }

    pub fn old_orientation(&self) -> (f64, f64, f64) {
        (self.old_azimuth, self.old_elevation, self.old_aperture)
    }

    /// Destination size of the previously rendered frame
    pub fn old_size(&self) -> (u32, u32) {
        (self.old_width, self.old_height)
    }

    /// Set orientation in radians, wrapping azimuth and clamping elevation
    pub fn set_orientation(&mut self, azimuth: f64, elevation: f64) {
        self.azimuth = wrap_azimuth_rad(azimuth);
        self.elevation = clamp_elevation_rad(elevation);
    }

    /// Set the zoom in degrees; keeps `aperture == aperture_delta * π/180`
    pub fn set_aperture_delta(&mut self, zoom_deg: f64) {
        self.aperture_delta = zoom_deg;
        self.aperture = deg_to_rad(zoom_deg);
    }

    /// Set the zoom from radians, used when snapping to a stored frame
    pub fn set_aperture(&mut self, aperture: f64) {
        self.aperture = aperture;
        self.aperture_delta = rad_to_deg(aperture);
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        self.scale_factor = scale_factor.clamp(Self::SCALE_RANGE.0, Self::SCALE_RANGE.1);
    }

    pub fn set_widget_size(&mut self, width: u32, height: u32) {
        self.widget_width = width;
        self.widget_height = height;
    }

    pub(crate) fn set_old_size(&mut self, width: u32, height: u32) {
        self.old_width = width;
        self.old_height = height;
    }

    /// Snapshot the current orientation into the `old_*` fields
    pub fn backup(&mut self) {
        self.old_azimuth = self.azimuth;
        self.old_elevation = self.elevation;
        self.old_aperture = self.aperture;
    }

    /// True when the orientation changed since the last backup
    pub fn moved_since_backup(&self) -> bool {
        self.azimuth != self.old_azimuth
            || self.elevation != self.old_elevation
            || self.aperture != self.old_aperture
    }

    /// The frame currently displayed
    pub fn frame(&self) -> ProjectionParams {
        let (width, height) = self.dest_size();
        ProjectionParams::new(self.azimuth, self.elevation, self.aperture, width, height)
    }
}
