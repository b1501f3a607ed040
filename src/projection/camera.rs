//! Virtual camera and equirectangular pixel model
//!
//! World frame: x points at longitude 0 on the equator, y at longitude +90°,
//! z at the north pole. The camera looks along `forward`; screen-right is the
//! direction of increasing longitude and screen-down is decreasing latitude,
//! so a rendered view is never mirrored relative to the panorama.

use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use crate::domain::{Point, ProjectionParams};
use crate::error::ViewerError;

/// Rays whose depth along the view axis is below this are treated as behind
pub const MIN_DEPTH: f64 = 1e-9;

/// Rectilinear (gnomonic) camera for one projection frame
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    forward: Vector3<f64>,
    right: Vector3<f64>,
    up: Vector3<f64>,
    focal: f64,
    center_x: f64,
    center_y: f64,
}

impl Camera {
    /// Build the camera for a frame; the aperture is the horizontal field of view
    pub fn new(frame: &ProjectionParams) -> Result<Self, ViewerError> {
        if !(frame.aperture > 0.0 && frame.aperture < PI) {
            return Err(ViewerError::InvalidAperture(frame.aperture));
        }

        let (sa, ca) = frame.azimuth.sin_cos();
        let (se, ce) = frame.elevation.sin_cos();

        let half_width = frame.width as f64 / 2.0;
        Ok(Self {
            forward: Vector3::new(ce * ca, ce * sa, se),
            right: Vector3::new(-sa, ca, 0.0),
            up: Vector3::new(-se * ca, -se * sa, ce),
            focal: half_width / (frame.aperture / 2.0).tan(),
            center_x: half_width,
            center_y: frame.height as f64 / 2.0,
        })
    }

    /// Focal length in destination pixels
    pub fn focal(&self) -> f64 {
        self.focal
    }

    /// Unnormalized ray through a destination point (forward component is 1)
    #[inline]
    pub fn ray(&self, p: Point) -> Vector3<f64> {
        let x = (p.x - self.center_x) / self.focal;
        let y = (p.y - self.center_y) / self.focal;
        self.forward + self.right * x - self.up * y
    }

    /// Destination point hit by a direction, `None` when it points behind
    #[inline]
    pub fn project(&self, dir: &Vector3<f64>) -> Option<Point> {
        let depth = dir.dot(&self.forward);
        if depth < MIN_DEPTH {
            return None;
        }
        let x = dir.dot(&self.right) / depth;
        let y = -dir.dot(&self.up) / depth;
        Some(Point::new(
            self.center_x + x * self.focal,
            self.center_y + y * self.focal,
        ))
    }
}

/// Pixel geometry of an equirectangular panorama
#[derive(Clone, Copy, Debug)]
pub struct Equirect {
    width: f64,
    height: f64,
}

impl Equirect {
    pub fn new(width: u32, height: u32) -> Result<Self, ViewerError> {
        if width == 0 || height == 0 {
            return Err(ViewerError::InvalidSource { width, height });
        }
        Ok(Self {
            width: width as f64,
            height: height as f64,
        })
    }

    /// Source pixel coordinates for a longitude/latitude pair, x in `[0, width)`
    #[inline]
    pub fn lonlat_to_pixel(&self, lon: f64, lat: f64) -> Point {
        let x = (lon / TAU + 0.5) * self.width;
        let y = (0.5 - lat / PI) * self.height;
        Point::new(x.rem_euclid(self.width), y)
    }

    #[inline]
    pub fn direction_to_pixel(&self, dir: &Vector3<f64>) -> Point {
        let lon = dir.y.atan2(dir.x);
        let lat = (dir.z / dir.norm()).clamp(-1.0, 1.0).asin();
        self.lonlat_to_pixel(lon, lat)
    }

    /// Unit direction through a source pixel coordinate
    pub fn pixel_to_direction(&self, p: Point) -> Vector3<f64> {
        let lon = (p.x / self.width - 0.5) * TAU;
        let lat = (0.5 - p.y / self.height) * PI;
        let (sl, cl) = lat.sin_cos();
        let (so, co) = lon.sin_cos();
        Vector3::new(cl * co, cl * so, sl)
    }
}
