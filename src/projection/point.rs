//! Single-point counterparts of the pixel kernel
//!
//! These use the same [`Camera`] and [`Equirect`] model as
//! [`super::kernel::project`], so a reprojected annotation quad bounds the
//! same content as the rendered image. Straight lines in one rectilinear
//! frame stay straight in another, which is why mapping the four corners is
//! enough to carry a quad between frames.

use crate::domain::{Point, ProjectionParams};
use crate::error::ViewerError;

use super::camera::{Camera, Equirect};

/// Where a point lands in a destination frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointClass {
    /// In front of the camera and inside the frame
    Visible(Point),
    /// In front of the camera but outside the frame
    OutOfBounds(Point),
    /// On the far hemisphere, or the frame cannot be projected at all
    Behind,
}

impl PointClass {
    pub fn is_visible(&self) -> bool {
        matches!(self, PointClass::Visible(_))
    }

    pub fn point(&self) -> Option<Point> {
        match self {
            PointClass::Visible(p) | PointClass::OutOfBounds(p) => Some(*p),
            PointClass::Behind => None,
        }
    }
}

/// Map a destination point of `frame` to source panorama pixel coordinates
pub fn map_point(
    point: Point,
    frame: &ProjectionParams,
    src_width: u32,
    src_height: u32,
) -> Result<Point, ViewerError> {
    let pano = Equirect::new(src_width, src_height)?;
    let camera = Camera::new(frame)?;
    Ok(pano.direction_to_pixel(&camera.ray(point)))
}

/// Map a source panorama pixel into `frame`
pub fn unmap_point(
    point: Point,
    src_width: u32,
    src_height: u32,
    frame: &ProjectionParams,
) -> Result<PointClass, ViewerError> {
    let pano = Equirect::new(src_width, src_height)?;
    let camera = Camera::new(frame)?;
    Ok(classify(&camera, &pano.pixel_to_direction(point), frame))
}

/// Carry a point from one destination frame into another
pub fn reproject_point(from: &ProjectionParams, point: Point, to: &ProjectionParams) -> PointClass {
    let (Ok(source), Ok(target)) = (Camera::new(from), Camera::new(to)) else {
        return PointClass::Behind;
    };
    classify(&target, &source.ray(point), to)
}

fn classify(camera: &Camera, dir: &nalgebra::Vector3<f64>, frame: &ProjectionParams) -> PointClass {
    let Some(p) = camera.project(dir) else {
        return PointClass::Behind;
    };
    let in_bounds = p.x >= 0.0
        && p.x <= frame.width as f64
        && p.y >= 0.0
        && p.y <= frame.height as f64;
    if in_bounds {
        PointClass::Visible(p)
    } else {
        PointClass::OutOfBounds(p)
    }
}
