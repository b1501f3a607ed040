//! Export crops of annotations at source resolution

use std::f64::consts::TAU;

use image::RgbaImage;

use crate::core::viewer::PanoramaViewer;
use crate::domain::{Annotation, Point, ProjectionParams, Rect};
use crate::error::ViewerError;
use crate::projection::camera::Camera;
use crate::projection::{Window, project_region, reproject_point};

impl PanoramaViewer {
    /// Crop the content of an annotation straight from the panorama.
    ///
    /// The crop is rendered at the annotation's stored frame, independent of
    /// the live view. The frame is enlarged until one destination pixel
    /// covers no more than one source pixel, and only the annotation's
    /// bounding box (less its border) is rendered.
    pub fn crop_object(&self, annotation: &Annotation) -> Result<RgbaImage, ViewerError> {
        let panorama = self.panorama.as_ref().ok_or(ViewerError::NoPanorama)?;
        let params = *annotation.params();
        if params.width == 0 || params.height == 0 {
            return Err(ViewerError::EmptyRegion);
        }

        let camera = Camera::new(&params)?;
        let pixels_per_radian = panorama.width() as f64 / TAU;
        let factor = (pixels_per_radian / camera.focal()).max(1.0);
        let frame_width = (params.width as f64 * factor).round();
        let frame_height = (params.height as f64 * factor).round();
        if frame_width > u32::MAX as f64 || frame_height > u32::MAX as f64 {
            return Err(ViewerError::CropTooLarge {
                width: frame_width as u64,
                height: frame_height as u64,
                max: MAX_CROP_SIDE,
            });
        }
        let frame = params.with_size(frame_width as u32, frame_height as u32);

        let window = crop_window(annotation, &params, &frame, factor).ok_or(ViewerError::EmptyRegion)?;
        if window.width > MAX_CROP_SIDE || window.height > MAX_CROP_SIDE {
            return Err(ViewerError::CropTooLarge {
                width: window.width as u64,
                height: window.height as u64,
                max: MAX_CROP_SIDE,
            });
        }
        log::debug!(
            "Cropping annotation {} at {}x{}: {}x{} window",
            annotation.id,
            frame.width,
            frame.height,
            window.width,
            window.height
        );
        project_region(
            &panorama.rgba,
            &frame,
            window,
            self.config.interpolation,
            self.config.threads,
        )
    }
}

const SNAP: f64 = 1e-6;

/// Largest crop side rendered, in pixels
pub const MAX_CROP_SIDE: u32 = 16384;

/// Pixel window of the annotation's bounding box inside the enlarged frame
fn crop_window(
    annotation: &Annotation,
    params: &ProjectionParams,
    frame: &ProjectionParams,
    factor: f64,
) -> Option<Window> {
    let corners: Vec<Point> = annotation
        .proj_points()
        .iter()
        .filter_map(|p| reproject_point(params, *p, frame).point())
        .collect();
    if corners.len() != 4 {
        return None;
    }

    let bounds = Rect::new(0.0, 0.0, frame.width as f64, frame.height as f64);
    let rect = Rect::bounding(&corners)?
        .inset(annotation.border_width * factor)
        .intersect(bounds)?;

    // Reprojection noise must not widen a box that sits on whole pixels
    let left = (rect.left + SNAP).floor() as u32;
    let top = (rect.top + SNAP).floor() as u32;
    let right = ((rect.right - SNAP).ceil() as u32).min(frame.width);
    let bottom = ((rect.bottom - SNAP).ceil() as u32).min(frame.height);
    if right <= left || bottom <= top {
        return None;
    }
    Some(Window {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    })
}
