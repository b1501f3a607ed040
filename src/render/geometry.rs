//! Shared geometry and styling for overlay rendering
//!
//! This module contains the constants and pixel math used when
//! annotations are drawn over a rendered view.

use crate::domain::{Annotation, AutomaticStatus, ManualStatus, ObjectType, Point};

/// Stroke constants
pub mod stroke {
    /// Annotation outline thickness in destination pixels
    pub const THICKNESS: f32 = 2.0;
    /// Dark outline drawn under each annotation stroke
    pub const SHADOW_THICKNESS: f32 = 4.0;
    pub const SIGHT_THICKNESS: f32 = 1.0;
}

/// Overlay colours (RGBA)
pub mod palette {
    pub const FACE: [u8; 4] = [0, 200, 80, 255];
    pub const NUMBER_PLATE: [u8; 4] = [40, 120, 255, 255];
    pub const TO_BLUR: [u8; 4] = [255, 170, 0, 255];
    pub const UNCLASSIFIED: [u8; 4] = [255, 255, 255, 255];
    /// Rejected by the pipeline or by a reviewer
    pub const INVALID: [u8; 4] = [128, 128, 128, 255];
    pub const SIGHT: [u8; 4] = [255, 0, 0, 255];
    pub const SHADOW: [u8; 4] = [0, 0, 0, 200];
}

/// Stroke colour of an annotation: grey when rejected, otherwise by type
pub fn annotation_color(annotation: &Annotation) -> [u8; 4] {
    let rejected = match annotation.manual_status {
        ManualStatus::Invalid => true,
        ManualStatus::Valid => false,
        ManualStatus::None => matches!(annotation.auto_status, AutomaticStatus::Invalid(_)),
    };
    if rejected {
        return palette::INVALID;
    }
    match annotation.object_type {
        ObjectType::Face => palette::FACE,
        ObjectType::NumberPlate => palette::NUMBER_PLATE,
        ObjectType::ToBlur => palette::TO_BLUR,
        ObjectType::None => palette::UNCLASSIFIED,
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

/// Inclusive pixel bounds `(min_x, min_y, max_x, max_y)` covered by a quad,
/// clipped to an image of `width` x `height`
pub fn pixel_bounds(points: &[Point; 4], width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    if width == 0 || height == 0 {
        return None;
    }
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        normalize_rect(points[0].x as f32, points[0].y as f32, points[2].x as f32, points[2].y as f32);
    for p in points {
        min_x = min_x.min(p.x as f32);
        min_y = min_y.min(p.y as f32);
        max_x = max_x.max(p.x as f32);
        max_y = max_y.max(p.y as f32);
    }

    if max_x < 0.0 || max_y < 0.0 || min_x >= width as f32 || min_y >= height as f32 {
        return None;
    }
    let min_x = min_x.floor().max(0.0) as u32;
    let min_y = min_y.floor().max(0.0) as u32;
    let max_x = (max_x.ceil() as u32).saturating_sub(1).min(width - 1);
    let max_y = (max_y.ceil() as u32).saturating_sub(1).min(height - 1);
    if max_x < min_x || max_y < min_y {
        return None;
    }
    Some((min_x, min_y, max_x, max_y))
}
