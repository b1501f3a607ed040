//! Visibility of annotations and the sight rectangle
//!
//! This module contains:
//! - The per-render visibility test of an annotation's stored corners
//! - The sight: the centred square outside which no geometry can be edited

use crate::domain::{Annotation, Point, ProjectionParams, Rect};
use crate::projection::reproject_point;

/// True when all four stored corners land inside `frame`, in front of the camera.
///
/// A quad with one corner past the viewport edge or on the far hemisphere
/// cannot be drawn as a flat shape, so it is hidden as a whole.
pub fn is_visible(annotation: &Annotation, frame: &ProjectionParams) -> bool {
    annotation
        .proj_points()
        .iter()
        .all(|p| reproject_point(annotation.params(), *p, frame).is_visible())
}

/// Guide square at the centre of the destination buffer
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Sight {
    rect: Rect,
}

impl Sight {
    /// Sight for a destination buffer; the base size shrinks as the aperture widens
    pub fn new(dest_width: u32, dest_height: u32, base_size: f64, scale_factor: f64, aperture: f64) -> Self {
        let size = base_size * (scale_factor / aperture);
        let left = (dest_width / 2) as f64 - size / 2.0;
        let top = (dest_height / 2) as f64 - size / 2.0;
        Self {
            rect: Rect::from_xywh(left, top, size, size),
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Half-open containment test of `p` shifted by `tolerance`
    pub fn contains(&self, p: Point, tolerance: f64) -> bool {
        let x = p.x + tolerance;
        let y = p.y + tolerance;
        x >= self.rect.left && x < self.rect.right && y >= self.rect.top && y < self.rect.bottom
    }

    pub fn contains_quad(&self, quad: &[Point; 4]) -> bool {
        quad.iter().all(|p| self.contains(*p, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{deg_to_rad, rigid_quad};

    fn frame(az_deg: f64) -> ProjectionParams {
        ProjectionParams::new(deg_to_rad(az_deg), 0.0, deg_to_rad(90.0), 1000, 800)
    }

    fn centred_annotation() -> Annotation {
        Annotation::new(
            rigid_quad(Point::new(450.0, 350.0), Point::new(550.0, 450.0)),
            frame(0.0),
        )
    }

    #[test]
    fn test_visible_in_own_frame() {
        assert!(is_visible(&centred_annotation(), &frame(0.0)));
        assert!(is_visible(&centred_annotation(), &frame(20.0)));
    }

    #[test]
    fn test_one_corner_out_of_bounds_hides_quad() {
        // The right edge sits just inside the frame, the left one just outside
        let ann = Annotation::new(
            rigid_quad(Point::new(-5.0, 350.0), Point::new(100.0, 450.0)),
            frame(0.0),
        );
        assert!(!is_visible(&ann, &frame(0.0)));
    }

    #[test]
    fn test_far_hemisphere_hides_quad() {
        assert!(!is_visible(&centred_annotation(), &frame(180.0)));
        // Turned far enough that the quad leaves the right edge
        assert!(!is_visible(&centred_annotation(), &frame(-50.0)));
    }

    #[test]
    fn test_sight_geometry() {
        // 800 px scaled by 1 / (π/2) rad is about 509 px
        let sight = Sight::new(1001, 801, 800.0, 1.0, std::f64::consts::FRAC_PI_2);
        let rect = sight.rect();
        let size = 800.0 / std::f64::consts::FRAC_PI_2;
        assert!((rect.width() - size).abs() < 1e-9);
        assert!((rect.left - (500.0 - size / 2.0)).abs() < 1e-9);
        assert!((rect.top - (400.0 - size / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sight_is_half_open() {
        let sight = Sight {
            rect: Rect::from_xywh(10.0, 10.0, 100.0, 100.0),
        };
        assert!(sight.contains(Point::new(10.0, 10.0), 0.0));
        assert!(!sight.contains(Point::new(110.0, 50.0), 0.0));
        assert!(!sight.contains(Point::new(50.0, 110.0), 0.0));
        assert!(sight.contains(Point::new(9.0, 9.0), 1.0));
    }

    #[test]
    fn test_quad_in_sight_needs_every_corner() {
        let sight = Sight {
            rect: Rect::from_xywh(0.0, 0.0, 100.0, 100.0),
        };
        assert!(sight.contains_quad(&rigid_quad(Point::new(10.0, 10.0), Point::new(90.0, 90.0))));
        assert!(!sight.contains_quad(&rigid_quad(Point::new(10.0, 10.0), Point::new(100.0, 90.0))));
    }
}
