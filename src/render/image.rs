//! Overlay rendering using tiny-skia
//!
//! These functions draw annotations and the sight onto a rendered view,
//! producing the preview image written by the command-line front end.

use image::{Rgba, RgbaImage};
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

use super::geometry::{self, palette, stroke};
use crate::core::{PanoramaViewer, Sight};
use crate::domain::{Annotation, Point};

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    // Copy back
    img.copy_from_slice(pixmap.data());
}

/// Build a closed path through the four corners
fn build_quad_path(points: &[Point; 4]) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].x as f32, points[0].y as f32);
    for p in &points[1..] {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.close();
    pb.finish()
}

fn stroke_path(pixmap: &mut Pixmap, path: &tiny_skia::Path, color: [u8; 4], width: f32) {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;

    let stroke = Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, Transform::identity(), None);
}

/// Replace the area under a quad with blocks of its average colour
pub fn pixelate_quad(img: &mut RgbaImage, points: &[Point; 4], block_size: u32) {
    let Some((min_x, min_y, max_x, max_y)) = geometry::pixel_bounds(points, img.width(), img.height())
    else {
        return;
    };
    let block_size = block_size.max(1);

    let mut block_y = min_y;
    while block_y <= max_y {
        let block_end_y = (block_y + block_size - 1).min(max_y);

        let mut block_x = min_x;
        while block_x <= max_x {
            let block_end_x = (block_x + block_size - 1).min(max_x);

            // Calculate average color for this block
            let mut totals = [0u64; 4];
            let mut pixel_count: u64 = 0;
            for py in block_y..=block_end_y {
                for px in block_x..=block_end_x {
                    let pixel = img.get_pixel(px, py);
                    for (total, channel) in totals.iter_mut().zip(pixel.0) {
                        *total += channel as u64;
                    }
                    pixel_count += 1;
                }
            }

            if pixel_count > 0 {
                let avg_color = Rgba(totals.map(|t| (t / pixel_count) as u8));
                for py in block_y..=block_end_y {
                    for px in block_x..=block_end_x {
                        img.put_pixel(px, py, avg_color);
                    }
                }
            }

            block_x += block_size;
        }
        block_y += block_size;
    }
}

/// Stroke annotation quads (and their children) with a dark outline underneath
pub fn draw_annotation_outlines(img: &mut RgbaImage, annotations: &[&Annotation]) {
    if annotations.is_empty() {
        return;
    }

    with_pixmap(img, |pixmap| {
        for annotation in annotations {
            let children = annotation.children.iter().filter(|child| child.is_visible());
            let quads = std::iter::once(*annotation).chain(children);
            for quad in quads {
                let Some(path) = build_quad_path(quad.points()) else {
                    continue;
                };
                stroke_path(pixmap, &path, palette::SHADOW, stroke::SHADOW_THICKNESS);
                stroke_path(pixmap, &path, geometry::annotation_color(quad), stroke::THICKNESS);
            }
        }
    });
}

/// Outline the sight rectangle
pub fn draw_sight(img: &mut RgbaImage, sight: &Sight) {
    let rect = sight.rect();
    let (min_x, min_y, max_x, max_y) = geometry::normalize_rect(
        rect.left as f32,
        rect.top as f32,
        rect.right as f32,
        rect.bottom as f32,
    );
    with_pixmap(img, |pixmap| {
        let Some(bounds) = tiny_skia::Rect::from_ltrb(min_x, min_y, max_x, max_y) else {
            return;
        };
        let path = PathBuilder::from_rect(bounds);
        stroke_path(pixmap, &path, palette::SIGHT, stroke::SIGHT_THICKNESS);
    });
}

/// Composite visible annotations and the sight over a rendered view.
///
/// Blurred annotations are pixelated first so that outlines are drawn on top.
pub fn draw_overlay(img: &mut RgbaImage, annotations: &[Annotation], sight: Option<&Sight>, block_size: u32) {
    let visible: Vec<&Annotation> = annotations.iter().filter(|a| a.is_visible()).collect();

    for annotation in visible.iter().filter(|a| a.blurred) {
        pixelate_quad(img, annotation.points(), block_size);
    }
    draw_annotation_outlines(img, &visible);

    if let Some(sight) = sight {
        draw_sight(img, sight);
    }
}

/// The viewer's current frame with its overlay composited
pub fn compose(viewer: &PanoramaViewer, with_sight: bool) -> RgbaImage {
    let mut img = viewer.frame_image().clone();
    let sight = viewer.sight();
    draw_overlay(
        &mut img,
        viewer.annotations(),
        with_sight.then_some(&sight),
        viewer.config().pixelation_block_size,
    );
    img
}
