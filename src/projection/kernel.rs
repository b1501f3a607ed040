//! Equirectangular to rectilinear pixel remapping
//!
//! Every destination pixel is traced back to the panorama: pixel centre to
//! camera ray, ray to longitude/latitude, then a sample of the source.
//! Longitude wraps around the seam and latitude clamps at the poles.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::domain::{Point, ProjectionParams};
use crate::error::ViewerError;

use super::camera::{Camera, Equirect};

const CHANNELS: usize = 4;

/// Source sampling method
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Interpolation {
    Nearest,
    #[default]
    Bilinear,
}

/// Window of a destination frame, in whole pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Window {
    pub fn full(frame: &ProjectionParams) -> Self {
        Self {
            x: 0,
            y: 0,
            width: frame.width,
            height: frame.height,
        }
    }
}

/// Render the whole of `frame` from `src`
///
/// `workers` is the number of row bands processed concurrently; with one
/// worker the pass runs on the calling thread.
pub fn project(
    src: &RgbaImage,
    frame: &ProjectionParams,
    interpolation: Interpolation,
    workers: usize,
) -> Result<RgbaImage, ViewerError> {
    project_region(src, frame, Window::full(frame), interpolation, workers)
}

/// Render only `window` of `frame`; the output has the window's size
pub fn project_region(
    src: &RgbaImage,
    frame: &ProjectionParams,
    window: Window,
    interpolation: Interpolation,
    workers: usize,
) -> Result<RgbaImage, ViewerError> {
    let pano = Equirect::new(src.width(), src.height())?;
    let camera = Camera::new(frame)?;

    let row_len = window.width as usize * CHANNELS;
    let mut buffer = vec![0u8; row_len * window.height as usize];
    if buffer.is_empty() {
        return Ok(RgbaImage::new(window.width, window.height));
    }

    let sampler = Sampler {
        src,
        pano,
        camera,
        window,
        interpolation,
    };

    let workers = workers.max(1);
    if workers == 1 {
        sampler.fill_rows(&mut buffer, 0);
    } else {
        let band_rows = (window.height as usize).div_ceil(workers);
        buffer
            .par_chunks_mut(band_rows * row_len)
            .enumerate()
            .for_each(|(band, rows)| sampler.fill_rows(rows, band * band_rows));
    }

    RgbaImage::from_raw(window.width, window.height, buffer).ok_or(ViewerError::InvalidSource {
        width: window.width,
        height: window.height,
    })
}

/// Read-only state shared by every row band
struct Sampler<'a> {
    src: &'a RgbaImage,
    pano: Equirect,
    camera: Camera,
    window: Window,
    interpolation: Interpolation,
}

impl Sampler<'_> {
    fn fill_rows(&self, rows: &mut [u8], first_row: usize) {
        let row_len = self.window.width as usize * CHANNELS;
        for (i, row) in rows.chunks_exact_mut(row_len).enumerate() {
            let y = (self.window.y as usize + first_row + i) as f64 + 0.5;
            for (j, px) in row.chunks_exact_mut(CHANNELS).enumerate() {
                let x = (self.window.x as usize + j) as f64 + 0.5;
                let dir = self.camera.ray(Point::new(x, y));
                let s = self.pano.direction_to_pixel(&dir);
                let color = match self.interpolation {
                    Interpolation::Nearest => sample_nearest(self.src, s.x, s.y),
                    Interpolation::Bilinear => sample_bilinear(self.src, s.x, s.y),
                };
                px.copy_from_slice(&color.0);
            }
        }
    }
}

fn sample_nearest(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let xi = (x.floor() as i64).rem_euclid(w);
    let yi = (y.floor() as i64).clamp(0, h - 1);
    *src.get_pixel(xi as u32, yi as u32)
}

/// Bilinear sample at continuous pixel coordinates (pixel centres at +0.5)
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = (src.width() as i64, src.height() as i64);
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let x0 = x0 as i64;
    let y0 = y0 as i64;
    let xa = x0.rem_euclid(w) as u32;
    let xb = (x0 + 1).rem_euclid(w) as u32;
    let ya = y0.clamp(0, h - 1) as u32;
    let yb = (y0 + 1).clamp(0, h - 1) as u32;

    let p00 = src.get_pixel(xa, ya).0;
    let p10 = src.get_pixel(xb, ya).0;
    let p01 = src.get_pixel(xa, yb).0;
    let p11 = src.get_pixel(xb, yb).0;

    let mut out = [0u8; CHANNELS];
    for c in 0..CHANNELS {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deg_to_rad;

    /// Panorama whose red channel encodes the column band and green the row band
    fn banded_panorama(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 8 / width * 32) as u8, (y * 4 / height * 64) as u8, 7, 255])
        })
    }

    fn frame(az_deg: f64, el_deg: f64) -> ProjectionParams {
        ProjectionParams::new(deg_to_rad(az_deg), deg_to_rad(el_deg), deg_to_rad(60.0), 64, 48)
    }

    #[test]
    fn test_output_has_frame_size() {
        let src = banded_panorama(360, 180);
        let out = project(&src, &frame(0.0, 0.0), Interpolation::Bilinear, 1).unwrap();
        assert_eq!(out.dimensions(), (64, 48));
    }

    #[test]
    fn test_uniform_source_renders_uniform_view() {
        let src = RgbaImage::from_pixel(100, 50, Rgba([10, 20, 30, 255]));
        let out = project(&src, &frame(123.0, 70.0), Interpolation::Bilinear, 1).unwrap();
        assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_view_center_samples_look_direction() {
        let src = banded_panorama(800, 400);
        // Azimuth -112.5° is the middle of column band 1, elevation +30° is row band 1
        let out = project(&src, &frame(-112.5, 30.0), Interpolation::Nearest, 1).unwrap();
        let center = out.get_pixel(32, 24);
        assert_eq!(center.0[0], 32);
        assert_eq!(center.0[1], 64);
    }

    #[test]
    fn test_worker_count_does_not_change_output() {
        let src = banded_panorama(720, 360);
        let f = frame(170.0, -20.0);
        let single = project(&src, &f, Interpolation::Bilinear, 1).unwrap();
        for workers in [2, 3, 7, 64, 100] {
            let banded = project(&src, &f, Interpolation::Bilinear, workers).unwrap();
            assert_eq!(single, banded, "workers={workers}");
        }
    }

    #[test]
    fn test_region_matches_full_frame() {
        let src = banded_panorama(720, 360);
        let f = frame(30.0, 10.0);
        let full = project(&src, &f, Interpolation::Bilinear, 1).unwrap();
        let window = Window {
            x: 10,
            y: 5,
            width: 20,
            height: 30,
        };
        let part = project_region(&src, &f, window, Interpolation::Bilinear, 2).unwrap();
        for (x, y, px) in part.enumerate_pixels() {
            assert_eq!(px, full.get_pixel(x + 10, y + 5));
        }
    }

    #[test]
    fn test_zero_sized_source_fails_fast() {
        let src = RgbaImage::new(0, 0);
        let err = project(&src, &frame(0.0, 0.0), Interpolation::Bilinear, 4).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidSource { width: 0, height: 0 }));
    }

    #[test]
    fn test_empty_destination_is_allowed() {
        let src = banded_panorama(36, 18);
        let out = project(&src, &frame(0.0, 0.0).with_size(0, 10), Interpolation::Bilinear, 2).unwrap();
        assert_eq!(out.dimensions(), (0, 10));
    }
}
