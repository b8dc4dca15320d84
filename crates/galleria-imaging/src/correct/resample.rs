// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bilinear sampling of an RGBA raster at fractional coordinates.

use image::{Rgba, RgbaImage};

/// Sample `raster` at `(x, y)` by blending the four nearest pixels.
///
/// The coordinate is clamped into `[0, width-1] x [0, height-1]` and
/// neighbours past the last row or column reuse the edge pixel, so no lookup
/// ever leaves the raster. Channels are rounded to the nearest integer.
/// Sampling an empty raster yields a transparent pixel.
pub fn sample_bilinear(raster: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Rgba([0, 0, 0, 0]);
    }

    let max_x = f64::from(width - 1);
    let max_y = f64::from(height - 1);
    // `clamp` passes NaN through; map it onto the origin instead.
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, max_x) };
    let y = if y.is_nan() { 0.0 } else { y.clamp(0.0, max_y) };

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let dx = x - f64::from(x0);
    let dy = y - f64::from(y0);

    let p00 = raster.get_pixel(x0, y0).0;
    let p10 = raster.get_pixel(x1, y0).0;
    let p01 = raster.get_pixel(x0, y1).0;
    let p11 = raster.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for (c, channel) in out.iter_mut().enumerate() {
        let top = f64::from(p00[c]) * (1.0 - dx) + f64::from(p10[c]) * dx;
        let bottom = f64::from(p01[c]) * (1.0 - dx) + f64::from(p11[c]) * dx;
        *channel = (top * (1.0 - dy) + bottom * dy).round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x2 raster with a distinct value in every channel of every pixel.
    fn gradient() -> RgbaImage {
        RgbaImage::from_fn(3, 2, |x, y| {
            let base = (x * 40 + y * 100) as u8;
            Rgba([base, base + 10, 255 - base, 200 + x as u8])
        })
    }

    #[test]
    fn integer_coordinates_return_exact_pixel() {
        let raster = gradient();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(
                    sample_bilinear(&raster, f64::from(x), f64::from(y)),
                    *raster.get_pixel(x, y)
                );
            }
        }
    }

    #[test]
    fn midpoint_blends_neighbours() {
        let raster = RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgba([0, 0, 0, 255]) } else { Rgba([100, 255, 1, 255]) }
        });
        assert_eq!(sample_bilinear(&raster, 0.5, 0.0), Rgba([50, 128, 1, 255]));
        assert_eq!(sample_bilinear(&raster, 0.25, 0.0), Rgba([25, 64, 0, 255]));
    }

    #[test]
    fn centre_of_four_pixels_is_their_mean() {
        let raster = RgbaImage::from_fn(2, 2, |x, y| {
            let v = [10u8, 20, 30, 40][(y * 2 + x) as usize];
            Rgba([v, v, v, v])
        });
        assert_eq!(sample_bilinear(&raster, 0.5, 0.5), Rgba([25, 25, 25, 25]));
    }

    #[test]
    fn outer_edge_reuses_edge_pixels() {
        let raster = gradient();
        // x = width-1 has no right neighbour; it must not read out of bounds.
        assert_eq!(sample_bilinear(&raster, 2.0, 0.0), *raster.get_pixel(2, 0));
        assert_eq!(sample_bilinear(&raster, 2.0, 1.0), *raster.get_pixel(2, 1));
        let between = sample_bilinear(&raster, 2.0, 0.5);
        assert_eq!(between.0[3], 202);
    }

    #[test]
    fn coordinates_outside_are_clamped() {
        let raster = gradient();
        assert_eq!(sample_bilinear(&raster, -5.0, -1.0), *raster.get_pixel(0, 0));
        assert_eq!(sample_bilinear(&raster, 99.0, 99.0), *raster.get_pixel(2, 1));
        assert_eq!(sample_bilinear(&raster, f64::NAN, 1.0), *raster.get_pixel(0, 1));
    }

    #[test]
    fn single_pixel_raster() {
        let raster = RgbaImage::from_pixel(1, 1, Rgba([1, 2, 3, 4]));
        assert_eq!(sample_bilinear(&raster, 0.7, 0.3), Rgba([1, 2, 3, 4]));
    }

    #[test]
    fn empty_raster_is_transparent() {
        let raster = RgbaImage::new(0, 0);
        assert_eq!(sample_bilinear(&raster, 0.0, 0.0), Rgba([0, 0, 0, 0]));
    }
}
