// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quad-to-rectangle dewarp by inverse mapping.

use galleria_core::error::{GalleriaError, Result};
use image::{Rgba, RgbaImage};
use tracing::{debug, instrument};

use super::geometry::Quad;
use super::homography::Homography;
use super::resample::sample_bilinear;

/// Written wherever the inverse-mapped coordinate leaves the source.
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Largest side a JPEG can carry.
pub const MAX_OUTPUT_SIDE: u32 = 65_535;

/// Largest raster the rasterizer will allocate (256 MiB of RGBA).
pub const MAX_OUTPUT_PIXELS: u64 = 64 * 1024 * 1024;

/// Size of the rectangle a quad is straightened into.
///
/// Width is the mean of the top and bottom edge lengths, height the mean of
/// the left and right edge lengths, each rounded and floored at
/// `min_dimension`.
pub fn output_size(quad: &Quad, min_dimension: u32) -> (u32, u32) {
    let width = (quad.top_length() + quad.bottom_length()) / 2.0;
    let height = (quad.left_length() + quad.right_length()) / 2.0;
    (
        round_dimension(width, min_dimension),
        round_dimension(height, min_dimension),
    )
}

fn round_dimension(length: f64, min_dimension: u32) -> u32 {
    let rounded = length.round();
    if rounded.is_finite() && rounded > f64::from(min_dimension) {
        // Saturates at u32::MAX; `check_output_size` rejects it.
        rounded as u32
    } else {
        min_dimension
    }
}

/// Reject output sizes no encoder accepts before anything is allocated.
fn check_output_size(width: u32, height: u32) -> Result<()> {
    let pixels = u64::from(width).checked_mul(u64::from(height));
    let fits = width <= MAX_OUTPUT_SIDE
        && height <= MAX_OUTPUT_SIDE
        && pixels.is_some_and(|p| p <= MAX_OUTPUT_PIXELS);
    if fits {
        Ok(())
    } else {
        Err(GalleriaError::Encode(format!(
            "unsupported output size {width}x{height}"
        )))
    }
}

/// Straighten the region of `source` bounded by `quad` into a new raster.
///
/// The destination rectangle is `(0,0) (W,0) (W,H) (0,H)` with `W x H` from
/// [`output_size`]. Every destination pixel is inverse-mapped into the
/// source; pixels landing outside `[0, w-1) x [0, h-1)` are transparent. The
/// source is never modified.
///
/// Fails with [`GalleriaError::DegenerateGeometry`] for a degenerate quad and
/// with [`GalleriaError::Encode`] when `W x H` exceeds [`MAX_OUTPUT_SIDE`] or
/// [`MAX_OUTPUT_PIXELS`].
#[instrument(skip(source), fields(src_w = source.width(), src_h = source.height()))]
pub fn dewarp(source: &RgbaImage, quad: &Quad, min_dimension: u32) -> Result<RgbaImage> {
    let (width, height) = output_size(quad, min_dimension);
    let target = Quad::rectangle(f64::from(width), f64::from(height));
    let homography = Homography::from_quads(quad, &target)?;
    check_output_size(width, height)?;
    debug!(width, height, "dewarping");

    let max_x = f64::from(source.width()) - 1.0;
    let max_y = f64::from(source.height()) - 1.0;

    let output = RgbaImage::from_fn(width, height, |x, y| {
        let (sx, sy) = homography.map_inverse(f64::from(x), f64::from(y));
        // Written so that NaN coordinates also fall through to transparent.
        if sx >= 0.0 && sy >= 0.0 && sx < max_x && sy < max_y {
            sample_bilinear(source, sx, sy)
        } else {
            TRANSPARENT
        }
    });

    Ok(output)
}
