// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image handling for Galleria artwork uploads.
//
// Provides the perspective-correction core (homography, bilinear resampling,
// quad-to-rectangle dewarp, corner editor, export) and an image processor for
// decoding uploads, downscaling previews and re-encoding to JPEG.

pub mod correct;
pub mod image;

// Re-export the primary items so callers can use `galleria_imaging::CornerEditor` etc.
pub use crate::correct::{CornerEditor, ExportRequest, Homography, Point, Quad};
pub use crate::image::processor::{ImageProcessor, reencode_to_jpeg};
