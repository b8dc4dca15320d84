// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective correction: geometry, homography, bilinear resampling, the
// quad-to-rectangle dewarp, the interactive corner editor, and export.

pub mod dewarp;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod homography;
pub mod resample;

pub use dewarp::{dewarp, output_size};
pub use editor::{CornerEditor, DisplayScale, DragState};
pub use export::{ExportRequest, export};
pub use geometry::{Corner, Point, Quad};
pub use homography::Homography;
pub use resample::sample_bilinear;
