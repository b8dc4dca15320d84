// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective-correction settings.

use serde::{Deserialize, Serialize};

use crate::error::{GalleriaError, Result};

/// Settings for the correction editor and the export step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// JPEG quality on a 0–1 scale used when no quality is given.
    pub jpeg_quality: f32,
    /// Fraction of each source dimension left as margin by the default corners.
    pub inset_fraction: f64,
    /// Pointer hit radius around a corner handle, in display pixels.
    pub handle_radius_px: f64,
    /// Radius of a drawn handle in the overlay, in display pixels.
    pub handle_draw_radius_px: i32,
    /// Widest display canvas used for the editor overlay and live preview.
    pub preview_max_width: u32,
    /// Smallest width or height a corrected image may have.
    pub min_output_dimension: u32,
    /// Largest source file accepted for processing (default 20 MiB).
    pub max_upload_bytes: u64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 0.8,
            inset_fraction: 0.08,
            handle_radius_px: 20.0,
            handle_draw_radius_px: 8,
            preview_max_width: 900,
            min_output_dimension: 32,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl CorrectionConfig {
    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.jpeg_quality > 0.0 && self.jpeg_quality <= 1.0) {
            return Err(GalleriaError::Config(format!(
                "jpeg_quality must be in (0, 1], got {}",
                self.jpeg_quality
            )));
        }
        if !(0.0..0.5).contains(&self.inset_fraction) {
            return Err(GalleriaError::Config(format!(
                "inset_fraction must be in [0, 0.5), got {}",
                self.inset_fraction
            )));
        }
        if !(self.handle_radius_px.is_finite() && self.handle_radius_px > 0.0) {
            return Err(GalleriaError::Config(format!(
                "handle_radius_px must be positive, got {}",
                self.handle_radius_px
            )));
        }
        if self.handle_draw_radius_px <= 0 {
            return Err(GalleriaError::Config(format!(
                "handle_draw_radius_px must be positive, got {}",
                self.handle_draw_radius_px
            )));
        }
        if self.preview_max_width == 0 {
            return Err(GalleriaError::Config("preview_max_width must be non-zero".into()));
        }
        if self.min_output_dimension == 0 {
            return Err(GalleriaError::Config(
                "min_output_dimension must be non-zero".into(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(GalleriaError::Config("max_upload_bytes must be non-zero".into()));
        }
        Ok(())
    }
}
