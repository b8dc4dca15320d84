// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export: full-resolution dewarp followed by JPEG encoding.

use std::sync::Arc;

use galleria_core::error::{GalleriaError, Result};
use galleria_core::types::EncodedImage;
use image::RgbaImage;
use tracing::{info, instrument, warn};

use super::dewarp::dewarp;
use super::geometry::Quad;
use crate::image::processor::{DEFAULT_JPEG_QUALITY, ImageProcessor, effective_quality};

/// Dewarp `source` inside `quad` at full resolution and encode it as JPEG.
///
/// `quality` is on a 0–1 scale; values outside it fall back to 0.8. A
/// degenerate quad fails with [`GalleriaError::DegenerateGeometry`]; every
/// other failure is reported as [`GalleriaError::Encode`].
#[instrument(skip(source), fields(src_w = source.width(), src_h = source.height()))]
pub fn export(
    source: &RgbaImage,
    quad: &Quad,
    quality: f32,
    min_dimension: u32,
) -> Result<EncodedImage> {
    if effective_quality(quality) != quality {
        warn!(quality, fallback = DEFAULT_JPEG_QUALITY, "Quality out of range; using default");
    }

    let corrected = dewarp(source, quad, min_dimension).map_err(|err| match err {
        GalleriaError::DegenerateGeometry(_) => err,
        other => GalleriaError::Encode(other.to_string()),
    })?;

    let encoded = ImageProcessor::from_rgba(corrected).to_encoded_jpeg(quality)?;
    info!(
        width = encoded.width,
        height = encoded.height,
        bytes = encoded.bytes.len(),
        "Corrected image exported"
    );
    Ok(encoded)
}

/// An export captured at one point in time.
///
/// Holds a shared, read-only handle to the source and its own copy of the
/// corners, so it can run on another thread while editing continues.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    source: Arc<RgbaImage>,
    quad: Quad,
    quality: f32,
    min_dimension: u32,
}

impl ExportRequest {
    pub fn new(source: Arc<RgbaImage>, quad: Quad, quality: f32, min_dimension: u32) -> Self {
        Self {
            source,
            quad,
            quality,
            min_dimension,
        }
    }

    pub fn quad(&self) -> Quad {
        self.quad
    }

    /// Run the export on the current thread.
    pub fn run(&self) -> Result<EncodedImage> {
        export(&self.source, &self.quad, self.quality, self.min_dimension)
    }

    /// Run the export on tokio's blocking pool.
    ///
    /// Resolves exactly once, with the encoded image or the failure.
    pub async fn run_in_background(self) -> Result<EncodedImage> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|err| GalleriaError::Encode(format!("export task failed: {err}")))?
    }
}
