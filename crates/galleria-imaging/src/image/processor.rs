// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor for decoding uploads, downscaling for previews, and encoding
// to JPEG/PNG. Operates on in-memory images using the `image` crate.

use galleria_core::error::GalleriaError;
use galleria_core::types::EncodedImage;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::{debug, info, instrument};

/// Quality used when a caller-supplied factor is outside `[0, 1]`.
pub const DEFAULT_JPEG_QUALITY: f32 = 0.8;

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&upload)?
///     .downscale_to_width(900)
///     .to_jpeg_bytes(80)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, GalleriaError> {
        let img = image::load_from_memory(data)
            .map_err(|err| GalleriaError::Decode(err.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(GalleriaError::Decode("image has no pixels".into()));
        }
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Decode an upload after checking it against the size cap.
    pub fn from_upload(data: &[u8], max_bytes: u64) -> Result<Self, GalleriaError> {
        let size = data.len() as u64;
        if size > max_bytes {
            return Err(GalleriaError::FileTooLarge {
                size,
                limit: max_bytes,
            });
        }
        Self::from_bytes(data)
    }

    /// Wrap an RGBA raster.
    pub fn from_rgba(raster: RgbaImage) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(raster),
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return an 8-bit RGBA raster.
    pub fn into_rgba8(self) -> RgbaImage {
        self.image.into_rgba8()
    }

    // -- Transformations ------------------------------------------------------

    /// Shrink the image so it is at most `max_width` wide, preserving aspect
    /// ratio. Narrower images are returned unchanged.
    #[instrument(skip(self))]
    pub fn downscale_to_width(self, max_width: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        if width <= max_width || max_width == 0 {
            return self;
        }
        let scale = f64::from(max_width) / f64::from(width);
        let new_h = ((f64::from(height) * scale).round() as u32).max(1);
        let resized = self
            .image
            .resize_exact(max_width, new_h, FilterType::Triangle);
        debug!(
            new_w = resized.width(),
            new_h = resized.height(),
            "Downscale complete"
        );
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, GalleriaError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| GalleriaError::Encode(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG has no alpha channel; transparent pixels are written with their
    /// stored colour, which is black for the dewarp border.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, GalleriaError> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(GalleriaError::Encode("image has zero area".into()));
        }
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| GalleriaError::Encode(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode as JPEG and package the bytes with the image dimensions.
    pub fn to_encoded_jpeg(&self, quality: f32) -> Result<EncodedImage, GalleriaError> {
        let bytes = self.to_jpeg_bytes(jpeg_quality_percent(quality))?;
        Ok(EncodedImage {
            bytes,
            width: self.width(),
            height: self.height(),
        })
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), GalleriaError> {
        self.image.save(path.as_ref()).map_err(|err| {
            GalleriaError::Encode(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })
    }
}

/// Re-encode an uploaded photo as JPEG at its natural size.
///
/// This is the "use the original" path: no geometry is changed.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn reencode_to_jpeg(
    data: &[u8],
    quality: f32,
    max_bytes: u64,
) -> Result<EncodedImage, GalleriaError> {
    let processor = ImageProcessor::from_upload(data, max_bytes)?;
    let encoded = processor.to_encoded_jpeg(quality)?;
    info!(
        width = encoded.width,
        height = encoded.height,
        bytes = encoded.bytes.len(),
        "Image re-encoded as JPEG"
    );
    Ok(encoded)
}

/// Quality factors outside `[0, 1]` (or NaN) fall back to the default.
pub fn effective_quality(quality: f32) -> f32 {
    if (0.0..=1.0).contains(&quality) {
        quality
    } else {
        DEFAULT_JPEG_QUALITY
    }
}

/// Convert a 0–1 quality factor to the encoder's 1–100 scale.
pub fn jpeg_quality_percent(quality: f32) -> u8 {
    (effective_quality(quality) * 100.0).round().clamp(1.0, 100.0) as u8
}
