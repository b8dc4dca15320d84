// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Domain types handed from the imaging core to the upload layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GalleriaError, Result};

/// Object storage bucket holding artwork images.
pub const BUCKET_NAME: &str = "artworks";

/// An encoded image ready for upload.
///
/// Produced by the export step (corrected) or by the re-encode path (as-is).
/// Ownership passes to the caller once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Compressed image bytes (JPEG).
    pub bytes: Vec<u8>,
    /// Pixel width of the encoded image.
    pub width: u32,
    /// Pixel height of the encoded image.
    pub height: u32,
}

impl EncodedImage {
    /// MIME type of the encoded bytes.
    pub fn content_type(&self) -> &'static str {
        "image/jpeg"
    }
}

/// How an uploaded photo was prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UploadMode {
    /// Re-encoded without geometric changes.
    AsIs,
    /// Perspective-corrected before encoding.
    Corrected,
}

/// A processed photo waiting to be stored.
#[derive(Debug, Clone)]
pub struct PreparedUpload {
    /// Identifier the stored image will carry.
    pub id: Uuid,
    pub mode: UploadMode,
    pub image: EncodedImage,
}

impl PreparedUpload {
    pub fn new(mode: UploadMode, image: EncodedImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            image,
        }
    }
}

/// An image attached to a work, as recorded in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkImage {
    pub id: Uuid,
    pub work_id: Uuid,
    /// Object path inside [`BUCKET_NAME`].
    pub storage_path: String,
    pub width: u32,
    pub height: u32,
    /// Position of the image within its work, starting at 0.
    pub display_order: u32,
    pub created_at: DateTime<Utc>,
}

impl WorkImage {
    /// Build the record for an upload placed at `display_order`.
    pub fn from_upload(work_id: Uuid, upload: &PreparedUpload, display_order: u32) -> Self {
        Self {
            id: upload.id,
            work_id,
            storage_path: storage_path(work_id, upload.id),
            width: upload.image.width,
            height: upload.image.height,
            display_order,
            created_at: Utc::now(),
        }
    }
}

/// Object path of an image inside the artwork bucket.
pub fn storage_path(work_id: Uuid, image_id: Uuid) -> String {
    format!("{work_id}/{image_id}.jpg")
}

/// Strip a leading `artworks/` bucket prefix, if present.
pub fn normalize_storage_path(path: &str) -> &str {
    path.strip_prefix(BUCKET_NAME)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(path)
}

/// Display order for the first image appended after `existing`.
///
/// Fails with [`GalleriaError::Storage`] when the highest order is already
/// `u32::MAX`.
pub fn next_display_order(existing: &[WorkImage]) -> Result<u32> {
    match existing.iter().map(|image| image.display_order).max() {
        None => Ok(0),
        Some(highest) => highest.checked_add(1).ok_or_else(|| {
            GalleriaError::Storage(format!("display order {highest} cannot be followed"))
        }),
    }
}

/// Keep `selected` as the cover if it is still attached, else fall back to the
/// first image.
pub fn resolve_cover_image_id(images: &[WorkImage], selected: Option<Uuid>) -> Option<Uuid> {
    match selected {
        Some(id) if images.iter().any(|image| image.id == id) => Some(id),
        _ => images.first().map(|image| image.id),
    }
}
