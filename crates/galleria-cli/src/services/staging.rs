// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local upload staging. Lays processed images out the way the artwork bucket
// stores them (`{work_id}/{image_id}.jpg`) and keeps a per-work manifest of
// `WorkImage` records ready to be written to the database.
//
// Image files are written before the manifest, and the manifest is replaced
// atomically, so a failed stage never leaves a record pointing at a missing
// file.

use std::path::PathBuf;

use galleria_core::error::{GalleriaError, Result};
use galleria_core::types::{BUCKET_NAME, PreparedUpload, WorkImage, next_display_order};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::data_dir;

const MANIFEST_FILE: &str = "images.json";

/// A directory standing in for the artwork bucket.
#[derive(Debug, Clone)]
pub struct UploadStaging {
    root: PathBuf,
}

impl UploadStaging {
    /// Stage under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Stage under `<data dir>/artworks`.
    pub fn in_data_dir() -> Self {
        Self::new(data_dir::data_subdir(BUCKET_NAME))
    }

    /// Records already staged for `work_id`, in display order.
    pub fn existing_images(&self, work_id: Uuid) -> Result<Vec<WorkImage>> {
        let path = self.manifest_path(work_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)?;
        let mut images: Vec<WorkImage> = serde_json::from_str(&data)?;
        images.sort_by_key(|image| image.display_order);
        Ok(images)
    }

    /// Write `uploads` after the images already staged for `work_id`.
    ///
    /// Returns the new records, numbered from the next free display order.
    #[instrument(skip(self, uploads), fields(count = uploads.len()))]
    pub fn stage(&self, work_id: Uuid, uploads: &[PreparedUpload]) -> Result<Vec<WorkImage>> {
        let mut images = self.existing_images(work_id)?;
        let first_order = next_display_order(&images)?;

        // Number every upload before writing, so an exhausted order leaves no files.
        let staged = uploads
            .iter()
            .enumerate()
            .map(|(offset, upload)| -> Result<WorkImage> {
                let order = u32::try_from(offset)
                    .ok()
                    .and_then(|offset| first_order.checked_add(offset))
                    .ok_or_else(|| {
                        GalleriaError::Storage(format!(
                            "no display order left for upload {} of work {work_id}",
                            offset + 1
                        ))
                    })?;
                Ok(WorkImage::from_upload(work_id, upload, order))
            })
            .collect::<Result<Vec<_>>>()?;

        for (record, upload) in staged.iter().zip(uploads) {
            let path = self.root.join(&record.storage_path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &upload.image.bytes)?;
            debug!(path = %path.display(), mode = ?upload.mode, "image staged");
        }

        images.extend(staged.iter().cloned());
        self.write_manifest(work_id, &images)?;
        info!(%work_id, staged = staged.len(), total = images.len(), "uploads staged");
        Ok(staged)
    }

    fn manifest_path(&self, work_id: Uuid) -> PathBuf {
        self.root.join(work_id.to_string()).join(MANIFEST_FILE)
    }

    fn write_manifest(&self, work_id: Uuid, images: &[WorkImage]) -> Result<()> {
        let path = self.manifest_path(work_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(images)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
