// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Galleria.

use thiserror::Error;

/// Top-level error type for all Galleria operations.
#[derive(Debug, Error)]
pub enum GalleriaError {
    // -- Image pipeline errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("degenerate quadrilateral: {0}")]
    DegenerateGeometry(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("image is too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GalleriaError>;
