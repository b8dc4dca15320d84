// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the admin editing an artwork.
//
// Every pipeline failure is terminal for the current attempt. The admin is
// always offered the same two ways out: try again, or upload the original
// photo without correction.

use crate::error::GalleriaError;

/// Message shown for any failure inside the correction pipeline.
pub const PROCESSING_FAILED: &str = "Could not process the image.";

/// Suggestion paired with [`PROCESSING_FAILED`].
pub const RETRY_OR_SKIP: &str = "Please try again or skip correction.";

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The user must do something (pick a smaller file, move a corner).
    ActionRequired,
    /// Retrying the same input will not help.
    Permanent,
    /// Something on this machine went wrong (disk, settings file).
    Internal,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a manual retry of the same operation may succeed.
    pub retriable: bool,
    /// Whether uploading the original image unmodified is still possible.
    pub can_skip_correction: bool,
    /// Severity level.
    pub severity: Severity,
}

/// Convert a `GalleriaError` into a `HumanError`.
pub fn humanize_error(err: &GalleriaError) -> HumanError {
    match err {
        // Decode, geometry and encode failures all surface with the same message.
        GalleriaError::Decode(_) => HumanError {
            message: PROCESSING_FAILED.into(),
            suggestion: RETRY_OR_SKIP.into(),
            retriable: true,
            can_skip_correction: false,
            severity: Severity::Permanent,
        },

        GalleriaError::DegenerateGeometry(_) => HumanError {
            message: PROCESSING_FAILED.into(),
            suggestion: RETRY_OR_SKIP.into(),
            retriable: true,
            can_skip_correction: true,
            severity: Severity::ActionRequired,
        },

        GalleriaError::Encode(_) => HumanError {
            message: PROCESSING_FAILED.into(),
            suggestion: RETRY_OR_SKIP.into(),
            retriable: true,
            can_skip_correction: true,
            severity: Severity::Permanent,
        },

        GalleriaError::FileTooLarge { limit, .. } => HumanError {
            message: "Image is too large.".into(),
            suggestion: format!(
                "Please use an image under {}MB.",
                limit / (1024 * 1024)
            ),
            retriable: false,
            can_skip_correction: false,
            severity: Severity::ActionRequired,
        },

        GalleriaError::Config(detail) => HumanError {
            message: "The image settings are invalid.".into(),
            suggestion: format!("Reset the settings to their defaults and try again. ({detail})"),
            retriable: false,
            can_skip_correction: true,
            severity: Severity::Internal,
        },

        GalleriaError::Io(_) | GalleriaError::Serialization(_) | GalleriaError::Storage(_) => HumanError {
            message: "Something went wrong while saving.".into(),
            suggestion: "Check there is free disk space, then try again.".into(),
            retriable: true,
            can_skip_correction: true,
            severity: Severity::Internal,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_failures_share_one_message() {
        let errors = [
            GalleriaError::Decode("bad magic".into()),
            GalleriaError::DegenerateGeometry("collinear".into()),
            GalleriaError::Encode("zero area".into()),
        ];
        for err in &errors {
            let human = humanize_error(err);
            assert_eq!(human.message, PROCESSING_FAILED);
            assert_eq!(human.suggestion, RETRY_OR_SKIP);
            assert!(human.retriable);
        }
    }

    #[test]
    fn undecodable_source_cannot_skip_correction() {
        let human = humanize_error(&GalleriaError::Decode("truncated".into()));
        assert!(!human.can_skip_correction);
    }

    #[test]
    fn oversized_file_names_the_limit() {
        let err = GalleriaError::FileTooLarge {
            size: 25 * 1024 * 1024,
            limit: 20 * 1024 * 1024,
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("20MB"));
        assert!(!human.retriable);
    }

    #[test]
    fn io_errors_are_internal() {
        let err = GalleriaError::Io(std::io::Error::other("disk full"));
        assert_eq!(humanize_error(&err).severity, Severity::Internal);
    }
}
