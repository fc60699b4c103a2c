// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people holding the camera.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Hosts show these alongside the unmodified source image when scanning fails.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A passing problem; trying again may work.
    Transient,
    /// The user must do something (adjust corners, retake the photo).
    ActionRequired,
    /// Cannot be fixed by retrying or user action.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may retry without user involvement.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError`.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        ScanError::Geometry(_) => HumanError {
            message: "The document corners don't form a usable shape.".into(),
            suggestion: "Drag the corner handles onto the four corners of the page, or retake the photo with the whole page visible.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::Encoding(_) => HumanError {
            message: "We couldn't save the scanned page.".into(),
            suggestion: "Try again with a lower quality setting or a different output format.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::Resource(detail) => HumanError {
            message: "This scan is too large to process.".into(),
            suggestion: format!("Choose a smaller output size and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanError::Configuration(detail) => HumanError {
            message: "The scanner settings are not valid.".into(),
            suggestion: format!("Reset the scanner settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanError::Io(io) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check that the file exists and that there is free space. ({io})"),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanError::Serialization(_) => HumanError {
            message: "The settings file couldn't be understood.".into(),
            suggestion: "Check the settings file for typos, or delete it to use the defaults.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}

/// The message shown when no document boundary was found. Not an error: the
/// host keeps the full original image and tells the user.
pub fn no_document_found() -> HumanError {
    HumanError {
        message: "We couldn't find the edges of the page.".into(),
        suggestion: "The whole photo will be used. Place the page on a contrasting surface, or set the corners by hand.".into(),
        retriable: true,
        severity: Severity::Transient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_errors_ask_for_user_action() {
        let h = humanize_error(&ScanError::Geometry("collinear".into()));
        assert_eq!(h.severity, Severity::ActionRequired);
        assert!(!h.retriable);
        assert!(h.suggestion.contains("corner"));
    }

    #[test]
    fn resource_errors_carry_detail() {
        let h = humanize_error(&ScanError::Resource("width 9000".into()));
        assert!(h.suggestion.contains("width 9000"));
    }

    #[test]
    fn retriable_flag_matches_error() {
        let io = ScanError::Io(std::io::Error::other("disk"));
        assert_eq!(humanize_error(&io).retriable, io.is_retriable());
        assert!(no_document_found().retriable);
    }
}
