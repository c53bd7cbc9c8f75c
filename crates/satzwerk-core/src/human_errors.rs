// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable messages for export outcomes.
//
// Every technical error is mapped to a short heading and a suggestion that a
// front end can show verbatim.

use crate::error::SatzwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Part of the output is missing but the rest was produced.
    Partial,
    /// User must change something (folder, font, option) and try again.
    ActionRequired,
    /// A programming fault; retrying with the same input will not help.
    Permanent,
}

/// A human-readable error with a heading and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `SatzwerkError` into a `HumanError`.
pub fn humanize_error(err: &SatzwerkError) -> HumanError {
    match err {
        SatzwerkError::PageUnavailable { page, .. } => HumanError {
            message: format!("Page {page} could not be rendered."),
            suggestion: "Check that the scanned image for this page still exists.".into(),
            severity: Severity::Partial,
        },

        SatzwerkError::CodecConstraintViolation {
            compression,
            color_format,
        } => HumanError {
            message: "The selected image compression does not fit the image format.".into(),
            suggestion: format!(
                "{compression:?} cannot store {color_format:?} images. Choose Zip compression instead."
            ),
            severity: Severity::Permanent,
        },

        SatzwerkError::BackendResource(detail) => HumanError {
            message: "The PDF library does not support the selected font.".into(),
            suggestion: format!("Pick a different font and export again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        SatzwerkError::Finalization(detail) => HumanError {
            message: "The PDF export failed.".into(),
            suggestion: format!(
                "Check that you have writing permissions in the selected folder. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        SatzwerkError::Io(_) => HumanError {
            message: "Failed to save output.".into(),
            suggestion: "Check that you have writing permissions in the selected folder.".into(),
            severity: Severity::ActionRequired,
        },

        SatzwerkError::ImageError(_) => HumanError {
            message: "An image on the page could not be processed.".into(),
            suggestion: "Try a different image format or compression.".into(),
            severity: Severity::Permanent,
        },

        SatzwerkError::InvalidSettings(detail) => HumanError {
            message: "The export options are not valid.".into(),
            suggestion: detail.clone(),
            severity: Severity::ActionRequired,
        },

        SatzwerkError::Serialization(_) => HumanError {
            message: "The export options could not be read.".into(),
            suggestion: "Reset the export options to their defaults.".into(),
            severity: Severity::ActionRequired,
        },
    }
}

/// Summarise the pages an export pass had to skip, if any.
pub fn summarize_failed_pages(failed: &[String]) -> Option<HumanError> {
    if failed.is_empty() {
        return None;
    }
    Some(HumanError {
        message: "Errors occurred.".into(),
        suggestion: format!(
            "The following pages could not be rendered:\n{}",
            failed.join("\n")
        ),
        severity: Severity::Partial,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ColorFormat, Compression};

    #[test]
    fn codec_violation_is_permanent() {
        let human = humanize_error(&SatzwerkError::CodecConstraintViolation {
            compression: Compression::Fax4,
            color_format: ColorFormat::Color,
        });
        assert_eq!(human.severity, Severity::Permanent);
        assert!(human.suggestion.contains("Fax4"));
    }

    #[test]
    fn font_fault_asks_for_another_font() {
        let human = humanize_error(&SatzwerkError::BackendResource("Comic".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.message.contains("font"));
    }

    #[test]
    fn invalid_settings_carries_detail() {
        let human = humanize_error(&SatzwerkError::InvalidSettings("dpi is zero".into()));
        assert_eq!(human.suggestion, "dpi is zero");
    }

    #[test]
    fn failed_pages_summary() {
        assert!(summarize_failed_pages(&[]).is_none());
        let summary =
            summarize_failed_pages(&["page 2".to_string(), "page 5".to_string()]).unwrap();
        assert_eq!(summary.severity, Severity::Partial);
        assert!(summary.suggestion.ends_with("page 2\npage 5"));
    }
}
