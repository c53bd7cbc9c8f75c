// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Satzwerk.

use thiserror::Error;

use crate::settings::{ColorFormat, Compression};

/// Top-level error type for all Satzwerk operations.
#[derive(Debug, Error)]
pub enum SatzwerkError {
    // -- Pass-level page errors --
    /// The source image for a page could not be obtained. Export passes skip
    /// the page and report it at the end.
    #[error("page {page} is unavailable: {reason}")]
    PageUnavailable { page: String, reason: String },

    // -- Codec errors --
    /// A compression was requested that the colour format cannot carry
    /// (fax4 without monochrome, jpeg with monochrome).
    #[error("{compression:?} compression cannot encode {color_format:?} images")]
    CodecConstraintViolation {
        compression: Compression,
        color_format: ColorFormat,
    },

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Document backend errors --
    #[error("document backend resource unavailable: {0}")]
    BackendResource(String),

    #[error("document finalization failed: {0}")]
    Finalization(String),

    // -- Configuration --
    #[error("invalid export settings: {0}")]
    InvalidSettings(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SatzwerkError>;
