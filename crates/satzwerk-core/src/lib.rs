// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Satzwerk: Core types, export settings and error definitions shared by the
// codec, painter and layout crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod settings;
pub mod types;

pub use config::{ExportConfig, ExportOptions, FontSelection};
pub use error::SatzwerkError;
pub use settings::{ColorFormat, Compression, DitherMethod, ExportSettings};
pub use types::*;
