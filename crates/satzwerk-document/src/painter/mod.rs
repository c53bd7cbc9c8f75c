// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Painter interface, the drawing surface the layout engine targets, plus its two
// backends: a raster preview and the PDF document writer.

pub mod pdf;
pub mod preview;

use image::DynamicImage;
use satzwerk_core::error::Result;
use satzwerk_core::{ExportSettings, Rect};

pub use pdf::{PdfDocumentWriter, PdfPagePainter};
pub use preview::PreviewPainter;

/// Drawing operations shared by every backend.
///
/// Coordinates are source-scan pixels of the page being painted; each backend
/// maps them to its own space. Measurements are returned in the same units and
/// always reflect the font size most recently set.
pub trait Painter {
    /// Font size in points for subsequent text. Setting the current size
    /// again has no effect.
    fn set_font_size(&mut self, points: f64);

    /// Place `text` with its left edge at `x` and its baseline at `y`.
    fn draw_text(&mut self, x: f64, y: f64, text: &str);

    /// Convert and compress `image` per `settings` and stretch it over `bbox`.
    fn draw_image(&mut self, bbox: Rect, image: &DynamicImage, settings: &ExportSettings)
    -> Result<()>;

    fn average_char_width(&self) -> f64;

    fn text_width(&self, text: &str) -> f64;
}
