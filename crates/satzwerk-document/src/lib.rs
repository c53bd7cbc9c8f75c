// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// satzwerk-document: Typesets OCR results into searchable PDF documents.
//
// Provides the image codec pipeline (colour conversion, dithering, deflate /
// CCITT Group 4 / JPEG), the painter backends (PDF document and raster
// preview), the layout engine that walks an OCR tree, and the export and
// preview passes that tie them together.

pub mod codec;
pub mod export;
pub mod font;
pub mod image;
pub mod layout;
pub mod painter;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the primary types so callers can use `satzwerk_document::Exporter` etc.
pub use codec::{EncodedImage, ImageFilter};
pub use export::{ExportReport, Exporter};
pub use font::{BuiltinFontResolver, FontMetrics, FontResolver, ResolvedFont};
pub use crate::image::processor::ImageProcessor;
pub use layout::PageLayout;
pub use painter::{Painter, PdfDocumentWriter, PdfPagePainter, PreviewPainter};
pub use source::{ImageFileSource, PageRaster, SourceImageProvider};
