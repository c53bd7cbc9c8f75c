// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test doubles shared by the layout and export tests.

use std::collections::HashMap;

use image::{DynamicImage, GrayImage, Luma};
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::{ExportSettings, OcrNode, OcrPage, Rect};

use crate::painter::Painter;
use crate::source::SourceImageProvider;

/// One recorded painter call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    FontSize(f64),
    Text { x: f64, y: f64, text: String, size: f64 },
    Image { bbox: Rect, width: u32, height: u32 },
}

/// Painter that records every call. Every glyph is half an em wide, so
/// `average_char_width` is `size / 2` and `text_width` is `len * size / 2`.
#[derive(Debug, Default)]
pub(crate) struct RecordingPainter {
    pub calls: Vec<Call>,
    font_size: f64,
}

impl RecordingPainter {
    pub fn new(font_size: f64) -> Self {
        Self {
            calls: Vec::new(),
            font_size,
        }
    }

    pub fn texts(&self) -> Vec<(f64, f64, String, f64)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Text { x, y, text, size } => Some((*x, *y, text.clone(), *size)),
                _ => None,
            })
            .collect()
    }

    pub fn images(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Image { bbox, .. } => Some(*bbox),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn set_font_size(&mut self, points: f64) {
        self.font_size = points;
        self.calls.push(Call::FontSize(points));
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) {
        self.calls.push(Call::Text {
            x,
            y,
            text: text.to_owned(),
            size: self.font_size,
        });
    }

    fn draw_image(
        &mut self,
        bbox: Rect,
        image: &DynamicImage,
        settings: &ExportSettings,
    ) -> Result<()> {
        settings.check_codec()?;
        self.calls.push(Call::Image {
            bbox,
            width: image.width(),
            height: image.height(),
        });
        Ok(())
    }

    fn average_char_width(&self) -> f64 {
        self.font_size / 2.0
    }

    fn text_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.font_size / 2.0
    }
}

/// Page rasters held in memory, keyed by page title.
#[derive(Default)]
pub(crate) struct MemorySource {
    pages: HashMap<String, DynamicImage>,
}

impl MemorySource {
    pub fn with_page(mut self, title: &str, image: DynamicImage) -> Self {
        self.pages.insert(title.to_owned(), image);
        self
    }
}

impl SourceImageProvider for MemorySource {
    fn load_page(&self, page: &OcrPage, _output_dpi: u32) -> Result<DynamicImage> {
        self.pages
            .get(&page.title)
            .cloned()
            .ok_or_else(|| SatzwerkError::PageUnavailable {
                page: page.title.clone(),
                reason: "not in memory".into(),
            })
    }
}

/// A mid-grey raster.
pub(crate) fn grey_raster(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([128u8])))
}

/// Page with one paragraph of two lines, two words each, at 300 dpi.
///
/// Paragraph box: (100, 200) 800x120. Lines have a zero baseline.
pub(crate) fn two_line_page(title: &str) -> OcrPage {
    let line = |y: i32, first: &str, second: &str| {
        OcrNode::line(
            Rect::new(100, y, 700, 50),
            0,
            vec![
                OcrNode::word(Rect::new(100, y, 200, 50), first, 11.0),
                OcrNode::word(Rect::new(320, y, 200, 50), second, 13.0),
            ],
        )
    };
    let paragraph = OcrNode::paragraph(
        Rect::new(100, 200, 800, 120),
        vec![line(200, "Hello", "world"), line(260, "second", "line")],
    );
    OcrPage {
        title: title.to_owned(),
        source_file: format!("{title}.png").into(),
        page_number: 1,
        source_dpi: 300,
        angle: 0.0,
        bbox: Rect::new(0, 0, 1000, 500),
        enabled: true,
        root: OcrNode::page(Rect::new(0, 0, 1000, 500), vec![paragraph]),
    }
}
