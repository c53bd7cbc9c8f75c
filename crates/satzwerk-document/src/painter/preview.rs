// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preview renderer: paints a page into an RGBA raster for live feedback.
//
// Text is drawn as one block per glyph rather than rasterised outlines, but
// glyph advances come from the same font metrics as the document backend, so
// every run starts and ends where it will in the PDF.

use image::{DynamicImage, Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect as PixelRect;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::{Compression, ExportSettings, OcrPage, POINTS_PER_INCH, Rect};
use tracing::debug;

use super::Painter;
use crate::codec;
use crate::font::FontMetrics;
use crate::image::ImageProcessor;

const INK: Rgba<u8> = Rgba([20, 20, 20, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Share of the font size covered by a glyph block.
const GLYPH_HEIGHT: f64 = 0.5;

/// Raster painter in source-pixel space: one canvas pixel per scan pixel.
pub struct PreviewPainter {
    canvas: RgbaImage,
    metrics: FontMetrics,
    px_per_pt: f64,
    font_size: f64,
}

impl PreviewPainter {
    /// A blank canvas the size of `page`.
    pub fn new(page: &OcrPage, metrics: FontMetrics) -> Self {
        let width = page.bbox.width.max(1) as u32;
        let height = page.bbox.height.max(1) as u32;
        Self {
            canvas: RgbaImage::from_pixel(width, height, PAPER),
            metrics,
            px_per_pt: f64::from(page.source_dpi) / POINTS_PER_INCH,
            font_size: 0.0,
        }
    }

    /// Blend the whole canvas toward white by `opacity` (0.0..=1.0).
    pub fn wash(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        for pixel in self.canvas.pixels_mut() {
            for channel in &mut pixel.0[..3] {
                let lift = f32::from(255 - *channel) * opacity;
                *channel = channel.saturating_add(lift.round() as u8);
            }
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

impl Painter for PreviewPainter {
    fn set_font_size(&mut self, points: f64) {
        self.font_size = points;
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) {
        let block_height = (self.font_size * self.px_per_pt * GLYPH_HEIGHT).round().max(1.0);
        let top = (y - block_height).round() as i32;
        let mut cursor = x;
        for c in text.chars() {
            let advance = self.metrics.char_width(c, self.font_size) * self.px_per_pt;
            if !c.is_whitespace() {
                let left = (cursor + advance * 0.1).round() as i32;
                let width = (advance * 0.8).round().max(1.0) as u32;
                draw_filled_rect_mut(
                    &mut self.canvas,
                    PixelRect::at(left, top).of_size(width, block_height as u32),
                    INK,
                );
            }
            cursor += advance;
        }
    }

    fn draw_image(
        &mut self,
        bbox: Rect,
        image: &DynamicImage,
        settings: &ExportSettings,
    ) -> Result<()> {
        settings.check_codec()?;
        if image.width() == 0 || image.height() == 0 {
            return Err(SatzwerkError::ImageError(format!(
                "cannot preview an empty {}x{} image",
                image.width(),
                image.height()
            )));
        }

        let shown = match settings.compression {
            Compression::Jpeg => {
                let encoded = codec::encode(image, settings)?;
                image::load_from_memory(&encoded.data).map_err(|err| {
                    SatzwerkError::ImageError(format!("JPEG preview decode failed: {}", err))
                })?
            }
            Compression::Zip | Compression::Fax4 => ImageProcessor::from_dynamic(image.clone())
                .to_color_format(settings.color_format, settings.dither_method)
                .into_dynamic(),
        };

        if bbox.width <= 0 || bbox.height <= 0 {
            return Ok(());
        }
        let placed = ImageProcessor::from_dynamic(shown)
            .resize_exact(bbox.width as u32, bbox.height as u32)
            .into_dynamic()
            .to_rgba8();
        imageops::overlay(
            &mut self.canvas,
            &placed,
            i64::from(bbox.x),
            i64::from(bbox.y),
        );
        debug!(
            x = bbox.x,
            y = bbox.y,
            width = bbox.width,
            height = bbox.height,
            "Preview image placed"
        );
        Ok(())
    }

    fn average_char_width(&self) -> f64 {
        self.metrics.average_char_width(self.font_size) * self.px_per_pt
    }

    fn text_width(&self, text: &str) -> f64 {
        self.metrics.string_width(text, self.font_size) * self.px_per_pt
    }
}
