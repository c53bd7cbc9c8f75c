// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export settings: the immutable per-pass configuration consumed by the codec
// pipeline and the layout engine.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SatzwerkError};

/// Target sample format for embedded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    /// 8-bit RGB.
    Color,
    /// 8-bit luma.
    Grayscale,
    /// 1-bit bi-level.
    Monochrome,
}

impl ColorFormat {
    /// Bits per sample in the packed buffer.
    pub fn bits_per_component(&self) -> u8 {
        match self {
            Self::Color | Self::Grayscale => 8,
            Self::Monochrome => 1,
        }
    }

    /// Number of interleaved components per pixel.
    pub fn components(&self) -> u8 {
        match self {
            Self::Color => 3,
            Self::Grayscale | Self::Monochrome => 1,
        }
    }

    /// PDF colour space name.
    pub fn pdf_color_space(&self) -> &'static str {
        match self {
            Self::Color => "DeviceRGB",
            Self::Grayscale | Self::Monochrome => "DeviceGray",
        }
    }
}

/// Dithering used when reducing to monochrome. Ignored for other formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DitherMethod {
    /// Closest colour: every pixel is thresholded independently.
    Threshold,
    /// Floyd–Steinberg error diffusion.
    Diffuse,
}

/// Image codec selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    /// Deflate (lossless, any colour format).
    Zip,
    /// CCITT Group 4 (lossless, monochrome only).
    Fax4,
    /// Baseline JPEG (lossy, colour or grayscale only).
    Jpeg,
}

impl Compression {
    /// Whether this codec can encode samples of the given colour format.
    pub fn supports(&self, color_format: ColorFormat) -> bool {
        match self {
            Self::Zip => true,
            Self::Fax4 => color_format == ColorFormat::Monochrome,
            Self::Jpeg => color_format != ColorFormat::Monochrome,
        }
    }
}

/// Resolved, immutable settings for one preview or export pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub color_format: ColorFormat,
    pub dither_method: DitherMethod,
    pub compression: Compression,
    /// JPEG quality, 0–100.
    pub compression_quality: u8,
    /// Draw each word at its detected font size instead of the document size.
    pub use_detected_font_sizes: bool,
    /// Multiplier (in percent) applied to detected font sizes.
    pub font_scale_percent: u32,
    /// Redistribute the lines of each paragraph evenly over its height.
    pub uniformize_line_spacing: bool,
    /// Gaps wider than this many average glyph widths are kept as-is when
    /// uniformizing.
    pub preserve_space_threshold: u32,
    /// Draw the page scan as background and layer the text over it.
    pub overlay_mode: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            color_format: ColorFormat::Color,
            dither_method: DitherMethod::Threshold,
            compression: Compression::Zip,
            compression_quality: 90,
            use_detected_font_sizes: true,
            font_scale_percent: 100,
            uniformize_line_spacing: false,
            preserve_space_threshold: 4,
            overlay_mode: false,
        }
    }
}

impl ExportSettings {
    /// Scale factor applied to detected font sizes.
    pub fn detected_font_scaling(&self) -> f64 {
        f64::from(self.font_scale_percent) / 100.0
    }

    /// Check that the requested codec can carry the requested colour format.
    pub fn check_codec(&self) -> Result<()> {
        if self.compression.supports(self.color_format) {
            Ok(())
        } else {
            Err(SatzwerkError::CodecConstraintViolation {
                compression: self.compression,
                color_format: self.color_format,
            })
        }
    }

    /// Enforce every settings invariant.
    pub fn validate(&self) -> Result<()> {
        self.check_codec()?;
        if self.compression_quality > 100 {
            return Err(SatzwerkError::InvalidSettings(format!(
                "compression quality {} is outside 0..=100",
                self.compression_quality
            )));
        }
        if self.font_scale_percent == 0 {
            return Err(SatzwerkError::InvalidSettings(
                "font scale must be positive".into(),
            ));
        }
        Ok(())
    }
}
