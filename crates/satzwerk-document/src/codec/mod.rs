// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image codec pipeline: colour conversion, sample packing and compression of a
// picture region into a stream the PDF writer can embed as an image XObject.

pub mod fax4;

use std::io::Write;

use flate2::Compression as FlateLevel;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::{ColorFormat, Compression, ExportSettings};
use tracing::{debug, instrument};

use crate::image::{ConvertedImage, ImageProcessor};

/// How an encoded stream must be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// zlib/deflate over the packed samples.
    Flate,
    /// CCITT Group 4. `k` is always negative (pure two-dimensional coding).
    Fax4 { columns: u32, rows: u32, k: i32 },
    /// A complete baseline JPEG file.
    Dct,
}

impl ImageFilter {
    /// PDF filter name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Flate => "FlateDecode",
            Self::Fax4 { .. } => "CCITTFaxDecode",
            Self::Dct => "DCTDecode",
        }
    }
}

/// Output of the codec pipeline: the stream plus everything needed to
/// describe it to a decoder.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub color_format: ColorFormat,
    pub filter: ImageFilter,
}

impl EncodedImage {
    pub fn bits_per_component(&self) -> u8 {
        self.color_format.bits_per_component()
    }

    pub fn components(&self) -> u8 {
        self.color_format.components()
    }
}

/// Convert `image` per the settings' colour format and dithering, then
/// compress it with the selected codec.
///
/// Incompatible codec/colour pairings fail with `CodecConstraintViolation`
/// before any conversion work is done.
#[instrument(skip(image, settings), fields(
    width = image.width(),
    height = image.height(),
    compression = ?settings.compression,
    color_format = ?settings.color_format,
))]
pub fn encode(image: &DynamicImage, settings: &ExportSettings) -> Result<EncodedImage> {
    settings.check_codec()?;
    if image.width() == 0 || image.height() == 0 {
        return Err(SatzwerkError::ImageError(format!(
            "cannot encode an empty {}x{} image",
            image.width(),
            image.height()
        )));
    }

    let converted = ImageProcessor::from_dynamic(image.clone())
        .to_color_format(settings.color_format, settings.dither_method);
    let encoded = match settings.compression {
        Compression::Zip => encode_flate(&converted)?,
        Compression::Fax4 => encode_fax4(&converted),
        Compression::Jpeg => encode_jpeg(&converted, settings.compression_quality)?,
    };

    debug!(
        bytes = encoded.data.len(),
        filter = encoded.filter.name(),
        "Image encoded"
    );
    Ok(encoded)
}

fn encode_flate(converted: &ConvertedImage) -> Result<EncodedImage> {
    let (width, height) = converted.dimensions();
    let mut encoder = ZlibEncoder::new(Vec::new(), FlateLevel::default());
    encoder.write_all(&converted.pack())?;
    let data = encoder.finish()?;
    Ok(EncodedImage {
        data,
        width,
        height,
        color_format: converted.color_format(),
        filter: ImageFilter::Flate,
    })
}

fn encode_fax4(converted: &ConvertedImage) -> EncodedImage {
    let (width, height) = converted.dimensions();
    let data = fax4::encode(&converted.pack(), width, height, converted.row_bytes());
    EncodedImage {
        data,
        width,
        height,
        color_format: ColorFormat::Monochrome,
        filter: ImageFilter::Fax4 {
            columns: width,
            rows: height,
            k: -1,
        },
    }
}

fn encode_jpeg(converted: &ConvertedImage, quality: u8) -> Result<EncodedImage> {
    let (width, height) = converted.dimensions();
    let mut data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100));
    let written = match converted {
        ConvertedImage::Rgb(img) => img.write_with_encoder(encoder),
        ConvertedImage::Gray(img) => img.write_with_encoder(encoder),
        ConvertedImage::Mono(_) => {
            return Err(SatzwerkError::CodecConstraintViolation {
                compression: Compression::Jpeg,
                color_format: ColorFormat::Monochrome,
            });
        }
    };
    written.map_err(|err| SatzwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(EncodedImage {
        data,
        width,
        height,
        color_format: converted.color_format(),
        filter: ImageFilter::Dct,
    })
}
