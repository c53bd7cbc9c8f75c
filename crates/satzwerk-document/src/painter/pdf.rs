// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: the document backend of the painter interface, built directly on
// `lopdf` objects so image streams can carry their own filters and decode
// parameters.
//
// Pages are painted one at a time: `begin_page` hands out a page painter that
// borrows the writer, and `finish_page` appends the finished page to the page
// tree. The document is serialised once, by `finish` or `save`.

use std::io::Write;
use std::path::Path;

use flate2::Compression as FlateLevel;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::{ExportSettings, FontSelection, OcrPage, Rect};
use tracing::{debug, info, instrument};

use super::Painter;
use crate::codec::{self, ImageFilter};
use crate::font::{FontResolver, ResolvedFont};

/// Resource name of the text font on every page.
const FONT_RESOURCE: &str = "F1";

/// Builds a multi-page PDF with an optional searchable text layer.
pub struct PdfDocumentWriter {
    document: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    font: ResolvedFont,
    page_ids: Vec<ObjectId>,
    title: Option<String>,
}

impl PdfDocumentWriter {
    /// Create an empty document using the font resolved from `selection`.
    ///
    /// Fails with `BackendResource` when the font cannot be resolved.
    pub fn new(selection: &FontSelection, resolver: &dyn FontResolver) -> Result<Self> {
        let font = resolver.resolve(selection)?;

        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        debug!(base_font = font.base_font, "PDF document started");
        Ok(Self {
            document,
            pages_id,
            font_id,
            font,
            page_ids: Vec::new(),
            title: None,
        })
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Number of pages finished so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Start a page sized to `page`'s bounding box at its source resolution.
    pub fn begin_page(&mut self, page: &OcrPage) -> PdfPagePainter<'_> {
        let (width_pt, height_pt) = page.size_pt();
        debug!(title = %page.title, width_pt, height_pt, "Beginning PDF page");
        PdfPagePainter {
            writer: self,
            scale: page.doc_scale(),
            width_pt,
            height_pt,
            font_size: 0.0,
            invisible_text: false,
            operations: Vec::new(),
            xobjects: Dictionary::new(),
        }
    }

    /// Close the page tree and serialise the document.
    #[instrument(skip(self), fields(pages = self.page_ids.len()))]
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(self.page_ids.len() as i64),
        };
        self.document
            .objects
            .insert(self.pages_id, Object::Dictionary(pages));

        let mut info = dictionary! {
            "Producer" => Object::String(b"Satzwerk".to_vec(), StringFormat::Literal),
        };
        if let Some(title) = &self.title {
            info.set(
                "Title",
                Object::String(to_win_ansi(title), StringFormat::Literal),
            );
        }
        let info_id = self.document.add_object(info);
        self.document.trailer.set("Info", info_id);

        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            SatzwerkError::Finalization(format!("failed to serialise PDF: {}", err))
        })?;
        info!(bytes = output.len(), "PDF document finished");
        Ok(output)
    }

    /// Serialise the document and write it to `path`.
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.finish()?;
        std::fs::write(path, &bytes).map_err(|err| {
            SatzwerkError::Finalization(format!("failed to write {}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), "PDF saved");
        Ok(())
    }
}

/// Paints one PDF page. Coordinates are source pixels; the painter scales them
/// to points and flips the y axis.
pub struct PdfPagePainter<'a> {
    writer: &'a mut PdfDocumentWriter,
    scale: f64,
    width_pt: f64,
    height_pt: f64,
    font_size: f64,
    invisible_text: bool,
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

impl PdfPagePainter<'_> {
    /// Emit text with rendering mode 3, so it is searchable but not drawn.
    pub fn set_invisible_text(&mut self, invisible: bool) {
        self.invisible_text = invisible;
    }

    /// Compress the page content and append the page to the document.
    pub fn finish_page(self) -> Result<()> {
        let content = Content {
            operations: self.operations,
        }
        .encode()
        .map_err(|err| {
            SatzwerkError::BackendResource(format!("failed to encode page content: {}", err))
        })?;
        let mut encoder = ZlibEncoder::new(Vec::new(), FlateLevel::default());
        encoder.write_all(&content)?;
        let compressed = encoder.finish()?;

        let writer = self.writer;
        let content_id = writer.document.add_object(Stream::new(
            dictionary! { "Filter" => "FlateDecode" },
            compressed,
        ));

        let mut resources = dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => writer.font_id },
        };
        if !self.xobjects.is_empty() {
            resources.set("XObject", self.xobjects);
        }
        let page_id = writer.document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => writer.pages_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                (self.width_pt as f32).into(),
                (self.height_pt as f32).into(),
            ],
            "Contents" => content_id,
            "Resources" => resources,
        });
        writer.page_ids.push(page_id);
        debug!(page = writer.page_ids.len(), "PDF page finished");
        Ok(())
    }

    fn to_pt(&self, value: f64) -> f32 {
        (value * self.scale) as f32
    }
}

impl Painter for PdfPagePainter<'_> {
    fn set_font_size(&mut self, points: f64) {
        self.font_size = points;
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str) {
        let x_pt = self.to_pt(x);
        let y_pt = (self.height_pt - y * self.scale) as f32;
        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![
                Object::Name(FONT_RESOURCE.as_bytes().to_vec()),
                (self.font_size as f32).into(),
            ],
        ));
        if self.invisible_text {
            self.operations
                .push(Operation::new("Tr", vec![Object::Integer(3)]));
        }
        self.operations
            .push(Operation::new("Td", vec![x_pt.into(), y_pt.into()]));
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(text), StringFormat::Literal)],
        ));
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn draw_image(
        &mut self,
        bbox: Rect,
        image: &DynamicImage,
        settings: &ExportSettings,
    ) -> Result<()> {
        let encoded = codec::encode(image, settings)?;

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(encoded.width)),
            "Height" => Object::Integer(i64::from(encoded.height)),
            "ColorSpace" => encoded.color_format.pdf_color_space(),
            "BitsPerComponent" => Object::Integer(i64::from(encoded.bits_per_component())),
            "Filter" => encoded.filter.name(),
        };
        if let ImageFilter::Fax4 { columns, rows, k } = encoded.filter {
            dict.set(
                "DecodeParms",
                dictionary! {
                    "K" => Object::Integer(i64::from(k)),
                    "Columns" => Object::Integer(i64::from(columns)),
                    "Rows" => Object::Integer(i64::from(rows)),
                },
            );
        }
        let stream = Stream::new(dict, encoded.data).with_compression(false);
        let image_id = self.writer.document.add_object(stream);

        let name = format!("Im{}", self.xobjects.len() + 1);
        self.xobjects.set(name.as_str(), image_id);

        let width = self.to_pt(f64::from(bbox.width));
        let height = self.to_pt(f64::from(bbox.height));
        let x = self.to_pt(f64::from(bbox.x));
        let y = (self.height_pt - f64::from(bbox.y + bbox.height) * self.scale) as f32;
        self.operations.push(Operation::new("q", vec![]));
        self.operations.push(Operation::new(
            "cm",
            vec![
                width.into(),
                Object::Integer(0),
                Object::Integer(0),
                height.into(),
                x.into(),
                y.into(),
            ],
        ));
        self.operations
            .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
        self.operations.push(Operation::new("Q", vec![]));
        Ok(())
    }

    fn average_char_width(&self) -> f64 {
        self.writer.font.metrics.average_char_width(self.font_size) / self.scale
    }

    fn text_width(&self, text: &str) -> f64 {
        self.writer.font.metrics.string_width(text, self.font_size) / self.scale
    }
}

/// Encode for a WinAnsi base font. Latin-1 maps one to one; anything else
/// becomes `?`.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}
