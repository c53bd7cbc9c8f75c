// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export and preview passes: drive the layout engine over whole pages with
// either the document backend or the preview backend.

use std::path::Path;

use image::{DynamicImage, RgbaImage};
use satzwerk_core::error::{Result, SatzwerkError};
use satzwerk_core::human_errors::{HumanError, summarize_failed_pages};
use satzwerk_core::{ExportConfig, OcrDocument, OcrPage};
use tracing::{debug, info, instrument, warn};

use crate::font::{BuiltinFontResolver, FontResolver};
use crate::layout::PageLayout;
use crate::painter::{Painter, PdfDocumentWriter, PreviewPainter};
use crate::source::{PageRaster, SourceImageProvider};

/// Opacity of the white wash over the scan in overlay previews.
const OVERLAY_WASH: f32 = 0.5;

/// Outcome of an export pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub pages_written: usize,
    /// Titles of pages skipped because their scan was unavailable.
    pub failed_pages: Vec<String>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }

    /// User-facing summary of skipped pages, if any.
    pub fn failure_summary(&self) -> Option<HumanError> {
        summarize_failed_pages(&self.failed_pages)
    }
}

/// Runs export and preview passes for one validated configuration.
pub struct Exporter {
    config: ExportConfig,
    resolver: Box<dyn FontResolver>,
}

impl Exporter {
    /// Validate `config` and bind it to the builtin font resolver.
    pub fn new(config: ExportConfig) -> Result<Self> {
        Self::with_font_resolver(config, Box::new(BuiltinFontResolver))
    }

    pub fn with_font_resolver(
        config: ExportConfig,
        resolver: Box<dyn FontResolver>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, resolver })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// A document writer using the configured font.
    pub fn create_writer(&self) -> Result<PdfDocumentWriter> {
        PdfDocumentWriter::new(&self.config.options.font, self.resolver.as_ref())
    }

    /// Paint every enabled page of `document` into `sink`.
    ///
    /// Pages whose scan cannot be loaded are skipped and listed in the
    /// report. Any other failure aborts the pass.
    #[instrument(skip_all, fields(pages = document.page_count()))]
    pub fn export(
        &self,
        document: &OcrDocument,
        provider: &dyn SourceImageProvider,
        sink: &mut PdfDocumentWriter,
    ) -> Result<ExportReport> {
        let mut report = ExportReport::default();
        for page in &document.pages {
            if !page.enabled {
                debug!(title = %page.title, "Page disabled");
                continue;
            }
            let Some(raster) = self.load_raster(page, provider, &mut report) else {
                continue;
            };

            let mut painter = sink.begin_page(page);
            painter.set_invisible_text(self.config.settings.overlay_mode);
            self.paint_page(&mut painter, page, &raster)?;
            painter.finish_page()?;
            report.pages_written += 1;
        }

        info!(
            written = report.pages_written,
            failed = report.failed_pages.len(),
            "Export pass finished"
        );
        Ok(report)
    }

    /// Export `document` and save the result to `path`.
    ///
    /// Nothing is reported as written unless the file was saved.
    pub fn export_to_file(
        &self,
        document: &OcrDocument,
        provider: &dyn SourceImageProvider,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let path = path.as_ref();
        let mut writer = self.create_writer()?;
        if let Some(stem) = path.file_stem() {
            writer.set_title(stem.to_string_lossy());
        }
        let report = self.export(document, provider, &mut writer)?;
        writer.save(path)?;
        Ok(report)
    }

    /// Render `page` with the preview backend.
    #[instrument(skip_all, fields(title = %page.title))]
    pub fn preview(
        &self,
        page: &OcrPage,
        provider: &dyn SourceImageProvider,
    ) -> Result<RgbaImage> {
        check_resolution(page)?;
        let raster = PageRaster::new(provider.load_page(page, self.config.options.output_dpi)?);
        let font = self.resolver.resolve(&self.config.options.font)?;
        let settings = &self.config.settings;

        let mut painter = PreviewPainter::new(page, font.metrics);
        painter.set_font_size(self.config.options.font.size_pt);
        if settings.overlay_mode {
            if let Some(background) = self.background(page, &raster) {
                painter.draw_image(page.bbox, &background, settings)?;
            }
            painter.wash(OVERLAY_WASH);
        }
        self.layout(page, &raster).render(&mut painter, &page.root)?;
        Ok(painter.into_image())
    }

    fn layout<'a>(&'a self, page: &OcrPage, raster: &'a PageRaster) -> PageLayout<'a> {
        PageLayout::new(
            &self.config.settings,
            raster,
            page.image_scale(self.config.options.output_dpi),
        )
    }

    fn load_raster(
        &self,
        page: &OcrPage,
        provider: &dyn SourceImageProvider,
        report: &mut ExportReport,
    ) -> Option<PageRaster> {
        let loaded = check_resolution(page)
            .and_then(|()| provider.load_page(page, self.config.options.output_dpi));
        match loaded {
            Ok(image) => Some(PageRaster::new(image)),
            Err(err) => {
                let reason = match err {
                    SatzwerkError::PageUnavailable { reason, .. } => reason,
                    other => other.to_string(),
                };
                warn!(title = %page.title, %reason, "Skipping page without source image");
                report.failed_pages.push(page.title.clone());
                None
            }
        }
    }

    /// Document font, then the overlay background, then the tree.
    fn paint_page<P: Painter + ?Sized>(
        &self,
        painter: &mut P,
        page: &OcrPage,
        raster: &PageRaster,
    ) -> Result<()> {
        let settings = &self.config.settings;
        painter.set_font_size(self.config.options.font.size_pt);
        let background = settings
            .overlay_mode
            .then(|| self.background(page, raster))
            .flatten();
        if let Some(background) = background {
            painter.draw_image(page.bbox, &background, settings)?;
        }
        self.layout(page, raster).render(painter, &page.root)
    }

    /// The part of the raster under the page box, at image scale.
    fn background(&self, page: &OcrPage, raster: &PageRaster) -> Option<DynamicImage> {
        let region = page
            .bbox
            .scaled(page.image_scale(self.config.options.output_dpi));
        let image = raster.selection(region);
        if image.width() == 0 || image.height() == 0 {
            debug!(title = %page.title, ?region, "Page box outside the raster");
            return None;
        }
        Some(image)
    }
}

/// Pages without a source resolution cannot be placed in points.
fn check_resolution(page: &OcrPage) -> Result<()> {
    if page.source_dpi == 0 {
        return Err(SatzwerkError::PageUnavailable {
            page: page.title.clone(),
            reason: "source resolution is zero".into(),
        });
    }
    Ok(())
}
