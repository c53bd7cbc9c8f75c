// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout engine: walks one page's OCR tree and turns it into painter calls.
//
// Two line-spacing policies exist. Line mode trusts the OCR geometry: every
// word is drawn at its detected x on its line's detected baseline. Uniform mode
// spreads a paragraph's lines evenly over the paragraph height and runs a
// horizontal cursor through each line, snapping back to the detected x only
// where the scan shows a real gap.

use satzwerk_core::error::Result;
use satzwerk_core::{ExportSettings, NodeClass, OcrNode};
use tracing::debug;

use crate::painter::Painter;
use crate::source::PageRaster;

/// Per-page traversal state. Holds only borrowed, read-only inputs.
pub struct PageLayout<'a> {
    settings: &'a ExportSettings,
    raster: &'a PageRaster,
    image_scale: f64,
}

impl<'a> PageLayout<'a> {
    /// `raster` is the page scan at output resolution; `image_scale` maps
    /// source pixels into it.
    pub fn new(settings: &'a ExportSettings, raster: &'a PageRaster, image_scale: f64) -> Self {
        Self {
            settings,
            raster,
            image_scale,
        }
    }

    /// Paint `node` and its enabled descendants.
    pub fn render<P: Painter + ?Sized>(&self, painter: &mut P, node: &OcrNode) -> Result<()> {
        if !node.enabled {
            return Ok(());
        }
        match node.class {
            NodeClass::Paragraph if self.settings.uniformize_line_spacing => {
                self.render_uniform_paragraph(painter, node);
                Ok(())
            }
            NodeClass::Line if !self.settings.uniformize_line_spacing => {
                self.render_line(painter, node);
                Ok(())
            }
            NodeClass::Graphic if !self.settings.overlay_mode => {
                self.render_graphic(painter, node)
            }
            _ => {
                for child in &node.children {
                    self.render(painter, child)?;
                }
                Ok(())
            }
        }
    }

    fn apply_word_font<P: Painter + ?Sized>(&self, painter: &mut P, word: &OcrNode) {
        if self.settings.use_detected_font_sizes {
            painter.set_font_size(word.font_size_pt * self.settings.detected_font_scaling());
        }
    }

    /// Lines evenly spaced over the paragraph, all on the first line's
    /// baseline offset.
    fn render_uniform_paragraph<P: Painter + ?Sized>(&self, painter: &mut P, paragraph: &OcrNode) {
        let Some(first) = paragraph.children.first() else {
            debug!(title = %paragraph.title, "Paragraph without lines");
            return;
        };
        let line_count = paragraph.children.len() as f64;
        let y_step = f64::from(paragraph.bbox.height) / line_count;
        let baseline = f64::from(first.baseline);
        let top = f64::from(paragraph.bbox.top());
        let left = f64::from(paragraph.bbox.left());
        let preserve = f64::from(self.settings.preserve_space_threshold);

        for (index, line) in paragraph.children.iter().enumerate() {
            if !line.enabled {
                continue;
            }
            let y = top + (index + 1) as f64 * y_step + baseline;
            let mut x = left;
            let mut prev_word_right = left;
            for word in line.children.iter().filter(|word| word.enabled) {
                self.apply_word_font(painter, word);
                let word_left = f64::from(word.bbox.left());
                if word_left - prev_word_right > preserve * painter.average_char_width() {
                    x = word_left;
                }
                painter.draw_text(x, y, &word.text);
                prev_word_right = f64::from(word.bbox.right());
                x += painter.text_width(&format!("{} ", word.text));
            }
        }
    }

    /// Words at their detected positions on the line's detected baseline.
    fn render_line<P: Painter + ?Sized>(&self, painter: &mut P, line: &OcrNode) {
        let y = f64::from(line.bbox.bottom() + line.baseline);
        for word in line.children.iter().filter(|word| word.enabled) {
            self.apply_word_font(painter, word);
            painter.draw_text(f64::from(word.bbox.left()), y, &word.text);
        }
    }

    fn render_graphic<P: Painter + ?Sized>(&self, painter: &mut P, graphic: &OcrNode) -> Result<()> {
        let region = graphic.bbox.scaled(self.image_scale);
        let image = self.raster.selection(region);
        if image.width() == 0 || image.height() == 0 {
            debug!(title = %graphic.title, ?region, "Graphic outside the page raster");
            return Ok(());
        }
        painter.draw_image(graphic.bbox, &image, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, RecordingPainter, grey_raster, two_line_page};
    use satzwerk_core::{ColorFormat, Compression, Rect, SatzwerkError};

    fn uniform() -> ExportSettings {
        ExportSettings {
            uniformize_line_spacing: true,
            ..ExportSettings::default()
        }
    }

    fn render(settings: &ExportSettings, node: &OcrNode) -> RecordingPainter {
        let raster = PageRaster::new(grey_raster(2000, 1000));
        let mut painter = RecordingPainter::new(12.0);
        PageLayout::new(settings, &raster, 2.0)
            .render(&mut painter, node)
            .unwrap();
        painter
    }

    fn word(x: i32, text: &str) -> OcrNode {
        OcrNode::word(Rect::new(x, 100, 40, 20), text, 10.0)
    }

    #[test]
    fn uniform_lines_are_evenly_spaced() {
        let page = two_line_page("p1");
        let painter = render(&uniform(), &page.root);
        let ys: Vec<f64> = painter.texts().iter().map(|t| t.1).collect();
        // top 200, height 120, two lines
        assert_eq!(ys, vec![260.0, 260.0, 320.0, 320.0]);
    }

    #[test]
    fn uniform_lines_share_the_first_baseline() {
        let paragraph = OcrNode::paragraph(
            Rect::new(0, 0, 300, 90),
            vec![
                OcrNode::line(Rect::new(0, 0, 300, 30), -4, vec![word(0, "a")]),
                OcrNode::line(Rect::new(0, 30, 300, 30), -9, vec![word(0, "b")]),
                OcrNode::line(Rect::new(0, 60, 300, 30), 2, vec![word(0, "c")]),
            ],
        );
        let painter = render(&uniform(), &paragraph);
        let ys: Vec<f64> = painter.texts().iter().map(|t| t.1).collect();
        assert_eq!(ys, vec![26.0, 56.0, 86.0]);
    }

    #[test]
    fn uniform_cursor_accumulates_text_width() {
        let page = two_line_page("p1");
        let painter = render(&uniform(), &page.root);
        let texts = painter.texts();
        // "Hello " at 11pt is 6 * 5.5 wide; the 21px gap to "world" stays
        // under 4 * 6.5.
        assert_eq!(texts[0].0, 100.0);
        assert_eq!(texts[1].0, 133.0);
        assert_eq!(texts[2].0, 100.0);
        assert_eq!(texts[3].0, 138.5);
    }

    #[test]
    fn wide_gaps_snap_to_detected_position() {
        let paragraph = OcrNode::paragraph(
            Rect::new(0, 100, 600, 20),
            vec![OcrNode::line(
                Rect::new(0, 100, 600, 20),
                0,
                vec![word(0, "left"), word(45, "near"), word(400, "far")],
            )],
        );
        let painter = render(&uniform(), &paragraph);
        let xs: Vec<f64> = painter.texts().iter().map(|t| t.0).collect();
        // 10pt glyphs are 5 wide: threshold 20. "left " advances 25.
        assert_eq!(xs, vec![0.0, 25.0, 400.0]);
    }

    #[test]
    fn preserve_threshold_scales_with_setting() {
        let paragraph = OcrNode::paragraph(
            Rect::new(0, 100, 600, 20),
            vec![OcrNode::line(
                Rect::new(0, 100, 600, 20),
                0,
                vec![word(0, "a"), word(80, "b")],
            )],
        );
        let strict = ExportSettings {
            preserve_space_threshold: 100,
            ..uniform()
        };
        let xs: Vec<f64> = render(&strict, &paragraph).texts().iter().map(|t| t.0).collect();
        assert_eq!(xs, vec![0.0, 10.0]);
    }

    #[test]
    fn line_mode_uses_detected_geometry() {
        let page = two_line_page("p1");
        let painter = render(&ExportSettings::default(), &page.root);
        let texts = painter.texts();
        let positions: Vec<(f64, f64)> = texts.iter().map(|t| (t.0, t.1)).collect();
        // bottom() is inclusive: 200 + 50 - 1
        assert_eq!(
            positions,
            vec![(100.0, 249.0), (320.0, 249.0), (100.0, 309.0), (320.0, 309.0)]
        );
    }

    #[test]
    fn line_mode_applies_line_baseline() {
        let line = OcrNode::line(Rect::new(0, 0, 100, 40), -7, vec![word(13, "x")]);
        let painter = render(&ExportSettings::default(), &line);
        assert_eq!(painter.texts()[0].1, 32.0);
        assert_eq!(painter.texts()[0].0, 13.0);
    }

    #[test]
    fn detected_font_sizes_are_scaled() {
        let settings = ExportSettings {
            font_scale_percent: 150,
            ..ExportSettings::default()
        };
        let page = two_line_page("p1");
        let sizes: Vec<f64> = render(&settings, &page.root)
            .texts()
            .iter()
            .map(|t| t.3)
            .collect();
        assert_eq!(sizes, vec![16.5, 19.5, 16.5, 19.5]);
    }

    #[test]
    fn document_font_size_when_detection_is_off() {
        for uniformize in [false, true] {
            let settings = ExportSettings {
                use_detected_font_sizes: false,
                uniformize_line_spacing: uniformize,
                ..ExportSettings::default()
            };
            let page = two_line_page("p1");
            let painter = render(&settings, &page.root);
            assert!(!painter.calls.iter().any(|c| matches!(c, Call::FontSize(_))));
            assert!(painter.texts().iter().all(|t| t.3 == 12.0));
            assert_eq!(painter.texts().len(), 4);
        }
    }

    #[test]
    fn empty_paragraph_is_a_no_op() {
        let paragraph = OcrNode::paragraph(Rect::new(0, 0, 100, 100), Vec::new());
        for settings in [uniform(), ExportSettings::default()] {
            assert!(render(&settings, &paragraph).calls.is_empty());
        }
    }

    #[test]
    fn disabled_subtrees_are_silent() {
        let mut page = two_line_page("p1");
        page.root = OcrNode::page(
            Rect::new(0, 0, 1000, 500),
            vec![
                OcrNode::container(Rect::new(0, 0, 1000, 500), vec![page.root.clone()]).disabled(),
                OcrNode::graphic(Rect::new(0, 0, 10, 10)).disabled(),
            ],
        );
        for settings in [uniform(), ExportSettings::default()] {
            assert!(render(&settings, &page.root).calls.is_empty());
        }
    }

    #[test]
    fn disabled_words_and_lines_are_skipped() {
        let paragraph = OcrNode::paragraph(
            Rect::new(0, 0, 300, 60),
            vec![
                OcrNode::line(Rect::new(0, 0, 300, 30), 0, vec![word(0, "gone")]).disabled(),
                OcrNode::line(
                    Rect::new(0, 30, 300, 30),
                    0,
                    vec![word(0, "kept"), word(50, "hidden").disabled()],
                ),
            ],
        );
        let painter = render(&uniform(), &paragraph);
        let texts = painter.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].2, "kept");
        // the disabled first line keeps its slot
        assert_eq!(texts[0].1, 60.0);

        let line_mode = render(&ExportSettings::default(), &paragraph);
        let words: Vec<String> = line_mode.texts().into_iter().map(|t| t.2).collect();
        assert_eq!(words, vec!["kept".to_string()]);
    }

    #[test]
    fn graphics_are_cut_at_image_scale() {
        let graphic = OcrNode::graphic(Rect::new(10, 20, 100, 50));
        let painter = render(&ExportSettings::default(), &graphic);
        assert_eq!(
            painter.calls,
            vec![Call::Image {
                bbox: Rect::new(10, 20, 100, 50),
                width: 200,
                height: 100,
            }]
        );
    }

    #[test]
    fn overlay_suppresses_graphics() {
        let settings = ExportSettings {
            overlay_mode: true,
            ..ExportSettings::default()
        };
        let page = OcrNode::page(
            Rect::new(0, 0, 500, 500),
            vec![OcrNode::graphic(Rect::new(10, 20, 100, 50))],
        );
        assert!(render(&settings, &page).images().is_empty());
    }

    #[test]
    fn graphics_off_the_raster_are_skipped() {
        let graphic = OcrNode::graphic(Rect::new(1500, 900, 100, 50));
        assert!(render(&ExportSettings::default(), &graphic).calls.is_empty());
    }

    #[test]
    fn codec_faults_propagate() {
        let settings = ExportSettings {
            color_format: ColorFormat::Color,
            compression: Compression::Fax4,
            ..ExportSettings::default()
        };
        let raster = PageRaster::new(grey_raster(100, 100));
        let mut painter = RecordingPainter::new(12.0);
        let result = PageLayout::new(&settings, &raster, 1.0)
            .render(&mut painter, &OcrNode::graphic(Rect::new(0, 0, 10, 10)));
        assert!(matches!(
            result,
            Err(SatzwerkError::CodecConstraintViolation { .. })
        ));
        assert!(painter.calls.is_empty());
    }
}
