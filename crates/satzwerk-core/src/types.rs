// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: source-pixel geometry and the OCR layout tree.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Axis-aligned rectangle in source-scan pixels.
///
/// `right()` and `bottom()` are inclusive edges, so a 10px wide box starting at
/// x = 0 has `right() == 9`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width).saturating_sub(1)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height).saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Scale every component, truncating towards zero.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            x: (f64::from(self.x) * factor) as i32,
            y: (f64::from(self.y) * factor) as i32,
            width: (f64::from(self.width) * factor) as i32,
            height: (f64::from(self.height) * factor) as i32,
        }
    }
}

/// Layout role of an OCR tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeClass {
    Page,
    Paragraph,
    Line,
    Word,
    Graphic,
    /// Any other grouping (columns, blocks, areas).
    Container,
}

/// One unit of the OCR layout tree.
///
/// Paragraph children are lines and line children are words. Graphic nodes
/// have no children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrNode {
    pub class: NodeClass,
    /// Free-form identifier carried through from the OCR output.
    #[serde(default)]
    pub title: String,
    pub bbox: Rect,
    /// Offset from the box bottom to the text baseline (lines and words).
    #[serde(default)]
    pub baseline: i32,
    /// Detected font size in points (words).
    #[serde(default)]
    pub font_size_pt: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub children: Vec<OcrNode>,
}

fn enabled_by_default() -> bool {
    true
}

impl OcrNode {
    pub fn new(class: NodeClass, bbox: Rect) -> Self {
        Self {
            class,
            title: String::new(),
            bbox,
            baseline: 0,
            font_size_pt: 0.0,
            text: String::new(),
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn page(bbox: Rect, children: Vec<OcrNode>) -> Self {
        Self::new(NodeClass::Page, bbox).with_children(children)
    }

    pub fn container(bbox: Rect, children: Vec<OcrNode>) -> Self {
        Self::new(NodeClass::Container, bbox).with_children(children)
    }

    pub fn paragraph(bbox: Rect, lines: Vec<OcrNode>) -> Self {
        Self::new(NodeClass::Paragraph, bbox).with_children(lines)
    }

    pub fn line(bbox: Rect, baseline: i32, words: Vec<OcrNode>) -> Self {
        Self {
            baseline,
            ..Self::new(NodeClass::Line, bbox).with_children(words)
        }
    }

    pub fn word(bbox: Rect, text: impl Into<String>, font_size_pt: f64) -> Self {
        Self {
            text: text.into(),
            font_size_pt,
            ..Self::new(NodeClass::Word, bbox)
        }
    }

    pub fn graphic(bbox: Rect) -> Self {
        Self::new(NodeClass::Graphic, bbox)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_children(mut self, children: Vec<OcrNode>) -> Self {
        self.children = children;
        self
    }

    /// Mark this node (and therefore its subtree) as excluded from output.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// One scanned page and its OCR tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    /// Display name used when reporting failures.
    pub title: String,
    pub source_file: PathBuf,
    /// 1-based page index inside `source_file`.
    #[serde(default = "first_page")]
    pub page_number: u32,
    pub source_dpi: u32,
    /// Rotation in degrees applied to the source scan before OCR.
    #[serde(default)]
    pub angle: f64,
    pub bbox: Rect,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub root: OcrNode,
}

fn first_page() -> u32 {
    1
}

impl OcrPage {
    /// Source pixels to output points.
    pub fn doc_scale(&self) -> f64 {
        POINTS_PER_INCH / f64::from(self.source_dpi)
    }

    /// Source pixels to pixels of a raster rendered at `output_dpi`.
    pub fn image_scale(&self, output_dpi: u32) -> f64 {
        f64::from(output_dpi) / f64::from(self.source_dpi)
    }

    /// Page size in points.
    pub fn size_pt(&self) -> (f64, f64) {
        let scale = self.doc_scale();
        (
            f64::from(self.bbox.width) * scale,
            f64::from(self.bbox.height) * scale,
        )
    }
}

/// A whole OCR result: the ordered list of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrDocument {
    pub pages: Vec<OcrPage>,
}

impl OcrDocument {
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
