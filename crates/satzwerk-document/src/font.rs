// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font resolution and metrics for the text layer.
//
// The document backend references one of the PDF standard fonts, so no font
// program is embedded. Advance widths come from the Adobe font metrics of
// those fonts (1/1000 em) and are shared with the preview backend, which keeps
// preview and document placement identical.

use satzwerk_core::FontSelection;
use satzwerk_core::error::{Result, SatzwerkError};
use tracing::debug;

/// Advance widths of Helvetica for U+0020..=U+007E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Advance widths of Helvetica-Bold for U+0020..=U+007E, in 1/1000 em.
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside the tables.
const FALLBACK_WIDTH: u16 = 556;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Widths {
    Table(&'static [u16; 95]),
    Fixed(u16),
}

/// Advance-width metrics of a resolved font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    widths: Widths,
}

impl FontMetrics {
    fn glyph_units(&self, c: char) -> u16 {
        match self.widths {
            Widths::Fixed(width) => width,
            Widths::Table(table) => match c {
                ' '..='~' => table[c as usize - 0x20],
                _ => FALLBACK_WIDTH,
            },
        }
    }

    /// Advance of one character at `size_pt`, in points.
    pub fn char_width(&self, c: char, size_pt: f64) -> f64 {
        f64::from(self.glyph_units(c)) * size_pt / 1000.0
    }

    /// Average glyph width at `size_pt`, in points. Like most layout code this
    /// uses the advance of a lower-case `x`.
    pub fn average_char_width(&self, size_pt: f64) -> f64 {
        self.char_width('x', size_pt)
    }

    /// Advance of a whole string at `size_pt`, in points.
    pub fn string_width(&self, text: &str, size_pt: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_units(c))).sum();
        f64::from(units) * size_pt / 1000.0
    }
}

/// A usable font: the PDF base font name plus its metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFont {
    pub base_font: &'static str,
    pub metrics: FontMetrics,
}

/// Turns a font selection into a font the document backend can use.
pub trait FontResolver {
    fn resolve(&self, selection: &FontSelection) -> Result<ResolvedFont>;
}

/// Resolves the sans-serif and monospaced PDF standard fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFontResolver;

impl FontResolver for BuiltinFontResolver {
    fn resolve(&self, selection: &FontSelection) -> Result<ResolvedFont> {
        let family = selection.family.trim().to_ascii_lowercase();
        let resolved = match family.as_str() {
            "helvetica" | "arial" | "sans" | "sans-serif" => {
                let (base_font, table) = match (selection.bold, selection.italic) {
                    (false, false) => ("Helvetica", &HELVETICA_WIDTHS),
                    (true, false) => ("Helvetica-Bold", &HELVETICA_BOLD_WIDTHS),
                    (false, true) => ("Helvetica-Oblique", &HELVETICA_WIDTHS),
                    (true, true) => ("Helvetica-BoldOblique", &HELVETICA_BOLD_WIDTHS),
                };
                ResolvedFont {
                    base_font,
                    metrics: FontMetrics {
                        widths: Widths::Table(table),
                    },
                }
            }
            "courier" | "monospace" => {
                let base_font = match (selection.bold, selection.italic) {
                    (false, false) => "Courier",
                    (true, false) => "Courier-Bold",
                    (false, true) => "Courier-Oblique",
                    (true, true) => "Courier-BoldOblique",
                };
                ResolvedFont {
                    base_font,
                    metrics: FontMetrics {
                        widths: Widths::Fixed(600),
                    },
                }
            }
            _ => {
                return Err(SatzwerkError::BackendResource(format!(
                    "font family '{}' is not available",
                    selection.family
                )));
            }
        };
        debug!(family = %selection.family, base_font = resolved.base_font, "Font resolved");
        Ok(resolved)
    }
}
