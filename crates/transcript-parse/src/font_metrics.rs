//! Glyph widths for advancing the text position.
//!
//! Simple fonts carry `/FirstChar` and `/Widths`, with `/MissingWidth` in the
//! font descriptor. Composite fonts carry `/DW` and `/W` on their descendant
//! font. Widths are in glyph space (1/1000 of text space).

use std::collections::HashMap;

use crate::interpreter::{object_to_f64, resolve};

/// Fallback width for simple fonts without a `/Widths` array.
const DEFAULT_SIMPLE_WIDTH: f64 = 600.0;

/// Default width of a composite font without `/DW`.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Width lookup for one font.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphWidths {
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: HashMap<u32, f64>,
    missing_width: f64,
}

impl Default for GlyphWidths {
    fn default() -> Self {
        Self::uniform(DEFAULT_SIMPLE_WIDTH)
    }
}

impl GlyphWidths {
    /// Every code has the same width.
    pub fn uniform(width: f64) -> Self {
        Self {
            first_char: 0,
            widths: Vec::new(),
            cid_widths: HashMap::new(),
            missing_width: width,
        }
    }

    /// Width of `code` in glyph space.
    pub fn width(&self, code: u32) -> f64 {
        if let Some(w) = self.cid_widths.get(&code) {
            return *w;
        }
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.missing_width)
    }

    /// Widths of a simple (single-byte) font dictionary.
    pub fn from_simple_font(doc: &lopdf::Document, font: &lopdf::Dictionary) -> Self {
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(object_to_f64)
            .map_or(0, |v| v.max(0.0) as u32);

        let widths: Vec<f64> = font
            .get(b"Widths")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|o| object_to_f64(resolve(doc, o)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| resolve(doc, o).as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(object_to_f64)
            .filter(|w| *w > 0.0)
            .unwrap_or(DEFAULT_SIMPLE_WIDTH);

        Self {
            first_char,
            widths,
            cid_widths: HashMap::new(),
            missing_width,
        }
    }

    /// Widths of a Type0 font, read from its first descendant.
    pub fn from_composite_font(doc: &lopdf::Document, font: &lopdf::Dictionary) -> Self {
        let descendant = font
            .get(b"DescendantFonts")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .and_then(|arr| arr.first())
            .and_then(|o| resolve(doc, o).as_dict().ok());

        let Some(descendant) = descendant else {
            return Self::uniform(DEFAULT_CID_WIDTH);
        };

        let default_width = descendant
            .get(b"DW")
            .ok()
            .and_then(object_to_f64)
            .unwrap_or(DEFAULT_CID_WIDTH);

        let cid_widths = descendant
            .get(b"W")
            .ok()
            .and_then(|o| resolve(doc, o).as_array().ok())
            .map(|arr| parse_w_array(doc, arr))
            .unwrap_or_default();

        Self {
            first_char: 0,
            widths: Vec::new(),
            cid_widths,
            missing_width: default_width,
        }
    }
}

/// `/W` entries come as `c [w1 w2 ...]` or `c_first c_last w`.
fn parse_w_array(doc: &lopdf::Document, items: &[lopdf::Object]) -> HashMap<u32, f64> {
    let mut out = HashMap::new();
    let mut i = 0;
    while i < items.len() {
        let Some(start) = object_to_f64(resolve(doc, &items[i])) else {
            break;
        };
        let start = start.max(0.0) as u32;
        match items.get(i + 1).map(|o| resolve(doc, o)) {
            Some(lopdf::Object::Array(run)) => {
                for (offset, w) in run.iter().enumerate() {
                    if let Some(w) = object_to_f64(resolve(doc, w)) {
                        out.insert(start + offset as u32, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let (Some(end), Some(w)) = (
                    object_to_f64(end),
                    items.get(i + 2).and_then(|o| object_to_f64(resolve(doc, o))),
                ) else {
                    break;
                };
                for code in start..=end.max(0.0) as u32 {
                    out.insert(code, w);
                }
                i += 3;
            }
            None => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, dictionary};

    #[test]
    fn simple_widths_with_first_char() {
        let doc = lopdf::Document::with_version("1.5");
        let font = dictionary! {
            "FirstChar" => Object::Integer(44),
            "Widths" => vec![Object::Integer(278), Object::Integer(333), Object::Integer(278)],
        };
        let widths = GlyphWidths::from_simple_font(&doc, &font);
        assert_eq!(widths.width(44), 278.0);
        assert_eq!(widths.width(45), 333.0);
        assert_eq!(widths.width(43), DEFAULT_SIMPLE_WIDTH);
        assert_eq!(widths.width(47), DEFAULT_SIMPLE_WIDTH);
    }

    #[test]
    fn missing_width_from_descriptor() {
        let doc = lopdf::Document::with_version("1.5");
        let font = dictionary! {
            "FontDescriptor" => dictionary! { "MissingWidth" => Object::Integer(250) },
        };
        assert_eq!(GlyphWidths::from_simple_font(&doc, &font).width(65), 250.0);
    }

    #[test]
    fn composite_w_array_forms() {
        let doc = lopdf::Document::with_version("1.5");
        let font = dictionary! {
            "Subtype" => "Type0",
            "DescendantFonts" => vec![Object::Dictionary(dictionary! {
                "DW" => Object::Integer(500),
                "W" => vec![
                    Object::Integer(1),
                    Object::Array(vec![Object::Integer(300), Object::Integer(400)]),
                    Object::Integer(10),
                    Object::Integer(12),
                    Object::Integer(700),
                ],
            })],
        };
        let widths = GlyphWidths::from_composite_font(&doc, &font);
        assert_eq!(widths.width(1), 300.0);
        assert_eq!(widths.width(2), 400.0);
        assert_eq!(widths.width(11), 700.0);
        assert_eq!(widths.width(3), 500.0);
    }

    #[test]
    fn composite_without_descendant_uses_full_em() {
        let doc = lopdf::Document::with_version("1.5");
        let widths = GlyphWidths::from_composite_font(&doc, &lopdf::Dictionary::new());
        assert_eq!(widths.width(0x41), DEFAULT_CID_WIDTH);
    }
}
