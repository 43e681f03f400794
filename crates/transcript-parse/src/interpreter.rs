//! Content stream interpreter.
//!
//! Walks a page's operators, maintaining graphics and text state, and turns
//! text-showing operators (Tj, TJ, ', ") into [`Token`]s. Each string
//! advances the text position by its glyph widths, so a string that starts
//! where the previous one ended on the same baseline continues the same
//! token. Form XObjects invoked with `Do` are interpreted recursively.

use std::collections::HashMap;

use transcript_core::{ExtractResult, ExtractWarning, ExtractWarningCode, Token};

use crate::cmap::ToUnicodeCMap;
use crate::content::{Operand, Operator, tokenize};
use crate::encoding::{FontEncoding, StandardEncoding};
use crate::error::BackendError;
use crate::font_metrics::GlyphWidths;
use crate::text_state::{GraphicsState, Matrix, TextState};

/// Nesting limit for Form XObjects.
pub const MAX_FORM_DEPTH: usize = 12;

/// A TJ adjustment beyond this many thousandths of a text space unit
/// separates words.
const WORD_GAP: f64 = 200.0;

/// Horizontal distance (device units) within which a string continues the
/// previous one.
const X_TOLERANCE: f64 = 3.0;

/// Baseline drift allowed between joined strings.
const Y_TOLERANCE: f64 = 1.0;

/// How a font's string bytes become text.
#[derive(Debug, Clone, Default)]
struct FontDecoder {
    encoding: FontEncoding,
    to_unicode: Option<ToUnicodeCMap>,
    /// Type0 font: multi-byte codes.
    composite: bool,
    widths: GlyphWidths,
}

impl FontDecoder {
    fn decode(&self, bytes: &[u8]) -> String {
        let mut out = String::new();
        match (&self.to_unicode, self.composite) {
            (Some(cmap), true) => {
                for code in cmap.codes(bytes) {
                    out.push_str(cmap.lookup(code).unwrap_or("\u{FFFD}"));
                }
            }
            (Some(cmap), false) => {
                for &b in bytes {
                    match cmap.lookup(u32::from(b)) {
                        Some(text) => out.push_str(text),
                        None => out.push(self.encoding.decode(b).unwrap_or('\u{FFFD}')),
                    }
                }
            }
            (None, true) => {
                for pair in bytes.chunks(2) {
                    let code = pair.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
                    out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                }
            }
            (None, false) => out = self.encoding.decode_bytes(bytes),
        }
        out
    }

    fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        match (&self.to_unicode, self.composite) {
            (Some(cmap), true) => cmap.codes(bytes).collect(),
            (None, true) => bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
                .collect(),
            (_, false) => bytes.iter().map(|&b| u32::from(b)).collect(),
        }
    }

    /// Text space displacement of showing `bytes`. Word spacing applies to
    /// the single-byte space only.
    fn advance(&self, bytes: &[u8], ts: &TextState) -> f64 {
        self.codes(bytes)
            .into_iter()
            .map(|code| ts.glyph_advance(self.widths.width(code), !self.composite && code == 32))
            .sum()
    }
}

/// Text shown so far that later strings may still continue.
#[derive(Debug)]
struct Fragment {
    text: String,
    top: f64,
    /// Device-space x where the text position ended.
    end_x: f64,
}

/// Resolve a potentially indirect object.
pub(crate) fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a lopdf::Object) -> &'a lopdf::Object {
    match obj {
        lopdf::Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode a stream, decompressing if it has a filter.
pub(crate) fn decode_stream(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

/// Look up `/Resources/<category>/<name>`.
fn resource<'a>(
    doc: &'a lopdf::Document,
    resources: &'a lopdf::Dictionary,
    category: &[u8],
    name: &str,
) -> Option<&'a lopdf::Object> {
    let group = resolve(doc, resources.get(category).ok()?).as_dict().ok()?;
    Some(resolve(doc, group.get(name.as_bytes()).ok()?))
}

/// Interprets the content of one page and collects its tokens.
pub(crate) struct PageInterpreter<'a> {
    doc: &'a lopdf::Document,
    page_index: usize,
    /// Upper edge of the page in default user space.
    page_top: f64,
    tokens: Vec<Token>,
    pending: Option<Fragment>,
    warnings: Vec<ExtractWarning>,
}

impl<'a> PageInterpreter<'a> {
    pub(crate) fn new(doc: &'a lopdf::Document, page_index: usize, page_top: f64) -> Self {
        Self {
            doc,
            page_index,
            page_top,
            tokens: Vec::new(),
            pending: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> ExtractResult<Vec<Token>> {
        self.flush();
        ExtractResult::with_warnings(self.tokens, self.warnings)
    }

    fn warn(&mut self, code: ExtractWarningCode, description: String) {
        #[cfg(feature = "tracing")]
        tracing::debug!(page = self.page_index, %code, "{description}");
        self.warnings
            .push(ExtractWarning::with_code(code, description).on_page(self.page_index));
    }

    /// Interpret one content stream with the given resources.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed content or when Form XObjects nest
    /// deeper than [`MAX_FORM_DEPTH`].
    pub(crate) fn run(
        &mut self,
        content: &[u8],
        resources: &lopdf::Dictionary,
        depth: usize,
        gs: &mut GraphicsState,
        ts: &mut TextState,
    ) -> Result<(), BackendError> {
        if depth > MAX_FORM_DEPTH {
            return Err(BackendError::Content(format!(
                "Form XObject nesting exceeds {MAX_FORM_DEPTH} levels"
            )));
        }

        let operators = tokenize(content)?;
        let mut fonts: HashMap<String, FontDecoder> = HashMap::new();

        for op in &operators {
            match op.name.as_str() {
                "q" => gs.save(ts),
                "Q" => gs.restore(ts),
                "cm" => {
                    if let Some(m) = op.matrix() {
                        gs.concat(Matrix::from_array(m));
                    }
                }
                "BT" => ts.begin_text(),
                "ET" => ts.end_text(),
                "Tf" => {
                    let name = op.operands.first().and_then(Operand::as_name).unwrap_or("");
                    ts.set_font(name, op.number(1).unwrap_or(0.0));
                    if !fonts.contains_key(name) {
                        let decoder = self.load_font(resources, name);
                        fonts.insert(name.to_string(), decoder);
                    }
                }
                "Tm" => {
                    if let Some(m) = op.matrix() {
                        ts.set_text_matrix(Matrix::from_array(m));
                    }
                }
                "Td" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        ts.move_text_position(tx, ty);
                    }
                }
                "TD" => {
                    if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                        ts.move_text_position_and_set_leading(tx, ty);
                    }
                }
                "T*" => ts.move_to_next_line(),
                "TL" => {
                    if let Some(v) = op.number(0) {
                        ts.leading = v;
                    }
                }
                "Ts" => {
                    if let Some(v) = op.number(0) {
                        ts.rise = v;
                    }
                }
                "Tc" => {
                    if let Some(v) = op.number(0) {
                        ts.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = op.number(0) {
                        ts.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = op.number(0) {
                        ts.horizontal_scaling = v;
                    }
                }
                "Tj" => self.show(op.operands.first(), &fonts, gs, ts),
                "TJ" => self.show_array(op, &fonts, gs, ts),
                "'" => {
                    ts.move_to_next_line();
                    self.show(op.operands.first(), &fonts, gs, ts);
                }
                "\"" => {
                    if let (Some(aw), Some(ac)) = (op.number(0), op.number(1)) {
                        ts.word_spacing = aw;
                        ts.char_spacing = ac;
                    }
                    ts.move_to_next_line();
                    self.show(op.operands.get(2), &fonts, gs, ts);
                }
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        self.run_xobject(resources, name, depth, gs, ts)?;
                    }
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn load_font(&mut self, resources: &lopdf::Dictionary, name: &str) -> FontDecoder {
        let Some(font) = resource(self.doc, resources, b"Font", name).and_then(|o| o.as_dict().ok())
        else {
            self.warn(
                ExtractWarningCode::MissingFont,
                format!("font /{name} not found in resources, decoding as WinAnsi"),
            );
            return FontDecoder::default();
        };

        let composite = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Type0");

        let to_unicode = match font.get(b"ToUnicode") {
            Ok(obj) => match resolve(self.doc, obj).as_stream() {
                Ok(stream) => match decode_stream(stream).and_then(|d| ToUnicodeCMap::parse(&d)) {
                    Ok(cmap) => Some(cmap),
                    Err(e) => {
                        self.warn(
                            ExtractWarningCode::EncodingFallback,
                            format!("unreadable ToUnicode map for font /{name}: {e}"),
                        );
                        None
                    }
                },
                Err(_) => None,
            },
            Err(_) => None,
        };

        if composite && to_unicode.is_none() {
            self.warn(
                ExtractWarningCode::EncodingFallback,
                format!("composite font /{name} has no ToUnicode map, reading codes as UCS-2"),
            );
        }

        let widths = if composite {
            GlyphWidths::from_composite_font(self.doc, font)
        } else {
            GlyphWidths::from_simple_font(self.doc, font)
        };

        FontDecoder {
            encoding: self.simple_encoding(font),
            to_unicode,
            composite,
            widths,
        }
    }

    /// `/Encoding` as a name or as a dictionary with `/Differences`.
    fn simple_encoding(&self, font: &lopdf::Dictionary) -> FontEncoding {
        let Ok(obj) = font.get(b"Encoding") else {
            return FontEncoding::default();
        };
        let obj = resolve(self.doc, obj);

        if let Ok(name) = obj.as_name() {
            return StandardEncoding::from_name(name)
                .map(FontEncoding::from_standard)
                .unwrap_or_default();
        }

        let Ok(dict) = obj.as_dict() else {
            return FontEncoding::default();
        };
        let mut encoding = dict
            .get(b"BaseEncoding")
            .ok()
            .and_then(|o| o.as_name().ok())
            .and_then(StandardEncoding::from_name)
            .map(FontEncoding::from_standard)
            .unwrap_or_default();

        if let Ok(differences) = dict
            .get(b"Differences")
            .and_then(|o| resolve(self.doc, o).as_array())
        {
            let mut code: Option<i64> = None;
            let mut pairs: Vec<(u8, String)> = Vec::new();
            for item in differences {
                match item {
                    lopdf::Object::Integer(i) => code = Some(*i),
                    lopdf::Object::Name(glyph) => {
                        if let Some(c) = code {
                            if let Ok(byte) = u8::try_from(c) {
                                pairs.push((byte, String::from_utf8_lossy(glyph).into_owned()));
                            }
                            code = Some(c + 1);
                        }
                    }
                    _ => {}
                }
            }
            encoding.apply_differences(pairs.iter().map(|(c, g)| (*c, g.as_str())));
        }

        encoding
    }

    fn current_font<'f>(
        fonts: &'f HashMap<String, FontDecoder>,
        ts: &TextState,
    ) -> Option<&'f FontDecoder> {
        fonts.get(&ts.font_name)
    }

    fn show(
        &mut self,
        operand: Option<&Operand>,
        fonts: &HashMap<String, FontDecoder>,
        gs: &GraphicsState,
        ts: &mut TextState,
    ) {
        let Some(bytes) = operand.and_then(Operand::as_bytes) else {
            return;
        };
        let default_font = FontDecoder::default();
        let font = Self::current_font(fonts, ts).unwrap_or(&default_font);

        let start = gs.text_origin(ts);
        let text = font.decode(bytes);
        let tx = font.advance(bytes, ts);
        ts.advance(tx);
        let (end_x, _) = gs.text_origin(ts);
        self.emit(text, start, end_x);
    }

    /// TJ: strings joined, with a space wherever the adjustment opens a
    /// word-sized gap.
    fn show_array(
        &mut self,
        op: &Operator,
        fonts: &HashMap<String, FontDecoder>,
        gs: &GraphicsState,
        ts: &mut TextState,
    ) {
        let Some(Operand::Array(items)) = op.operands.first() else {
            return;
        };
        let default_font = FontDecoder::default();
        let font = Self::current_font(fonts, ts).unwrap_or(&default_font);

        let start = gs.text_origin(ts);
        let mut text = String::new();
        for item in items {
            match item {
                Operand::String(bytes) => {
                    text.push_str(&font.decode(bytes));
                    let tx = font.advance(bytes, ts);
                    ts.advance(tx);
                }
                Operand::Number(adjust) => {
                    if -adjust > WORD_GAP && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    let tx = ts.adjustment_advance(*adjust);
                    ts.advance(tx);
                }
                _ => {}
            }
        }
        let (end_x, _) = gs.text_origin(ts);
        self.emit(text, start, end_x);
    }

    /// Continue the pending fragment when `text` starts on its baseline
    /// where it ended; otherwise start a new one.
    fn emit(&mut self, text: String, start: (f64, f64), end_x: f64) {
        if text.is_empty() {
            return;
        }
        let top = self.page_top - start.1;
        if let Some(pending) = self.pending.as_mut() {
            if (pending.top - top).abs() <= Y_TOLERANCE
                && (start.0 - pending.end_x).abs() <= X_TOLERANCE
            {
                pending.text.push_str(&text);
                pending.end_x = end_x;
                return;
            }
        }
        self.flush();
        self.pending = Some(Fragment { text, top, end_x });
    }

    fn flush(&mut self) {
        if let Some(fragment) = self.pending.take() {
            let trimmed = fragment.text.trim();
            if !trimmed.is_empty() {
                self.tokens.push(Token::new(trimmed, fragment.top));
            }
        }
    }

    fn run_xobject(
        &mut self,
        resources: &lopdf::Dictionary,
        name: &str,
        depth: usize,
        gs: &mut GraphicsState,
        ts: &mut TextState,
    ) -> Result<(), BackendError> {
        let Some(stream) = resource(self.doc, resources, b"XObject", name)
            .and_then(|o| o.as_stream().ok())
        else {
            return Ok(());
        };
        let is_form = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|s| s == b"Form");
        if !is_form {
            return Ok(());
        }

        let content = decode_stream(stream)?;
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|o| resolve(self.doc, o).as_dict().ok())
            .unwrap_or(resources);

        gs.save(ts);
        if let Ok(matrix) = stream.dict.get(b"Matrix").and_then(|o| o.as_array()) {
            let values: Option<Vec<f64>> = matrix.iter().map(object_to_f64).collect();
            if let Some([a, b, c, d, e, f]) = values.as_deref() {
                gs.concat(Matrix::new(*a, *b, *c, *d, *e, *f));
            }
        }
        let result = self.run(&content, form_resources, depth + 1, gs, ts);
        gs.restore(ts);
        result
    }
}

/// Numeric lopdf object as `f64`.
pub(crate) fn object_to_f64(obj: &lopdf::Object) -> Option<f64> {
    match obj {
        lopdf::Object::Integer(i) => Some(*i as f64),
        lopdf::Object::Real(f) => Some(f64::from(*f)),
        _ => None,
    }
}
