//! Content stream lexer.
//!
//! Splits decoded page content into [`Operator`]s, each carrying the
//! operands that preceded it. Only the object kinds that can appear in a
//! content stream are recognized; inline image data is skipped.

use crate::error::BackendError;

/// A content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer or real number.
    Number(f64),
    /// Name object, without the leading `/`.
    Name(String),
    /// Literal `(...)` or hex `<...>` string, as raw bytes.
    String(Vec<u8>),
    Array(Vec<Operand>),
    Boolean(bool),
    Null,
    /// Inline dictionary (marked-content properties).
    Dictionary(Vec<(String, Operand)>),
}

impl Operand {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Operand::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::String(s) => Some(s),
            _ => None,
        }
    }
}

/// An operator with its operands, e.g. `72 720 Td`.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Operator {
    /// Numeric operand at `index`, if present.
    pub fn number(&self, index: usize) -> Option<f64> {
        self.operands.get(index).and_then(Operand::as_number)
    }

    /// All six operands of a matrix operator (`cm`, `Tm`).
    pub fn matrix(&self) -> Option<[f64; 6]> {
        let mut values = [0.0; 6];
        for (i, slot) in values.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Some(values)
    }
}

/// Lex a content stream into operators.
///
/// # Errors
///
/// Returns [`BackendError::Content`] for unterminated strings, arrays or
/// dictionaries and for stray closing delimiters.
pub fn tokenize(input: &[u8]) -> Result<Vec<Operator>, BackendError> {
    let mut lexer = Lexer { input, pos: 0 };
    let mut ops = Vec::new();
    let mut stack = Vec::new();

    while let Some(item) = lexer.next_item()? {
        match item {
            Item::Operand(operand) => stack.push(operand),
            Item::Keyword(word) if word == "BI" => {
                lexer.skip_inline_image();
                stack.clear();
            }
            Item::Keyword(word) => ops.push(Operator {
                name: word,
                operands: std::mem::take(&mut stack),
            }),
        }
    }

    Ok(ops)
}

enum Item {
    Operand(Operand),
    Keyword(String),
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | 0x0C | 0x00)
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl Lexer<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn skip_blank(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    fn next_item(&mut self) -> Result<Option<Item>, BackendError> {
        loop {
            self.skip_blank();
            let Some(b) = self.peek() else {
                return Ok(None);
            };
            let item = match b {
                b'a'..=b'z' | b'A'..=b'Z' | b'*' | b'\'' | b'"' => {
                    let word = self.keyword();
                    match word.as_str() {
                        "true" => Item::Operand(Operand::Boolean(true)),
                        "false" => Item::Operand(Operand::Boolean(false)),
                        "null" => Item::Operand(Operand::Null),
                        _ => Item::Keyword(word),
                    }
                }
                b']' | b')' | b'}' => {
                    return Err(BackendError::Content(format!(
                        "unexpected '{}' at offset {}",
                        b as char, self.pos
                    )));
                }
                b'>' => {
                    return Err(BackendError::Content(format!(
                        "unexpected '>' at offset {}",
                        self.pos
                    )));
                }
                b'{' => {
                    // PostScript calculator braces never carry text; skip.
                    self.pos += 1;
                    continue;
                }
                _ => match self.operand()? {
                    Some(operand) => Item::Operand(operand),
                    None => {
                        self.pos += 1;
                        continue;
                    }
                },
            };
            return Ok(Some(item));
        }
    }

    /// Parse one operand at the current position, or `None` for an
    /// unrecognized byte.
    fn operand(&mut self) -> Result<Option<Operand>, BackendError> {
        let Some(b) = self.peek() else {
            return Ok(None);
        };
        let operand = match b {
            b'(' => Operand::String(self.literal_string()?),
            b'<' if self.peek_at(1) == Some(b'<') => Operand::Dictionary(self.dictionary()?),
            b'<' => Operand::String(self.hex_string()?),
            b'[' => Operand::Array(self.array()?),
            b'/' => Operand::Name(self.name()),
            b'0'..=b'9' | b'+' | b'-' | b'.' => Operand::Number(self.number()),
            _ => return Ok(None),
        };
        Ok(Some(operand))
    }

    fn keyword(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn name(&mut self) -> String {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        let raw = &self.input[start..self.pos];
        let mut out = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                if let (Some(hi), Some(lo)) = (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    out.push((hi << 4) | lo);
                    i += 3;
                    continue;
                }
            }
            out.push(raw[i]);
            i += 1;
        }
        String::from_utf8_lossy(&out).into_owned()
    }

    /// Numbers that fail to parse (e.g. a lone `-`) read as zero, the way
    /// viewers treat them.
    fn number(&mut self) -> f64 {
        let start = self.pos;
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut seen_dot = false;
        while let Some(b) = self.peek() {
            if b.is_ascii_digit() {
                self.pos += 1;
            } else if b == b'.' && !seen_dot {
                seen_dot = true;
                self.pos += 1;
            } else {
                break;
            }
        }
        std::str::from_utf8(&self.input[start..self.pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0)
    }

    fn literal_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut out = Vec::new();
        let mut depth = 1u32;

        while let Some(b) = self.peek() {
            self.pos += 1;
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(b);
                }
                b'\\' => self.escape(&mut out),
                _ => out.push(b),
            }
        }

        Err(BackendError::Content("unterminated literal string".to_string()))
    }

    fn escape(&mut self, out: &mut Vec<u8>) {
        let Some(b) = self.peek() else {
            return;
        };
        self.pos += 1;
        match b {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            b'0'..=b'7' => {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    match self.peek() {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => out.push(other),
        }
    }

    fn hex_string(&mut self) -> Result<Vec<u8>, BackendError> {
        self.pos += 1;
        let mut nibbles = Vec::new();
        loop {
            let Some(b) = self.peek() else {
                return Err(BackendError::Content("unterminated hex string".to_string()));
            };
            self.pos += 1;
            if b == b'>' {
                break;
            }
            if is_whitespace(b) {
                continue;
            }
            let nibble = hex_value(b).ok_or_else(|| {
                BackendError::Content(format!("invalid hex digit {:?}", b as char))
            })?;
            nibbles.push(nibble);
        }
        if nibbles.len() % 2 == 1 {
            nibbles.push(0);
        }
        Ok(nibbles.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
    }

    fn array(&mut self) -> Result<Vec<Operand>, BackendError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => return Err(BackendError::Content("unterminated array".to_string())),
                Some(b']') => {
                    self.pos += 1;
                    return Ok(items);
                }
                Some(b'a'..=b'z' | b'A'..=b'Z') => {
                    let word = self.keyword();
                    items.push(match word.as_str() {
                        "true" => Operand::Boolean(true),
                        "false" => Operand::Boolean(false),
                        "null" => Operand::Null,
                        _ => Operand::Name(word),
                    });
                }
                Some(b) => match self.operand()? {
                    Some(operand) => items.push(operand),
                    None => {
                        return Err(BackendError::Content(format!(
                            "unexpected byte 0x{b:02X} in array"
                        )));
                    }
                },
            }
        }
    }

    fn dictionary(&mut self) -> Result<Vec<(String, Operand)>, BackendError> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            self.skip_blank();
            match (self.peek(), self.peek_at(1)) {
                (None, _) => {
                    return Err(BackendError::Content("unterminated dictionary".to_string()));
                }
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    return Ok(entries);
                }
                (Some(b'/'), _) => {
                    let key = self.name();
                    self.skip_blank();
                    let value = match self.peek() {
                        Some(b'a'..=b'z' | b'A'..=b'Z') => {
                            let word = self.keyword();
                            match word.as_str() {
                                "true" => Operand::Boolean(true),
                                "false" => Operand::Boolean(false),
                                _ => Operand::Null,
                            }
                        }
                        _ => self.operand()?.ok_or_else(|| {
                            BackendError::Content(format!("missing value for /{key}"))
                        })?,
                    };
                    entries.push((key, value));
                }
                (Some(_), _) => {
                    return Err(BackendError::Content(
                        "expected name key in dictionary".to_string(),
                    ));
                }
            }
        }
    }

    /// Skip `BI ... ID <binary> EI`. The binary section ends at the first
    /// `EI` that stands alone between whitespace.
    fn skip_inline_image(&mut self) {
        let data = self.input;
        while self.pos + 1 < data.len() {
            if data[self.pos] == b'I'
                && data[self.pos + 1] == b'D'
                && self.pos > 0
                && is_whitespace(data[self.pos - 1])
            {
                self.pos += 3;
                break;
            }
            self.pos += 1;
        }
        while self.pos + 1 < data.len() {
            let standalone_before = self.pos == 0 || is_whitespace(data[self.pos - 1]);
            let standalone_after = data.get(self.pos + 2).is_none_or(|&b| is_whitespace(b));
            if data[self.pos] == b'E' && data[self.pos + 1] == b'I' && standalone_before && standalone_after
            {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
        self.pos = data.len();
    }
}
