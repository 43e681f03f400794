//! ToUnicode CMap parsing.
//!
//! Reads the `beginbfchar` and `beginbfrange` sections of a font's
//! `/ToUnicode` stream into a code → text table. Destination values are
//! UTF-16BE hex strings, so one code may map to several characters
//! (ligatures) or to a surrogate pair.

use std::collections::HashMap;

use crate::error::BackendError;

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeCMap {
    mappings: HashMap<u32, String>,
    /// Width in bytes of the source codes (1 for simple fonts, 2 for most
    /// composite fonts).
    code_width: usize,
}

impl ToUnicodeCMap {
    /// Parse CMap stream content.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Font`] when a hex code or UTF-16 value is
    /// malformed.
    pub fn parse(data: &[u8]) -> Result<Self, BackendError> {
        let text = String::from_utf8_lossy(data);
        let mut cmap = ToUnicodeCMap {
            mappings: HashMap::new(),
            code_width: 1,
        };

        for section in sections(&text, "begincodespacerange", "endcodespacerange") {
            if let Some(first) = hex_tokens(section).first() {
                cmap.code_width = cmap.code_width.max(first.len().div_ceil(2));
            }
        }

        for section in sections(&text, "beginbfchar", "endbfchar") {
            for line in section.lines() {
                let tokens = hex_tokens(line);
                if let [src, dst, ..] = tokens.as_slice() {
                    cmap.note_code_width(src);
                    cmap.mappings.insert(parse_code(src)?, decode_utf16be(dst)?);
                }
            }
        }

        for section in sections(&text, "beginbfrange", "endbfrange") {
            for line in section.lines() {
                cmap.parse_range_line(line)?;
            }
        }

        Ok(cmap)
    }

    fn note_code_width(&mut self, src: &str) {
        self.code_width = self.code_width.max(src.len().div_ceil(2));
    }

    /// `<lo> <hi> <dst>` or `<lo> <hi> [<dst0> <dst1> ...]`.
    fn parse_range_line(&mut self, line: &str) -> Result<(), BackendError> {
        let (head, array) = match line.find('[') {
            Some(i) => (&line[..i], Some(&line[i + 1..])),
            None => (line, None),
        };
        let tokens = hex_tokens(head);
        let (Some(lo_hex), Some(hi_hex)) = (tokens.first(), tokens.get(1)) else {
            return Ok(());
        };
        self.note_code_width(lo_hex);
        let lo = parse_code(lo_hex)?;
        let hi = parse_code(hi_hex)?;
        if hi < lo {
            return Ok(());
        }

        match array {
            Some(rest) => {
                let end = rest.find(']').unwrap_or(rest.len());
                for (code, dst) in (lo..=hi).zip(hex_tokens(&rest[..end])) {
                    self.mappings.insert(code, decode_utf16be(dst)?);
                }
            }
            None => {
                let Some(dst) = tokens.get(2) else {
                    return Ok(());
                };
                let start = decode_utf16be(dst)?;
                let mut chars: Vec<char> = start.chars().collect();
                for code in lo..=hi {
                    self.mappings.insert(code, chars.iter().collect());
                    // The last character of the destination increments.
                    if let Some(last) = chars.last_mut() {
                        match char::from_u32(*last as u32 + 1) {
                            Some(next) => *last = next,
                            None => break,
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn code_width(&self) -> usize {
        self.code_width
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Split a byte string into codes of [`code_width`](Self::code_width)
    /// bytes. A short trailing chunk is read as-is.
    pub fn codes<'a>(&self, bytes: &'a [u8]) -> impl Iterator<Item = u32> + 'a {
        bytes
            .chunks(self.code_width.max(1))
            .map(|chunk| chunk.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
    }
}

/// Bodies of every `begin ... end` section in order.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        let Some(stop) = body.find(end) else {
            break;
        };
        found.push(&body[..stop]);
        rest = &body[stop + end.len()..];
    }
    found
}

/// Contents of every `<...>` group on a line, whitespace removed.
fn hex_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let Some(close) = rest[open + 1..].find('>') else {
            break;
        };
        tokens.push(rest[open + 1..open + 1 + close].trim());
        rest = &rest[open + close + 2..];
    }
    tokens
}

fn parse_code(hex: &str) -> Result<u32, BackendError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| BackendError::Font(format!("invalid CMap code <{hex}>: {e}")))
}

/// Decode a UTF-16BE hex string. Two-digit values are single bytes padded
/// to one code unit.
fn decode_utf16be(hex: &str) -> Result<String, BackendError> {
    if hex.len() == 2 {
        return decode_utf16be(&format!("00{hex}"));
    }
    if hex.len() % 4 != 0 || !hex.is_ascii() {
        return Err(BackendError::Font(format!(
            "UTF-16BE value <{hex}> is not a whole number of code units"
        )));
    }
    let units = (0..hex.len())
        .step_by(4)
        .map(|i| {
            u16::from_str_radix(&hex[i..i + 4], 16)
                .map_err(|e| BackendError::Font(format!("invalid UTF-16BE value <{hex}>: {e}")))
        })
        .collect::<Result<Vec<u16>, _>>()?;
    String::from_utf16(&units)
        .map_err(|e| BackendError::Font(format!("invalid UTF-16BE value <{hex}>: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOILERPLATE: &str = "/CIDInit /ProcSet findresource begin\n\
        12 dict begin\n\
        begincmap\n\
        1 begincodespacerange\n\
        <0000> <FFFF>\n\
        endcodespacerange\n";

    #[test]
    fn empty_cmap() {
        let cmap = ToUnicodeCMap::parse(b"").unwrap();
        assert!(cmap.is_empty());
        assert_eq!(cmap.code_width(), 1);
    }

    #[test]
    fn bfchar_mappings() {
        let data = format!(
            "{BOILERPLATE}2 beginbfchar\n<0003> <0020>\n<0011> <00FC>\nendbfchar\nendcmap"
        );
        let cmap = ToUnicodeCMap::parse(data.as_bytes()).unwrap();
        assert_eq!(cmap.code_width(), 2);
        assert_eq!(cmap.lookup(0x03), Some(" "));
        assert_eq!(cmap.lookup(0x11), Some("ü"));
        assert_eq!(cmap.lookup(0x12), None);
    }

    #[test]
    fn single_byte_codes() {
        let cmap = ToUnicodeCMap::parse(b"1 beginbfchar\n<41> <0042>\nendbfchar").unwrap();
        assert_eq!(cmap.code_width(), 1);
        assert_eq!(cmap.lookup(0x41), Some("B"));
    }

    #[test]
    fn ligature_destination() {
        let cmap = ToUnicodeCMap::parse(b"1 beginbfchar\n<01> <00660069>\nendbfchar").unwrap();
        assert_eq!(cmap.lookup(1), Some("fi"));
    }

    #[test]
    fn surrogate_pair_destination() {
        let cmap = ToUnicodeCMap::parse(b"1 beginbfchar\n<01> <D835DC00>\nendbfchar").unwrap();
        assert_eq!(cmap.lookup(1), Some("\u{1D400}"));
    }

    #[test]
    fn bfrange_increments() {
        let cmap =
            ToUnicodeCMap::parse(b"1 beginbfrange\n<0024> <0026> <0041>\nendbfrange").unwrap();
        assert_eq!(cmap.lookup(0x24), Some("A"));
        assert_eq!(cmap.lookup(0x25), Some("B"));
        assert_eq!(cmap.lookup(0x26), Some("C"));
        assert_eq!(cmap.len(), 3);
    }

    #[test]
    fn bfrange_with_array() {
        let cmap = ToUnicodeCMap::parse(
            b"1 beginbfrange\n<0010> <0012> [<0031> <002C> <0033>]\nendbfrange",
        )
        .unwrap();
        assert_eq!(cmap.lookup(0x10), Some("1"));
        assert_eq!(cmap.lookup(0x11), Some(","));
        assert_eq!(cmap.lookup(0x12), Some("3"));
    }

    #[test]
    fn several_sections_combine() {
        let data = b"1 beginbfchar\n<0001> <0041>\nendbfchar\n\
            1 beginbfrange\n<0002> <0003> <0061>\nendbfrange\n\
            1 beginbfchar\n<0004> <00DF>\nendbfchar";
        let cmap = ToUnicodeCMap::parse(data).unwrap();
        assert_eq!(cmap.len(), 4);
        assert_eq!(cmap.lookup(4), Some("ß"));
    }

    #[test]
    fn crlf_line_endings() {
        let cmap =
            ToUnicodeCMap::parse(b"1 beginbfchar\r\n<0001> <0041>\r\nendbfchar\r\n").unwrap();
        assert_eq!(cmap.lookup(1), Some("A"));
    }

    #[test]
    fn codes_follow_code_width() {
        let data = format!("{BOILERPLATE}1 beginbfchar\n<0001> <0041>\nendbfchar");
        let cmap = ToUnicodeCMap::parse(data.as_bytes()).unwrap();
        let codes: Vec<u32> = cmap.codes(&[0x00, 0x01, 0x01, 0x02]).collect();
        assert_eq!(codes, vec![0x0001, 0x0102]);
    }

    #[test]
    fn malformed_destination_is_an_error() {
        assert!(ToUnicodeCMap::parse(b"1 beginbfchar\n<01> <041>\nendbfchar").is_err());
    }
}
