//! Single-byte font encodings.
//!
//! Builds 256-entry code tables for the standard PDF encodings and applies
//! `/Differences` overrides. WinAnsi and MacRoman tables come from
//! [`encoding_rs`]; Standard encoding differs from WinAnsi only in the
//! printable ASCII quotes, which is all transcripts use of it.

use std::sync::LazyLock;

/// A named standard PDF encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardEncoding {
    WinAnsi,
    MacRoman,
    Standard,
}

impl StandardEncoding {
    /// Resolve an `/Encoding` or `/BaseEncoding` name.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"WinAnsiEncoding" => Some(Self::WinAnsi),
            b"MacRomanEncoding" => Some(Self::MacRoman),
            b"StandardEncoding" => Some(Self::Standard),
            _ => None,
        }
    }

    fn table(self) -> &'static [Option<char>; 256] {
        match self {
            Self::WinAnsi => &WIN_ANSI,
            Self::MacRoman => &MAC_ROMAN,
            Self::Standard => &STANDARD,
        }
    }
}

static WIN_ANSI: LazyLock<[Option<char>; 256]> =
    LazyLock::new(|| table_from(encoding_rs::WINDOWS_1252));
static MAC_ROMAN: LazyLock<[Option<char>; 256]> =
    LazyLock::new(|| table_from(encoding_rs::MACINTOSH));
static STANDARD: LazyLock<[Option<char>; 256]> = LazyLock::new(|| {
    let mut table = [None; 256];
    for code in 0x20u8..0x7F {
        table[code as usize] = Some(code as char);
    }
    table[0x27] = Some('\u{2019}');
    table[0x60] = Some('\u{2018}');
    table
});

/// Decode every byte value through a single-byte encoding. Control
/// characters other than tab/newline stay unmapped.
fn table_from(encoding: &'static encoding_rs::Encoding) -> [Option<char>; 256] {
    let mut table = [None; 256];
    for (code, slot) in table.iter_mut().enumerate() {
        let byte = [code as u8];
        let (decoded, had_errors) = encoding.decode_without_bom_handling(&byte);
        if had_errors {
            continue;
        }
        *slot = decoded
            .chars()
            .next()
            .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'));
    }
    table
}

/// Code table for a simple font: a standard base plus `/Differences`.
#[derive(Debug, Clone, PartialEq)]
pub struct FontEncoding {
    table: [Option<char>; 256],
}

impl Default for FontEncoding {
    /// WinAnsi, the fallback for fonts without a usable `/Encoding`.
    fn default() -> Self {
        Self::from_standard(StandardEncoding::WinAnsi)
    }
}

impl FontEncoding {
    pub fn from_standard(encoding: StandardEncoding) -> Self {
        Self {
            table: *encoding.table(),
        }
    }

    /// Override codes with `(code, glyph name)` pairs. Unknown glyph names
    /// leave the base mapping in place.
    pub fn apply_differences<'a>(&mut self, differences: impl IntoIterator<Item = (u8, &'a str)>) {
        for (code, glyph) in differences {
            if let Some(ch) = glyph_name_to_char(glyph) {
                self.table[code as usize] = Some(ch);
            }
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[code as usize]
    }

    /// Decode a byte string. Unmapped bytes become U+FFFD.
    pub fn decode_bytes(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|&b| self.decode(b).unwrap_or('\u{FFFD}'))
            .collect()
    }
}

/// Resolve an Adobe glyph name to a character.
///
/// Handles `uniXXXX`, single-character names and the Latin glyph names
/// that occur in German-language documents.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return Some(c);
        }
    }

    GLYPH_NAMES
        .binary_search_by_key(&name, |&(n, _)| n)
        .ok()
        .map(|i| GLYPH_NAMES[i].1)
}

/// Sorted for binary search.
static GLYPH_NAMES: &[(&str, char)] = &[
    ("Adieresis", '\u{00C4}'),
    ("Eacute", '\u{00C9}'),
    ("Euro", '\u{20AC}'),
    ("Odieresis", '\u{00D6}'),
    ("Udieresis", '\u{00DC}'),
    ("aacute", '\u{00E1}'),
    ("adieresis", '\u{00E4}'),
    ("agrave", '\u{00E0}'),
    ("ampersand", '&'),
    ("asterisk", '*'),
    ("at", '@'),
    ("bullet", '\u{2022}'),
    ("colon", ':'),
    ("comma", ','),
    ("copyright", '\u{00A9}'),
    ("degree", '\u{00B0}'),
    ("dollar", '$'),
    ("eacute", '\u{00E9}'),
    ("egrave", '\u{00E8}'),
    ("eight", '8'),
    ("emdash", '\u{2014}'),
    ("endash", '\u{2013}'),
    ("equal", '='),
    ("exclam", '!'),
    ("fi", '\u{FB01}'),
    ("five", '5'),
    ("fl", '\u{FB02}'),
    ("four", '4'),
    ("germandbls", '\u{00DF}'),
    ("greater", '>'),
    ("hyphen", '-'),
    ("less", '<'),
    ("nine", '9'),
    ("numbersign", '#'),
    ("odieresis", '\u{00F6}'),
    ("one", '1'),
    ("paragraph", '\u{00B6}'),
    ("parenleft", '('),
    ("parenright", ')'),
    ("percent", '%'),
    ("period", '.'),
    ("plus", '+'),
    ("question", '?'),
    ("quotedbl", '"'),
    ("quotedblleft", '\u{201C}'),
    ("quotedblright", '\u{201D}'),
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotesingle", '\''),
    ("section", '\u{00A7}'),
    ("semicolon", ';'),
    ("seven", '7'),
    ("six", '6'),
    ("slash", '/'),
    ("space", ' '),
    ("three", '3'),
    ("two", '2'),
    ("udieresis", '\u{00FC}'),
    ("underscore", '_'),
    ("zero", '0'),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_table_is_sorted() {
        assert!(GLYPH_NAMES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn win_ansi_ascii_and_umlauts() {
        let enc = FontEncoding::from_standard(StandardEncoding::WinAnsi);
        assert_eq!(enc.decode_bytes(b"Logik 1,3"), "Logik 1,3");
        assert_eq!(enc.decode_bytes(b"Pr\xfcfung"), "Prüfung");
        assert_eq!(enc.decode(0xDF), Some('ß'));
        assert_eq!(enc.decode(0x80), Some('€'));
    }

    #[test]
    fn win_ansi_control_bytes_are_unmapped() {
        let enc = FontEncoding::default();
        assert_eq!(enc.decode(0x01), None);
        assert_eq!(enc.decode_bytes(b"\x01a"), "\u{FFFD}a");
    }

    #[test]
    fn mac_roman_umlaut() {
        let enc = FontEncoding::from_standard(StandardEncoding::MacRoman);
        assert_eq!(enc.decode(0x8A), Some('ä'));
        assert_eq!(enc.decode(0x9F), Some('ü'));
        assert_eq!(enc.decode(b'A'), Some('A'));
    }

    #[test]
    fn standard_encoding_quotes() {
        let enc = FontEncoding::from_standard(StandardEncoding::Standard);
        assert_eq!(enc.decode(0x27), Some('\u{2019}'));
        assert_eq!(enc.decode(b'x'), Some('x'));
        assert_eq!(enc.decode(0xE4), None);
    }

    #[test]
    fn encoding_names() {
        assert_eq!(
            StandardEncoding::from_name(b"WinAnsiEncoding"),
            Some(StandardEncoding::WinAnsi)
        );
        assert_eq!(StandardEncoding::from_name(b"Identity-H"), None);
    }

    #[test]
    fn differences_override_codes() {
        let mut enc = FontEncoding::default();
        enc.apply_differences([(0x41, "udieresis"), (0x42, "germandbls"), (0x43, "bogus")]);
        assert_eq!(enc.decode_bytes(b"ABC"), "üßC");
    }

    #[test]
    fn glyph_names() {
        assert_eq!(glyph_name_to_char("uni00FC"), Some('ü'));
        assert_eq!(glyph_name_to_char("g"), Some('g'));
        assert_eq!(glyph_name_to_char("comma"), Some(','));
        assert_eq!(glyph_name_to_char("unknownglyph"), None);
    }
}
