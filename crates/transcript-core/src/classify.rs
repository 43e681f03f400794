//! Line classification.
//!
//! Recognition is separated from state: [`LineClassifier::classify`] turns a
//! line's text into a [`LineKind`] without knowing which section is active.
//! The section fold in [`crate::extract`] consumes these kinds in order.

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::aggregate::parse_locale_decimal;
use crate::error::TranscriptError;
use crate::extract::ExtractOptions;

/// A curriculum section code: one uppercase letter and a digit 1-9 (e.g. `B2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct SectionCode {
    letter: char,
    digit: u8,
}

impl SectionCode {
    /// The credit-only category of the default layout.
    pub const DEFAULT_EXCLUDED: SectionCode = SectionCode {
        letter: 'A',
        digit: 5,
    };

    /// Build a code, rejecting non-uppercase letters and digits outside 1-9.
    pub fn new(letter: char, digit: u8) -> Option<Self> {
        if letter.is_ascii_uppercase() && (1..=9).contains(&digit) {
            Some(Self { letter, digit })
        } else {
            None
        }
    }

    pub fn letter(&self) -> char {
        self.letter
    }

    pub fn digit(&self) -> u8 {
        self.digit
    }
}

impl fmt::Display for SectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letter, self.digit)
    }
}

impl FromStr for SectionCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(letter), Some(digit), None) => digit
                .to_digit(10)
                .and_then(|d| SectionCode::new(letter, d as u8)),
            _ => None,
        };
        parsed.ok_or_else(|| format!("invalid section code '{s}' (expected e.g. 'A5')"))
    }
}

impl TryFrom<String> for SectionCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SectionCode> for String {
    fn from(code: SectionCode) -> Self {
        code.to_string()
    }
}

/// What a single line of transcript text represents.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// Semester stamp such as `WS23`; carries no record data.
    Noise,
    /// Start of a new curriculum section.
    SectionHeader(SectionCode),
    /// A course line: free-text name, grade and credit weight.
    DataLine {
        name: String,
        /// Grade exactly as printed, e.g. `"1,7"`.
        grade: String,
        credit_weight: f64,
    },
    /// Anything else (titles, footers, column headings).
    Unrecognized,
}

/// Pattern rules for the fixed transcript layout.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    noise: Option<Regex>,
    record: Regex,
    section_letters: Vec<char>,
}

impl LineClassifier {
    /// Compile the rules for the given options.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::Other`] if a pattern fails to compile.
    pub fn new(options: &ExtractOptions) -> Result<Self, TranscriptError> {
        let noise = if options.noise_prefixes.is_empty() {
            None
        } else {
            let alternatives = options
                .noise_prefixes
                .iter()
                .map(|p| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&format!("^(?:{alternatives})[0-9]{{2}}"))?)
        };
        let record = Regex::new(r"^(.*?)\s+([0-9],[0-9])\s+([0-9],[0-9])")?;

        Ok(Self {
            noise,
            record,
            section_letters: options.section_letters.clone(),
        })
    }

    /// Classify one line of text. Rules are tried in order: noise, section
    /// header, data line.
    pub fn classify(&self, text: &str) -> LineKind {
        if self.noise.as_ref().is_some_and(|re| re.is_match(text)) {
            return LineKind::Noise;
        }

        if let Some(code) = self.section_header(text) {
            return LineKind::SectionHeader(code);
        }

        if let Some(caps) = self.record.captures(text) {
            if let Some(credit_weight) = parse_locale_decimal(&caps[3]) {
                return LineKind::DataLine {
                    name: caps[1].trim().to_string(),
                    grade: caps[2].to_string(),
                    credit_weight,
                };
            }
        }

        LineKind::Unrecognized
    }

    /// A header is a known letter, a digit 1-9, then a space.
    fn section_header(&self, text: &str) -> Option<SectionCode> {
        let mut chars = text.chars();
        let letter = chars.next()?;
        if !self.section_letters.contains(&letter) {
            return None;
        }
        let digit = chars.next()?.to_digit(10)?;
        if chars.next()? != ' ' {
            return None;
        }
        SectionCode::new(letter, digit as u8)
    }
}
