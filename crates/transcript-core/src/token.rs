/// A positioned piece of text on one page.
///
/// Produced by the document-layout backend. `top` is the distance from the
/// top edge of the page, so larger values are further down the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// The text content of this token.
    pub text: String,
    /// Vertical position, page-relative, top-left origin.
    pub top: f64,
}

impl Token {
    pub fn new(text: impl Into<String>, top: f64) -> Self {
        Self {
            text: text.into(),
            top,
        }
    }
}

/// A visual line: tokens that share a vertical cluster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// Tokens in this line, in source stream order.
    pub tokens: Vec<Token>,
    /// Smallest vertical position among the tokens.
    pub top: f64,
}

impl Line {
    /// Concatenated text: token texts joined by a single space, trimmed.
    pub fn text(&self) -> String {
        let joined = self
            .tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        joined.trim().to_string()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
