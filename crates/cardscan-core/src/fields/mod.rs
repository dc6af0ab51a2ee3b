//! Rule-based field recognizers for payment card text.

pub mod expiry;
pub mod format;
pub mod holder;
pub mod number;
pub mod patterns;

pub use expiry::{is_valid_expiry, parse_expiry, ExpiryRule};
pub use format::{format_card_number, NumberGrouping};
pub use holder::{is_holder_name, HolderNameRule};
pub use number::{validate_luhn, NumberRule};

use crate::models::scan::{ClassifiedField, FieldKind};

/// A single recognized text line.
///
/// Only lives for the duration of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine<'a> {
    /// The line as recognized.
    pub raw: &'a str,
    /// The line with all whitespace removed.
    pub trimmed: String,
}

impl<'a> TextLine<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            trimmed: raw.chars().filter(|c| !c.is_whitespace()).collect(),
        }
    }

    /// Length of the trimmed form, in characters.
    pub fn trimmed_len(&self) -> usize {
        self.trimmed.chars().count()
    }
}

/// Trait for field recognition rules.
pub trait FieldRule {
    /// The field kind this rule recognizes.
    fn kind(&self) -> FieldKind;

    /// Classify the line, returning the accepted field.
    fn extract(&self, line: &TextLine<'_>) -> Option<ClassifiedField>;

    /// Whether the line is accepted by this rule.
    fn matches(&self, line: &TextLine<'_>) -> bool {
        self.extract(line).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_line_strips_all_whitespace() {
        let line = TextLine::new(" 4111 1111\t1111 1111\n");
        assert_eq!(line.raw, " 4111 1111\t1111 1111\n");
        assert_eq!(line.trimmed, "4111111111111111");
        assert_eq!(line.trimmed_len(), 16);
    }

    #[test]
    fn test_trimmed_len_counts_characters() {
        let line = TextLine::new("ÉMILE ZOLA");
        assert_eq!(line.trimmed_len(), 9);
    }
}
