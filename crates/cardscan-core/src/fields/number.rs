//! Card number recognition and validation.

use crate::models::scan::{ClassifiedField, FieldKind};

use super::format::{format_card_number, NumberGrouping};
use super::patterns::ONLY_DIGITS;
use super::{FieldRule, TextLine};

/// Card number rule.
#[derive(Debug, Clone)]
pub struct NumberRule {
    min_len: usize,
    max_len: usize,
    validate: bool,
    grouping: NumberGrouping,
}

impl NumberRule {
    /// Create a rule accepting 15 to 16 digit numbers.
    pub fn new() -> Self {
        Self {
            min_len: 15,
            max_len: 16,
            validate: false,
            grouping: NumberGrouping::Numeric,
        }
    }

    /// Set the accepted length range (inclusive).
    pub fn with_length(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    /// Set whether to validate the Luhn checksum.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the display grouping.
    pub fn with_grouping(mut self, grouping: NumberGrouping) -> Self {
        self.grouping = grouping;
        self
    }
}

impl Default for NumberRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for NumberRule {
    fn kind(&self) -> FieldKind {
        FieldKind::Number
    }

    fn extract(&self, line: &TextLine<'_>) -> Option<ClassifiedField> {
        let len = line.trimmed_len();
        if len < self.min_len || len > self.max_len {
            return None;
        }

        if !ONLY_DIGITS.is_match(&line.trimmed) {
            return None;
        }

        if self.validate && !validate_luhn(&line.trimmed) {
            return None;
        }

        Some(ClassifiedField::new(
            FieldKind::Number,
            line.raw,
            format_card_number(&line.trimmed, self.grouping),
        ))
    }
}

/// Validate a card number using the Luhn (mod 10) checksum.
///
/// Whitespace is ignored; any other non-digit makes the number invalid.
pub fn validate_luhn(number: &str) -> bool {
    let digits: Option<Vec<u32>> = number
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(10))
        .collect();

    let digits = match digits {
        Some(d) if d.len() >= 2 => d,
        _ => return false,
    };

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
