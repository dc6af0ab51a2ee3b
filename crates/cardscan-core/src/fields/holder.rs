//! Card holder name recognition.

use crate::models::scan::{ClassifiedField, FieldKind};

use super::patterns::ONLY_ALPHA;
use super::{FieldRule, TextLine};

/// Holder name rule.
#[derive(Debug, Clone)]
pub struct HolderNameRule {
    min_letters: usize,
}

impl HolderNameRule {
    /// Create a rule requiring at least 9 letters.
    ///
    /// The bound is inclusive so that a short name such as "JOHN SMITH"
    /// (9 letters) is accepted. A stricter "more than 10" bound would reject it.
    pub fn new() -> Self {
        Self { min_letters: 9 }
    }

    /// Set the minimum number of letters (whitespace excluded).
    pub fn with_min_letters(mut self, min_letters: usize) -> Self {
        self.min_letters = min_letters;
        self
    }
}

impl Default for HolderNameRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for HolderNameRule {
    fn kind(&self) -> FieldKind {
        FieldKind::HolderName
    }

    fn extract(&self, line: &TextLine<'_>) -> Option<ClassifiedField> {
        if line.trimmed_len() < self.min_letters
            || !line.raw.contains(' ')
            || !ONLY_ALPHA.is_match(&line.trimmed)
        {
            return None;
        }

        Some(ClassifiedField::new(FieldKind::HolderName, line.raw, line.raw))
    }
}

/// Check whether a line looks like a card holder name.
pub fn is_holder_name(line: &str) -> bool {
    HolderNameRule::new().matches(&TextLine::new(line))
}
