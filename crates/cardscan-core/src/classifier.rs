//! Line classifier: maps one recognized text line to at most one card field.
//!
//! Rules are tried in a fixed priority order (number, expiry date, holder
//! name) and the first match wins. Classification is pure, so it can run on
//! any number of frame workers at once.

use crate::fields::{ExpiryRule, FieldRule, HolderNameRule, NumberRule, TextLine};
use crate::models::config::ClassifierConfig;
use crate::models::scan::ClassifiedField;

/// Configurable line classifier.
#[derive(Debug, Clone, Default)]
pub struct LineClassifier {
    number: NumberRule,
    expiry: ExpiryRule,
    holder: HolderNameRule,
}

impl LineClassifier {
    /// Create a classifier with default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier from configuration.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            number: NumberRule::new()
                .with_length(config.number_min_len, config.number_max_len)
                .with_validation(config.validate_checksum)
                .with_grouping(config.number_grouping),
            expiry: ExpiryRule::new()
                .with_window(config.expiry_window_years)
                .with_reference_year(config.reference_year),
            holder: HolderNameRule::new().with_min_letters(config.holder_min_letters),
        }
    }

    /// Anchor the expiry window at a fixed year.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.expiry = self.expiry.with_reference_year(Some(year));
        self
    }

    /// Rules in priority order.
    pub fn rules(&self) -> [&dyn FieldRule; 3] {
        [&self.number, &self.expiry, &self.holder]
    }

    /// Classify a single line.
    pub fn classify(&self, line: &str) -> Option<ClassifiedField> {
        let line = TextLine::new(line);
        self.rules().into_iter().find_map(|rule| rule.extract(&line))
    }

    /// Classify a batch of lines, dropping the ones that match nothing.
    pub fn classify_all<'a, I>(&self, lines: I) -> Vec<ClassifiedField>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines.into_iter().filter_map(|l| self.classify(l)).collect()
    }
}

/// Classify a line with the default rules, anchored at the current year.
pub fn classify(line: &str) -> Option<ClassifiedField> {
    LineClassifier::new().classify(line)
}
