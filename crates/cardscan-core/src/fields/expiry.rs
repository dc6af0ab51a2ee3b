//! Expiry date recognition (MM/YY or MM/YYYY).

use chrono::{Datelike, Local};

use crate::models::scan::{ClassifiedField, FieldKind};

use super::patterns::EXPIRY_DATE;
use super::{FieldRule, TextLine};

/// Expiry date rule.
#[derive(Debug, Clone)]
pub struct ExpiryRule {
    window_years: i32,
    reference_year: Option<i32>,
}

impl ExpiryRule {
    /// Create a rule accepting dates within 20 years from the current year.
    pub fn new() -> Self {
        Self {
            window_years: 20,
            reference_year: None,
        }
    }

    /// Set the size of the accepted year window.
    pub fn with_window(mut self, years: i32) -> Self {
        self.window_years = years;
        self
    }

    /// Anchor the window at a fixed year instead of the current one.
    pub fn with_reference_year(mut self, year: Option<i32>) -> Self {
        self.reference_year = year;
        self
    }

    fn reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(current_year)
    }
}

impl Default for ExpiryRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldRule for ExpiryRule {
    fn kind(&self) -> FieldKind {
        FieldKind::ExpiryDate
    }

    fn extract(&self, line: &TextLine<'_>) -> Option<ClassifiedField> {
        // 12/20 up to 12/2020
        let len = line.trimmed_len();
        if !(5..=7).contains(&len) {
            return None;
        }

        parse_expiry(line.raw, self.reference_year(), self.window_years)?;

        Some(ClassifiedField::new(FieldKind::ExpiryDate, line.raw, line.raw))
    }
}

/// Parse an expiry date, returning `(month, year)` with the year as written.
///
/// The year may be two-digit or four-digit and must fall in
/// `[reference_year, reference_year + window_years)` in the matching form.
pub fn parse_expiry(line: &str, reference_year: i32, window_years: i32) -> Option<(u32, i32)> {
    let caps = EXPIRY_DATE.captures(line)?;
    let month: i32 = caps[1].parse().ok()?;
    let year: i32 = caps[2].parse().ok()?;

    if !(1..=12).contains(&month) {
        return None;
    }

    let short_year = reference_year % 100;
    let in_short_window = year >= short_year && year < short_year.saturating_add(window_years);
    let in_long_window = year >= reference_year && year < reference_year.saturating_add(window_years);

    if in_short_window || in_long_window {
        Some((month as u32, year))
    } else {
        None
    }
}

/// Check an expiry date against the default 20-year window from today.
pub fn is_valid_expiry(line: &str) -> bool {
    parse_expiry(line, current_year(), 20).is_some()
}

pub(crate) fn current_year() -> i32 {
    Local::now().year()
}
