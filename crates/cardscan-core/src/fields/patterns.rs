//! Common regex patterns for card field classification.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Card number body (whitespace already removed)
    pub static ref ONLY_DIGITS: Regex = Regex::new(r"^[0-9]+$").unwrap();

    // Holder name body (whitespace already removed)
    pub static ref ONLY_ALPHA: Regex = Regex::new(r"^[A-Za-z]+$").unwrap();

    // Expiry date, MM/YY or MM/YYYY
    pub static ref EXPIRY_DATE: Regex = Regex::new(r"^([+-]?[0-9]+)/([+-]?[0-9]+)$").unwrap();
}
