//! Display formatting for card numbers.

use serde::{Deserialize, Serialize};

/// Size of a digit block in a formatted card number.
pub const GROUP_SIZE: usize = 4;

/// How a card number is regrouped for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberGrouping {
    /// Round-trip through an integer before grouping. Leading zeros are lost.
    #[default]
    Numeric,
    /// Group the digit string as-is.
    Chunked,
}

/// Format a card number in blocks of four digits (`4111 1111 1111 1111`).
///
/// Whitespace in the input is ignored. Input that is not a digit string is
/// returned unchanged.
pub fn format_card_number(number: &str, grouping: NumberGrouping) -> String {
    let digits: String = number.chars().filter(|c| !c.is_whitespace()).collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return number.to_string();
    }

    match grouping {
        NumberGrouping::Numeric => match digits.parse::<u128>() {
            Ok(value) => group_digits(&value.to_string()),
            Err(_) => group_digits(&digits),
        },
        NumberGrouping::Chunked => group_digits(&digits),
    }
}

fn group_digits(digits: &str) -> String {
    let mut formatted = String::with_capacity(digits.len() + digits.len() / GROUP_SIZE);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % GROUP_SIZE == 0 {
            formatted.push(' ');
        }
        formatted.push(c);
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sixteen_digits() {
        assert_eq!(
            format_card_number("4111111111111111", NumberGrouping::Numeric),
            "4111 1111 1111 1111"
        );
        assert_eq!(
            format_card_number("4111 1111 1111 1111", NumberGrouping::Chunked),
            "4111 1111 1111 1111"
        );
    }

    #[test]
    fn test_format_fifteen_digits_groups_from_the_front() {
        assert_eq!(
            format_card_number("378282246310005", NumberGrouping::Numeric),
            "3782 8224 6310 005"
        );
    }

    #[test]
    fn test_numeric_grouping_drops_leading_zeros() {
        assert_eq!(
            format_card_number("0012345678901234", NumberGrouping::Numeric),
            "1234 5678 9012 34"
        );
    }

    #[test]
    fn test_chunked_grouping_keeps_leading_zeros() {
        assert_eq!(
            format_card_number("0012345678901234", NumberGrouping::Chunked),
            "0012 3456 7890 1234"
        );
    }

    #[test]
    fn test_non_digits_unchanged() {
        assert_eq!(format_card_number("4111-1111", NumberGrouping::Numeric), "4111-1111");
        assert_eq!(format_card_number("", NumberGrouping::Chunked), "");
    }

    #[test]
    fn test_all_zeros() {
        assert_eq!(format_card_number("000000000000000", NumberGrouping::Numeric), "0");
    }
}
