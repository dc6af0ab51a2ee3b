//! Configuration structures for the scanning engine.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::fields::NumberGrouping;

/// Accepted expiry window sizes, in years.
const WINDOW_YEARS: RangeInclusive<i32> = 1..=100;

/// Accepted reference years.
const REFERENCE_YEARS: RangeInclusive<i32> = 1..=9999;

/// Main configuration for cardscan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Line classification rules.
    pub classifier: ClassifierConfig,

    /// Session behavior.
    pub session: SessionConfig,
}

/// Line classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum card number length in digits.
    pub number_min_len: usize,

    /// Maximum card number length in digits.
    pub number_max_len: usize,

    /// Reject card numbers failing the Luhn checksum.
    pub validate_checksum: bool,

    /// How the card number is grouped for display.
    pub number_grouping: NumberGrouping,

    /// Number of years (starting with the current one) an expiry date may fall into.
    pub expiry_window_years: i32,

    /// Minimum number of letters in a holder name (whitespace excluded).
    pub holder_min_letters: usize,

    /// Year the expiry window is anchored at (default: current local year).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            number_min_len: 15,
            number_max_len: 16,
            validate_checksum: false,
            number_grouping: NumberGrouping::Numeric,
            expiry_window_years: 20,
            holder_min_letters: 9,
            reference_year: None,
        }
    }
}

/// Scan session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hold card completion until a holder name has been captured too.
    pub require_holder_name: bool,
}

impl ScanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check that the configured bounds are usable.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let c = &self.classifier;

        if c.number_min_len == 0 {
            return Err(ConfigError::Zero("classifier.number_min_len"));
        }
        if c.number_min_len > c.number_max_len {
            return Err(ConfigError::InvalidRange {
                field: "classifier.number_min_len",
                min: c.number_min_len,
                max: c.number_max_len,
            });
        }
        check_range("classifier.expiry_window_years", c.expiry_window_years, WINDOW_YEARS)?;
        if let Some(year) = c.reference_year {
            check_range("classifier.reference_year", year, REFERENCE_YEARS)?;
        }

        Ok(())
    }
}

fn check_range(
    field: &'static str,
    value: i32,
    range: RangeInclusive<i32>,
) -> std::result::Result<(), ConfigError> {
    if range.contains(&value) {
        return Ok(());
    }

    Err(ConfigError::OutOfRange {
        field,
        value: value.into(),
        min: (*range.start()).into(),
        max: (*range.end()).into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.classifier.number_min_len, 15);
        assert_eq!(config.classifier.number_max_len, 16);
        assert_eq!(config.classifier.expiry_window_years, 20);
        assert!(!config.session.require_holder_name);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScanConfig =
            serde_json::from_str(r#"{"session": {"require_holder_name": true}}"#).unwrap();

        assert!(config.session.require_holder_name);
        assert_eq!(config.classifier, ClassifierConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ScanConfig::default();
        config.classifier.number_grouping = NumberGrouping::Chunked;
        config.classifier.reference_year = Some(2030);
        config.save(&path).unwrap();

        let loaded = ScanConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = ScanConfig::default();
        config.classifier.number_min_len = 17;

        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "classifier.number_min_len",
                min: 17,
                max: 16,
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_window() {
        let mut config = ScanConfig::default();
        config.classifier.expiry_window_years = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_window_and_reference_year() {
        let mut config = ScanConfig::default();
        config.classifier.expiry_window_years = i32::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "classifier.expiry_window_years",
                value: i32::MAX as i64,
                min: 1,
                max: 100,
            })
        );

        config.classifier.expiry_window_years = 100;
        assert!(config.validate().is_ok());

        config.classifier.reference_year = Some(i32::MAX);
        assert!(config.validate().is_err());
        config.classifier.reference_year = Some(2026);
        assert!(config.validate().is_ok());
    }
}
