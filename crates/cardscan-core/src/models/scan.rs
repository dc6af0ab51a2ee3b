//! Scan data models: classified fields, results and session states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic kind of a classified text line.
///
/// Declaration order is the classification priority: a numeric string must
/// never be mistaken for a date or a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Card number (PAN).
    Number,
    /// Expiry date (MM/YY or MM/YYYY).
    ExpiryDate,
    /// Card holder name.
    HolderName,
}

impl FieldKind {
    /// All kinds, in classification priority order.
    pub const ALL: [FieldKind; 3] = [FieldKind::Number, FieldKind::ExpiryDate, FieldKind::HolderName];

    /// Label used in logs and text output, identical to the serialized name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::ExpiryDate => "expiry_date",
            FieldKind::HolderName => "holder_name",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A text line accepted as a card field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedField {
    /// Which field the line was classified as.
    pub kind: FieldKind,
    /// The line exactly as it was recognized.
    pub raw_value: String,
    /// Normalized value for display.
    pub display_value: String,
}

impl ClassifiedField {
    pub fn new(kind: FieldKind, raw_value: impl Into<String>, display_value: impl Into<String>) -> Self {
        Self {
            kind,
            raw_value: raw_value.into(),
            display_value: display_value.into(),
        }
    }
}

/// Payment card fields collected in structured-fields mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardResult {
    /// Card number slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<ClassifiedField>,

    /// Expiry date slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<ClassifiedField>,

    /// Holder name slot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<ClassifiedField>,
}

impl CardResult {
    /// Get the slot for a field kind.
    pub fn slot(&self, kind: FieldKind) -> Option<&ClassifiedField> {
        match kind {
            FieldKind::Number => self.number.as_ref(),
            FieldKind::ExpiryDate => self.expiry.as_ref(),
            FieldKind::HolderName => self.holder_name.as_ref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, kind: FieldKind) -> &mut Option<ClassifiedField> {
        match kind {
            FieldKind::Number => &mut self.number,
            FieldKind::ExpiryDate => &mut self.expiry,
            FieldKind::HolderName => &mut self.holder_name,
        }
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        FieldKind::ALL.iter().filter(|k| self.slot(**k).is_some()).count()
    }

    /// Display value of the card number, if captured.
    pub fn number_display(&self) -> Option<&str> {
        self.number.as_ref().map(|f| f.display_value.as_str())
    }

    /// Display value of the expiry date, if captured.
    pub fn expiry_display(&self) -> Option<&str> {
        self.expiry.as_ref().map(|f| f.display_value.as_str())
    }

    /// Display value of the holder name, if captured.
    pub fn holder_name_display(&self) -> Option<&str> {
        self.holder_name.as_ref().map(|f| f.display_value.as_str())
    }
}

/// Payload collected in single-value mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeResult {
    /// Decoded symbol payload.
    pub payload: String,
}

/// Finalized result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScanResult {
    /// Structured card fields.
    Card(CardResult),
    /// Single decoded payload.
    Code(CodeResult),
}

impl ScanResult {
    /// Mode the result was produced in.
    pub fn mode(&self) -> ScanMode {
        match self {
            ScanResult::Card(_) => ScanMode::Card,
            ScanResult::Code(_) => ScanMode::Code,
        }
    }

    /// Card fields, if this is a card result.
    pub fn as_card(&self) -> Option<&CardResult> {
        match self {
            ScanResult::Card(card) => Some(card),
            ScanResult::Code(_) => None,
        }
    }

    /// Code payload, if this is a code result.
    pub fn as_code(&self) -> Option<&CodeResult> {
        match self {
            ScanResult::Code(code) => Some(code),
            ScanResult::Card(_) => None,
        }
    }
}

/// Operating mode of a scan attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Structured-fields mode (payment card).
    #[default]
    Card,
    /// Single-value mode (QR or bar code).
    Code,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Card => f.pad("card"),
            ScanMode::Code => f.pad("code"),
        }
    }
}

/// Lifecycle state of a scan session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Accepting ingestion.
    #[default]
    Active,
    /// Holding a final result; ingestion is ignored.
    Completed,
    /// Single-value mode only: the result was rejected and the session waits
    /// for an explicit retry.
    AwaitingRetry,
}

impl SessionState {
    /// Whether ingestion is accepted in this state.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_kind_label_matches_serde() {
        for kind in FieldKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
        assert_eq!(FieldKind::ExpiryDate.to_string(), "expiry_date");
    }

    #[test]
    fn test_card_result_slots() {
        let mut card = CardResult::default();
        assert_eq!(card.filled(), 0);

        *card.slot_mut(FieldKind::ExpiryDate) = Some(ClassifiedField::new(FieldKind::ExpiryDate, "12/26", "12/26"));

        assert_eq!(card.filled(), 1);
        assert_eq!(card.expiry_display(), Some("12/26"));
        assert!(card.slot(FieldKind::Number).is_none());
    }

    #[test]
    fn test_scan_result_serializes_with_mode_tag() {
        let result = ScanResult::Code(CodeResult {
            payload: "PAYLOAD".to_string(),
        });

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["mode"], "code");
        assert_eq!(json["payload"], "PAYLOAD");
        assert_eq!(result.mode(), ScanMode::Code);
    }

    #[test]
    fn test_empty_card_slots_are_skipped() {
        let json = serde_json::to_string(&ScanResult::Card(CardResult::default())).unwrap();
        assert_eq!(json, r#"{"mode":"card"}"#);
    }
}
