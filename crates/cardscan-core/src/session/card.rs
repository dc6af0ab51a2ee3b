//! Structured-fields session for payment cards.

use tracing::{debug, info, trace};

use crate::classifier::LineClassifier;
use crate::models::config::ScanConfig;
use crate::models::scan::{CardResult, ClassifiedField, ScanMode, ScanResult, SessionState};

use super::ScanSession;

/// Accumulates card fields from a stream of recognized lines.
///
/// Every slot is first-write-wins. Once completed the session is terminal:
/// card scans have no retry path.
#[derive(Debug, Clone)]
pub struct CardSession {
    classifier: LineClassifier,
    require_holder_name: bool,
    result: CardResult,
    state: SessionState,
}

impl CardSession {
    /// Create a session with default classification rules.
    pub fn new() -> Self {
        Self::with_classifier(LineClassifier::new())
    }

    /// Create a session from configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::with_classifier(LineClassifier::from_config(&config.classifier))
            .with_require_holder_name(config.session.require_holder_name)
    }

    /// Create a session using the given classifier.
    pub fn with_classifier(classifier: LineClassifier) -> Self {
        Self {
            classifier,
            require_holder_name: false,
            result: CardResult::default(),
            state: SessionState::Active,
        }
    }

    /// Require a holder name before the session can complete.
    pub fn with_require_holder_name(mut self, require: bool) -> Self {
        self.require_holder_name = require;
        self
    }

    /// The classifier used by [`ingest_lines`](Self::ingest_lines).
    pub fn classifier(&self) -> &LineClassifier {
        &self.classifier
    }

    /// Fields collected so far.
    pub fn snapshot(&self) -> &CardResult {
        &self.result
    }

    /// Classify and accumulate a batch of lines from one frame.
    ///
    /// Returns the fields that filled a previously empty slot. Does nothing
    /// unless the session is active.
    pub fn ingest_lines<I, L>(&mut self, lines: I) -> Vec<ClassifiedField>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        if !self.state.is_active() {
            trace!("Ignoring lines for {:?} card session", self.state);
            return Vec::new();
        }

        let mut captured = Vec::new();
        for line in lines {
            if let Some(field) = self.classifier.classify(line.as_ref()) {
                if let Some(field) = self.accept(field) {
                    captured.push(field);
                }
            }
        }
        captured
    }

    /// Store an already classified field if its slot is still empty.
    ///
    /// Returns a copy of the field when it was stored.
    pub fn accept(&mut self, field: ClassifiedField) -> Option<ClassifiedField> {
        if !self.state.is_active() {
            trace!("Ignoring {} field for {:?} card session", field.kind, self.state);
            return None;
        }

        let slot = self.result.slot_mut(field.kind);
        if slot.is_some() {
            return None;
        }

        debug!("Captured {}: {}", field.kind, field.display_value);
        *slot = Some(field.clone());
        Some(field)
    }
}

impl Default for CardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanSession for CardSession {
    fn mode(&self) -> ScanMode {
        ScanMode::Card
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn is_complete(&self) -> bool {
        self.result.number.is_some()
            && self.result.expiry.is_some()
            && (!self.require_holder_name || self.result.holder_name.is_some())
    }

    fn try_complete(&mut self) -> Option<ScanResult> {
        if !self.state.is_active() || !self.is_complete() {
            return None;
        }

        self.state = SessionState::Completed;
        info!("Card scan complete ({} of 3 fields)", self.result.filled());
        Some(ScanResult::Card(self.result.clone()))
    }
}
