//! Single-value session for QR and bar codes.

use tracing::{debug, info, trace};

use crate::models::scan::{CodeResult, ScanMode, ScanResult, SessionState};

use super::ScanSession;

/// Completes on the first non-empty decoded payload.
///
/// State transitions:
///
/// ```text
/// Active --ingest_code--> Completed --reject--> AwaitingRetry
///    ^                        |                       |
///    +------reset_for_retry---+-----------------------+
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeSession {
    payload: Option<String>,
    state: SessionState,
    delivered: bool,
}

impl CodeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decoded payload.
    ///
    /// Ignored unless the session is active and the payload is non-empty.
    /// Returns whether the payload was recorded.
    pub fn ingest_code(&mut self, payload: &str) -> bool {
        if !self.state.is_active() {
            trace!("Ignoring payload for {:?} code session", self.state);
            return false;
        }
        if payload.is_empty() {
            return false;
        }

        debug!("Captured code payload ({} bytes)", payload.len());
        self.payload = Some(payload.to_string());
        self.state = SessionState::Completed;
        self.delivered = false;
        true
    }

    /// The recorded payload, if any.
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Mark the completed payload as invalid; the session then waits for a retry.
    pub fn reject(&mut self) -> bool {
        if self.state != SessionState::Completed {
            return false;
        }

        info!("Code payload rejected, awaiting retry");
        self.state = SessionState::AwaitingRetry;
        true
    }

    /// Clear the payload and accept decodes again.
    pub fn reset_for_retry(&mut self) -> bool {
        match self.state {
            SessionState::Completed | SessionState::AwaitingRetry => {
                info!("Code session reset for retry");
                self.payload = None;
                self.state = SessionState::Active;
                self.delivered = false;
                true
            }
            SessionState::Active => false,
        }
    }
}

impl ScanSession for CodeSession {
    fn mode(&self) -> ScanMode {
        ScanMode::Code
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn is_complete(&self) -> bool {
        self.payload.is_some()
    }

    fn try_complete(&mut self) -> Option<ScanResult> {
        if self.state != SessionState::Completed || self.delivered {
            return None;
        }

        let payload = self.payload.clone()?;
        self.delivered = true;
        info!("Code scan complete");
        Some(ScanResult::Code(CodeResult { payload }))
    }
}
