//! Session controller: serializes a session shared by frame workers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::classifier::LineClassifier;
use crate::models::config::ScanConfig;
use crate::models::scan::{CardResult, ClassifiedField, ScanMode, SessionState};

use super::card::CardSession;
use super::code::CodeSession;
use super::sink::PresentationSink;
use super::ScanSession;

/// Owns the session of one scan attempt.
///
/// Every mutating call takes the session lock for one ingest-plus-completion
/// cycle, so a result is handed to the sink at most once per completion no
/// matter how many frame workers feed the controller. Share it with `Arc`.
///
/// The mode is fixed by the session type: lines can only be fed to a card
/// controller and payloads only to a code controller.
pub struct SessionController<S: ScanSession> {
    mode: ScanMode,
    session: Mutex<Option<S>>,
    sink: Box<dyn PresentationSink>,
}

impl<S: ScanSession> SessionController<S> {
    /// Create a controller for a session.
    pub fn new(session: S, sink: impl PresentationSink + 'static) -> Self {
        Self {
            mode: session.mode(),
            session: Mutex::new(Some(session)),
            sink: Box::new(sink),
        }
    }

    /// Operating mode of the attempt.
    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Current session state, or `None` once the attempt was cancelled.
    pub fn state(&self) -> Option<SessionState> {
        self.lock().as_ref().map(|s| s.state())
    }

    /// Whether the controller still accepts ingestion.
    pub fn is_active(&self) -> bool {
        self.state().is_some_and(|s| s.is_active())
    }

    /// End the attempt and discard the session.
    ///
    /// Frames still in flight are dropped when they arrive.
    pub fn cancel(&self) {
        if self.lock().take().is_some() {
            info!("{} scan cancelled", self.mode);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<S>> {
        // Session operations never panic mid-update, so a poisoned lock still
        // guards a consistent session.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one mutation plus completion check under the lock.
    fn cycle<F>(&self, ingest: F) -> bool
    where
        F: FnOnce(&mut S, &dyn PresentationSink),
    {
        let mut guard = self.lock();
        let Some(session) = guard.as_mut() else {
            debug!("Dropping input for cancelled {} scan", self.mode);
            return false;
        };

        ingest(&mut *session, self.sink.as_ref());

        match session.try_complete() {
            Some(result) => {
                self.sink.on_complete(result);
                true
            }
            None => false,
        }
    }
}

impl SessionController<CardSession> {
    /// Create a card controller from configuration.
    pub fn card(config: &ScanConfig, sink: impl PresentationSink + 'static) -> Self {
        Self::new(CardSession::from_config(config), sink)
    }

    /// Classify one frame's lines and accumulate them.
    ///
    /// Classification runs before the lock is taken. Returns whether this
    /// batch completed the scan.
    pub fn ingest_lines<I, L>(&self, lines: I) -> bool
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let Some(classifier) = self.classifier() else {
            return false;
        };

        let fields: Vec<ClassifiedField> = lines
            .into_iter()
            .filter_map(|l| classifier.classify(l.as_ref()))
            .collect();

        self.ingest_fields(fields)
    }

    /// Accumulate fields classified elsewhere. Returns whether the scan completed.
    pub fn ingest_fields(&self, fields: Vec<ClassifiedField>) -> bool {
        if fields.is_empty() {
            return false;
        }

        self.cycle(|session, sink| {
            for field in fields {
                if let Some(captured) = session.accept(field) {
                    sink.on_field(&captured);
                }
            }
        })
    }

    /// Fields collected so far.
    pub fn snapshot(&self) -> Option<CardResult> {
        self.lock().as_ref().map(|s| s.snapshot().clone())
    }

    fn classifier(&self) -> Option<LineClassifier> {
        self.lock().as_ref().map(|s| s.classifier().clone())
    }
}

impl SessionController<CodeSession> {
    /// Create a code controller.
    pub fn code(sink: impl PresentationSink + 'static) -> Self {
        Self::new(CodeSession::new(), sink)
    }

    /// Feed one decoded payload. Returns whether it completed the scan.
    pub fn ingest_code(&self, payload: &str) -> bool {
        self.cycle(|session, _| {
            session.ingest_code(payload);
        })
    }

    /// Reject the completed payload and prompt the user to try again.
    pub fn reject(&self) -> bool {
        let mut guard = self.lock();
        if guard.as_mut().is_some_and(|s| s.reject()) {
            self.sink.on_rejected();
            true
        } else {
            false
        }
    }

    /// User asked to scan again: reset the session and hide the invalid-code prompt.
    pub fn notify_retry(&self) -> bool {
        let mut guard = self.lock();
        if guard.as_mut().is_some_and(|s| s.reset_for_retry()) {
            self.sink.on_retry();
            true
        } else {
            false
        }
    }

    /// The recorded payload, if any.
    pub fn payload(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .and_then(|s| s.payload().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::models::scan::{CodeResult, ScanResult};
    use crate::session::sink::{ChannelSink, NullSink, OneshotSink, ScanEvent};
    use pretty_assertions::assert_eq;

    fn config() -> ScanConfig {
        let mut config = ScanConfig::default();
        config.classifier.reference_year = Some(2026);
        config
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<ScanEvent>) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_card_completion_notifies_once() {
        let (sink, mut rx) = ChannelSink::new();
        let controller = SessionController::card(&config(), sink);

        assert!(!controller.ingest_lines(["4111 1111 1111 1111"]));
        assert!(controller.ingest_lines(["12/26", "JOHN SMITH"]));
        assert!(!controller.ingest_lines(["4111 1111 1111 1111", "01/30"]));

        let events = drain(&mut rx);
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, ScanEvent::Completed(_)))
            .collect();
        assert_eq!(completions.len(), 1);
        assert_eq!(
            events.iter().filter(|e| matches!(e, ScanEvent::FieldCaptured(_))).count(),
            3
        );
        assert_eq!(controller.state(), Some(SessionState::Completed));
    }

    #[test]
    fn test_concurrent_ingestion_completes_once() {
        let (sink, mut rx) = ChannelSink::new();
        let controller = Arc::new(SessionController::card(&config(), sink));

        let frames: Vec<Vec<&'static str>> = (0..64)
            .map(|i| match i % 4 {
                0 => vec!["4111 1111 1111 1111", "noise"],
                1 => vec!["12/26"],
                2 => vec!["JOHN SMITH", "5555 5555 5555 4444"],
                _ => vec!["01/30", "VISA"],
            })
            .collect();

        let handles: Vec<_> = frames
            .into_iter()
            .map(|frame| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || controller.ingest_lines(frame))
            })
            .collect();

        let completed: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(completed, 1);
        let completions = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, ScanEvent::Completed(_)))
            .count();
        assert_eq!(completions, 1);
    }

    #[tokio::test]
    async fn test_oneshot_delivery() {
        let (sink, rx) = OneshotSink::new();
        let controller = SessionController::card(&config(), sink);

        controller.ingest_lines(["4111111111111111", "12/26"]);

        let result = rx.await.unwrap();
        assert_eq!(result.as_card().unwrap().expiry_display(), Some("12/26"));
    }

    #[tokio::test]
    async fn test_cancel_drops_session() {
        let (sink, rx) = OneshotSink::new();
        let controller = SessionController::card(&config(), sink);

        controller.ingest_lines(["4111111111111111"]);
        controller.cancel();

        assert!(!controller.ingest_lines(["12/26"]));
        assert_eq!(controller.state(), None);
        assert_eq!(controller.snapshot(), None);

        drop(controller);
        assert!(rx.await.is_err());
    }

    #[test]
    fn test_code_retry_flow() {
        let (sink, mut rx) = ChannelSink::new();
        let controller = SessionController::code(sink);
        assert_eq!(controller.mode(), ScanMode::Code);

        assert!(controller.ingest_code("PAYLOAD"));
        assert!(!controller.ingest_code("OTHER"));
        assert!(controller.reject());
        assert_eq!(controller.state(), Some(SessionState::AwaitingRetry));
        assert!(controller.notify_retry());
        assert!(controller.ingest_code("OTHER"));

        assert_eq!(
            drain(&mut rx),
            vec![
                ScanEvent::Completed(ScanResult::Code(CodeResult {
                    payload: "PAYLOAD".to_string()
                })),
                ScanEvent::Rejected,
                ScanEvent::RetryReady,
                ScanEvent::Completed(ScanResult::Code(CodeResult {
                    payload: "OTHER".to_string()
                })),
            ]
        );
        assert_eq!(controller.payload().as_deref(), Some("OTHER"));
    }

    #[test]
    fn test_retry_without_reject() {
        let controller = SessionController::code(NullSink);
        controller.ingest_code("A");
        assert!(controller.notify_retry());
        assert!(controller.is_active());
        assert!(!controller.notify_retry());
    }

    #[test]
    fn test_reject_and_retry_signal_only_on_transition() {
        let (sink, mut rx) = ChannelSink::new();
        let controller = SessionController::code(sink);

        assert!(!controller.reject());
        assert!(!controller.notify_retry());
        assert!(drain(&mut rx).is_empty());

        controller.ingest_code("A");
        assert!(controller.reject());
        assert!(!controller.reject());
        assert!(controller.notify_retry());

        assert_eq!(
            drain(&mut rx),
            vec![
                ScanEvent::Completed(ScanResult::Code(CodeResult {
                    payload: "A".to_string()
                })),
                ScanEvent::Rejected,
                ScanEvent::RetryReady,
            ]
        );

        controller.cancel();
        assert!(!controller.reject());
        assert!(!controller.notify_retry());
    }

    #[test]
    fn test_concurrent_codes_complete_once() {
        let (sink, mut rx) = ChannelSink::new();
        let controller = Arc::new(SessionController::code(sink));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let controller = Arc::clone(&controller);
                thread::spawn(move || controller.ingest_code(&format!("CODE-{}", i)))
            })
            .collect();

        let completed = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|c| *c)
            .count();
        assert_eq!(completed, 1);
        assert_eq!(drain(&mut rx).len(), 1);
    }
}
