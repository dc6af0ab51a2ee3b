//! Presentation sinks: where scan progress and results are delivered.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::models::scan::{ClassifiedField, ScanResult};

/// Notification sent to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// A card field filled its slot.
    FieldCaptured(ClassifiedField),
    /// The scan attempt finished.
    Completed(ScanResult),
    /// The completed code was rejected; show the invalid-code prompt.
    Rejected,
    /// The session accepts decodes again; hide the invalid-code prompt.
    RetryReady,
}

/// Receiving end of a [`ChannelSink`].
pub type EventReceiver = mpsc::UnboundedReceiver<ScanEvent>;

/// Receiver of scan notifications.
///
/// Called with the session lock held: implementations must return quickly
/// and must not call back into the controller.
pub trait PresentationSink: Send + Sync {
    /// A card field was captured.
    fn on_field(&self, _field: &ClassifiedField) {}

    /// The scan attempt completed.
    fn on_complete(&self, result: ScanResult);

    /// The completed code was rejected.
    fn on_rejected(&self) {}

    /// The session was reset for another attempt.
    fn on_retry(&self) {}
}

/// Sink forwarding every notification over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ScanEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiving end of its channel.
    pub fn new() -> (Self, EventReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ScanEvent) {
        // Receiver gone means nobody is presenting anymore.
        let _ = self.sender.send(event);
    }
}

impl PresentationSink for ChannelSink {
    fn on_field(&self, field: &ClassifiedField) {
        self.send(ScanEvent::FieldCaptured(field.clone()));
    }

    fn on_complete(&self, result: ScanResult) {
        self.send(ScanEvent::Completed(result));
    }

    fn on_rejected(&self) {
        self.send(ScanEvent::Rejected);
    }

    fn on_retry(&self) {
        self.send(ScanEvent::RetryReady);
    }
}

/// Sink delivering only the first completed result.
///
/// The sender is consumed on first use, so a second completion can never
/// reach the receiver.
#[derive(Debug)]
pub struct OneshotSink {
    sender: Mutex<Option<oneshot::Sender<ScanResult>>>,
}

impl OneshotSink {
    /// Create a sink and the receiver its result will arrive on.
    ///
    /// The receiver errors if the sink is dropped without a result, e.g. when
    /// the scan is cancelled.
    pub fn new() -> (Self, oneshot::Receiver<ScanResult>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Mutex::new(Some(sender)),
            },
            receiver,
        )
    }

    /// Whether the result has already been sent.
    pub fn is_spent(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl PresentationSink for OneshotSink {
    fn on_complete(&self, result: ScanResult) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(sender) = sender {
            let _ = sender.send(result);
        }
    }
}

/// Sink that discards everything, for callers that poll the controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn on_complete(&self, _result: ScanResult) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scan::{CodeResult, FieldKind};

    fn code(payload: &str) -> ScanResult {
        ScanResult::Code(CodeResult {
            payload: payload.to_string(),
        })
    }

    #[test]
    fn test_channel_sink_forwards_events() {
        let (sink, mut rx) = ChannelSink::new();
        let field = ClassifiedField::new(FieldKind::ExpiryDate, "12/26", "12/26");

        sink.on_field(&field);
        sink.on_complete(code("A"));
        sink.on_rejected();
        sink.on_retry();

        assert_eq!(rx.try_recv().unwrap(), ScanEvent::FieldCaptured(field));
        assert_eq!(rx.try_recv().unwrap(), ScanEvent::Completed(code("A")));
        assert_eq!(rx.try_recv().unwrap(), ScanEvent::Rejected);
        assert_eq!(rx.try_recv().unwrap(), ScanEvent::RetryReady);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_complete(code("A"));
    }

    #[tokio::test]
    async fn test_oneshot_sink_delivers_first_result_only() {
        let (sink, rx) = OneshotSink::new();
        assert!(!sink.is_spent());

        sink.on_complete(code("FIRST"));
        sink.on_complete(code("SECOND"));

        assert!(sink.is_spent());
        assert_eq!(rx.await.unwrap(), code("FIRST"));
    }

    #[tokio::test]
    async fn test_oneshot_sink_dropped_without_result() {
        let (sink, rx) = OneshotSink::new();
        drop(sink);
        assert!(rx.await.is_err());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(ScanEvent::RetryReady).unwrap();
        assert_eq!(json["event"], "retry_ready");
    }
}
