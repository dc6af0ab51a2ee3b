//! Scan sessions and their controller.
//!
//! A session accumulates one scan attempt. [`CardSession`] collects card fields
//! slot by slot, [`CodeSession`] completes on the first decoded payload. The
//! [`SessionController`] serializes access to a session shared by concurrent
//! frame workers and delivers the result to a [`PresentationSink`].

mod card;
mod code;
mod controller;
mod sink;

pub use card::CardSession;
pub use code::CodeSession;
pub use controller::SessionController;
pub use sink::{ChannelSink, EventReceiver, NullSink, OneshotSink, PresentationSink, ScanEvent};

use crate::models::scan::{ScanMode, ScanResult, SessionState};

/// Common interface of the scan session state machines.
pub trait ScanSession: Send {
    /// Operating mode, fixed for the session's lifetime.
    fn mode(&self) -> ScanMode;

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Whether enough has been collected to finish the attempt.
    fn is_complete(&self) -> bool;

    /// Finish the attempt, returning the result exactly once per completion.
    ///
    /// Subsequent calls return `None` until the session is reset.
    fn try_complete(&mut self) -> Option<ScanResult>;
}
