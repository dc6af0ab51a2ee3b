//! Core library for live payment card and code scanning.
//!
//! This crate provides:
//! - Line classification of recognized text into card fields (number, expiry, holder name)
//! - Card number display formatting
//! - Scan sessions accumulating fields across video frames
//! - A session controller serializing concurrent frame results and delivering
//!   the final result exactly once
//!
//! Camera capture and OCR/QR decoding happen elsewhere; this crate consumes
//! their text output.

pub mod classifier;
pub mod error;
pub mod fields;
pub mod models;
pub mod session;

pub use classifier::{classify, LineClassifier};
pub use error::{ConfigError, Result, ScanError};
pub use fields::{format_card_number, NumberGrouping, TextLine};
pub use models::config::{ClassifierConfig, ScanConfig, SessionConfig};
pub use models::scan::{CardResult, ClassifiedField, CodeResult, FieldKind, ScanMode, ScanResult, SessionState};
pub use session::{
    CardSession, ChannelSink, CodeSession, EventReceiver, NullSink, OneshotSink, PresentationSink, ScanEvent, ScanSession,
    SessionController,
};
