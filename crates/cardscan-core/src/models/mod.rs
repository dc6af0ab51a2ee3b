//! Data models for scan results and configuration.

pub mod config;
pub mod scan;

pub use config::{ClassifierConfig, ScanConfig, SessionConfig};
pub use scan::{CardResult, ClassifiedField, CodeResult, FieldKind, ScanMode, ScanResult, SessionState};
