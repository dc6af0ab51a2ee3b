//! WASM bindings for live card and code scanning.
//!
//! The host page runs the camera and the text/QR recognizer, and feeds each
//! frame's output into a scanner object. Presentation events are pulled with
//! `poll_events`.

use wasm_bindgen::prelude::*;

use cardscan_core::{
    CardSession, ChannelSink, CodeSession, EventReceiver, NumberGrouping, ScanConfig, ScanEvent,
    SessionController,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn parse_config(config: JsValue) -> Result<ScanConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ScanConfig::default());
    }

    let config: ScanConfig =
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}

/// Classify one recognized line with the default rules.
///
/// Returns `undefined` for lines that are not a card field.
#[wasm_bindgen]
pub fn classify_line(line: &str) -> Result<JsValue, JsValue> {
    match cardscan_core::classify(line) {
        Some(field) => to_js(&field),
        None => Ok(JsValue::UNDEFINED),
    }
}

/// Group a card number into blocks of four digits.
#[wasm_bindgen]
pub fn format_card_number(number: &str) -> String {
    cardscan_core::format_card_number(number, NumberGrouping::Numeric)
}

/// Card scanner for browser use.
#[wasm_bindgen]
pub struct CardScanner {
    controller: SessionController<CardSession>,
    events: EventQueue,
}

#[wasm_bindgen]
impl CardScanner {
    /// Create a card scanner, optionally from a configuration object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CardScanner, JsValue> {
        let config = parse_config(config)?;
        let (sink, events) = ChannelSink::new();

        Ok(Self {
            controller: SessionController::card(&config, sink),
            events: EventQueue::new(events),
        })
    }

    /// Feed the lines recognized in one frame. Returns whether the scan completed.
    #[wasm_bindgen]
    pub fn ingest(&self, lines: Vec<String>) -> bool {
        self.controller.ingest_lines(&lines)
    }

    /// Current session state ("active" or "completed"), `undefined` once cancelled.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        match self.controller.state() {
            Some(state) => to_js(&state),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Fields captured so far.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        match self.controller.snapshot() {
            Some(card) => to_js(&card),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Drain pending presentation events.
    #[wasm_bindgen]
    pub fn poll_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.events.drain())
    }

    /// Dismiss the scanner; later frames are ignored.
    #[wasm_bindgen]
    pub fn cancel(&self) {
        self.controller.cancel();
    }
}

/// QR / bar code scanner for browser use.
#[wasm_bindgen]
pub struct CodeScanner {
    controller: SessionController<CodeSession>,
    events: EventQueue,
}

#[wasm_bindgen]
impl CodeScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let (sink, events) = ChannelSink::new();

        Self {
            controller: SessionController::code(sink),
            events: EventQueue::new(events),
        }
    }

    /// Feed one decoded payload. Returns whether it completed the scan.
    #[wasm_bindgen]
    pub fn ingest(&self, payload: &str) -> bool {
        self.controller.ingest_code(payload)
    }

    /// Reject the captured payload and show the invalid-code prompt.
    #[wasm_bindgen]
    pub fn reject(&self) -> bool {
        self.controller.reject()
    }

    /// Scan again after a rejection.
    #[wasm_bindgen]
    pub fn retry(&self) -> bool {
        self.controller.notify_retry()
    }

    #[wasm_bindgen]
    pub fn payload(&self) -> Option<String> {
        self.controller.payload()
    }

    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsValue> {
        match self.controller.state() {
            Some(state) => to_js(&state),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Drain pending presentation events.
    #[wasm_bindgen]
    pub fn poll_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.events.drain())
    }

    #[wasm_bindgen]
    pub fn cancel(&self) {
        self.controller.cancel();
    }
}

impl Default for CodeScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull side of a scanner's event channel.
struct EventQueue {
    rx: EventReceiver,
}

impl EventQueue {
    fn new(rx: EventReceiver) -> Self {
        Self { rx }
    }

    /// Take every event queued since the last call.
    fn drain(&mut self) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
