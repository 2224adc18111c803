//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing lifecycle events to the logger
//! (which goes to UART / USB-CDC on most targets). Integrations with a
//! status LED or a UI implement the same trait instead.

use log::info;

use crate::app::events::LinkEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LinkEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LinkEvent) {
        match event {
            LinkEvent::Connected => info!("LINK | session up"),
            LinkEvent::Disconnected => info!("LINK | session lost, reconnecting"),
        }
    }
}
