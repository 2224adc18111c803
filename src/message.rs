//! Message model and wire vocabulary.
//!
//! [`InboundMessage`] is the decoded form of one broker message, produced by
//! a protocol adapter and consumed by the dispatcher. Topics are routing
//! categories, not raw topic strings: the adapter owns the string syntax of
//! its wire protocol and maps each path to a [`Topic`] before the message
//! enters the core.
//!
//! Everything here is fixed-capacity. Adapters that decode oversized fields
//! truncate at the published bounds.

use core::fmt;

use heapless::{String, Vec};

/// Values one message can carry.
pub const MAX_VALUES: usize = 8;

/// Bytes per value payload.
pub const MAX_VALUE_LEN: usize = 64;

/// Bytes per unit annotation.
pub const MAX_UNIT_LEN: usize = 16;

/// Bytes per command sequence ID.
pub const MAX_ID_LEN: usize = 32;

/// Bytes per rejection message.
pub const MAX_ERROR_LEN: usize = 64;

/// Wire-level rejection text for malformed or out-of-range payloads.
pub const ERROR_INCORRECT_PARAM: &str = "incorrect parameter";

// ───────────────────────────────────────────────────────────────
// Topic categories
// ───────────────────────────────────────────────────────────────

/// Routing category of a message path.
///
/// `Other` absorbs every unrecognized path so that forward-compatible
/// brokers never break dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// Inbound write request for a virtual channel.
    Command,
    /// Inbound write request for a digital pin channel.
    DigitalCommand,
    /// Inbound polling config for a digital channel.
    DigitalConfig,
    /// Inbound write request for an analog pin channel.
    AnalogCommand,
    /// Inbound polling config for an analog channel.
    AnalogConfig,
    /// Outbound virtual channel data.
    Data,
    /// Outbound digital channel state.
    Digital,
    /// Outbound analog channel state.
    Analog,
    /// Outbound device model announcement.
    SysModel,
    /// Outbound CPU model announcement.
    SysCpuModel,
    /// Outbound CPU clock announcement.
    SysCpuSpeed,
    /// Outbound client version announcement.
    SysVersion,
    /// Anything the adapter did not recognize.
    Other,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Command => "command",
            Self::DigitalCommand => "digital-command",
            Self::DigitalConfig => "digital-config",
            Self::AnalogCommand => "analog-command",
            Self::AnalogConfig => "analog-config",
            Self::Data => "data",
            Self::Digital => "digital",
            Self::Analog => "analog",
            Self::SysModel => "sys-model",
            Self::SysCpuModel => "sys-cpu-model",
            Self::SysCpuSpeed => "sys-cpu-speed",
            Self::SysVersion => "sys-version",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

// ───────────────────────────────────────────────────────────────
// Values
// ───────────────────────────────────────────────────────────────

/// One `(unit, value)` pair from a message payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePair {
    /// Optional unit annotation (`"c"`, `"lux"`, ...).
    pub unit: Option<String<MAX_UNIT_LEN>>,
    /// The value text as carried on the wire.
    pub value: String<MAX_VALUE_LEN>,
}

impl ValuePair {
    /// A bare value with no unit, truncated to capacity.
    pub fn new(value: &str) -> Self {
        Self {
            unit: None,
            value: bounded(value),
        }
    }

    /// A unit-annotated value, both parts truncated to capacity.
    pub fn with_unit(unit: &str, value: &str) -> Self {
        Self {
            unit: Some(bounded(unit)),
            value: bounded(value),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Inbound messages
// ───────────────────────────────────────────────────────────────

/// One decoded inbound broker message.
///
/// Handlers receive this mutably so they can veto a command via
/// [`set_error`](Self::set_error); the dispatcher reads the slot back after
/// the handler returns and turns it into a failure response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Routing category the adapter assigned.
    pub topic: Topic,
    /// Channel the message addresses.
    pub channel: u16,
    /// Sequence ID used to correlate the response.
    pub id: String<MAX_ID_LEN>,
    /// Decoded payload values.
    pub values: Vec<ValuePair, MAX_VALUES>,
    error: Option<String<MAX_ERROR_LEN>>,
}

impl InboundMessage {
    /// A message with no values yet.
    pub fn new(topic: Topic, channel: u16, id: &str) -> Self {
        Self {
            topic,
            channel,
            id: bounded(id),
            values: Vec::new(),
            error: None,
        }
    }

    /// Builder form: append one bare value. Values past [`MAX_VALUES`] are
    /// dropped.
    #[must_use]
    pub fn with_value(mut self, value: &str) -> Self {
        let _ = self.values.push(ValuePair::new(value));
        self
    }

    /// The first value payload, if any.
    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(|pair| pair.value.as_str())
    }

    /// Record a handler rejection, truncated to capacity. A later call
    /// replaces an earlier one.
    pub fn set_error(&mut self, text: &str) {
        self.error = Some(bounded(text));
    }

    /// The recorded rejection, if the handler set one.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Minimal request view passed to channel handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    /// Channel the request addresses.
    pub channel: u16,
}

// ───────────────────────────────────────────────────────────────
// Data vocabulary
// ───────────────────────────────────────────────────────────────

/// Measurement kind keys published alongside virtual channel data.
pub mod data_kind {
    pub const TEMPERATURE: &str = "temp";
    pub const LUMINOSITY: &str = "lum";
    pub const BAROMETRIC_PRESSURE: &str = "bp";
    pub const DIGITAL_SENSOR: &str = "digital_sensor";
}

/// Unit keys published alongside virtual channel data.
pub mod data_unit {
    pub const CELSIUS: &str = "c";
    pub const FAHRENHEIT: &str = "f";
    pub const KELVIN: &str = "k";
    pub const LUX: &str = "lux";
    pub const PASCAL: &str = "pa";
    pub const HECTOPASCAL: &str = "hpa";
    pub const DIGITAL: &str = "d";
}

/// Copy `text` into a bounded string, truncating at the capacity.
///
/// Truncation is per character so multi-byte input cannot split.
fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
