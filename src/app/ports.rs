//! Port traits: the hexagonal boundary of the link core.
//!
//! Every interaction between the domain logic and the outside world flows
//! through one of these traits. Adapters implement them; the service and
//! its helpers only ever see the trait.
//!
//! ```text
//!  ProtocolPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  NetworkPort  ──▶ │        LinkService        │
//!  GpioPort     ◀── │  dispatch · poll · retry  │
//!                   └──────────────────────────┘
//! ```
//!
//! ## Layering notes
//!
//! - `ProtocolPort` is a session-layer engine (an MQTT client or similar):
//!   it owns topic-string syntax and payload encoding, and hands the core
//!   pre-decoded [`InboundMessage`]s.
//! - `NetworkPort` is the transport under that engine. The split exists
//!   because connect failures at the two layers recover differently.
//! - Ports are passed per call, not stored, so one adapter struct may
//!   implement several of them without borrow gymnastics.

use crate::error::{GpioError, LinkError};
use crate::message::{InboundMessage, Topic, ValuePair};

use super::events::LinkEvent;

// ───────────────────────────────────────────────────────────────
// ProtocolPort (broker session engine)
// ───────────────────────────────────────────────────────────────

/// Which channels a subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelector {
    /// Wildcard: every channel of the topic.
    All,
    /// A single channel.
    One(u16),
}

/// Session-layer engine for the broker protocol.
pub trait ProtocolPort {
    /// Run the protocol handshake over an already-connected transport.
    fn connect(&mut self) -> core::result::Result<(), LinkError>;

    /// Drop the session. Safe to call when not connected.
    fn disconnect(&mut self);

    /// Whether the session is currently established.
    fn is_connected(&mut self) -> bool;

    /// Subscribe to one inbound topic category.
    fn subscribe(
        &mut self,
        topic: Topic,
        channels: ChannelSelector,
    ) -> core::result::Result<(), LinkError>;

    /// Publish values on an outbound topic.
    ///
    /// `channel` is `None` for device-scoped topics (the system announce
    /// family). `key` is the optional measurement-kind annotation.
    fn publish(
        &mut self,
        topic: Topic,
        channel: Option<u16>,
        key: Option<&str>,
        values: &[ValuePair],
    ) -> core::result::Result<(), LinkError>;

    /// Publish a command response correlated by `id`. `error` of `None`
    /// means success.
    fn publish_response(
        &mut self,
        id: &str,
        error: Option<&str>,
    ) -> core::result::Result<(), LinkError>;

    /// Wait up to `timeout_ms` for one inbound message.
    ///
    /// `Ok(None)` means the wait elapsed with nothing to deliver. The core
    /// drains by calling this repeatedly with a zero timeout, so an engine
    /// buffering several messages hands them over one per call.
    fn poll_inbound(
        &mut self,
        timeout_ms: u32,
    ) -> core::result::Result<Option<InboundMessage>, LinkError>;
}

// ───────────────────────────────────────────────────────────────
// NetworkPort (transport under the session)
// ───────────────────────────────────────────────────────────────

/// Transport the protocol engine runs over.
pub trait NetworkPort {
    /// Open the transport to `host:port`.
    fn connect(&mut self, host: &str, port: u16) -> core::result::Result<(), LinkError>;

    /// Whether the transport is currently up.
    fn is_connected(&mut self) -> bool;

    /// Close the transport. Safe to call when not connected.
    fn disconnect(&mut self);
}

// ───────────────────────────────────────────────────────────────
// GpioPort (channel-addressed pin access)
// ───────────────────────────────────────────────────────────────

/// Pin access addressed by channel number.
///
/// Digital levels are plain `bool` (`true` = high). Analog reads return the
/// raw sample; analog writes take an 8-bit duty value.
pub trait GpioPort {
    fn digital_read(&mut self, channel: u16) -> core::result::Result<bool, GpioError>;

    fn digital_write(&mut self, channel: u16, level: bool)
    -> core::result::Result<(), GpioError>;

    fn analog_read(&mut self, channel: u16) -> core::result::Result<u16, GpioError>;

    fn analog_write(&mut self, channel: u16, duty: u8) -> core::result::Result<(), GpioError>;
}

// ───────────────────────────────────────────────────────────────
// EventSink (lifecycle notifications out)
// ───────────────────────────────────────────────────────────────

/// Receives lifecycle events from the core.
pub trait EventSink {
    fn emit(&mut self, event: &LinkEvent);
}
