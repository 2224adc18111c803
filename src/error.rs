//! Unified error types for the link core.
//!
//! Two families with different handling live here. [`CommandError`] covers
//! rejected inbound commands: every variant is recovered locally by sending
//! a correlated failure response, and none of them disturbs the session.
//! [`LinkError`] covers the session itself: transport and protocol failures
//! that the connection lifecycle reacts to. [`GpioError`] sits under both,
//! reporting pin-level faults from whatever adapter backs the channels.

use core::fmt::{self, Write as _};

use heapless::String;

use crate::message::{ERROR_INCORRECT_PARAM, MAX_ERROR_LEN};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An inbound command was rejected.
    Command(CommandError),
    /// The broker link failed at the transport or protocol layer.
    Link(LinkError),
    /// A hardware pin operation failed.
    Gpio(GpioError),
    /// Configuration is invalid or could not be parsed.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command rejections
// ---------------------------------------------------------------------------

/// Why an inbound command was rejected.
///
/// Rejections never tear the session down. The dispatcher answers each one
/// with a failure response correlated to the command's sequence ID and
/// leaves channel state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The value list was empty or the payload did not parse.
    MalformedPayload,
    /// A digital command payload other than a single `0` or `1`.
    InvalidDigitalLevel,
    /// An analog command value outside `[0, 1]`.
    OutOfRange,
    /// The bound handler rejected the command with its own message.
    HandlerReported(String<MAX_ERROR_LEN>),
    /// The pin driver refused the write.
    Hardware(GpioError),
}

impl CommandError {
    /// Wrap a handler-supplied rejection message, truncating to fit.
    pub fn handler_reported(text: &str) -> Self {
        let mut msg = String::new();
        for ch in text.chars() {
            if msg.push(ch).is_err() {
                break;
            }
        }
        Self::HandlerReported(msg)
    }

    /// The text sent back in this rejection's correlated response.
    ///
    /// Payload-shape rejections all collapse to the wire-level
    /// "incorrect parameter" string; handler rejections carry the handler's
    /// own message through verbatim.
    pub fn response_text(&self) -> String<MAX_ERROR_LEN> {
        let mut msg = String::new();
        match self {
            Self::MalformedPayload | Self::InvalidDigitalLevel | Self::OutOfRange => {
                let _ = msg.push_str(ERROR_INCORRECT_PARAM);
            }
            Self::HandlerReported(text) => {
                let _ = msg.push_str(text);
            }
            Self::Hardware(e) => {
                let _ = write!(msg, "hardware failure: {e}");
            }
        }
        msg
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload => write!(f, "malformed payload"),
            Self::InvalidDigitalLevel => write!(f, "invalid digital level"),
            Self::OutOfRange => write!(f, "value out of range"),
            Self::HandlerReported(text) => write!(f, "handler rejected: {text}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Session failures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport could not connect, or the socket dropped.
    Network,
    /// The protocol handshake or authentication was refused.
    Handshake,
    /// The engine failed an operation mid-session.
    Protocol,
    /// A value did not fit its bounded buffer.
    BufferOverflow,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network connect failed"),
            Self::Handshake => write!(f, "protocol handshake refused"),
            Self::Protocol => write!(f, "protocol operation failed"),
            Self::BufferOverflow => write!(f, "value exceeds buffer capacity"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Pin faults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// No line is mapped for this channel, or the operation is not
    /// available on the adapter.
    Unsupported,
    /// The underlying pin driver reported a fault.
    Pin(embedded_hal::digital::ErrorKind),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported => write!(f, "no line mapped"),
            Self::Pin(kind) => write!(f, "pin driver fault: {kind:?}"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
