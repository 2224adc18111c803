//! Inbound message dispatch.
//!
//! Pure routing: one decoded message in, handler invocation plus the
//! resulting publishes out. Nothing here owns state; registry, bitsets, and
//! ports are borrowed from the service for the duration of one message.
//!
//! Every command topic follows the same contract:
//!
//! 1. validate the payload,
//! 2. apply the effect (handler call or pin write),
//! 3. on success, echo the accepted value on the matching state topic,
//! 4. always answer with a response correlated to the command's ID.
//!
//! Config messages are the exception: they mutate the poll sets and answer
//! with nothing, success or not.

use log::{debug, warn};

use crate::channels::ChannelBitset;
use crate::error::CommandError;
use crate::message::{InboundMessage, Request, Topic};
use crate::registry::{Binding, HandlerRegistry};

use super::ports::{GpioPort, ProtocolPort};
use super::write::{digital_text, publish_state};

/// Route one inbound message to its handling path.
pub(crate) fn dispatch(
    registry: &mut HandlerRegistry,
    digital: &mut ChannelBitset,
    analog: &mut ChannelBitset,
    link: &mut impl ProtocolPort,
    hw: &mut impl GpioPort,
    message: &mut InboundMessage,
) {
    debug!(
        "message received: topic {}, channel {}",
        message.topic, message.channel
    );
    match message.topic {
        Topic::Command => handle_command(registry, link, message),
        Topic::DigitalCommand => handle_digital_command(link, hw, message),
        Topic::DigitalConfig => apply_config(digital, message),
        Topic::AnalogCommand => handle_analog_command(link, hw, message),
        Topic::AnalogConfig => apply_config(analog, message),
        // Outbound categories looping back, and anything unrecognized.
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// Virtual channel commands
// ───────────────────────────────────────────────────────────────

fn handle_command(
    registry: &mut HandlerRegistry,
    link: &mut impl ProtocolPort,
    message: &mut InboundMessage,
) {
    let channel = message.channel;
    let has_payload = message.first_value().is_some_and(|v| !v.is_empty());
    if !has_payload {
        reject(link, message, &CommandError::MalformedPayload);
        return;
    }

    match registry.input(channel) {
        Binding::Dedicated(handler) | Binding::Fallback(handler) => {
            handler.handle(Request { channel }, message);
        }
        // No handler anywhere: the command still succeeds, so the sender's
        // view converges on the echoed value.
        Binding::Vacant => {}
    }

    match message.error() {
        None => {
            if let Some(value) = message.first_value() {
                publish_state(link, Topic::Data, channel, value);
            }
            respond(link, message.id.as_str(), None);
        }
        Some(text) => {
            let err = CommandError::handler_reported(text);
            reject(link, message, &err);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Pin channel commands
// ───────────────────────────────────────────────────────────────

fn handle_digital_command(
    link: &mut impl ProtocolPort,
    hw: &mut impl GpioPort,
    message: &InboundMessage,
) {
    let channel = message.channel;
    let outcome = match message.first_value() {
        Some("0") => Ok(false),
        Some("1") => Ok(true),
        _ => Err(CommandError::InvalidDigitalLevel),
    }
    .and_then(|level| {
        hw.digital_write(channel, level)
            .map(|()| level)
            .map_err(CommandError::Hardware)
    });

    match outcome {
        Ok(level) => {
            debug!("dw {}, channel {channel}", digital_text(level));
            publish_state(link, Topic::Digital, channel, digital_text(level));
            respond(link, message.id.as_str(), None);
        }
        Err(err) => reject(link, message, &err),
    }
}

fn handle_analog_command(
    link: &mut impl ProtocolPort,
    hw: &mut impl GpioPort,
    message: &InboundMessage,
) {
    let channel = message.channel;
    let outcome = parse_fraction(message.first_value()).and_then(|value| {
        debug!("aw {value}, channel {channel}");
        hw.analog_write(channel, scale_duty(value))
            .map_err(CommandError::Hardware)
    });

    match outcome {
        Ok(()) => {
            // Echo the payload as received, not a reformatted float.
            if let Some(value) = message.first_value() {
                publish_state(link, Topic::Analog, channel, value);
            }
            respond(link, message.id.as_str(), None);
        }
        Err(err) => reject(link, message, &err),
    }
}

/// Parse an analog command payload: a decimal fraction in `[0, 1]`.
fn parse_fraction(payload: Option<&str>) -> core::result::Result<f32, CommandError> {
    let text = payload.ok_or(CommandError::MalformedPayload)?;
    let value: f32 = text
        .trim()
        .parse()
        .map_err(|_| CommandError::MalformedPayload)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(CommandError::OutOfRange)
    }
}

/// Scale a `[0, 1]` fraction to an 8-bit duty value, rounding to nearest.
fn scale_duty(value: f32) -> u8 {
    (value * 255.0).round() as u8
}

// ───────────────────────────────────────────────────────────────
// Polling config
// ───────────────────────────────────────────────────────────────

/// Apply a polling config payload to one bitset.
///
/// Fire-and-forget on the wire: unrecognized payloads are dropped, and
/// config messages never produce a response.
fn apply_config(bitset: &mut ChannelBitset, message: &InboundMessage) {
    let payload = message.first_value().unwrap_or("");
    debug!("config channel {}: {payload}", message.channel);
    if payload.len() >= 2 {
        match payload {
            "on" => bitset.enable(message.channel, true),
            "off" => bitset.enable(message.channel, false),
            _ => {}
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

fn reject(link: &mut impl ProtocolPort, message: &InboundMessage, err: &CommandError) {
    warn!(
        "command rejected on channel {}: {err}",
        message.channel
    );
    let text = err.response_text();
    respond(link, message.id.as_str(), Some(text.as_str()));
}

fn respond(link: &mut impl ProtocolPort, id: &str, error: Option<&str>) {
    debug!("send response: {id} {}", error.unwrap_or("ok"));
    if let Err(e) = link.publish_response(id, error) {
        warn!("response publish failed for {id}: {e}");
    }
}
