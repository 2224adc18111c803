//! Outbound value publication.
//!
//! [`VirtualWriter`] publishes measurement values on the data topic through
//! a borrowed protocol engine. Output handlers receive one per poll cycle;
//! application code can also construct one directly between ticks. The
//! typed helpers cover the common measurement vocabulary so call sites
//! don't repeat kind/unit string pairs.

use core::fmt::{self, Write as _};

use heapless::String;
use log::{debug, warn};

use crate::error::LinkError;
use crate::message::{MAX_VALUE_LEN, Topic, ValuePair, data_kind, data_unit};

use super::ports::ProtocolPort;

/// Publishes channel values through a borrowed protocol engine.
pub struct VirtualWriter<'a> {
    link: &'a mut dyn ProtocolPort,
}

impl<'a> VirtualWriter<'a> {
    pub fn new(link: &'a mut dyn ProtocolPort) -> Self {
        Self { link }
    }

    /// Publish `value` on the data topic for `channel`.
    ///
    /// `kind` and `unit` annotate the measurement; pass `None` for untyped
    /// values. Fails with [`LinkError::BufferOverflow`] when the formatted
    /// value exceeds [`MAX_VALUE_LEN`].
    pub fn virtual_write(
        &mut self,
        channel: u16,
        value: impl fmt::Display,
        kind: Option<&str>,
        unit: Option<&str>,
    ) -> core::result::Result<(), LinkError> {
        let mut text: String<MAX_VALUE_LEN> = String::new();
        write!(text, "{value}").map_err(|_| LinkError::BufferOverflow)?;
        debug!("virtual write: channel {channel}, value {text}");
        let pair = match unit {
            Some(unit) => ValuePair::with_unit(unit, &text),
            None => ValuePair::new(&text),
        };
        self.link.publish(Topic::Data, Some(channel), kind, &[pair])
    }

    // ── Typed helpers ─────────────────────────────────────────

    /// Temperature in degrees Celsius.
    pub fn celsius_write(
        &mut self,
        channel: u16,
        value: f32,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::TEMPERATURE),
            Some(data_unit::CELSIUS),
        )
    }

    /// Temperature in degrees Fahrenheit.
    pub fn fahrenheit_write(
        &mut self,
        channel: u16,
        value: f32,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::TEMPERATURE),
            Some(data_unit::FAHRENHEIT),
        )
    }

    /// Temperature in kelvin.
    pub fn kelvin_write(
        &mut self,
        channel: u16,
        value: f32,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::TEMPERATURE),
            Some(data_unit::KELVIN),
        )
    }

    /// Illuminance in lux.
    pub fn lux_write(&mut self, channel: u16, value: f32) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::LUMINOSITY),
            Some(data_unit::LUX),
        )
    }

    /// Barometric pressure in pascals.
    pub fn pascal_write(
        &mut self,
        channel: u16,
        value: f32,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::BAROMETRIC_PRESSURE),
            Some(data_unit::PASCAL),
        )
    }

    /// Barometric pressure in hectopascals.
    pub fn hectopascal_write(
        &mut self,
        channel: u16,
        value: f32,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            value,
            Some(data_kind::BAROMETRIC_PRESSURE),
            Some(data_unit::HECTOPASCAL),
        )
    }

    /// A two-state sensor reading.
    pub fn digital_sensor_write(
        &mut self,
        channel: u16,
        value: bool,
    ) -> core::result::Result<(), LinkError> {
        self.virtual_write(
            channel,
            u8::from(value),
            Some(data_kind::DIGITAL_SENSOR),
            Some(data_unit::DIGITAL),
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Shared publication helpers
// ───────────────────────────────────────────────────────────────

/// Publish one channel state value on a status topic, logging instead of
/// propagating failures. Used for command echoes and physical poll results,
/// neither of which has a caller that could recover.
pub(crate) fn publish_state(
    link: &mut impl ProtocolPort,
    topic: Topic,
    channel: u16,
    value: &str,
) {
    debug!("publish state: topic {topic}, channel {channel}, value {value}");
    if let Err(e) = link.publish(topic, Some(channel), None, &[ValuePair::new(value)]) {
        warn!("state publish failed on channel {channel}: {e}");
    }
}

/// Wire text for a digital level.
pub(crate) fn digital_text(level: bool) -> &'static str {
    if level { "1" } else { "0" }
}
