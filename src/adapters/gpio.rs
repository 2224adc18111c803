//! embedded-hal digital pin bank.
//!
//! Implements [`GpioPort`] over `embedded-hal` 1.0 digital pins so the
//! digital channel surface works against any conforming HAL. Channels map
//! to pins explicitly: nothing is assumed about numbering, and a channel
//! with no mapped line fails with [`GpioError::Unsupported`].
//!
//! Analog channels have no embedded-hal 1.0 trait (the ADC/PWM traits did
//! not make the 1.0 cut), so the bank reports `Unsupported` for them.
//! Integrations with analog channels implement [`GpioPort`] directly on
//! their HAL's ADC/PWM types and delegate the digital half here if they
//! want to.

use embedded_hal::digital::{InputPin, OutputPin};
use heapless::FnvIndexMap;

use crate::app::ports::GpioPort;
use crate::error::GpioError;

/// Channels one bank can map. Must be a power of two (index map bound).
pub const MAX_LINES: usize = 32;

enum Line<E: embedded_hal::digital::Error> {
    Input(Box<dyn InputPin<Error = E>>),
    Output(Box<dyn OutputPin<Error = E>>),
}

/// Digital pin bank over embedded-hal pins.
///
/// `E` is the HAL's pin error type; a bank holds pins from one HAL.
pub struct HalPinBank<E: embedded_hal::digital::Error> {
    lines: FnvIndexMap<u16, Line<E>, MAX_LINES>,
}

impl<E: embedded_hal::digital::Error> HalPinBank<E> {
    /// An empty bank: every channel is unmapped.
    pub fn new() -> Self {
        Self {
            lines: FnvIndexMap::new(),
        }
    }

    /// Map `channel` to an input pin, replacing any existing mapping.
    /// Returns `false` (dropping the pin) when the bank is full.
    pub fn map_input(&mut self, channel: u16, pin: impl InputPin<Error = E> + 'static) -> bool {
        self.lines
            .insert(channel, Line::Input(Box::new(pin)))
            .is_ok()
    }

    /// Map `channel` to an output pin, replacing any existing mapping.
    /// Returns `false` (dropping the pin) when the bank is full.
    pub fn map_output(&mut self, channel: u16, pin: impl OutputPin<Error = E> + 'static) -> bool {
        self.lines
            .insert(channel, Line::Output(Box::new(pin)))
            .is_ok()
    }

    /// Whether `channel` has a mapped line.
    pub fn is_mapped(&self, channel: u16) -> bool {
        self.lines.contains_key(&channel)
    }
}

impl<E: embedded_hal::digital::Error> Default for HalPinBank<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: embedded_hal::digital::Error> GpioPort for HalPinBank<E> {
    fn digital_read(&mut self, channel: u16) -> Result<bool, GpioError> {
        match self.lines.get_mut(&channel) {
            Some(Line::Input(pin)) => pin.is_high().map_err(|e| GpioError::Pin(e.kind())),
            _ => Err(GpioError::Unsupported),
        }
    }

    fn digital_write(&mut self, channel: u16, level: bool) -> Result<(), GpioError> {
        match self.lines.get_mut(&channel) {
            Some(Line::Output(pin)) => {
                let result = if level { pin.set_high() } else { pin.set_low() };
                result.map_err(|e| GpioError::Pin(e.kind()))
            }
            _ => Err(GpioError::Unsupported),
        }
    }

    fn analog_read(&mut self, _channel: u16) -> Result<u16, GpioError> {
        Err(GpioError::Unsupported)
    }

    fn analog_write(&mut self, _channel: u16, _duty: u8) -> Result<(), GpioError> {
        Err(GpioError::Unsupported)
    }
}
