//! Outbound polling cadences.
//!
//! ```text
//!           tick(now_ms)
//!                │
//!    ┌───────────┴────────────┐
//!    ▼                        ▼
//!  virtual cadence        physical cadence
//!  (rate-limited)         (every tick)
//!    │                        │
//!    ▼                        ▼
//!  dedicated handlers     enabled digital reads
//!  0..32, ascending,      enabled analog reads,
//!  then the catch-all     published as state
//! ```
//!
//! The virtual cadence is gated to one run per interval because every run
//! can publish up to a message per handler, and brokers rate-limit chatty
//! clients. Physical polling is driven by the bitsets, which are empty on
//! an idle device, so it stays effectively free until a config command
//! enables something.

use core::fmt::Write as _;

use heapless::String;
use log::{debug, warn};

use crate::channels::ChannelBitset;
use crate::message::{Request, Topic};
use crate::registry::{HANDLER_SLOTS, HandlerRegistry};

use super::ports::{GpioPort, ProtocolPort};
use super::write::{VirtualWriter, digital_text, publish_state};

/// Drives both poll cadences from the service tick.
pub(crate) struct PollDriver {
    interval_ms: u32,
    last_virtual_ms: Option<u32>,
}

impl PollDriver {
    pub(crate) fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_virtual_ms: None,
        }
    }

    /// Run the poll work for one tick.
    pub(crate) fn tick(
        &mut self,
        now_ms: u32,
        registry: &mut HandlerRegistry,
        digital: &ChannelBitset,
        analog: &ChannelBitset,
        link: &mut impl ProtocolPort,
        hw: &mut impl GpioPort,
    ) {
        if self.virtual_due(now_ms) {
            poll_virtual_channels(registry, link);
        }
        poll_physical_channels(digital, analog, link, hw);
    }

    /// Cadence gate for the virtual poll.
    ///
    /// Fires when strictly more than `interval_ms` has elapsed since the
    /// last run, on a wrapping millisecond clock. The first call seeds the
    /// mark one interval in the past, so the first poll happens as soon as
    /// any time at all has passed.
    fn virtual_due(&mut self, now_ms: u32) -> bool {
        let last = *self
            .last_virtual_ms
            .get_or_insert(now_ms.wrapping_sub(self.interval_ms));
        if now_ms.wrapping_sub(last) > self.interval_ms {
            self.last_virtual_ms = Some(now_ms);
            true
        } else {
            false
        }
    }
}

/// One virtual poll cycle: dedicated handlers in ascending channel order,
/// then the catch-all once.
fn poll_virtual_channels(registry: &mut HandlerRegistry, link: &mut impl ProtocolPort) {
    debug!("polling virtual channels");
    let mut writer = VirtualWriter::new(link);
    for channel in 0..HANDLER_SLOTS as u16 {
        if let Some(handler) = registry.output(channel) {
            handler.poll(Request { channel }, &mut writer);
        }
    }
    if let Some(default) = registry.output_default() {
        default(&mut writer);
    }
}

/// One physical poll cycle: read and publish every enabled channel.
fn poll_physical_channels(
    digital: &ChannelBitset,
    analog: &ChannelBitset,
    link: &mut impl ProtocolPort,
    hw: &mut impl GpioPort,
) {
    digital.for_each_enabled(|channel| match hw.digital_read(channel) {
        Ok(level) => {
            debug!("send digital channel {channel}: {}", digital_text(level));
            publish_state(link, Topic::Digital, channel, digital_text(level));
        }
        Err(e) => warn!("digital read failed on channel {channel}: {e}"),
    });
    analog.for_each_enabled(|channel| match hw.analog_read(channel) {
        Ok(sample) => {
            let mut text: String<8> = String::new();
            let _ = write!(text, "{sample}");
            debug!("send analog channel {channel}: {text}");
            publish_state(link, Topic::Analog, channel, &text);
        }
        Err(e) => warn!("analog read failed on channel {channel}: {e}"),
    });
}
