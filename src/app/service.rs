//! Link service: the hexagonal core.
//!
//! [`LinkService`] owns the handler registry, the polling state, and the
//! connection lifecycle. It exposes a clean, transport-agnostic API. All
//! I/O flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  ProtocolPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  NetworkPort  ──▶ │        LinkService        │
//!  GpioPort     ◀── │  dispatch · poll · retry  │
//!                   └──────────────────────────┘
//! ```
//!
//! The caller owns the loop. Each [`tick`](LinkService::tick) drains and
//! dispatches inbound traffic, runs both poll cadences, and checks
//! liveness; between ticks the caller is free to publish its own values
//! through a [`VirtualWriter`](super::write::VirtualWriter).

use log::warn;

use crate::channels::ChannelBitset;
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::registry::HandlerRegistry;

use super::dispatch;
use super::lifecycle::{LinkLifecycle, LinkState};
use super::poll::PollDriver;
use super::ports::{EventSink, GpioPort, NetworkPort, ProtocolPort};

// ───────────────────────────────────────────────────────────────
// LinkService
// ───────────────────────────────────────────────────────────────

/// The link service orchestrates all domain logic.
pub struct LinkService {
    config: LinkConfig,
    registry: HandlerRegistry,
    /// Digital channels under periodic polling.
    digital: ChannelBitset,
    /// Analog channels under periodic polling.
    analog: ChannelBitset,
    poll: PollDriver,
    lifecycle: LinkLifecycle,
}

impl LinkService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the network. Call [`connect`](Self::connect)
    /// next, or just start ticking and let the retry driver establish the
    /// session.
    pub fn new(config: LinkConfig) -> Self {
        let poll = PollDriver::new(config.virtual_poll_ms);
        Self {
            config,
            registry: HandlerRegistry::new(),
            digital: ChannelBitset::new(),
            analog: ChannelBitset::new(),
            poll,
            lifecycle: LinkLifecycle::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run one full connect attempt: transport, handshake, subscriptions,
    /// device announcement.
    pub fn connect(
        &mut self,
        link: &mut impl ProtocolPort,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), LinkError> {
        self.lifecycle.connect(&self.config, link, net, sink)
    }

    /// Run one cooperative tick.
    ///
    /// `now_ms` is a monotonic wrapping millisecond clock supplied by the
    /// caller. The tick blocks for at most the configured `yield_ms` while
    /// waiting for inbound traffic; everything else is non-blocking.
    pub fn tick(
        &mut self,
        now_ms: u32,
        link: &mut impl ProtocolPort,
        net: &mut impl NetworkPort,
        hw: &mut impl GpioPort,
        sink: &mut impl EventSink,
    ) {
        // 1. Yield to the protocol engine and dispatch everything delivered.
        self.drain_inbound(link, hw);

        // 2. Poll cadences: rate-limited virtual, per-tick physical.
        self.poll.tick(
            now_ms,
            &mut self.registry,
            &self.digital,
            &self.analog,
            link,
            hw,
        );

        // 3. Liveness check; synchronous reconnect on loss.
        self.lifecycle.check(&self.config, link, net, sink);
    }

    /// Pull inbound messages until the engine runs dry.
    ///
    /// Only the first wait may block; the rest of the drain polls with a
    /// zero timeout so one tick never stalls on a chatty broker.
    fn drain_inbound(&mut self, link: &mut impl ProtocolPort, hw: &mut impl GpioPort) {
        let mut timeout_ms = self.config.yield_ms;
        loop {
            match link.poll_inbound(timeout_ms) {
                Ok(Some(mut message)) => {
                    dispatch::dispatch(
                        &mut self.registry,
                        &mut self.digital,
                        &mut self.analog,
                        link,
                        hw,
                        &mut message,
                    );
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("inbound poll failed: {err}");
                    break;
                }
            }
            timeout_ms = 0;
        }
    }

    // ── Handler registration ──────────────────────────────────

    /// The handler registry, for binding input and output handlers.
    pub fn registry_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.registry
    }

    // ── Polling control ───────────────────────────────────────

    /// Enable or disable periodic polling of a digital channel. Equivalent
    /// to receiving the wire-level digital config command.
    pub fn enable_digital(&mut self, channel: u16, on: bool) {
        self.digital.enable(channel, on);
    }

    /// Enable or disable periodic polling of an analog channel.
    pub fn enable_analog(&mut self, channel: u16, on: bool) {
        self.analog.enable(channel, on);
    }

    /// Whether a digital channel is under periodic polling.
    pub fn digital_enabled(&self, channel: u16) -> bool {
        self.digital.is_enabled(channel)
    }

    /// Whether an analog channel is under periodic polling.
    pub fn analog_enabled(&self, channel: u16) -> bool {
        self.analog.is_enabled(channel)
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current session state.
    pub fn link_state(&self) -> LinkState {
        self.lifecycle.state()
    }

    /// Whether the session is established.
    pub fn is_connected(&self) -> bool {
        self.lifecycle.is_connected()
    }

    /// The live configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    // ── Sync requests ─────────────────────────────────────────

    /// Request a re-send of every subscribed value. A no-op on this wire
    /// protocol: the broker retains the last value per channel and replays
    /// it on subscription, so there is nothing to ask for. Kept for API
    /// parity with clients of brokers that do not retain.
    pub fn sync_all(&self) {}

    /// Request a re-send of one channel's value. Same no-op rationale as
    /// [`sync_all`](Self::sync_all).
    pub fn sync_virtual(&self, _channel: u16) {}
}
