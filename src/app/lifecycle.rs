//! Connection lifecycle.
//!
//! ```text
//! Disconnected ─▶ NetworkConnecting ─▶ ProtocolConnecting ─▶ Subscribing ─▶ Connected
//!      ▲                │                     │                                │
//!      │                ▼                     ▼                                │
//!      └──────── attempt failed ◀─── teardown on loss ◀────────────────────────┘
//! ```
//!
//! One [`connect`](LinkLifecycle::connect) call is one complete attempt:
//! transport, then protocol handshake, then the subscription set and the
//! device announcement. There is no retry inside an attempt; the per-tick
//! [`check`](LinkLifecycle::check) drives retries instead, so a dead broker
//! never wedges the caller's loop.
//!
//! [`LinkEvent::Connected`] and [`LinkEvent::Disconnected`] fire exactly
//! once per transition. Failed attempts while already down emit nothing.

use core::fmt::{self, Write as _};

use log::{info, warn};

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::message::{Topic, ValuePair};

use super::events::LinkEvent;
use super::ports::{ChannelSelector, EventSink, NetworkPort, ProtocolPort};

/// Inbound topic categories every session subscribes to.
const COMMAND_TOPICS: [Topic; 5] = [
    Topic::Command,
    Topic::DigitalCommand,
    Topic::DigitalConfig,
    Topic::AnalogCommand,
    Topic::AnalogConfig,
];

// ───────────────────────────────────────────────────────────────
// States
// ───────────────────────────────────────────────────────────────

/// Where the session currently stands.
///
/// The two `*Connecting` states and `Subscribing` are only observable from
/// within a connect attempt; between ticks the state is always either
/// `Disconnected` or `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    NetworkConnecting,
    ProtocolConnecting,
    Subscribing,
    Connected,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::NetworkConnecting => "network-connecting",
            Self::ProtocolConnecting => "protocol-connecting",
            Self::Subscribing => "subscribing",
            Self::Connected => "connected",
        };
        f.write_str(name)
    }
}

// ───────────────────────────────────────────────────────────────
// Lifecycle driver
// ───────────────────────────────────────────────────────────────

/// Owns the session state and drives connect/teardown/retry.
pub(crate) struct LinkLifecycle {
    state: LinkState,
}

impl LinkLifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
        }
    }

    pub(crate) fn state(&self) -> LinkState {
        self.state
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Run one full connect attempt.
    ///
    /// On success the session is established, subscribed, announced, and
    /// [`LinkEvent::Connected`] has been emitted. On failure everything
    /// opened so far is closed again and the state returns to
    /// `Disconnected` without emitting anything.
    pub(crate) fn connect(
        &mut self,
        config: &LinkConfig,
        link: &mut impl ProtocolPort,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) -> core::result::Result<(), LinkError> {
        info!(
            "Link: connecting to {}:{}",
            config.broker_host, config.broker_port
        );

        self.state = LinkState::NetworkConnecting;
        if let Err(err) = net.connect(&config.broker_host, config.broker_port) {
            warn!("Link: network connect failed: {err}");
            self.state = LinkState::Disconnected;
            return Err(err);
        }

        self.state = LinkState::ProtocolConnecting;
        if let Err(err) = link.connect() {
            warn!("Link: protocol connect failed: {err}");
            net.disconnect();
            self.state = LinkState::Disconnected;
            return Err(err);
        }

        self.state = LinkState::Subscribing;
        subscribe_command_topics(link);
        announce_device(config, link);

        self.state = LinkState::Connected;
        info!("Link: connected");
        sink.emit(&LinkEvent::Connected);
        Ok(())
    }

    /// Per-tick liveness check and retry driver.
    ///
    /// While connected: when either layer reports loss, tear down protocol
    /// then transport, emit [`LinkEvent::Disconnected`] once, and retry the
    /// full connect within this tick. While disconnected: retry every tick
    /// without re-emitting anything.
    pub(crate) fn check(
        &mut self,
        config: &LinkConfig,
        link: &mut impl ProtocolPort,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) {
        match self.state {
            LinkState::Connected => {
                if net.is_connected() && link.is_connected() {
                    return;
                }
                warn!("Link: connection lost");
                link.disconnect();
                net.disconnect();
                self.state = LinkState::Disconnected;
                sink.emit(&LinkEvent::Disconnected);
                let _ = self.connect(config, link, net, sink);
            }
            LinkState::Disconnected => {
                let _ = self.connect(config, link, net, sink);
            }
            // Mid-attempt states never persist across ticks.
            _ => {}
        }
    }
}

/// Subscribe to the full inbound command surface with wildcard channels.
///
/// Individual failures are logged and skipped; the liveness check catches a
/// session degraded enough for that to matter.
fn subscribe_command_topics(link: &mut impl ProtocolPort) {
    for topic in COMMAND_TOPICS {
        if let Err(err) = link.subscribe(topic, ChannelSelector::All) {
            warn!("Link: subscribe {topic} failed: {err}");
        }
    }
}

/// Announce the device identity on the system topics.
fn announce_device(config: &LinkConfig, link: &mut impl ProtocolPort) {
    let device = &config.device;
    let mut speed: heapless::String<16> = heapless::String::new();
    let _ = write!(speed, "{}", device.cpu_speed_hz);

    let announcements = [
        (Topic::SysModel, device.model.as_str()),
        (Topic::SysCpuModel, device.cpu_model.as_str()),
        (Topic::SysCpuSpeed, speed.as_str()),
        (Topic::SysVersion, device.version.as_str()),
    ];
    for (topic, value) in announcements {
        if let Err(err) = link.publish(topic, None, None, &[ValuePair::new(value)]) {
            warn!("Link: device info publish on {topic} failed: {err}");
        }
    }
}
