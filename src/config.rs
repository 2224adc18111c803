//! Link configuration parameters
//!
//! Broker endpoint, credentials, loop timing, and the device identity
//! announced after every successful connect. Integrators typically load
//! this from their own provisioning store; `from_json`/`to_json` cover the
//! common case of a JSON blob.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Bytes per endpoint/credential field.
pub const MAX_FIELD_LEN: usize = 64;

/// Bytes per device identity field.
pub const MAX_DEVICE_FIELD_LEN: usize = 32;

/// Core link configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    // --- Broker endpoint ---
    /// Broker hostname or IP address
    pub broker_host: String<MAX_FIELD_LEN>,
    /// Broker TCP port
    pub broker_port: u16,

    // --- Credentials ---
    /// Account username presented in the protocol handshake
    pub username: String<MAX_FIELD_LEN>,
    /// Account password or token
    pub password: String<MAX_FIELD_LEN>,
    /// Stable client identifier for this device
    pub client_id: String<MAX_FIELD_LEN>,

    // --- Timing ---
    /// How long one tick may block waiting for inbound traffic (milliseconds).
    /// Lowering this while publishing on every loop pass can flood the broker
    /// and trip its rate limiting.
    pub yield_ms: u32,
    /// Virtual channel poll interval (milliseconds)
    pub virtual_poll_ms: u32,

    // --- Identity ---
    /// Device identity announced on the system topics
    pub device: DeviceProfile,
}

/// Device identity announced after each connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Board or product model name
    pub model: String<MAX_DEVICE_FIELD_LEN>,
    /// CPU model name
    pub cpu_model: String<MAX_DEVICE_FIELD_LEN>,
    /// CPU clock in Hz
    pub cpu_speed_hz: u32,
    /// Client firmware/library version string
    pub version: String<MAX_DEVICE_FIELD_LEN>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            // Broker endpoint (provisioned per deployment)
            broker_host: bounded(""),
            broker_port: 1883,

            // Credentials (provisioned per device)
            username: bounded(""),
            password: bounded(""),
            client_id: bounded(""),

            // Timing
            yield_ms: 1000,        // one blocking wait per tick
            virtual_poll_ms: 15_000, // brokers rate-limit chattier clients

            device: DeviceProfile::default(),
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            model: bounded("generic-device"),
            cpu_model: bounded("generic-cpu"),
            cpu_speed_hz: 16_000_000,
            version: bounded(env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LinkConfig {
    /// Parse a configuration from its JSON provisioning form.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|_| Error::Config("invalid JSON"))
    }

    /// Serialize the configuration back to JSON.
    pub fn to_json(&self) -> Result<std::string::String> {
        serde_json::to_string(self).map_err(|_| Error::Config("serialize failed"))
    }
}

/// Copy `text` into a bounded field, truncating at the capacity.
fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
