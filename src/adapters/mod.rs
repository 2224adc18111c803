//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                     |
//! |------------|------------|---------------------------------|
//! | `gpio`     | GpioPort   | embedded-hal 1.0 digital pins   |
//! | `log_sink` | EventSink  | Serial log output               |
//!
//! `ProtocolPort` and `NetworkPort` adapters live with the integrating
//! firmware: they wrap whatever protocol engine and socket stack it ships.

pub mod gpio;
pub mod log_sink;
