//! Broker link core library.
//!
//! Channel routing, inbound command dispatch, dual-cadence polling, and
//! connection lifecycle for devices that speak a channel-addressed pub/sub
//! protocol. The core is transport-agnostic: the protocol engine, socket
//! stack, and pin hardware all arrive through the port traits in
//! [`app::ports`], so the whole crate runs under test with mock adapters.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod channels;
pub mod config;
pub mod message;
pub mod registry;

mod error;

pub use error::{CommandError, Error, GpioError, LinkError, Result};
