//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the link client: inbound
//! command dispatch, the dual polling cadences, and the connection
//! lifecycle. All interaction with the outside world happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without a broker or real pins.

pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod service;
pub mod write;

pub(crate) mod dispatch;
pub(crate) mod poll;
