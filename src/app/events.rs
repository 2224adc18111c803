//! Outbound link events.
//!
//! The [`LinkService`](super::service::LinkService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log, status LED, gating the
//! application's publish path, etc.).
//!
//! Both events fire exactly once per transition. A connect attempt that
//! fails, or a retry loop that keeps failing, emits nothing: the session
//! never reached (or never left) the established state.

/// Structured events emitted by the connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// A session reached steady state: subscribed and announced.
    Connected,

    /// An established session was lost; reconnection follows.
    Disconnected,
}
