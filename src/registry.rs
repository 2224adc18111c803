//! Handler registry.
//!
//! Maps channel numbers to application handlers, separately for the inbound
//! command direction and the outbound polling direction. Channels `0..32`
//! get dedicated slots; higher channels are legal on the wire and resolve
//! through the default handler only.
//!
//! Lookup deliberately distinguishes three states. A dedicated binding, the
//! registered catch-all default, and nothing at all each drive different
//! dispatch behaviour, so the registry reports which one it found instead
//! of flattening them into an `Option`.

use crate::app::write::VirtualWriter;
use crate::message::{InboundMessage, Request};

/// Channels with dedicated handler slots.
pub const HANDLER_SLOTS: usize = 32;

// ───────────────────────────────────────────────────────────────
// Handler traits
// ───────────────────────────────────────────────────────────────

/// Inbound command handler for one virtual channel.
///
/// Reject a command by calling [`InboundMessage::set_error`]; the
/// dispatcher turns the recorded text into a failure response and suppresses
/// the state echo.
pub trait InputHandler {
    fn handle(&mut self, request: Request, message: &mut InboundMessage);
}

impl<F> InputHandler for F
where
    F: FnMut(Request, &mut InboundMessage),
{
    fn handle(&mut self, request: Request, message: &mut InboundMessage) {
        self(request, message);
    }
}

/// Outbound poll handler for one virtual channel.
///
/// Invoked on the virtual poll cadence; publish the channel's current value
/// through the writer.
pub trait OutputHandler {
    fn poll(&mut self, request: Request, writer: &mut VirtualWriter<'_>);
}

impl<F> OutputHandler for F
where
    F: FnMut(Request, &mut VirtualWriter<'_>),
{
    fn poll(&mut self, request: Request, writer: &mut VirtualWriter<'_>) {
        self(request, writer);
    }
}

/// Catch-all poll callback, run once per virtual poll cycle after the
/// dedicated handlers. Takes no channel: it covers the device as a whole.
pub type OutputDefaultFn = Box<dyn FnMut(&mut VirtualWriter<'_>)>;

// ───────────────────────────────────────────────────────────────
// Lookup result
// ───────────────────────────────────────────────────────────────

/// Result of resolving the input handler for one channel.
pub enum Binding<'a, H: ?Sized> {
    /// No dedicated handler and no default registered.
    Vacant,
    /// No dedicated handler; the registered default covers this channel.
    Fallback(&'a mut H),
    /// A handler bound to this exact channel.
    Dedicated(&'a mut H),
}

// ───────────────────────────────────────────────────────────────
// Registry
// ───────────────────────────────────────────────────────────────

/// Per-direction handler tables plus the two default slots.
pub struct HandlerRegistry {
    inputs: [Option<Box<dyn InputHandler>>; HANDLER_SLOTS],
    input_default: Option<Box<dyn InputHandler>>,
    outputs: [Option<Box<dyn OutputHandler>>; HANDLER_SLOTS],
    output_default: Option<OutputDefaultFn>,
}

impl HandlerRegistry {
    /// An empty registry: every lookup resolves to [`Binding::Vacant`].
    pub fn new() -> Self {
        Self {
            inputs: core::array::from_fn(|_| None),
            input_default: None,
            outputs: core::array::from_fn(|_| None),
            output_default: None,
        }
    }

    /// Bind an input handler to `channel`.
    ///
    /// Returns `false` (and drops the handler) when the channel has no
    /// dedicated slot; such channels can only be served by the default.
    /// Rebinding a slot replaces the previous handler.
    pub fn bind_input(&mut self, channel: u16, handler: impl InputHandler + 'static) -> bool {
        let Some(slot) = self.inputs.get_mut(channel as usize) else {
            return false;
        };
        *slot = Some(Box::new(handler));
        true
    }

    /// Register the catch-all input handler.
    pub fn bind_input_default(&mut self, handler: impl InputHandler + 'static) {
        self.input_default = Some(Box::new(handler));
    }

    /// Bind an output poll handler to `channel`. Same slot rules as
    /// [`bind_input`](Self::bind_input).
    pub fn bind_output(&mut self, channel: u16, handler: impl OutputHandler + 'static) -> bool {
        let Some(slot) = self.outputs.get_mut(channel as usize) else {
            return false;
        };
        *slot = Some(Box::new(handler));
        true
    }

    /// Register the catch-all output callback.
    pub fn bind_output_default(
        &mut self,
        handler: impl FnMut(&mut VirtualWriter<'_>) + 'static,
    ) {
        self.output_default = Some(Box::new(handler));
    }

    /// Resolve the input handler for `channel`.
    pub fn input(&mut self, channel: u16) -> Binding<'_, dyn InputHandler> {
        if let Some(Some(handler)) = self.inputs.get_mut(channel as usize) {
            return Binding::Dedicated(handler.as_mut());
        }
        match self.input_default.as_deref_mut() {
            Some(handler) => Binding::Fallback(handler),
            None => Binding::Vacant,
        }
    }

    /// The dedicated output handler for `channel`, if one is bound.
    pub fn output(&mut self, channel: u16) -> Option<&mut (dyn OutputHandler + '_)> {
        match self.outputs.get_mut(channel as usize) {
            Some(Some(handler)) => Some(handler.as_mut()),
            _ => None,
        }
    }

    /// The catch-all output callback, if registered.
    pub fn output_default(&mut self) -> Option<&mut OutputDefaultFn> {
        self.output_default.as_mut()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
