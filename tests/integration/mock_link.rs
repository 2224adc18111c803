//! Mock port adapters for integration tests.
//!
//! Records every call made through the protocol, network, and pin ports so
//! tests can assert on the full outbound history, and lets tests script
//! inbound messages and failures without a broker.

use std::collections::{HashMap, VecDeque};

use pinlink::app::events::LinkEvent;
use pinlink::app::ports::{ChannelSelector, EventSink, GpioPort, NetworkPort, ProtocolPort};
use pinlink::message::{InboundMessage, Topic, ValuePair};
use pinlink::{GpioError, LinkError};

// ── Protocol call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    Connect,
    Disconnect,
    Subscribe(Topic, ChannelSelector),
    Publish {
        topic: Topic,
        channel: Option<u16>,
        key: Option<String>,
        values: Vec<ValuePair>,
    },
    Response {
        id: String,
        error: Option<String>,
    },
}

// ── MockLink ──────────────────────────────────────────────────

/// Scriptable protocol engine double.
pub struct MockLink {
    pub calls: Vec<LinkCall>,
    pub inbound: VecDeque<InboundMessage>,
    /// Timeouts passed to `poll_inbound`, in call order.
    pub poll_timeouts: Vec<u32>,
    pub connected: bool,
    /// Results for upcoming `connect` calls; empty means `Ok`.
    pub connect_script: VecDeque<Result<(), LinkError>>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            inbound: VecDeque::new(),
            poll_timeouts: Vec::new(),
            connected: false,
            connect_script: VecDeque::new(),
        }
    }

    /// Queue one inbound message for the next drain.
    pub fn queue(&mut self, message: InboundMessage) {
        self.inbound.push_back(message);
    }

    /// Every publish on `topic`, as `(channel, first value)` pairs.
    pub fn publishes_on(&self, topic: Topic) -> Vec<(Option<u16>, String)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                LinkCall::Publish {
                    topic: t,
                    channel,
                    values,
                    ..
                } if *t == topic => {
                    let value = values
                        .first()
                        .map(|pair| pair.value.as_str().to_owned())
                        .unwrap_or_default();
                    Some((*channel, value))
                }
                _ => None,
            })
            .collect()
    }

    /// Every response, as `(id, error)` pairs.
    pub fn responses(&self) -> Vec<(String, Option<String>)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                LinkCall::Response { id, error } => Some((id.clone(), error.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every subscription made, in call order.
    pub fn subscriptions(&self) -> Vec<(Topic, ChannelSelector)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                LinkCall::Subscribe(topic, sel) => Some((*topic, *sel)),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolPort for MockLink {
    fn connect(&mut self) -> Result<(), LinkError> {
        self.calls.push(LinkCall::Connect);
        let result = self.connect_script.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.connected = true;
        }
        result
    }

    fn disconnect(&mut self) {
        self.calls.push(LinkCall::Disconnect);
        self.connected = false;
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn subscribe(&mut self, topic: Topic, channels: ChannelSelector) -> Result<(), LinkError> {
        self.calls.push(LinkCall::Subscribe(topic, channels));
        Ok(())
    }

    fn publish(
        &mut self,
        topic: Topic,
        channel: Option<u16>,
        key: Option<&str>,
        values: &[ValuePair],
    ) -> Result<(), LinkError> {
        self.calls.push(LinkCall::Publish {
            topic,
            channel,
            key: key.map(str::to_owned),
            values: values.to_vec(),
        });
        Ok(())
    }

    fn publish_response(&mut self, id: &str, error: Option<&str>) -> Result<(), LinkError> {
        self.calls.push(LinkCall::Response {
            id: id.to_owned(),
            error: error.map(str::to_owned),
        });
        Ok(())
    }

    fn poll_inbound(&mut self, timeout_ms: u32) -> Result<Option<InboundMessage>, LinkError> {
        self.poll_timeouts.push(timeout_ms);
        Ok(self.inbound.pop_front())
    }
}

// ── MockNet ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum NetCall {
    Connect(String, u16),
    Disconnect,
}

/// Scriptable transport double.
pub struct MockNet {
    pub calls: Vec<NetCall>,
    pub connected: bool,
    /// Results for upcoming `connect` calls; empty means `Ok`.
    pub connect_script: VecDeque<Result<(), LinkError>>,
}

#[allow(dead_code)]
impl MockNet {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            connected: false,
            connect_script: VecDeque::new(),
        }
    }
}

impl Default for MockNet {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkPort for MockNet {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), LinkError> {
        self.calls.push(NetCall::Connect(host.to_owned(), port));
        let result = self.connect_script.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            self.connected = true;
        }
        result
    }

    fn is_connected(&mut self) -> bool {
        self.connected
    }

    fn disconnect(&mut self) {
        self.calls.push(NetCall::Disconnect);
        self.connected = false;
    }
}

// ── MockGpio ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    Digital(u16, bool),
    Analog(u16, u8),
}

/// Pin double: reads come from preset level maps, writes are recorded.
pub struct MockGpio {
    pub digital: HashMap<u16, bool>,
    pub analog: HashMap<u16, u16>,
    pub writes: Vec<GpioCall>,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

#[allow(dead_code)]
impl MockGpio {
    pub fn new() -> Self {
        Self {
            digital: HashMap::new(),
            analog: HashMap::new(),
            writes: Vec::new(),
            fail_writes: false,
            fail_reads: false,
        }
    }
}

impl Default for MockGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for MockGpio {
    fn digital_read(&mut self, channel: u16) -> Result<bool, GpioError> {
        if self.fail_reads {
            return Err(GpioError::Unsupported);
        }
        Ok(self.digital.get(&channel).copied().unwrap_or(false))
    }

    fn digital_write(&mut self, channel: u16, level: bool) -> Result<(), GpioError> {
        if self.fail_writes {
            return Err(GpioError::Unsupported);
        }
        self.writes.push(GpioCall::Digital(channel, level));
        self.digital.insert(channel, level);
        Ok(())
    }

    fn analog_read(&mut self, channel: u16) -> Result<u16, GpioError> {
        if self.fail_reads {
            return Err(GpioError::Unsupported);
        }
        Ok(self.analog.get(&channel).copied().unwrap_or(0))
    }

    fn analog_write(&mut self, channel: u16, duty: u8) -> Result<(), GpioError> {
        if self.fail_writes {
            return Err(GpioError::Unsupported);
        }
        self.writes.push(GpioCall::Analog(channel, duty));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Collects lifecycle events in emission order.
pub struct RecordingSink {
    pub events: Vec<LinkEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &LinkEvent) {
        self.events.push(*event);
    }
}

// ── Message helpers ───────────────────────────────────────────

/// One inbound message with a single value.
#[allow(dead_code)]
pub fn inbound(topic: Topic, channel: u16, id: &str, value: &str) -> InboundMessage {
    InboundMessage::new(topic, channel, id).with_value(value)
}
