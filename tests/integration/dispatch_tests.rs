//! Inbound dispatch through the full service pipeline.
//!
//! Every test queues decoded messages on the mock engine, runs one tick,
//! and asserts on the outbound call history: handler effects, state
//! echoes, and correlated responses.

use std::cell::RefCell;
use std::rc::Rc;

use pinlink::app::service::LinkService;
use pinlink::config::LinkConfig;
use pinlink::message::{ERROR_INCORRECT_PARAM, InboundMessage, Request, Topic};

use crate::mock_link::{GpioCall, MockGpio, MockLink, MockNet, RecordingSink, inbound};

/// A connected service with the handshake traffic cleared from the log.
fn connected() -> (LinkService, MockLink, MockNet, MockGpio, RecordingSink) {
    let mut service = LinkService::new(LinkConfig::default());
    let mut link = MockLink::new();
    let mut net = MockNet::new();
    let hw = MockGpio::new();
    let mut sink = RecordingSink::new();
    service.connect(&mut link, &mut net, &mut sink).unwrap();
    link.calls.clear();
    (service, link, net, hw, sink)
}

// ── Virtual channel commands ──────────────────────────────────

#[test]
fn command_invokes_dedicated_handler_echoes_and_responds() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    let seen: Rc<RefCell<Vec<(u16, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let tap = Rc::clone(&seen);
    assert!(service.registry_mut().bind_input(
        3,
        move |req: Request, msg: &mut InboundMessage| {
            tap.borrow_mut()
                .push((req.channel, msg.first_value().unwrap_or("").to_owned()));
        }
    ));

    link.queue(inbound(Topic::Command, 3, "42", "75"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(seen.borrow().as_slice(), &[(3, "75".to_owned())]);
    assert_eq!(
        link.publishes_on(Topic::Data),
        vec![(Some(3), "75".to_owned())]
    );
    assert_eq!(link.responses(), vec![("42".to_owned(), None)]);
}

#[test]
fn command_succeeds_without_any_handler() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    link.queue(inbound(Topic::Command, 9, "13", "42.5"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(
        link.publishes_on(Topic::Data),
        vec![(Some(9), "42.5".to_owned())]
    );
    assert_eq!(link.responses(), vec![("13".to_owned(), None)]);
}

#[test]
fn empty_payload_rejected_without_invoking_handler() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    let hits = Rc::new(RefCell::new(0u32));
    let tap = Rc::clone(&hits);
    assert!(service.registry_mut().bind_input(
        3,
        move |_req: Request, _msg: &mut InboundMessage| {
            *tap.borrow_mut() += 1;
        }
    ));

    link.queue(inbound(Topic::Command, 3, "42", ""));
    link.queue(InboundMessage::new(Topic::Command, 3, "43")); // no values at all
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(*hits.borrow(), 0);
    assert!(link.publishes_on(Topic::Data).is_empty());
    assert_eq!(
        link.responses(),
        vec![
            ("42".to_owned(), Some(ERROR_INCORRECT_PARAM.to_owned())),
            ("43".to_owned(), Some(ERROR_INCORRECT_PARAM.to_owned())),
        ]
    );
}

#[test]
fn handler_rejection_suppresses_echo_and_carries_message() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    assert!(service.registry_mut().bind_input(
        5,
        |_req: Request, msg: &mut InboundMessage| {
            msg.set_error("too hot");
        }
    ));

    link.queue(inbound(Topic::Command, 5, "9", "100"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert!(link.publishes_on(Topic::Data).is_empty());
    assert_eq!(
        link.responses(),
        vec![("9".to_owned(), Some("too hot".to_owned()))]
    );
}

#[test]
fn dedicated_handler_beats_default() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));
    let ded = Rc::clone(&order);
    let def = Rc::clone(&order);
    assert!(service.registry_mut().bind_input(
        2,
        move |_req: Request, _msg: &mut InboundMessage| {
            ded.borrow_mut().push("dedicated");
        }
    ));
    service
        .registry_mut()
        .bind_input_default(move |_req: Request, _msg: &mut InboundMessage| {
            def.borrow_mut().push("default");
        });

    link.queue(inbound(Topic::Command, 2, "1", "x"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(order.borrow().as_slice(), &["dedicated"]);
}

#[test]
fn default_handler_covers_channels_past_the_slot_table() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    let seen: Rc<RefCell<Vec<u16>>> = Rc::new(RefCell::new(Vec::new()));
    let tap = Rc::clone(&seen);
    service
        .registry_mut()
        .bind_input_default(move |req: Request, _msg: &mut InboundMessage| {
            tap.borrow_mut().push(req.channel);
        });

    link.queue(inbound(Topic::Command, 40, "7", "1"));
    link.queue(inbound(Topic::Command, 7, "8", "2"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(seen.borrow().as_slice(), &[40, 7]);
    assert_eq!(link.responses().len(), 2);
}

// ── Digital pin commands ──────────────────────────────────────

#[test]
fn digital_command_writes_pin_echoes_and_responds() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    link.queue(inbound(Topic::DigitalCommand, 2, "5", "1"));
    link.queue(inbound(Topic::DigitalCommand, 2, "6", "0"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(
        hw.writes,
        vec![GpioCall::Digital(2, true), GpioCall::Digital(2, false)]
    );
    assert_eq!(
        link.publishes_on(Topic::Digital),
        vec![(Some(2), "1".to_owned()), (Some(2), "0".to_owned())]
    );
    assert_eq!(
        link.responses(),
        vec![("5".to_owned(), None), ("6".to_owned(), None)]
    );
}

#[test]
fn digital_command_rejects_anything_but_zero_or_one() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    for (id, payload) in [("1", "2"), ("2", "10"), ("3", "on"), ("4", "")] {
        link.queue(inbound(Topic::DigitalCommand, 8, id, payload));
    }
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert!(hw.writes.is_empty());
    assert!(link.publishes_on(Topic::Digital).is_empty());
    let responses = link.responses();
    assert_eq!(responses.len(), 4);
    for (_, error) in responses {
        assert_eq!(error.as_deref(), Some(ERROR_INCORRECT_PARAM));
    }
}

#[test]
fn digital_write_failure_becomes_failure_response() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();
    hw.fail_writes = true;

    link.queue(inbound(Topic::DigitalCommand, 2, "5", "1"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert!(link.publishes_on(Topic::Digital).is_empty());
    let responses = link.responses();
    assert_eq!(responses.len(), 1);
    let error = responses[0].1.as_deref().unwrap_or("");
    assert!(
        error.starts_with("hardware failure"),
        "unexpected response text: {error}"
    );
}

// ── Analog pin commands ───────────────────────────────────────

#[test]
fn analog_command_scales_duty_and_echoes_raw_payload() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    link.queue(inbound(Topic::AnalogCommand, 4, "11", "0.5"));
    link.queue(inbound(Topic::AnalogCommand, 4, "12", "1"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert_eq!(
        hw.writes,
        vec![GpioCall::Analog(4, 128), GpioCall::Analog(4, 255)]
    );
    assert_eq!(
        link.publishes_on(Topic::Analog),
        vec![(Some(4), "0.5".to_owned()), (Some(4), "1".to_owned())]
    );
    assert_eq!(
        link.responses(),
        vec![("11".to_owned(), None), ("12".to_owned(), None)]
    );
}

#[test]
fn analog_command_rejects_out_of_range_and_garbage() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    for (id, payload) in [("1", "1.5"), ("2", "-0.2"), ("3", "bright"), ("4", "")] {
        link.queue(inbound(Topic::AnalogCommand, 6, id, payload));
    }
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert!(hw.writes.is_empty());
    assert!(link.publishes_on(Topic::Analog).is_empty());
    let responses = link.responses();
    assert_eq!(responses.len(), 4);
    for (_, error) in responses {
        assert_eq!(error.as_deref(), Some(ERROR_INCORRECT_PARAM));
    }
}

// ── Config and unknown topics ─────────────────────────────────

#[test]
fn config_messages_toggle_polling_and_never_respond() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    link.queue(inbound(Topic::DigitalConfig, 5, "1", "on"));
    link.queue(inbound(Topic::AnalogConfig, 7, "2", "on"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);
    assert!(service.digital_enabled(5));
    assert!(service.analog_enabled(7));

    link.queue(inbound(Topic::DigitalConfig, 5, "3", "off"));
    link.queue(inbound(Topic::DigitalConfig, 5, "4", "bogus"));
    service.tick(1, &mut link, &mut net, &mut hw, &mut sink);
    assert!(!service.digital_enabled(5));

    assert!(link.responses().is_empty());
}

#[test]
fn unrecognized_topics_are_dropped_silently() {
    let (mut service, mut link, mut net, mut hw, mut sink) = connected();

    link.queue(inbound(Topic::Other, 1, "7", "x"));
    link.queue(inbound(Topic::Data, 1, "8", "y"));
    service.tick(0, &mut link, &mut net, &mut hw, &mut sink);

    assert!(link.calls.is_empty());
    assert!(hw.writes.is_empty());
}
