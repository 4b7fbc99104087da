//! Unit tests for the application core.
//!
//! These tests run on the host (not embedded) and drive `AlertApp` with a
//! recording dispatcher standing in for the message center.

use super::*;
use crate::error::DecodeError;
use crate::protocol::Alert;

const SLOTS: usize = 2;
const CAP: usize = 160;

/// Records every send; can be told to refuse.
#[derive(Default)]
struct Recorder {
    sent: std::vec::Vec<Outbound>,
    refuse: bool,
}

impl Dispatcher for Recorder {
    fn send(&mut self, outbound: Outbound) -> Result<(), DispatchError> {
        if self.refuse {
            return Err(DispatchError::QueueFull);
        }
        self.sent.push(outbound);
        Ok(())
    }
}

fn app() -> AlertApp<Recorder, SLOTS, CAP> {
    AlertApp::new(Recorder::default(), AppConfig::DEFAULT)
}

fn control(value: u8) -> [u8; 3] {
    [0x82, 0x01, value]
}

fn decoded<D: Dispatcher>(app: &AlertApp<D, SLOTS, CAP>, handle: BufferHandle) -> Alert<'_> {
    Alert::decode(app.payload(handle).unwrap()).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// Event → Alert
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn control_connect_sends_alert_to_local_display() {
    let mut app = app();
    let payload = control(0x01);
    let handle = app
        .handle(Event::Message {
            port: Port::Control,
            payload: &payload,
        })
        .unwrap()
        .unwrap();

    let sent = &app.dispatcher().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, Host::Local);
    assert_eq!(sent[0].port, Port::Alert);
    assert_eq!(sent[0].handle, handle);

    let alert = decoded(&app, handle);
    assert_eq!(alert.duration_ms, 5000);
    assert_eq!(alert.title, "Bluetooth");
    assert_eq!(alert.body, "Connected");
}

#[test]
fn button_press_sends_fixed_alert() {
    let mut app = app();
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();
    let alert = decoded(&app, handle);
    assert_eq!(alert.title, "Button");
    assert_eq!(alert.body, "Pressed!");
}

#[test]
fn payload_length_matches_required_capacity() {
    let mut app = app();
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert_eq!(
        app.payload(handle).unwrap().len(),
        codec::alert_len(5000, "Button", "Pressed!")
    );
}

#[test]
fn configured_duration_is_encoded() {
    let config = AppConfig {
        alert_time_on_screen_ms: 1234,
        ..AppConfig::DEFAULT
    };
    let mut app: AlertApp<Recorder, SLOTS, CAP> = AlertApp::new(Recorder::default(), config);
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert_eq!(decoded(&app, handle).duration_ms, 1234);
}

#[test]
fn relay_config_sends_alerts_to_remote_host() {
    let mut app: AlertApp<Recorder, SLOTS, CAP> =
        AlertApp::new(Recorder::default(), AppConfig::relay());
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();

    let sent = &app.dispatcher().sent;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].destination, Host::Remote);
    assert_eq!(sent[0].port, Port::Alert);
    assert_eq!(decoded(&app, handle).body, "Pressed!");
}

#[test]
fn ignored_events_send_nothing() {
    let mut app = app();
    let unknown_value = control(0x09);
    let alert_port = [0x83, 0x01, 0x60, 0x60];

    assert_eq!(
        app.handle(Event::Message {
            port: Port::Control,
            payload: &unknown_value,
        }),
        Ok(None)
    );
    assert_eq!(
        app.handle(Event::Message {
            port: Port::Alert,
            payload: &alert_port,
        }),
        Ok(None)
    );

    assert!(app.dispatcher().sent.is_empty());
    assert_eq!(app.live_buffers(), 0);
    assert_eq!(app.stats().ignored, 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Failure policy
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn malformed_message_is_dropped_and_counted() {
    let mut app = app();
    let result = app.handle(Event::Message {
        port: Port::Equip,
        payload: &[0xFF, 0x00],
    });

    assert!(matches!(result, Err(Error::Decode(_))));
    assert!(app.dispatcher().sent.is_empty());
    assert_eq!(app.live_buffers(), 0);
    assert_eq!(app.stats().decode_errors, 1);
}

#[test]
fn schema_mismatch_reports_field() {
    let mut app = app();
    let result = app.handle(Event::Message {
        port: Port::Control,
        payload: &[0x82, 0x01, 0x61, b'x'],
    });
    assert_eq!(result, Err(Error::Decode(DecodeError::TypeMismatch(1))));
}

#[test]
fn exhausted_pool_drops_send_without_retry() {
    let mut app = app();
    app.handle(Event::ButtonPressed).unwrap();
    app.handle(Event::ButtonPressed).unwrap();

    let result = app.handle(Event::ButtonPressed);
    assert!(matches!(result, Err(Error::AllocationFailed { .. })));
    assert_eq!(app.dispatcher().sent.len(), 2);
    assert_eq!(app.stats().allocation_failures, 1);
    assert_eq!(app.live_buffers(), 2);
}

#[test]
fn refused_dispatch_releases_buffer() {
    let mut app = app();
    app.dispatcher_mut().refuse = true;

    let result = app.handle(Event::ButtonPressed);
    assert_eq!(result, Err(Error::Dispatch(DispatchError::QueueFull)));
    assert_eq!(app.live_buffers(), 0);
    assert_eq!(app.stats().dispatch_failures, 1);
    assert_eq!(app.stats().sent, 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Buffer lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn completion_releases_buffer() {
    let mut app = app();
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert_eq!(app.live_buffers(), 1);

    assert!(app.send_done(handle));
    assert_eq!(app.live_buffers(), 0);
    assert_eq!(app.payload(handle), None);
    assert_eq!(app.stats().completed, 1);
}

#[test]
fn second_completion_is_a_no_op() {
    let mut app = app();
    let handle = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert!(app.send_done(handle));
    assert!(!app.send_done(handle));
    assert_eq!(app.stats().completed, 1);
    assert_eq!(app.live_buffers(), 0);
}

#[test]
fn button_during_in_flight_send_leaves_it_intact() {
    let mut app = app();

    // Link alert is sent but its consumer has not finished yet.
    let payload = control(0x04);
    let in_flight = app
        .handle(Event::Message {
            port: Port::Control,
            payload: &payload,
        })
        .unwrap()
        .unwrap();
    let before = app.payload(in_flight).unwrap().to_vec();

    // Button fires in between.
    let pressed = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert_ne!(pressed, in_flight);

    // The earlier payload is byte-for-byte unchanged.
    assert_eq!(app.payload(in_flight).unwrap(), &before[..]);
    assert_eq!(decoded(&app, in_flight).body, "Disconnected");
    assert_eq!(decoded(&app, pressed).body, "Pressed!");

    // Completions arrive out of order.
    assert!(app.send_done(pressed));
    assert_eq!(decoded(&app, in_flight).body, "Disconnected");
    assert!(app.send_done(in_flight));
    assert_eq!(app.live_buffers(), 0);
}

#[test]
fn stale_completion_cannot_free_the_next_send() {
    let mut app = app();
    let first = app.handle(Event::ButtonPressed).unwrap().unwrap();
    app.send_done(first);

    let second = app.handle(Event::ButtonPressed).unwrap().unwrap();
    assert_eq!(second.index(), first.index());

    // Late duplicate completion for the first send.
    assert!(!app.send_done(first));
    assert_eq!(app.live_buffers(), 1);
    assert!(app.payload(second).is_some());
}
