//! Event handlers - decide which alert (if any) an event produces.
//!
//! | Event            | Alert                               |
//! |------------------|-------------------------------------|
//! | control connect  | "Bluetooth" / "Connected"           |
//! | control discon.  | "Bluetooth" / "Disconnected"        |
//! | equip            | "Device Name" / <name from message> |
//! | button press     | "Button" / "Pressed!"               |
//!
//! Handlers only decode and decide; buffer handling and sending live in
//! [`crate::app`].

use crate::config::MAX_ALERT_BODY_LEN;
use crate::error::DecodeError;
use crate::protocol::{ControlMessage, EquipMessage};
use heapless::String;

pub const TITLE_BLUETOOTH: &str = "Bluetooth";
pub const BODY_CONNECTED: &str = "Connected";
pub const BODY_DISCONNECTED: &str = "Disconnected";
pub const TITLE_DEVICE_NAME: &str = "Device Name";
pub const TITLE_BUTTON: &str = "Button";
pub const BODY_PRESSED: &str = "Pressed!";

/// An alert some handler wants on screen.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertRequest {
    pub title: &'static str,
    pub body: String<MAX_ALERT_BODY_LEN>,
}

impl AlertRequest {
    fn fixed(title: &'static str, text: &'static str) -> Self {
        debug_assert!(text.len() <= MAX_ALERT_BODY_LEN);
        let body = String::try_from(text).unwrap_or_default();
        Self { title, body }
    }
}

/// Control message received: connection state alerts.
///
/// Unknown `type` or `value` produces no alert.
pub fn on_control(payload: &[u8]) -> Result<Option<AlertRequest>, DecodeError> {
    let msg = ControlMessage::decode(payload)?;

    let Some(event) = msg.event() else {
        log_debug!("Control: ignoring type {} value {}", msg.kind, msg.value);
        return Ok(None);
    };

    let body = if event.is_connect() {
        BODY_CONNECTED
    } else {
        BODY_DISCONNECTED
    };
    Ok(Some(AlertRequest::fixed(TITLE_BLUETOOTH, body)))
}

/// Equip message received: show the reported device name.
pub fn on_equip(payload: &[u8]) -> Result<Option<AlertRequest>, DecodeError> {
    let msg = EquipMessage::decode(payload)?;

    match msg.name {
        Some(name) => Ok(Some(AlertRequest {
            title: TITLE_DEVICE_NAME,
            body: name,
        })),
        None => {
            log_debug!("Equip: ignoring type {}", msg.kind);
            Ok(None)
        }
    }
}

/// Forward button pressed.
pub fn on_button() -> AlertRequest {
    AlertRequest::fixed(TITLE_BUTTON, BODY_PRESSED)
}
