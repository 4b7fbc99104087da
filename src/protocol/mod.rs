//! Control-plane message model.
//!
//! Messages travel as small CBOR arrays:
//!
//! ```text
//! Control (in):  [type: uint, value: uint]
//! Equip   (in):  [type: uint, name: text]
//! Alert   (out): [duration_ms: uint, title: text, body: text]
//! ```
//!
//! Only `type == TYPE_CONTROL` carries a command; anything else is
//! ignored by the handlers.

pub mod codec;
pub mod frame;

use crate::config::MAX_DEVICE_NAME_LEN;
use crate::error::DecodeError;
use heapless::String;

/// `type` value marking a control-plane command.
pub const TYPE_CONTROL: u32 = 1;

/// Message-center host a message is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Host {
    /// This MCU (display, UI).
    Local,
    /// The BLE co-processor and whatever sits behind it.
    Remote,
}

/// Logical channel on the message center.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Port {
    /// Connection state changes from the radio.
    Control = 1,
    /// Equipment info (device name).
    Equip = 2,
    /// Alerts for the display.
    Alert = 3,
}

impl Port {
    /// Map a link-level port id.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(Port::Control),
            2 => Some(Port::Equip),
            3 => Some(Port::Alert),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u8 {
        self as u8
    }
}

/// Connection events carried in the `value` field of a control message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlValue {
    PeripheralConnected,
    PeripheralDisconnected,
    CentralConnected,
    CentralDisconnected,
}

impl ControlValue {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(ControlValue::PeripheralConnected),
            2 => Some(ControlValue::PeripheralDisconnected),
            3 => Some(ControlValue::CentralConnected),
            4 => Some(ControlValue::CentralDisconnected),
            _ => None,
        }
    }

    /// `true` for either connect event, `false` for either disconnect.
    pub fn is_connect(self) -> bool {
        matches!(
            self,
            ControlValue::PeripheralConnected | ControlValue::CentralConnected
        )
    }
}

/// Decoded control message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlMessage {
    pub kind: u32,
    pub value: u32,
}

impl ControlMessage {
    /// Read both fields; a message missing either one is rejected.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let kind = codec::decode_unsigned(payload, 0)?;
        let value = codec::decode_unsigned(payload, 1)?;
        Ok(Self { kind, value })
    }

    /// The connection event, if this is a recognised control command.
    pub fn event(&self) -> Option<ControlValue> {
        if self.kind != TYPE_CONTROL {
            return None;
        }
        ControlValue::from_raw(self.value)
    }
}

/// Decoded equip message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EquipMessage {
    pub kind: u32,
    /// Only read when `kind == TYPE_CONTROL`.
    pub name: Option<String<MAX_DEVICE_NAME_LEN>>,
}

impl EquipMessage {
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let kind = codec::decode_unsigned(payload, 0)?;
        let name = if kind == TYPE_CONTROL {
            Some(codec::decode_string(payload, 1)?)
        } else {
            None
        };
        Ok(Self { kind, name })
    }
}

/// Borrowed view of an alert payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Alert<'a> {
    /// How long the display should show the alert.
    pub duration_ms: u32,
    pub title: &'a str,
    pub body: &'a str,
}

impl<'a> Alert<'a> {
    pub fn decode(payload: &'a [u8]) -> Result<Self, DecodeError> {
        codec::decode_alert(payload)
    }

    /// Exact number of bytes `encode` writes.
    pub fn encoded_len(&self) -> usize {
        codec::alert_len(self.duration_ms, self.title, self.body)
    }

    pub fn encode(&self, out: &mut [u8]) -> Result<usize, crate::error::EncodeError> {
        codec::encode_alert(self.duration_ms, self.title, self.body, out)
    }
}
