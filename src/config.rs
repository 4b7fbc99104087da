//! Application-wide constants and startup configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

use crate::protocol::Host;

// Alerts

/// How long the display keeps an alert on screen (milliseconds).
/// Sent as the first field of every alert payload.
pub const ALERT_TIME_ON_SCREEN_MS: u32 = 5000;

/// Longest device name accepted from an equip message (bytes).
///
/// Whatever fits one link frame: `[1, name]` costs array(1) + uint(1) +
/// text header(2) on top of the name.
pub const MAX_DEVICE_NAME_LEN: usize = LINK_MAX_PAYLOAD - 4;

/// Longest alert body we build (bytes). The device name is the longest body.
pub const MAX_ALERT_BODY_LEN: usize = MAX_DEVICE_NAME_LEN;

// Outbound buffers

/// Number of outbound alert buffers that may be in flight at once.
pub const OUTBOUND_SLOTS: usize = 4;

/// Size of each outbound buffer (bytes).
///
/// Worst case alert: array(1) + u32 duration(5) + "Device Name"(1 + 11)
/// + longest body(2 + MAX_ALERT_BODY_LEN).
pub const OUTBOUND_SLOT_SIZE: usize = 1 + 5 + 12 + 2 + MAX_ALERT_BODY_LEN;

// Routing

/// Maximum number of (host, port) listeners the router keeps.
pub const MAX_LISTENERS: usize = 8;

/// Depth of the inbound event queue (link messages + button presses).
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Depth of the local alert queue feeding the display.
pub const ALERT_QUEUE_DEPTH: usize = 4;

/// Depth of the outbound queue feeding the radio link.
pub const LINK_QUEUE_DEPTH: usize = 4;

// Radio link (SPI to the BLE co-processor)

/// Link frame header: `[port][payload length]`.
pub const LINK_HEADER_LEN: usize = 2;

/// Largest payload a single link frame can carry (length is one byte).
pub const LINK_MAX_PAYLOAD: usize = 255;

// GPIO pin assignments (wearable reference board on nRF52840)
//
// Logical names only; the concrete `embassy_nrf::peripherals::*` are
// selected in `main.rs`.  Adjust for your PCB.
//
//   Button FORWARD → P0.11
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   BLE SPI SCK    → P1.15
//   BLE SPI MOSI   → P1.13
//   BLE SPI MISO   → P1.14
//   BLE SPI CS     → P1.12
//   BLE nRDY       → P1.11

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

// Display

/// Display width in pixels.
pub const DISPLAY_WIDTH: u32 = 128;

/// Characters per line with the 6x10 font.
pub const DISPLAY_CHARS_PER_LINE: usize = 21;

/// Body lines that fit under the alert title.
pub const DISPLAY_BODY_LINES: usize = 4;

/// Board capabilities, resolved once at startup.
///
/// Replaces build-time branching on hardware presence: the composition
/// root reads these flags and instantiates optional components only when
/// they are set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    /// A BLE co-processor is fitted and acts as the remote-host transport.
    pub ble_present: bool,
    /// Display duration written into every alert payload (ms).
    pub alert_time_on_screen_ms: u32,
    /// Where alerts are sent. `Remote` relays them over the link to the
    /// paired central instead of the on-board display.
    pub alert_destination: Host,
}

impl AppConfig {
    /// Wearable reference board defaults.
    pub const DEFAULT: Self = Self {
        ble_present: true,
        alert_time_on_screen_ms: ALERT_TIME_ON_SCREEN_MS,
        alert_destination: Host::Local,
    };

    /// Same board without the radio fitted.
    pub const fn without_ble() -> Self {
        Self {
            ble_present: false,
            ..Self::DEFAULT
        }
    }

    /// Radio fitted, alerts relayed to the remote host.
    pub const fn relay() -> Self {
        Self {
            alert_destination: Host::Remote,
            ..Self::DEFAULT
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
