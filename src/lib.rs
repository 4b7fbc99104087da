//! Alert dispatch core for the wearable reference firmware.
//!
//! Reacts to control/equip messages from the radio and to the forward
//! button by posting short CBOR-encoded alerts to the display.
//!
//! Everything in this library is hardware-independent and runs on the
//! host: `cargo test`.  The embedded binary (`src/main.rs`, feature
//! `embedded`) wires it to the nRF52840, the BLE co-processor link and
//! the SSD1306 display.
//!
//! ```text
//!  link msg ─┐
//!            ├─► handlers ─► BufferPool ─► codec ─► Dispatcher ─► display
//!  button  ──┘                  ▲                                   │
//!                               └──────────── send_done ────────────┘
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod outbound;
pub mod protocol;
pub mod router;

pub use app::{AlertApp, Dispatcher, Event, Outbound, Stats};
pub use config::AppConfig;
pub use error::{DecodeError, DispatchError, EncodeError, Error};
pub use outbound::{BufferHandle, BufferPool};
pub use protocol::{Alert, Host, Port};
pub use router::Router;
