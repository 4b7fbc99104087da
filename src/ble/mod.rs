//! Radio side of the message center.
//!
//! The BLE stack runs on a co-processor; this MCU talks to it over SPI.
//! Only built into the task set when `AppConfig::ble_present` is set.

pub mod spi_link;
