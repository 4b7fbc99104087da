//! User interface - SSD1306 alert display and the forward button.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C, shows one alert at a time
//! - **Button**: single tactile switch (forward), debounced
//! - **Alert view**: consumer of local alert sends; renders, then
//!   completes the send so its buffer returns to the pool

pub mod alert_view;
pub mod buttons;
pub mod display;
