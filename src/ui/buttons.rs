//! Forward button input with async debouncing.
//!
//! The button is active-low with the internal pull-up. The task waits
//! for a GPIO edge, debounces it and posts `AppEvent::ButtonPressed`.
//! Nothing else happens here: the alert is built by the app task.

use crate::{AppEvent, EventSender};
use defmt::{info, warn};
use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};
use wrd_alerts::config::BUTTON_DEBOUNCE_MS;

/// Run the button loop.
///
/// Waits for the pin to go low (pressed), debounces, posts the event,
/// then waits for release before repeating.
pub async fn button_task(pin: AnyPin, tx: &EventSender) -> ! {
    let mut btn = Input::new(pin, Pull::Up);

    loop {
        // Falling edge = press (active-low).
        btn.wait_for_falling_edge().await;

        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        if btn.is_low() {
            info!("Button: forward");
            if tx.try_send(AppEvent::ButtonPressed).is_err() {
                warn!("Button: event queue full, press dropped");
            }

            // Wait for release to avoid repeat triggers.
            btn.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        }
    }
}
