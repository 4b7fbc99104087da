//! Consumer of local alert sends.
//!
//! Each `Outbound` names a pool buffer holding a `[duration, title, body]`
//! alert. The view decodes and draws it, then completes the send so the
//! buffer is released. The alert stays on screen for its duration unless
//! a newer alert replaces it.

use crate::ui::display::{self, Display};
use crate::{AlertReceiver, SharedApp};
use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};
use wrd_alerts::{Alert, Outbound};

pub async fn run<I2C>(app: &'static SharedApp, alerts: AlertReceiver, mut display: Display<I2C>) -> !
where
    I2C: embedded_hal::i2c::I2c,
{
    let mut pending: Option<Outbound> = None;

    loop {
        let outbound = match pending.take() {
            Some(outbound) => outbound,
            None => alerts.receive().await,
        };

        let Some(duration_ms) = show(app, &mut display, outbound).await else {
            continue;
        };

        match select(
            Timer::after(Duration::from_millis(duration_ms as u64)),
            alerts.receive(),
        )
        .await
        {
            Either::First(()) => display::clear(&mut display),
            Either::Second(next) => pending = Some(next),
        }
    }
}

/// Draw one alert and complete its send. Returns how long to keep it up.
async fn show<I2C>(app: &SharedApp, display: &mut Display<I2C>, outbound: Outbound) -> Option<u32>
where
    I2C: embedded_hal::i2c::I2c,
{
    let mut app = app.lock().await;

    let shown = match app.payload(outbound.handle).map(Alert::decode) {
        Some(Ok(alert)) => {
            info!("Alert: {} / {}", alert.title, alert.body);
            display::draw_alert(display, alert.title, alert.body);
            Some(alert.duration_ms)
        }
        Some(Err(e)) => {
            warn!("Alert: undecodable payload: {}", e);
            None
        }
        None => {
            warn!("Alert: stale handle in slot {}", outbound.handle.index());
            None
        }
    };

    app.send_done(outbound.handle);
    shown
}
