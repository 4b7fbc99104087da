//! wrd-alerts firmware entry point (nRF52840).
//!
//! Task layout:
//!
//! ```text
//!  button_task ──┐ AppEvent                 Outbound (local)
//!                ├──────────► app_task ─────────────────► alert_task ─► SSD1306
//!  link_task ────┘  (EVENTS)    │ owns AlertApp behind APP   (ALERTS)
//!      ▲                        └──── Outbound (remote) ──► link_task ─► BLE co-processor
//!      └─ SPI frames from the BLE co-processor             (LINK_TX)
//! ```
//!
//! Alerts go to the display by default; with the `relay` feature they
//! are relayed to the paired central through `LINK_TX` instead.
//!
//! Interrupt-driven sources (button edge, link nRDY) only post events;
//! all decoding, buffer handling and encoding happens in `app_task`.

#![no_std]
#![no_main]

mod ble;
mod ui;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pin, Pull};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals, spim};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::mutex::Mutex;
use heapless::Vec;
use static_cell::StaticCell;
use wrd_alerts::config::{
    AppConfig, ALERT_QUEUE_DEPTH, EVENT_QUEUE_DEPTH, LINK_MAX_PAYLOAD, LINK_QUEUE_DEPTH,
    OUTBOUND_SLOTS, OUTBOUND_SLOT_SIZE,
};
use wrd_alerts::{AlertApp, DispatchError, Dispatcher, Event, Host, Outbound, Port, Router};
use {defmt_rtt as _, panic_probe as _};

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
});

/// Inbound work for the app task.
pub enum AppEvent {
    /// Message from the radio link for a local port.
    Message {
        port: Port,
        payload: Vec<u8, LINK_MAX_PAYLOAD>,
    },
    /// Forward button pressed (debounced).
    ButtonPressed,
}

/// `Dispatcher` backed by an embassy channel.
///
/// Never blocks: a full queue is reported back and the app drops the alert.
pub struct ChannelSink<const N: usize> {
    tx: Sender<'static, CriticalSectionRawMutex, Outbound, N>,
}

impl<const N: usize> Dispatcher for ChannelSink<N> {
    fn send(&mut self, outbound: Outbound) -> Result<(), DispatchError> {
        self.tx
            .try_send(outbound)
            .map_err(|_| DispatchError::QueueFull)
    }
}

pub type AppRouter = Router<ChannelSink<ALERT_QUEUE_DEPTH>, ChannelSink<LINK_QUEUE_DEPTH>>;
pub type App = AlertApp<AppRouter, OUTBOUND_SLOTS, OUTBOUND_SLOT_SIZE>;
pub type SharedApp = Mutex<CriticalSectionRawMutex, App>;

pub type EventSender = Sender<'static, CriticalSectionRawMutex, AppEvent, EVENT_QUEUE_DEPTH>;
pub type EventReceiver = Receiver<'static, CriticalSectionRawMutex, AppEvent, EVENT_QUEUE_DEPTH>;
pub type AlertReceiver = Receiver<'static, CriticalSectionRawMutex, Outbound, ALERT_QUEUE_DEPTH>;
pub type LinkReceiver = Receiver<'static, CriticalSectionRawMutex, Outbound, LINK_QUEUE_DEPTH>;

static EVENTS: Channel<CriticalSectionRawMutex, AppEvent, EVENT_QUEUE_DEPTH> = Channel::new();
static ALERTS: Channel<CriticalSectionRawMutex, Outbound, ALERT_QUEUE_DEPTH> = Channel::new();
static LINK_TX: Channel<CriticalSectionRawMutex, Outbound, LINK_QUEUE_DEPTH> = Channel::new();
static APP: StaticCell<SharedApp> = StaticCell::new();
static I2C_TX_BUF: StaticCell<[u8; 32]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    let config = if cfg!(feature = "relay") {
        AppConfig::relay()
    } else {
        AppConfig::DEFAULT
    };
    info!("wrd-alerts starting ({})", config);

    // Message center
    let local = ChannelSink {
        tx: ALERTS.sender(),
    };
    let mut router = Router::from_config(&config, local, || ChannelSink {
        tx: LINK_TX.sender(),
    });
    router.register_listener(Host::Local, Port::Control);
    router.register_listener(Host::Local, Port::Equip);

    let app: &'static SharedApp = APP.init(Mutex::new(AlertApp::new(router, config)));

    // Display
    let mut i2c_config = twim::Config::default();
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(
        p.TWISPI0,
        Irqs,
        p.P0_26,
        p.P0_27,
        i2c_config,
        I2C_TX_BUF.init([0; 32]),
    );
    let display = ui::display::init(i2c);

    unwrap!(spawner.spawn(app_task(app, EVENTS.receiver())));
    unwrap!(spawner.spawn(alert_task(app, ALERTS.receiver(), display)));

    // Button
    unwrap!(spawner.spawn(button_task(p.P0_11.degrade(), EVENTS.sender())));

    // Radio link, only on boards with the BLE co-processor fitted
    if config.ble_present {
        let mut spi_config = spim::Config::default();
        spi_config.frequency = spim::Frequency::M8;
        let spi = spim::Spim::new(p.SPI3, Irqs, p.P1_15, p.P1_14, p.P1_13, spi_config);
        let cs = Output::new(p.P1_12.degrade(), Level::High, OutputDrive::Standard);
        let nrdy = Input::new(p.P1_11.degrade(), Pull::Up);
        unwrap!(spawner.spawn(link_task(
            ble::spi_link::SpiLink::new(spi, cs, nrdy),
            app,
            EVENTS.sender(),
            LINK_TX.receiver(),
        )));
    } else {
        info!("No BLE co-processor - remote host disabled");
    }

    info!("wrd-alerts ready");
}

/// Sole owner of event processing: decode, acquire, encode, send.
#[embassy_executor::task]
async fn app_task(app: &'static SharedApp, events: EventReceiver) -> ! {
    loop {
        let event = events.receive().await;
        let mut app = app.lock().await;

        let result = match &event {
            AppEvent::ButtonPressed => app.handle(Event::ButtonPressed),
            AppEvent::Message { port, payload } => {
                if !app.dispatcher().is_listening(Host::Local, *port) {
                    warn!("No listener for port {}", port.as_raw());
                    continue;
                }
                app.handle(Event::Message {
                    port: *port,
                    payload: payload.as_slice(),
                })
            }
        };

        match result {
            Ok(Some(handle)) => info!("Alert queued in slot {}", handle.index()),
            Ok(None) => {}
            Err(e) => warn!("Event dropped: {}", e),
        }
    }
}

#[embassy_executor::task]
async fn alert_task(
    app: &'static SharedApp,
    alerts: AlertReceiver,
    display: ui::display::Display<Twim<'static, TWISPI0>>,
) -> ! {
    ui::alert_view::run(app, alerts, display).await
}

#[embassy_executor::task]
async fn button_task(pin: embassy_nrf::gpio::AnyPin, events: EventSender) -> ! {
    ui::buttons::button_task(pin, &events).await
}

#[embassy_executor::task]
async fn link_task(
    link: ble::spi_link::SpiLink,
    app: &'static SharedApp,
    events: EventSender,
    outbound: LinkReceiver,
) -> ! {
    ble::spi_link::run(link, app, &events, &outbound).await
}
