//! SPI link to the BLE co-processor.
//!
//! The co-processor owns the radio. This MCU is SPI master; the
//! co-processor pulls nRDY low when it has a frame for us. Frames are
//! `[port][len][payload]` in both directions (see `protocol::frame`).
//!
//! Inbound frames are copied into an `AppEvent::Message` and posted to the
//! app task. Outbound sends for the remote host are framed from the pool
//! buffer, which is completed as soon as the frame has been copied out.

use crate::{AppEvent, EventSender, LinkReceiver, SharedApp};
use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Output};
use embassy_nrf::peripherals::SPI3;
use embassy_nrf::spim::{self, Spim};
use heapless::Vec;
use wrd_alerts::config::{LINK_HEADER_LEN, LINK_MAX_PAYLOAD};
use wrd_alerts::protocol::frame;
use wrd_alerts::Outbound;

const FRAME_MAX: usize = LINK_HEADER_LEN + LINK_MAX_PAYLOAD;

pub struct SpiLink {
    spi: Spim<'static, SPI3>,
    cs: Output<'static>,
    nrdy: Input<'static>,
}

impl SpiLink {
    pub fn new(spi: Spim<'static, SPI3>, cs: Output<'static>, nrdy: Input<'static>) -> Self {
        Self { spi, cs, nrdy }
    }

    /// Clock one inbound frame out of the co-processor.
    async fn read_frame(&mut self) -> Result<AppEvent, LinkError> {
        self.cs.set_low();
        let result = self.read_frame_selected().await;
        self.cs.set_high();
        result
    }

    async fn read_frame_selected(&mut self) -> Result<AppEvent, LinkError> {
        let mut header = [0u8; LINK_HEADER_LEN];
        self.spi.read(&mut header).await.map_err(LinkError::Spi)?;
        let (port, len) = frame::parse_header(header).map_err(|_| LinkError::BadHeader(header[0]))?;

        let mut payload: Vec<u8, LINK_MAX_PAYLOAD> = Vec::new();
        payload
            .resize(len, 0)
            .map_err(|_| LinkError::BadHeader(header[0]))?;
        if !payload.is_empty() {
            self.spi.read(&mut payload).await.map_err(LinkError::Spi)?;
        }

        Ok(AppEvent::Message { port, payload })
    }

    async fn write_frame(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.cs.set_low();
        let result = self.spi.write(frame).await.map_err(LinkError::Spi);
        self.cs.set_high();
        result
    }
}

#[derive(Debug, defmt::Format)]
enum LinkError {
    Spi(spim::Error),
    BadHeader(u8),
}

/// Link loop: service nRDY and outbound remote sends, whichever comes first.
pub async fn run(
    mut link: SpiLink,
    app: &'static SharedApp,
    events: &EventSender,
    outbound: &LinkReceiver,
) -> ! {
    info!("Link: started");
    let mut tx = [0u8; FRAME_MAX];

    loop {
        match select(link.nrdy.wait_for_low(), outbound.receive()).await {
            Either::First(()) => match link.read_frame().await {
                Ok(event) => {
                    if events.try_send(event).is_err() {
                        warn!("Link: event queue full, frame dropped");
                    }
                }
                Err(e) => warn!("Link: read failed: {}", e),
            },
            Either::Second(send) => {
                let Some(len) = frame_out(app, send, &mut tx).await else {
                    continue;
                };
                debug!("Link: tx {} bytes", len);
                if let Err(e) = link.write_frame(&tx[..len]).await {
                    warn!("Link: write failed: {}", e);
                }
            }
        }
    }
}

/// Copy a pool buffer into a link frame and complete the send.
async fn frame_out(app: &SharedApp, send: Outbound, tx: &mut [u8]) -> Option<usize> {
    let mut app = app.lock().await;
    let framed = match app.payload(send.handle) {
        Some(payload) => match frame::encode_frame(send.port, payload, tx) {
            Ok(len) => Some(len),
            Err(e) => {
                warn!("Link: cannot frame payload: {}", e);
                None
            }
        },
        None => {
            warn!("Link: stale handle in slot {}", send.handle.index());
            None
        }
    };
    app.send_done(send.handle);
    framed
}
