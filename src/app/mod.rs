//! Application core - turns events into alert sends.
//!
//! Flow for every event:
//!
//! 1. run the matching handler ([`crate::handlers`]),
//! 2. size the payload with [`codec::alert_len`] and acquire a buffer of
//!    exactly that capacity from the [`BufferPool`],
//! 3. encode the alert into it,
//! 4. hand the buffer to the [`Dispatcher`] for `Port::Alert` on the
//!    configured destination (the display unless alerts are relayed).
//!
//! Whoever consumes the alert calls [`AlertApp::send_done`] once it is
//! finished with the bytes; that releases the buffer. Each send owns its
//! own buffer, so a button press arriving while a link alert is still in
//! flight cannot disturb it.

#[cfg(test)]
mod tests;

use crate::config::AppConfig;
use crate::error::{DispatchError, Error};
use crate::handlers::{self, AlertRequest};
use crate::outbound::{BufferHandle, BufferPool};
use crate::protocol::{codec, Host, Port};

/// Something that happened and may produce an alert.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event<'a> {
    /// Message delivered by the message center on `port`.
    Message { port: Port, payload: &'a [u8] },
    /// Forward button pressed.
    ButtonPressed,
}

/// An encoded message handed to the dispatcher.
///
/// The bytes stay in the pool until the consumer calls
/// [`AlertApp::send_done`] with `handle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outbound {
    pub destination: Host,
    pub port: Port,
    pub handle: BufferHandle,
}

/// Message-center send side.
pub trait Dispatcher {
    /// Queue `outbound` for delivery. On error the caller still owns the
    /// buffer.
    fn send(&mut self, outbound: Outbound) -> Result<(), DispatchError>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn send(&mut self, outbound: Outbound) -> Result<(), DispatchError> {
        (**self).send(outbound)
    }
}

/// Counters for dropped and delivered work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Stats {
    /// Alerts handed to the dispatcher.
    pub sent: u32,
    /// Completions that released a buffer.
    pub completed: u32,
    /// Events that produced no alert (unknown type/value, foreign port).
    pub ignored: u32,
    pub decode_errors: u32,
    pub allocation_failures: u32,
    pub dispatch_failures: u32,
}

/// Event handlers, outbound buffers and the dispatcher in one place.
pub struct AlertApp<D, const SLOTS: usize, const CAP: usize> {
    pool: BufferPool<SLOTS, CAP>,
    dispatcher: D,
    config: AppConfig,
    stats: Stats,
}

impl<D: Dispatcher, const SLOTS: usize, const CAP: usize> AlertApp<D, SLOTS, CAP> {
    pub fn new(dispatcher: D, config: AppConfig) -> Self {
        Self {
            pool: BufferPool::new(),
            dispatcher,
            config,
            stats: Stats::default(),
        }
    }

    /// Process one event.
    ///
    /// Returns the handle of the alert that was sent, `None` when the
    /// event produces no alert. Errors are already logged and counted;
    /// the event is dropped and nothing stays allocated.
    pub fn handle(&mut self, event: Event<'_>) -> Result<Option<BufferHandle>, Error> {
        let decided = match event {
            Event::Message {
                port: Port::Control,
                payload,
            } => handlers::on_control(payload),
            Event::Message {
                port: Port::Equip,
                payload,
            } => handlers::on_equip(payload),
            Event::Message { port, .. } => {
                log_warn!("App: no handler for port {}", port.as_raw());
                Ok(None)
            }
            Event::ButtonPressed => Ok(Some(handlers::on_button())),
        };

        match decided {
            Ok(Some(request)) => self.post(&request).map(Some),
            Ok(None) => {
                self.stats.ignored = self.stats.ignored.saturating_add(1);
                Ok(None)
            }
            Err(e) => {
                log_warn!("App: dropping malformed message: {:?}", e);
                self.stats.decode_errors = self.stats.decode_errors.saturating_add(1);
                Err(e.into())
            }
        }
    }

    /// Encode `request` into a fresh buffer and send it to
    /// `AppConfig::alert_destination`.
    pub fn post(&mut self, request: &AlertRequest) -> Result<BufferHandle, Error> {
        let duration_ms = self.config.alert_time_on_screen_ms;
        let title = request.title;
        let body = request.body.as_str();

        let capacity = codec::alert_len(duration_ms, title, body);
        let handle = match self.pool.acquire(capacity) {
            Ok(handle) => handle,
            Err(e) => {
                log_error!("App: no buffer for {} byte alert", capacity);
                self.stats.allocation_failures = self.stats.allocation_failures.saturating_add(1);
                return Err(e);
            }
        };

        if let Err(e) = self
            .pool
            .fill(handle, |buf| codec::encode_alert(duration_ms, title, body, buf))
        {
            log_error!("App: alert encoding failed");
            self.pool.release(handle);
            return Err(e);
        }

        let outbound = Outbound {
            destination: self.config.alert_destination,
            port: Port::Alert,
            handle,
        };
        if let Err(e) = self.dispatcher.send(outbound) {
            log_warn!("App: dispatcher refused alert");
            self.pool.release(handle);
            self.stats.dispatch_failures = self.stats.dispatch_failures.saturating_add(1);
            return Err(e.into());
        }

        self.stats.sent = self.stats.sent.saturating_add(1);
        log_info!("App: alert queued ({} bytes)", capacity);
        Ok(handle)
    }

    /// Encoded bytes of an in-flight message.
    pub fn payload(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.pool.get(handle)
    }

    /// Completion callback: the consumer is done with `handle`.
    ///
    /// Calling it again for the same handle is a no-op.
    pub fn send_done(&mut self, handle: BufferHandle) -> bool {
        let released = self.pool.release(handle);
        if released {
            self.stats.completed = self.stats.completed.saturating_add(1);
        } else {
            log_debug!("App: completion for stale buffer {}", handle.index());
        }
        released
    }

    /// Buffers handed out and not yet completed.
    pub fn live_buffers(&self) -> usize {
        self.pool.live()
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatcher
    }
}
