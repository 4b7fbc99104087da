//! Message-center routing: local sink, optional radio transport, and the
//! listener table.
//!
//! Local sends go to the on-board consumer (the display). Remote sends go
//! through the BLE transport, which only exists when the board has the
//! radio fitted (`AppConfig::ble_present`).

use crate::app::{Dispatcher, Outbound};
use crate::config::{AppConfig, MAX_LISTENERS};
use crate::error::DispatchError;
use crate::protocol::{Host, Port};
use heapless::Vec;

pub struct Router<L, R> {
    local: L,
    remote: Option<R>,
    listeners: Vec<(Host, Port), MAX_LISTENERS>,
}

impl<L: Dispatcher, R: Dispatcher> Router<L, R> {
    pub fn new(local: L, remote: Option<R>) -> Self {
        Self {
            local,
            remote,
            listeners: Vec::new(),
        }
    }

    /// Build from board capabilities. `transport` is only called when
    /// the radio is present.
    pub fn from_config<F>(config: &AppConfig, local: L, transport: F) -> Self
    where
        F: FnOnce() -> R,
    {
        let remote = if config.ble_present {
            Some(transport())
        } else {
            None
        };
        Self::new(local, remote)
    }

    /// Start delivering messages for `(host, port)`.
    ///
    /// Returns `false` when the table is full; registering twice is fine.
    pub fn register_listener(&mut self, host: Host, port: Port) -> bool {
        if self.is_listening(host, port) {
            return true;
        }
        if self.listeners.push((host, port)).is_err() {
            log_error!("Router: listener table full");
            return false;
        }
        log_info!("Router: listening on port {}", port.as_raw());
        true
    }

    pub fn is_listening(&self, host: Host, port: Port) -> bool {
        self.listeners.iter().any(|&(h, p)| h == host && p == port)
    }

    /// `true` when a remote-host transport is configured.
    pub fn has_transport(&self) -> bool {
        self.remote.is_some()
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn local_mut(&mut self) -> &mut L {
        &mut self.local
    }

    pub fn remote_mut(&mut self) -> Option<&mut R> {
        self.remote.as_mut()
    }
}

impl<L: Dispatcher, R: Dispatcher> Dispatcher for Router<L, R> {
    fn send(&mut self, outbound: Outbound) -> Result<(), DispatchError> {
        match outbound.destination {
            Host::Local => self.local.send(outbound),
            Host::Remote => match self.remote.as_mut() {
                Some(transport) => transport.send(outbound),
                None => {
                    log_warn!("Router: no transport for remote host");
                    Err(DispatchError::NoTransport)
                }
            },
        }
    }
}
