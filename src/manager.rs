//! High-level relay manager
//!
//! Wires sources, transport, converter and sinks together for each role and
//! owns the cancellation token that stops whichever role is running.

use crate::backend::{ControllerSink, SinkError};
use crate::capture::{Capture, CaptureError};
use crate::config::{Config, ConfigError};
use crate::mapping::{ButtonMap, Converter};
use crate::source::{RawEventSource, SourceError};
use crate::station::Station;
use crate::transport::{self, Link, Listener, TransportError};
use log::info;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// What this process does in the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Role {
    /// Read a local pad and forward its events to a station
    #[value(alias = "controller")]
    Capture,
    /// Accept a controller and drive the virtual pad
    #[value(alias = "station")]
    Emit,
    /// Print a local pad's events without forwarding them
    Monitor,
    /// Drive the virtual pad from a local pad, no network
    Local,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Capture => "capture",
            Role::Emit => "emit",
            Role::Monitor => "monitor",
            Role::Local => "local",
        };
        f.write_str(name)
    }
}

/// Runs one role at a time on the calling thread.
///
/// Clones share the cancellation token, so a clone handed to a signal
/// handler can stop a role running elsewhere.
#[derive(Debug, Clone)]
pub struct RelayManager {
    config: Config,
    cancel: CancellationToken,
}

impl RelayManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Ask the running role to wind down
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            info!("Stopping relay...");
            self.cancel.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Converter using the default layout plus configured overrides
    pub fn converter<K: ControllerSink>(&self, sink: K) -> Converter<K> {
        Converter::with_buttons(ButtonMap::with_overrides(&self.config.buttons), sink)
    }

    /// Dial the station and forward `source` until it is exhausted or the
    /// manager is stopped.
    pub fn run_capture<S>(&self, source: S) -> Result<(), RelayError>
    where
        S: RawEventSource + Send + 'static,
    {
        let network = &self.config.network;
        let addr = transport::dial_address(&network.host, network.port);
        let timeout = Duration::from_millis(network.connect_timeout_ms);
        let cancel = self.cancel_token();

        self.block_on(async move {
            let link = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                link = Link::dial(&addr, timeout) => link?,
            };
            Capture::new(source, cancel).run(link).await?;
            Ok(())
        })
    }

    /// Listen for a controller and drive `sink` until stopped.
    pub fn run_emit<K: ControllerSink>(&self, sink: K) -> Result<(), RelayError> {
        let network = &self.config.network;
        let addr = transport::listen_address(&network.host, network.port);
        let mut station = Station::new(self.converter(sink), self.cancel_token());

        self.block_on(async move {
            let listener = Listener::bind(&addr).await?;
            station.serve(&listener).await?;
            Ok(())
        })
    }

    /// Print every forwardable event `source` reports to stdout.
    pub fn run_monitor<S>(&self, source: S) -> Result<(), RelayError>
    where
        S: RawEventSource + Send + 'static,
    {
        let mut capture = Capture::new(source, self.cancel_token());

        self.block_on(async move {
            info!("Monitoring controller, press Ctrl+C to stop");
            while let Some(batch) = capture.next_batch().await? {
                for event in batch {
                    println!("{} {} {}", event.event_type, event.code, event.value);
                }
            }
            Ok(())
        })
    }

    /// Drive `sink` straight from `source`, skipping the network.
    pub fn run_local<S, K>(&self, source: S, sink: K) -> Result<(), RelayError>
    where
        S: RawEventSource + Send + 'static,
        K: ControllerSink,
    {
        let mut capture = Capture::new(source, self.cancel_token());
        let mut converter = self.converter(sink);

        self.block_on(async move {
            info!("Relaying controller locally, press Ctrl+C to stop");
            while let Some(batch) = capture.next_batch().await? {
                for event in batch {
                    converter.convert(&event);
                }
            }
            Ok(())
        })
    }

    fn block_on<F>(&self, future: F) -> Result<(), RelayError>
    where
        F: Future<Output = Result<(), RelayError>>,
    {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RelayError::Runtime)?;
        let result = rt.block_on(future);
        // a device read may still be parked on the blocking pool
        rt.shutdown_background();
        result
    }
}
