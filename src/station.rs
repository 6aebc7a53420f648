//! Emitting station
//!
//! Serves one capturing peer at a time and feeds every received event
//! through the converter into the virtual controller.

use crate::backend::ControllerSink;
use crate::mapping::Converter;
use crate::transport::{Link, Listener, TransportError};
use log::{info, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Pause after a failed accept (e.g. out of file descriptors) before retrying
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// How a served link ended
#[derive(Debug)]
pub enum LinkEnd {
    /// Peer closed the connection or sent something unreadable
    Closed,
    /// A newer peer dialed in and takes over
    Replaced(Link),
    /// The station was asked to stop
    Cancelled,
}

pub struct Station<K: ControllerSink> {
    converter: Converter<K>,
    cancel: CancellationToken,
    received: u64,
}

impl<K: ControllerSink> Station<K> {
    pub fn new(converter: Converter<K>, cancel: CancellationToken) -> Self {
        Self {
            converter,
            cancel,
            received: 0,
        }
    }

    pub fn converter(&self) -> &Converter<K> {
        &self.converter
    }

    /// Events received across all links so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Accept peers until cancelled.
    ///
    /// After a peer disconnects the station goes back to accepting. The
    /// converter (and its axis state) carries over to the next peer.
    pub async fn serve(&mut self, listener: &Listener) -> Result<(), TransportError> {
        info!("Station started, ready for remote controller to connect");
        let cancel = self.cancel.clone();
        let mut next: Option<Link> = None;

        loop {
            let link = match next.take() {
                Some(link) => link,
                None => {
                    let accepted = tokio::select! {
                        _ = cancel.cancelled() => break,
                        accepted = listener.accept() => accepted,
                    };
                    match accepted {
                        Ok(link) => link,
                        Err(e) => {
                            accept_failed(&e).await;
                            continue;
                        }
                    }
                }
            };

            info!("Controller connected from {}", link.peer_addr());
            match self.serve_link(listener, link).await {
                LinkEnd::Cancelled => break,
                LinkEnd::Replaced(newer) => next = Some(newer),
                LinkEnd::Closed => info!("Waiting for controller to reconnect"),
            }
        }

        info!("Station stopped after {} events", self.received);
        Ok(())
    }

    /// Drive one link until it closes, a newer peer dials in, or the
    /// station is cancelled.
    ///
    /// Only one link is ever served. A new dialer replaces the current one,
    /// so a capture host that vanished without closing its socket does not
    /// lock out its own restart.
    pub async fn serve_link(&mut self, listener: &Listener, mut link: Link) -> LinkEnd {
        let cancel = self.cancel.clone();
        let peer = link.peer_addr();

        loop {
            // pending frames (and a hang-up) are handled before new dialers
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return LinkEnd::Cancelled,

                received = link.recv() => match received {
                    Ok(Some(event)) => {
                        self.received += 1;
                        self.converter.convert(&event);
                    }
                    Ok(None) => {
                        warn!("Controller {} disconnected", peer);
                        return LinkEnd::Closed;
                    }
                    Err(e) => {
                        warn!("Link with {} failed: {}", peer, e);
                        return LinkEnd::Closed;
                    }
                },

                newer = listener.accept() => match newer {
                    Ok(newer) => {
                        warn!(
                            "Controller {} replaces {}, dropping the old link",
                            newer.peer_addr(),
                            peer
                        );
                        return LinkEnd::Replaced(newer);
                    }
                    Err(e) => accept_failed(&e).await,
                },
            }
        }
    }
}

async fn accept_failed(e: &TransportError) {
    warn!(
        "Failed to accept controller: {}, retrying in {:?}",
        e, ACCEPT_RETRY_DELAY
    );
    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
}
