//! Point-to-point event transport
//!
//! One TCP connection carries raw events from the capturing host to the
//! emitting host, in send order, without acknowledgment or retransmission.
//! The emitting side is the [`Listener`], the capturing side dials it.

pub mod codec;

pub use codec::{EventCodec, MAX_FRAME_LEN};

use crate::config::ANY_HOST;
use crate::event::RawEvent;
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("Timed out connecting to {0}")]
    ConnectTimeout(String),

    #[error("Link I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{}]:{}", host, port)
    } else {
        format!("{}:{}", host, port)
    }
}

/// Address the listener binds, `*` meaning every interface.
pub fn listen_address(host: &str, port: u16) -> String {
    let host = if host == ANY_HOST { "0.0.0.0" } else { host };
    join_host_port(host, port)
}

/// Address the dialer connects to; `*` falls back to loopback.
pub fn dial_address(host: &str, port: u16) -> String {
    let host = if host == ANY_HOST {
        warn!("No --host given for the capturing side, dialing loopback");
        "127.0.0.1"
    } else {
        host
    };
    join_host_port(host, port)
}

/// The bound end of the channel.
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let inner = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!("address: tcp://{}", inner.local_addr()?);
        Ok(Self { inner })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.inner.local_addr()?)
    }

    /// Wait for the next dialer.
    pub async fn accept(&self) -> Result<Link, TransportError> {
        let (stream, peer) = self.inner.accept().await?;
        Link::from_stream(stream, peer)
    }
}

/// An established connection between the two endpoints.
pub struct Link {
    frames: Framed<TcpStream, EventCodec>,
    peer: SocketAddr,
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link").field("peer", &self.peer).finish()
    }
}

impl Link {
    /// Connect to a listener, giving up after `timeout`.
    pub async fn dial(addr: &str, timeout: Duration) -> Result<Self, TransportError> {
        info!("address: tcp://{}", addr);
        let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| TransportError::ConnectTimeout(addr.to_string()))?
            .map_err(|source| TransportError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        let peer = stream.peer_addr()?;
        Self::from_stream(stream, peer)
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> Result<Self, TransportError> {
        stream.set_nodelay(true)?;
        debug!("Link established with {}", peer);
        Ok(Self {
            frames: Framed::new(stream, EventCodec::new()),
            peer,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Send one event and flush it onto the wire.
    pub async fn send(&mut self, event: &RawEvent) -> Result<(), TransportError> {
        self.frames.send(event).await
    }

    /// Next event, or `None` once the peer has closed the connection.
    ///
    /// Cancel-safe: a partially received frame stays buffered.
    pub async fn recv(&mut self) -> Result<Option<RawEvent>, TransportError> {
        self.frames.next().await.transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_host_resolution() {
        assert_eq!(listen_address("*", 5566), "0.0.0.0:5566");
        assert_eq!(dial_address("*", 5566), "127.0.0.1:5566");
        assert_eq!(dial_address("10.0.0.7", 6000), "10.0.0.7:6000");
        assert_eq!(listen_address("::1", 5566), "[::1]:5566");
    }

    #[tokio::test]
    async fn events_arrive_in_order() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let events: Vec<RawEvent> = (0..50)
            .map(|i| {
                if i % 2 == 0 {
                    RawEvent::absolute("ABS_X", -i * 100)
                } else {
                    RawEvent::key("BTN_SOUTH", i % 3)
                }
            })
            .collect();

        let sent = events.clone();
        let dialer = tokio::spawn(async move {
            let mut link = Link::dial(&addr, Duration::from_secs(5)).await.unwrap();
            for event in &sent {
                link.send(event).await.unwrap();
            }
        });

        let mut link = listener.accept().await.unwrap();
        let mut received = Vec::new();
        while let Some(event) = link.recv().await.unwrap() {
            received.push(event);
        }
        dialer.await.unwrap();

        assert_eq!(received, events);
    }

    #[tokio::test]
    async fn dial_without_listener_fails() {
        // bind then drop to get a port nobody listens on
        let port = {
            let listener = Listener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let result = Link::dial(&format!("127.0.0.1:{}", port), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let first = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = first.local_addr().unwrap().to_string();
        let result = Listener::bind(&addr).await;
        assert!(matches!(result, Err(TransportError::Bind { .. })));
    }
}
