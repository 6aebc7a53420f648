//! Capture loop
//!
//! Polls the physical pad and forwards every button and axis report over
//! the link, in the order the device produced them.

use crate::event::RawEvent;
use crate::source::{RawEventSource, SourceError};
use crate::transport::{Link, TransportError};
use log::{debug, info};
use thiserror::Error;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Event source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Failed to forward event: {0}")]
    Transport(#[from] TransportError),

    #[error("Event source poller stopped: {0}")]
    Poller(#[from] JoinError),
}

/// Owns the source and reads it until exhaustion or cancellation.
pub struct Capture<S> {
    source: Option<S>,
    cancel: CancellationToken,
}

impl<S> Capture<S>
where
    S: RawEventSource + Send + 'static,
{
    pub fn new(source: S, cancel: CancellationToken) -> Self {
        Self {
            source: Some(source),
            cancel,
        }
    }

    /// Next batch of forwardable events (Sync and other reports removed).
    ///
    /// Returns `None` once the source is exhausted or the capture is
    /// cancelled. The device poll runs on the blocking pool, so cancellation
    /// does not wait for the pad to report.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<RawEvent>>, CaptureError> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        let Some(mut source) = self.source.take() else {
            return Ok(None);
        };

        let poll = tokio::task::spawn_blocking(move || {
            let batch = source.poll();
            (source, batch)
        });

        let (source, batch) = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("Capture cancelled while polling");
                return Ok(None);
            }
            joined = poll => joined?,
        };

        match batch {
            Ok(events) => {
                self.source = Some(source);
                Ok(Some(
                    events
                        .into_iter()
                        .filter(|event| event.event_type.is_forwarded())
                        .collect(),
                ))
            }
            Err(SourceError::Exhausted) => {
                info!("Event source exhausted");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Forward everything the source reports over `link`.
    ///
    /// Returns the number of events sent. A failed send is fatal; there is
    /// no retry or buffering. A send stuck on a peer that stopped reading
    /// is abandoned on cancellation.
    pub async fn run(mut self, mut link: Link) -> Result<u64, CaptureError> {
        info!("Controller started, connected to station at {}", link.peer_addr());
        let cancel = self.cancel.clone();

        let mut forwarded = 0u64;
        'capture: while let Some(batch) = self.next_batch().await? {
            for event in batch {
                info!("captured event: {}", event);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        debug!("Capture cancelled while sending");
                        break 'capture;
                    }
                    sent = link.send(&event) => sent?,
                }
                forwarded += 1;
            }
        }

        info!("Capture stopped after {} events", forwarded);
        Ok(forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ScriptedSource;
    use crate::transport::Listener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn sync_reports_are_filtered() {
        let source = ScriptedSource::new(vec![vec![
            RawEvent::key("BTN_SOUTH", 1),
            RawEvent::sync(),
            RawEvent::absolute("ABS_X", 12),
            RawEvent::sync(),
        ]]);
        let mut capture = Capture::new(source, CancellationToken::new());

        assert_eq!(
            capture.next_batch().await.unwrap(),
            Some(vec![RawEvent::key("BTN_SOUTH", 1), RawEvent::absolute("ABS_X", 12)])
        );
        assert_eq!(capture.next_batch().await.unwrap(), None);
        assert_eq!(capture.next_batch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_poll_is_not_an_error() {
        let source = ScriptedSource::new(vec![vec![], vec![RawEvent::key("BTN_TL", 1)]]);
        let mut capture = Capture::new(source, CancellationToken::new());

        assert_eq!(capture.next_batch().await.unwrap(), Some(vec![]));
        assert_eq!(
            capture.next_batch().await.unwrap(),
            Some(vec![RawEvent::key("BTN_TL", 1)])
        );
    }

    #[tokio::test]
    async fn cancelled_capture_stops_polling() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut capture = Capture::new(
            ScriptedSource::single_batch(vec![RawEvent::key("BTN_SOUTH", 1)]),
            cancel,
        );

        assert_eq!(capture.next_batch().await.unwrap(), None);
    }

    struct BrokenSource;

    impl RawEventSource for BrokenSource {
        fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError> {
            Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "device unplugged",
            )))
        }
    }

    #[tokio::test]
    async fn device_failure_is_fatal() {
        let mut capture = Capture::new(BrokenSource, CancellationToken::new());
        let result = capture.next_batch().await;
        assert!(matches!(result, Err(CaptureError::Source(SourceError::Io(_)))));
    }

    /// Never runs dry; counts how often it was polled.
    struct FloodSource {
        polls: Arc<AtomicUsize>,
    }

    impl RawEventSource for FloodSource {
        fn poll(&mut self) -> Result<Vec<RawEvent>, SourceError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok((0..256).map(|i| RawEvent::absolute("ABS_X", i)).collect())
        }
    }

    #[tokio::test]
    async fn cancel_interrupts_a_stalled_send() {
        let listener = Listener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let link = Link::dial(&addr, Duration::from_secs(5)).await.unwrap();
        // accepted but never read, so the socket buffers eventually fill
        let _silent_station = listener.accept().await.unwrap();

        let polls = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();
        let capture = Capture::new(FloodSource { polls: polls.clone() }, cancel.clone());
        let running = tokio::spawn(capture.run(link));

        // wait until polling stops advancing, i.e. the capture is parked in a send
        let mut last = usize::MAX;
        loop {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let now = polls.load(Ordering::SeqCst);
            if now == last {
                break;
            }
            last = now;
        }

        cancel.cancel();
        let forwarded = tokio::time::timeout(Duration::from_secs(1), running)
            .await
            .expect("capture should stop once cancelled")
            .unwrap()
            .unwrap();
        assert!(forwarded > 0);
    }
}
