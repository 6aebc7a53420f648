//! Wire framing for raw events
//!
//! Each event travels as one length-delimited frame (4-byte big-endian
//! length prefix) whose body is a JSON object:
//!
//! ```text
//! 00 00 00 2b {"type":"Key","code":"BTN_SOUTH","value":1}
//! ```

use super::TransportError;
use crate::event::RawEvent;
use bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// Largest accepted frame body. Real events are well under 100 bytes.
pub const MAX_FRAME_LEN: usize = 1024;

#[derive(Debug)]
pub struct EventCodec {
    frames: LengthDelimitedCodec,
}

impl EventCodec {
    pub fn new() -> Self {
        Self {
            frames: LengthDelimitedCodec::builder()
                .max_frame_length(MAX_FRAME_LEN)
                .new_codec(),
        }
    }
}

impl Default for EventCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for EventCodec {
    type Item = RawEvent;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawEvent>, TransportError> {
        let Some(frame) = self.frames.decode(src)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&frame)?))
    }
}

impl Encoder<&RawEvent> for EventCodec {
    type Error = TransportError;

    fn encode(&mut self, event: &RawEvent, dst: &mut BytesMut) -> Result<(), TransportError> {
        let body = serde_json::to_vec(event)?;
        self.frames.encode(Bytes::from(body), dst)?;
        Ok(())
    }
}
