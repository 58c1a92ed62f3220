//! `tokio_util::codec` integration.

use bytes::{Buf, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};

use crate::codec::{encode_frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::receiver::{Received, Receiver};

/// HDLC framing codec for `FramedRead` / `FramedWrite`.
///
/// Aborted and oversized frames are dropped (with a `warn!` event) and
/// counted, so one damaged frame does not end the stream.
#[derive(Debug)]
pub struct HdlcCodec {
    receiver: Receiver,
    max_payload_size: usize,
    aborted: u64,
}

impl HdlcCodec {
    /// Create a codec with the default configuration.
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Create a codec with the given configuration.
    ///
    /// Frames larger than `max_payload_size` are rejected on encode and
    /// dropped on decode.
    pub fn with_config(config: FrameConfig) -> Self {
        Self {
            receiver: Receiver::new(config.max_payload_size),
            max_payload_size: config.max_payload_size,
            aborted: 0,
        }
    }

    /// Frames dropped so far.
    pub fn aborted(&self) -> u64 {
        self.aborted
    }

    /// Bytes discarded while hunting for a FLAG.
    pub fn discarded(&self) -> u64 {
        self.receiver.discarded()
    }
}

impl Default for HdlcCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for HdlcCodec {
    type Item = Bytes;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        let mut consumed = 0;
        let mut frame = None;
        for &byte in src.iter() {
            consumed += 1;
            match self.receiver.accept(byte) {
                Some(Received::Frame(f)) => {
                    frame = Some(f);
                    break;
                }
                Some(Received::Aborted(_)) => self.aborted += 1,
                None => {}
            }
        }
        src.advance(consumed);
        Ok(frame)
    }
}

impl Encoder<&[u8]> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<()> {
        if item.len() > self.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: item.len(),
                max: self.max_payload_size,
            });
        }
        encode_frame(item, dst)
    }
}

impl Encoder<Bytes> for HdlcCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Bytes, dst: &mut BytesMut) -> Result<()> {
        Encoder::<&[u8]>::encode(self, item.as_ref(), dst)
    }
}

/// Wrap an async reader in a frame stream with default configuration.
pub fn framed_read<R: AsyncRead>(reader: R) -> FramedRead<R, HdlcCodec> {
    FramedRead::new(reader, HdlcCodec::new())
}

/// Wrap an async writer in a frame sink with default configuration.
pub fn framed_write<W: AsyncWrite>(writer: W) -> FramedWrite<W, HdlcCodec> {
    FramedWrite::new(writer, HdlcCodec::new())
}
