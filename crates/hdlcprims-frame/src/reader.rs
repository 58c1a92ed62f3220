use std::io::{ErrorKind, Read};

use bytes::{Buf, Bytes, BytesMut};
use tracing::debug;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};
use crate::receiver::{Received, Receiver};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Handles partial reads and resynchronization internally. Bytes ahead of
/// the first FLAG are discarded. An aborted frame is reported once as
/// [`FrameError::Aborted`]; the next [`read_frame`](Self::read_frame) call
/// skips ahead to the next FLAG and carries on.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    receiver: Receiver,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            receiver: Receiver::new(config.max_payload_size),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        loop {
            if let Some(received) = self.drain_buffered() {
                return match received {
                    Received::Frame(frame) => Ok(frame),
                    Received::Aborted(reason) => Err(FrameError::Aborted(reason)),
                };
            }

            if !self.fill()? {
                return Err(FrameError::ConnectionClosed);
            }
        }
    }

    /// Discard input up to and including the next FLAG.
    ///
    /// Any partial frame is dropped. Returns the number of bytes discarded,
    /// not counting the flag. Does nothing if the reader sits on a frame
    /// boundary already.
    pub fn resync(&mut self) -> Result<u64> {
        if self.receiver.is_synced() && !self.receiver.is_mid_frame() {
            return Ok(0);
        }

        self.receiver.resync();
        let before = self.receiver.discarded();
        loop {
            let mut consumed = 0;
            for &byte in self.buf.iter() {
                consumed += 1;
                // unsynced: bytes only count or sync, never complete a frame
                let _ = self.receiver.accept(byte);
                if self.receiver.is_synced() {
                    break;
                }
            }
            self.buf.advance(consumed);

            if self.receiver.is_synced() {
                let discarded = self.receiver.discarded() - before;
                debug!(discarded, "resynced");
                return Ok(discarded);
            }

            if !self.fill()? {
                return Err(FrameError::ConnectionClosed);
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame decoding.
    ///
    /// A partially received frame is dropped.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
        self.receiver.set_max_payload(max_payload_size);
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Total bytes discarded while hunting for a FLAG.
    pub fn discarded(&self) -> u64 {
        self.receiver.discarded()
    }

    /// True if part of a frame has been received but not yet completed.
    ///
    /// After [`FrameError::ConnectionClosed`] this means the stream ended
    /// mid-frame.
    pub fn is_mid_frame(&self) -> bool {
        self.receiver.is_mid_frame()
    }

    fn drain_buffered(&mut self) -> Option<Received> {
        let mut consumed = 0;
        let mut received = None;
        for &byte in self.buf.iter() {
            consumed += 1;
            received = self.receiver.accept(byte);
            if received.is_some() {
                break;
            }
        }
        self.buf.advance(consumed);
        received
    }

    fn fill(&mut self) -> Result<bool> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(true);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }
}
