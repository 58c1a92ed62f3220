use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};
use tracing::debug;

use crate::alphabet::{ABORT, FLAG};
use crate::codec::{encode_escaped, encoded_len, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes framed payloads to any `Write` stream.
///
/// [`send`](Self::send) writes one complete frame. For partial and abortable
/// frames use [`flag`](Self::flag), [`write_escaped`](Self::write_escaped)
/// and [`abort`](Self::abort).
///
/// Consecutive flags are collapsed: the closing flag of one frame is the
/// opening flag of the next. An empty payload therefore produces no frame on
/// the receiving side.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    last_was_flag: bool,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            last_was_flag: false,
        }
    }

    /// Encode and send a payload as one frame (blocking).
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.config.max_payload_size {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: self.config.max_payload_size,
            });
        }

        self.buf.clear();
        self.buf.reserve(encoded_len(payload));
        if !self.last_was_flag {
            self.buf.put_u8(FLAG);
        }
        encode_escaped(payload, &mut self.buf);
        self.buf.put_u8(FLAG);

        self.write_buffered()?;
        self.last_was_flag = true;
        debug!(len = payload.len(), "frame sent");

        self.flush()
    }

    /// Write a FLAG unless the previous byte written was one.
    ///
    /// Required before and after a frame built with
    /// [`write_escaped`](Self::write_escaped).
    pub fn flag(&mut self) -> Result<()> {
        if self.last_was_flag {
            return Ok(());
        }
        self.buf.clear();
        self.buf.put_u8(FLAG);
        self.write_buffered()?;
        self.last_was_flag = true;
        Ok(())
    }

    /// Write `payload` escaped, without flags.
    ///
    /// Calls may be repeated to stream one frame in pieces. The size limit
    /// is not enforced here.
    pub fn write_escaped(&mut self, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        self.buf.clear();
        encode_escaped(payload, &mut self.buf);
        self.write_buffered()?;
        self.last_was_flag = false;
        Ok(())
    }

    /// Abort the frame in progress. Does nothing right after a flag.
    pub fn abort(&mut self) -> Result<()> {
        if self.last_was_flag {
            return Ok(());
        }
        self.buf.clear();
        self.buf.put_u8(ABORT);
        self.write_buffered()?;
        debug!("frame aborted");
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum payload size for subsequent frame encoding.
    pub fn set_max_payload_size(&mut self, max_payload_size: usize) {
        self.config.max_payload_size = max_payload_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    fn write_buffered(&mut self) -> Result<()> {
        // a failed write leaves the wire state unknown; force a fresh flag
        self.last_was_flag = false;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }
}
