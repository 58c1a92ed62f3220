//! HDLC-style byte-stuffing framing for serial byte streams.
//!
//! Frames are delimited by FLAG (0x7E). Inside a frame, the reserved bytes
//! ESC (0x7D), FLAG and ABORT (0x7F) are sent as `ESC, byte ^ 0x20`. An
//! unescaped ABORT drops the frame in progress, and idle time may be filled
//! with FLAG bytes. There is no addressing and no CRC: add those to the
//! payload if you need them.
//!
//! Layers, bottom up:
//! - [`Encoder`] / [`Decoder`]: byte-at-a-time state machines over
//!   caller-owned buffers. No allocation, no I/O.
//! - [`Receiver`]: a decoder plus the resync-on-FLAG policy.
//! - [`encode_frame`] / [`decode_frame`]: whole frames in and out of `BytesMut`.
//! - [`FrameWriter`] / [`FrameReader`]: blocking `Write` / `Read` adapters.
//! - `HdlcCodec`: `tokio_util::codec` adapter (behind the `async` feature).

pub mod alphabet;
pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod reader;
pub mod receiver;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use alphabet::{is_reserved, ABORT, ESC, ESC_MASK, FLAG};
pub use codec::{
    decode_frame, encode_escaped, encode_frame, encoded_len, FrameConfig, DEFAULT_MAX_PAYLOAD,
};
pub use decoder::{DecodeState, Decoder, Status};
pub use encoder::Encoder;
pub use error::{AbortReason, FrameError, Result};
pub use reader::FrameReader;
pub use receiver::{Received, Receiver};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::{framed_read, framed_write, HdlcCodec};
