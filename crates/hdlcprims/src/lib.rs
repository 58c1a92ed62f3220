//! HDLC-style framing for serial byte streams.
//!
//! hdlcprims delimits frames with FLAG bytes and escapes the reserved bytes
//! inside them, so binary payloads survive a plain byte stream such as a UART.
//! It does not add addresses, checksums or retransmission.
//!
//! # Crate Structure
//!
//! - [`frame`]: encoder/decoder state machines, slice codec, blocking
//!   reader/writer, and the `tokio_util` codec (behind the `async` feature)
//!
//! The most used types are also re-exported at the crate root.

/// Re-export frame types.
pub mod frame {
    pub use hdlcprims_frame::*;
}

pub use hdlcprims_frame::{
    AbortReason, Decoder, Encoder, FrameError, FrameReader, FrameWriter, Status, ABORT, ESC, FLAG,
};
