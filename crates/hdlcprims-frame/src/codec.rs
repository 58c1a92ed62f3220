use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::alphabet::{is_reserved, ESC, ESC_MASK, FLAG};
use crate::decoder::{Decoder, Status};
use crate::error::{FrameError, Result};

/// Default maximum payload size: 64 KiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 64 * 1024;

/// Exact wire size of `payload` framed by [`encode_frame`].
pub fn encoded_len(payload: &[u8]) -> usize {
    let escapes = payload.iter().filter(|b| is_reserved(**b)).count();
    payload.len() + escapes + 2
}

/// Append the escaped body of `payload` to `dst`, without flags.
///
/// Unlike [`Encoder`](crate::Encoder) this leaves `payload` untouched.
pub fn encode_escaped(payload: &[u8], dst: &mut BytesMut) {
    let mut rest = payload;
    while let Some(idx) = rest.iter().position(|b| is_reserved(*b)) {
        dst.put_slice(&rest[..idx]);
        dst.put_u8(ESC);
        dst.put_u8(rest[idx] ^ ESC_MASK);
        rest = &rest[idx + 1..];
    }
    dst.put_slice(rest);
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────────────────────────────────┬──────┐
/// │ FLAG │ payload, with 0x7D/0x7E/0x7F     │ FLAG │
/// │ 0x7E │ sent as 0x7D, (byte ^ 0x20)      │ 0x7E │
/// └──────┴──────────────────────────────────┴──────┘
/// ```
pub fn encode_frame(payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    dst.reserve(encoded_len(payload));
    dst.put_u8(FLAG);
    encode_escaped(payload, dst);
    dst.put_u8(FLAG);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Bytes ahead of the first FLAG are discarded, and a run of idle-fill flags
/// is collapsed to the last one. Returns `Ok(None)` if the buffer doesn't
/// contain a complete frame yet. On success, consumes the frame bytes but
/// leaves the closing FLAG in place to open the next frame.
///
/// An aborted or oversized frame is consumed and reported as
/// [`FrameError::Aborted`]; call again to continue with the next frame.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Bytes>> {
    let Some(start) = src.iter().position(|b| *b == FLAG) else {
        src.clear();
        return Ok(None); // Need more data
    };
    src.advance(start);

    let flags = src.iter().take_while(|b| **b == FLAG).count();
    src.advance(flags - 1);

    // a complete frame in `src` holds fewer than `src.len()` content bytes
    let capacity = max_payload.min(src.len()).saturating_add(1);
    let mut decoder = Decoder::new(vec![0u8; capacity]);
    let terminal = src.iter().enumerate().skip(1).find_map(|(idx, byte)| {
        let status = decoder.accept_byte(*byte);
        status.is_terminal().then_some((idx, status))
    });

    match terminal {
        Some((idx, Status::Complete)) => {
            let frame = Bytes::copy_from_slice(decoder.frame());
            src.advance(idx);
            Ok(Some(frame))
        }
        Some((idx, Status::Aborted(reason))) => {
            src.advance(idx + 1);
            Err(FrameError::Aborted(reason))
        }
        _ => Ok(None), // Need more data
    }
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 64 KiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
