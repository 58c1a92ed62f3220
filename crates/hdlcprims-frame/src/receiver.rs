//! Receive-side frame assembly with resynchronization.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::alphabet::{byte_name, FLAG};
use crate::decoder::{DecodeState, Decoder, Status};
use crate::error::AbortReason;

/// Something the receiver finished with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// A complete frame.
    Frame(Bytes),
    /// A frame was dropped; the receiver is hunting for the next FLAG.
    Aborted(AbortReason),
}

/// Drives a [`Decoder`] over an owned buffer and applies the resync policy.
///
/// Bytes are discarded until a FLAG is seen. From there each byte goes to the
/// decoder. A completed frame's closing flag doubles as the next opening
/// flag. After an abort the receiver drops back to hunting for a FLAG.
#[derive(Debug)]
pub struct Receiver {
    decoder: Decoder<Vec<u8>>,
    synced: bool,
    discarded: u64,
}

impl Receiver {
    /// Create a receiver accepting frames of up to `max_payload` bytes.
    pub fn new(max_payload: usize) -> Self {
        Self {
            decoder: Decoder::new(decode_buffer(max_payload)),
            synced: false,
            discarded: 0,
        }
    }

    /// Feed one byte from the transport.
    pub fn accept(&mut self, byte: u8) -> Option<Received> {
        if !self.synced {
            if byte == FLAG {
                debug!(discarded = self.discarded, "synchronized on flag");
                self.synced = true;
                self.decoder.reset();
            } else {
                self.discarded += 1;
            }
            return None;
        }

        match self.decoder.accept_byte(byte) {
            Status::Pending => None,
            Status::Complete => {
                let frame = Bytes::copy_from_slice(self.decoder.frame());
                debug!(len = frame.len(), "frame complete");
                self.decoder.reset();
                Some(Received::Frame(frame))
            }
            Status::Aborted(reason) => {
                warn!(
                    %reason,
                    trigger = byte_name(byte),
                    partial = self.decoder.position(),
                    "frame aborted"
                );
                self.resync();
                Some(Received::Aborted(reason))
            }
        }
    }

    /// Drop any partial frame and hunt for the next FLAG.
    pub fn resync(&mut self) {
        self.synced = false;
        self.decoder.reset();
    }

    /// Forget all progress, including the flag sync and discard counter.
    pub fn reset(&mut self) {
        self.resync();
        self.discarded = 0;
    }

    /// True once a FLAG has been seen since the last abort.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// True if part of a frame has been received.
    pub fn is_mid_frame(&self) -> bool {
        self.synced
            && matches!(
                self.decoder.state(),
                DecodeState::Ready | DecodeState::EscapePending
            )
    }

    /// Total bytes discarded while hunting for a FLAG.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Largest frame this receiver accepts.
    pub fn max_payload(&self) -> usize {
        self.decoder.capacity().saturating_sub(1)
    }

    /// Change the frame size limit. Drops any partial frame.
    pub fn set_max_payload(&mut self, max_payload: usize) {
        self.decoder = Decoder::new(decode_buffer(max_payload));
    }
}

fn decode_buffer(max_payload: usize) -> Vec<u8> {
    vec![0; max_payload.saturating_add(1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{ABORT, ESC};

    fn feed_all(rx: &mut Receiver, bytes: &[u8]) -> Vec<Received> {
        bytes.iter().filter_map(|b| rx.accept(*b)).collect()
    }

    #[test]
    fn discards_until_first_flag() {
        let mut rx = Receiver::new(16);
        let out = feed_all(&mut rx, &[1, 2, 3, FLAG, 4, FLAG]);
        assert_eq!(out, vec![Received::Frame(Bytes::from_static(&[4]))]);
        assert_eq!(rx.discarded(), 3);
    }

    #[test]
    fn closing_flag_opens_next_frame() {
        let mut rx = Receiver::new(16);
        let out = feed_all(&mut rx, &[FLAG, 1, FLAG, 2, ESC, 0x5D, FLAG]);
        assert_eq!(
            out,
            vec![
                Received::Frame(Bytes::from_static(&[1])),
                Received::Frame(Bytes::from_static(&[2, ESC])),
            ]
        );
    }

    #[test]
    fn abort_then_resync() {
        let mut rx = Receiver::new(16);
        let out = feed_all(&mut rx, &[FLAG, 1, 2, ABORT, 9, 9, FLAG, 3, FLAG]);
        assert_eq!(
            out,
            vec![
                Received::Aborted(AbortReason::Sender),
                Received::Frame(Bytes::from_static(&[3])),
            ]
        );
        assert_eq!(rx.discarded(), 2);
    }

    #[test]
    fn oversized_frame_is_dropped() {
        let mut rx = Receiver::new(2);
        let out = feed_all(&mut rx, &[FLAG, 1, 2, 3, 4, FLAG, 5, FLAG]);
        assert_eq!(
            out,
            vec![
                Received::Aborted(AbortReason::BufferExhausted),
                Received::Frame(Bytes::from_static(&[5])),
            ]
        );
    }

    #[test]
    fn mid_frame_tracking() {
        let mut rx = Receiver::new(8);
        assert!(!rx.is_mid_frame());
        rx.accept(FLAG);
        assert!(rx.is_synced());
        assert!(!rx.is_mid_frame());
        rx.accept(ESC);
        assert!(rx.is_mid_frame());
        rx.resync();
        assert!(!rx.is_synced());
    }

    #[test]
    fn max_payload_update() {
        let mut rx = Receiver::new(4);
        assert_eq!(rx.max_payload(), 4);
        rx.set_max_payload(1);
        let out = feed_all(&mut rx, &[FLAG, 1, 2, FLAG, 7, FLAG]);
        assert_eq!(
            out,
            vec![
                Received::Aborted(AbortReason::BufferExhausted),
                Received::Frame(Bytes::from_static(&[7])),
            ]
        );
    }
}
