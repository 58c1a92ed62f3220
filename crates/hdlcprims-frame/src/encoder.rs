use std::iter::FusedIterator;

use crate::alphabet::{is_reserved, ESC, ESC_MASK, FLAG};

/// Byte-at-a-time frame encoder over a caller-owned buffer.
///
/// The encoder **rewrites the buffer in place**: when the byte at the cursor
/// is reserved, it is replaced by `byte ^ ESC_MASK` and [`ESC`] is emitted.
/// The next call emits the rewritten byte. Because of this, a buffer can be
/// encoded exactly once. The encoder has no rewind, and
/// [`into_inner`](Self::into_inner) returns the rewritten buffer, not the
/// original content.
///
/// Start a transmission by sending [`FLAG`], then call
/// [`next_byte`](Self::next_byte) until it returns [`FLAG`] again. The closing
/// flag may double as the opening flag of the next frame and may be repeated
/// as idle fill. To abandon a partially sent frame, send
/// [`ABORT`](crate::ABORT) instead.
///
/// ```
/// use hdlcprims_frame::{Encoder, ESC, FLAG};
///
/// let mut raw = [0x01, 0x7E, 0x02];
/// let mut enc = Encoder::new(&mut raw[..]);
/// let wire: Vec<u8> = std::iter::from_fn(|| Some(enc.next_byte()))
///     .take_while(|b| *b != FLAG)
///     .collect();
/// assert_eq!(wire, [0x01, ESC, 0x5E, 0x02]);
/// assert_eq!(raw, [0x01, 0x5E, 0x02]);
/// ```
#[derive(Debug)]
pub struct Encoder<B> {
    buf: B,
    pos: usize,
    closed: bool,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Encoder<B> {
    /// Create an encoder with its cursor at the start of `buf`.
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            pos: 0,
            closed: false,
        }
    }

    /// Produce the next byte to transmit.
    ///
    /// Returns [`FLAG`] once the cursor reaches the end of the buffer, and
    /// keeps returning it on every later call. May rewrite the byte at the
    /// current position (see the type-level docs).
    pub fn next_byte(&mut self) -> u8 {
        let Some(slot) = self.buf.as_mut().get_mut(self.pos) else {
            return FLAG;
        };

        let byte = *slot;
        if is_reserved(byte) {
            *slot = byte ^ ESC_MASK;
            return ESC;
        }

        self.pos += 1;
        byte
    }

    /// Cursor position: number of frame bytes fully emitted.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the frame being encoded.
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// True if the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once every frame byte has been emitted.
    pub fn is_finished(&self) -> bool {
        self.pos == self.len()
    }

    /// Borrow the buffer, including any bytes already rewritten.
    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    /// Consume the encoder and return the (rewritten) buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }
}

/// Yields the encoded body followed by a single closing [`FLAG`], then ends.
///
/// The opening flag is not included.
impl<B: AsRef<[u8]> + AsMut<[u8]>> Iterator for Encoder<B> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.closed {
            return None;
        }
        let byte = self.next_byte();
        if byte == FLAG {
            self.closed = true;
        }
        Some(byte)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> FusedIterator for Encoder<B> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ABORT;

    #[test]
    fn empty_frame_yields_flag_immediately() {
        let mut enc = Encoder::new(Vec::new());
        assert_eq!(enc.next_byte(), FLAG);
        assert_eq!(enc.next_byte(), FLAG);
        assert_eq!(enc.position(), 0);
        assert!(enc.is_finished());
    }

    #[test]
    fn plain_bytes_pass_through() {
        let mut raw = *b"abc";
        let mut enc = Encoder::new(&mut raw[..]);

        assert_eq!(enc.next_byte(), b'a');
        assert_eq!(enc.next_byte(), b'b');
        assert_eq!(enc.next_byte(), b'c');
        assert_eq!(enc.next_byte(), FLAG);
        assert_eq!(raw, *b"abc");
    }

    #[test]
    fn reserved_byte_escapes_without_advancing() {
        let mut raw = [ABORT];
        let mut enc = Encoder::new(&mut raw[..]);

        assert_eq!(enc.next_byte(), ESC);
        assert_eq!(enc.position(), 0);
        assert_eq!(enc.get_ref()[0], 0x5F);

        assert_eq!(enc.next_byte(), 0x5F);
        assert_eq!(enc.position(), 1);
        assert_eq!(enc.next_byte(), FLAG);
    }

    #[test]
    fn every_reserved_byte_becomes_two_bytes() {
        for b in [ESC, FLAG, ABORT] {
            let wire: Vec<u8> = Encoder::new(vec![b]).collect();
            assert_eq!(wire, vec![ESC, b ^ ESC_MASK, FLAG], "byte {b:#04x}");
        }
    }

    #[test]
    fn second_pass_over_same_buffer_differs() {
        let mut raw = [0x7D, 0x10];
        let first: Vec<u8> = Encoder::new(&mut raw[..]).collect();
        let second: Vec<u8> = Encoder::new(&mut raw[..]).collect();

        assert_eq!(first, vec![ESC, 0x5D, 0x10, FLAG]);
        assert_eq!(second, vec![0x5D, 0x10, FLAG]);
    }

    #[test]
    fn iterator_stops_after_closing_flag() {
        let mut enc = Encoder::new(vec![1, 2]);
        assert_eq!(enc.by_ref().count(), 3);
        assert_eq!(enc.next(), None);
        assert_eq!(enc.next_byte(), FLAG);
    }

    #[test]
    fn into_inner_returns_rewritten_buffer() {
        let mut enc = Encoder::new(vec![FLAG, 0x00]);
        let _ = enc.next_byte();
        assert_eq!(enc.into_inner(), vec![0x5E, 0x00]);
    }
}
