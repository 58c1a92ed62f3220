use crate::alphabet::{ABORT, ESC, ESC_MASK, FLAG};
use crate::error::AbortReason;

/// Decoder state, kept beside the output buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeState {
    /// Fresh frame, nothing accepted yet. Leading flags are absorbed here.
    #[default]
    Init,
    /// At least one byte accepted; the next FLAG completes the frame.
    Ready,
    /// The previous byte was ESC; the next byte is stored with bit 5 flipped.
    EscapePending,
    /// The frame was dropped. Every byte reports the same reason until
    /// [`Decoder::reset`].
    Aborted(AbortReason),
}

/// Outcome of feeding one byte to a [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The frame is not complete yet.
    Pending,
    /// A closing flag arrived. [`Decoder::frame`] holds the content.
    Complete,
    /// The frame was dropped. Resynchronize on the next FLAG.
    Aborted(AbortReason),
}

impl Status {
    /// True for [`Status::Complete`] and [`Status::Aborted`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Pending)
    }
}

/// Byte-at-a-time frame decoder appending into a caller-owned buffer.
///
/// The buffer must be one byte larger than the largest frame expected: the
/// slot under the cursor is reserved for the next byte, so a buffer of
/// capacity `n` holds at most `n - 1` content bytes. Filling the last slot
/// reports [`AbortReason::BufferExhausted`].
///
/// After [`Status::Complete`] or [`Status::Aborted`], call
/// [`reset`](Self::reset) before decoding the next frame. After an abort the
/// caller should also discard input until the next FLAG (see
/// [`Receiver`](crate::Receiver) for a wrapper that does this).
#[derive(Debug)]
pub struct Decoder<B> {
    buf: B,
    pos: usize,
    state: DecodeState,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Decoder<B> {
    /// Create a decoder with its cursor at the start of `buf`.
    pub fn new(buf: B) -> Self {
        Self {
            buf,
            pos: 0,
            state: DecodeState::Init,
        }
    }

    /// Feed one received byte.
    ///
    /// Once a frame aborts nothing more is stored; every later byte returns
    /// the same [`Status::Aborted`] until [`reset`](Self::reset).
    pub fn accept_byte(&mut self, val: u8) -> Status {
        if let DecodeState::Aborted(reason) = self.state {
            return Status::Aborted(reason);
        }

        let buf = self.buf.as_mut();
        let end = buf.len();
        if self.pos == end {
            return latch(&mut self.state, AbortReason::BufferExhausted);
        }

        let byte = match self.state {
            DecodeState::EscapePending => match val {
                ESC => return latch(&mut self.state, AbortReason::Corruption),
                ABORT => return latch(&mut self.state, AbortReason::Sender),
                _ => val ^ ESC_MASK,
            },
            DecodeState::Init | DecodeState::Ready => match val {
                FLAG if self.state == DecodeState::Init => return Status::Pending,
                FLAG => return Status::Complete,
                ABORT => return latch(&mut self.state, AbortReason::Sender),
                ESC => {
                    self.state = DecodeState::EscapePending;
                    return Status::Pending;
                }
                _ => val,
            },
            DecodeState::Aborted(reason) => return Status::Aborted(reason),
        };

        buf[self.pos] = byte;
        self.pos += 1;

        // no room left for the next byte
        if self.pos == end {
            return latch(&mut self.state, AbortReason::BufferExhausted);
        }

        self.state = DecodeState::Ready;
        Status::Pending
    }

    /// Content decoded so far.
    pub fn frame(&self) -> &[u8] {
        &self.buf.as_ref()[..self.pos]
    }

    /// Cursor position: number of content bytes stored.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer size, including the reserved slot.
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Current state.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True once the frame has aborted and before [`reset`](Self::reset).
    pub fn is_aborted(&self) -> bool {
        matches!(self.state, DecodeState::Aborted(_))
    }

    /// True if the cursor has reached the end of the buffer.
    ///
    /// After an abort this tells buffer exhaustion apart from a sender abort.
    pub fn is_exhausted(&self) -> bool {
        self.pos == self.capacity()
    }

    /// Rewind to an empty frame in the initial state.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.state = DecodeState::Init;
    }

    /// Borrow the underlying buffer.
    pub fn get_ref(&self) -> &B {
        &self.buf
    }

    /// Consume the decoder and return the buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }
}

fn latch(state: &mut DecodeState, reason: AbortReason) -> Status {
    *state = DecodeState::Aborted(reason);
    Status::Aborted(reason)
}
