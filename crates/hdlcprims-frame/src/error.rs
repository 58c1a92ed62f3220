/// Why the decoder gave up on a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum AbortReason {
    /// The sender transmitted an unescaped ABORT byte.
    #[error("frame aborted by sender")]
    Sender,

    /// The receive buffer has no room for the next byte or state marker.
    #[error("receive buffer exhausted")]
    BufferExhausted,

    /// The byte sequence cannot be produced by a conforming encoder.
    #[error("corrupt escape sequence")]
    Corruption,
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The frame in progress was dropped.
    #[error("frame aborted: {0}")]
    Aborted(#[from] AbortReason),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended (or refused writes) before a complete frame.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
