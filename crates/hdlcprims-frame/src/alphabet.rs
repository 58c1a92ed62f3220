//! Reserved byte alphabet.
//!
//! Three byte values are reserved on the wire and never appear unescaped
//! inside a frame body. A literal occurrence is sent as `ESC, byte ^ ESC_MASK`.

/// Escape prefix. The following byte has bit 5 flipped.
pub const ESC: u8 = 0x7D;

/// Frame delimiter. Also used as idle fill between frames.
pub const FLAG: u8 = 0x7E;

/// Aborts the frame in progress. The receiver discards it.
pub const ABORT: u8 = 0x7F;

/// Bit flipped on an escaped byte.
pub const ESC_MASK: u8 = 0x20;

/// Returns true if `byte` must be escaped inside a frame body.
#[inline]
pub fn is_reserved(byte: u8) -> bool {
    matches!(byte, ESC | FLAG | ABORT)
}

/// Returns a human-readable name for a byte, for logs and CLI output.
pub fn byte_name(byte: u8) -> &'static str {
    match byte {
        ESC => "ESC",
        FLAG => "FLAG",
        ABORT => "ABORT",
        _ => "DATA",
    }
}
