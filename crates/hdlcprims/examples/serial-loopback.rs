//! Loop frames through the byte-level state machines and over a socket pair.
//!
//! Run with:
//!   cargo run --example serial-loopback
//!
//! The socket pair half runs on unix only.

use hdlcprims::{Decoder, Encoder, Status, FLAG};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    byte_pump()?;
    #[cfg(unix)]
    socket_pair()?;
    Ok(())
}

/// Drive an encoder into a decoder one byte at a time, the way a UART
/// interrupt handler would.
fn byte_pump() -> Result<(), Box<dyn std::error::Error>> {
    let payload = *b"\x01\x7e\x02 hello \x7d\x7f";
    let mut xmit = payload;
    let mut encoder = Encoder::new(&mut xmit[..]);
    let mut decoder = Decoder::new(vec![0u8; payload.len() + 1]);

    let mut wire = vec![FLAG];
    let mut status = decoder.accept_byte(FLAG);
    while !status.is_terminal() {
        let byte = encoder.next_byte();
        wire.push(byte);
        status = decoder.accept_byte(byte);
    }

    eprintln!("wire: {}", hex::encode(&wire));
    if status != Status::Complete || decoder.frame() != payload {
        return Err(format!("byte pump ended with {status:?}").into());
    }
    eprintln!("decoded {} bytes", decoder.frame().len());
    Ok(())
}

#[cfg(unix)]
fn socket_pair() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::thread;

    use hdlcprims::{FrameReader, FrameWriter};

    let (tx, rx) = UnixStream::pair()?;

    let sender = thread::spawn(move || -> hdlcprims::frame::Result<()> {
        let mut writer = FrameWriter::new(tx);
        for message in ["first", "second with \x7e flag", "third"] {
            writer.send(message.as_bytes())?;
        }
        // a frame the receiver will see aborted
        writer.flag()?;
        writer.write_escaped(b"partial")?;
        writer.abort()?;
        writer.send(b"after abort")?;
        Ok(())
    });

    let mut reader = FrameReader::new(rx);
    loop {
        match reader.read_frame() {
            Ok(frame) => eprintln!("received {:?}", String::from_utf8_lossy(&frame)),
            Err(hdlcprims::FrameError::Aborted(reason)) => eprintln!("aborted: {reason}"),
            Err(hdlcprims::FrameError::ConnectionClosed) => break,
            Err(err) => return Err(err.into()),
        }
    }

    sender.join().map_err(|_| "sender panicked")??;
    Ok(())
}
