//! Stream frames through an in-memory pipe with the tokio codec.
//!
//! Run with:
//!   cargo run --example async-loopback --features async

use futures_util::{SinkExt, StreamExt};
use hdlcprims::frame::{framed_read, framed_write};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (client, server) = tokio::io::duplex(64);

    let writer = tokio::spawn(async move {
        let mut sink = framed_write(client);
        for message in ["ping", "\x7d\x7e\x7f", "pong"] {
            sink.send(message.as_bytes()).await?;
        }
        // the codec encodes both `&[u8]` and `Bytes`, so name the item type
        SinkExt::<&[u8]>::close(&mut sink).await?;
        Ok::<_, hdlcprims::FrameError>(())
    });

    let mut frames = framed_read(server);
    while let Some(frame) = frames.next().await {
        let frame = frame?;
        println!("received {} bytes: {:02x?}", frame.len(), frame.as_ref());
    }
    eprintln!("aborted frames: {}", frames.decoder().aborted());

    writer.await??;
    Ok(())
}
