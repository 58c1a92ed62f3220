use hdlcprims_frame::{FrameConfig, FrameError, FrameWriter};
use tracing::debug;

use crate::cmd::{parse_hex, read_input, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let config = FrameConfig {
        max_payload_size: args.max_payload,
    };

    let wire = match args.abort_after {
        Some(keep) => encode_aborted(&payload, keep, config),
        None => encode(&payload, config),
    }
    .map_err(|err| frame_error("encode failed", err))?;

    debug!(payload = payload.len(), wire = wire.len(), "encoded");
    print_encoded(payload.len(), &wire, format);
    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    read_input(args.file.as_deref())
}

fn encode(payload: &[u8], config: FrameConfig) -> hdlcprims_frame::Result<Vec<u8>> {
    let mut writer = FrameWriter::with_config(Vec::new(), config);
    writer.send(payload)?;
    Ok(writer.into_inner())
}

/// Open a frame, send part of it, then abort it.
fn encode_aborted(
    payload: &[u8],
    keep: usize,
    config: FrameConfig,
) -> hdlcprims_frame::Result<Vec<u8>> {
    let sent = &payload[..keep.min(payload.len())];
    if sent.len() > config.max_payload_size {
        return Err(FrameError::PayloadTooLarge {
            size: sent.len(),
            max: config.max_payload_size,
        });
    }

    let mut writer = FrameWriter::with_config(Vec::new(), config);
    writer.flag()?;
    writer.write_escaped(sent)?;
    writer.abort()?;
    Ok(writer.into_inner())
}
