use std::io::Read;

use hdlcprims_frame::{FrameConfig, FrameError, FrameReader};
use tracing::{debug, info, warn};

use crate::cmd::{parse_hex, read_input, DecodeArgs};
use crate::exit::{frame_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let stream = match &args.hex {
        Some(hex) => parse_hex(hex)?,
        None => read_input(args.file.as_deref())?,
    };
    let config = FrameConfig {
        max_payload_size: args.max_payload,
    };

    let mut reader = FrameReader::with_config(stream.as_slice(), config);
    let summary = decode_stream(&mut reader, args.count, |index, payload| {
        print_frame(index, payload, format)
    })?;

    info!(
        frames = summary.frames,
        aborted = summary.aborted,
        discarded = reader.discarded(),
        "decode finished"
    );

    if args.strict && summary.aborted > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{} frame(s) aborted", summary.aborted),
        ));
    }
    Ok(SUCCESS)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct DecodeSummary {
    frames: usize,
    aborted: usize,
}

fn decode_stream<R: Read>(
    reader: &mut FrameReader<R>,
    limit: Option<usize>,
    mut emit: impl FnMut(usize, &[u8]),
) -> CliResult<DecodeSummary> {
    let mut summary = DecodeSummary::default();

    while limit.is_none_or(|limit| summary.frames < limit) {
        match reader.read_frame() {
            Ok(frame) => {
                emit(summary.frames, frame.as_ref());
                summary.frames += 1;
            }
            Err(FrameError::Aborted(reason)) => {
                debug!(%reason, "skipping aborted frame");
                summary.aborted += 1;
            }
            Err(FrameError::ConnectionClosed) => {
                if reader.is_mid_frame() {
                    warn!("stream ended mid-frame");
                    summary.aborted += 1;
                }
                break;
            }
            Err(err) => return Err(frame_error("decode failed", err)),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdlcprims_frame::{ABORT, ESC, FLAG};

    fn collect(stream: &[u8], limit: Option<usize>) -> (DecodeSummary, Vec<Vec<u8>>) {
        let mut reader = FrameReader::new(stream);
        let mut frames = Vec::new();
        let summary = decode_stream(&mut reader, limit, |_, payload| frames.push(payload.to_vec()))
            .unwrap();
        (summary, frames)
    }

    #[test]
    fn decodes_frames_and_counts_aborts() {
        let stream = [FLAG, 0x01, ESC, 0x5E, 0x02, FLAG, 0x03, ABORT, FLAG, 0x04, FLAG];
        let (summary, frames) = collect(&stream, None);

        assert_eq!(
            summary,
            DecodeSummary {
                frames: 2,
                aborted: 1
            }
        );
        assert_eq!(frames, vec![vec![0x01, 0x7E, 0x02], vec![0x04]]);
    }

    #[test]
    fn stops_after_count() {
        let stream = [FLAG, 1, FLAG, 2, FLAG, 3, FLAG];
        let (summary, frames) = collect(&stream, Some(2));
        assert_eq!(summary.frames, 2);
        assert_eq!(frames, vec![vec![1], vec![2]]);
    }

    #[test]
    fn trailing_partial_frame_counts_as_aborted() {
        let stream = [FLAG, 1, FLAG, 2, 3];
        let (summary, frames) = collect(&stream, None);
        assert_eq!(
            summary,
            DecodeSummary {
                frames: 1,
                aborted: 1
            }
        );
        assert_eq!(frames, vec![vec![1]]);
    }

    #[test]
    fn stream_ending_on_flag_is_clean() {
        let stream = [FLAG, 1, FLAG, FLAG];
        let (summary, _) = collect(&stream, None);
        assert_eq!(
            summary,
            DecodeSummary {
                frames: 1,
                aborted: 0
            }
        );
    }
}
