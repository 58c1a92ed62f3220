use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use hdlcprims_frame::DEFAULT_MAX_PAYLOAD;

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod selftest;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Frame a payload for transmission.
    Encode(EncodeArgs),
    /// Unframe a byte stream and print each frame.
    Decode(DecodeArgs),
    /// Round-trip random frames through the encoder and decoder.
    Selftest(SelftestArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Selftest(args) => selftest::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["file", "hex"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["data", "hex"])]
    pub file: Option<PathBuf>,
    /// Hex-encoded payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub hex: Option<String>,
    /// Send only the first N payload bytes, then ABORT the frame.
    #[arg(long, value_name = "N")]
    pub abort_after: Option<usize>,
    /// Reject payloads larger than this many bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Read the byte stream from file (default: stdin).
    #[arg(long, conflicts_with = "hex")]
    pub file: Option<PathBuf>,
    /// Hex-encoded byte stream.
    #[arg(long, conflicts_with = "file")]
    pub hex: Option<String>,
    /// Exit after decoding N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Exit with an error if any frame was aborted.
    #[arg(long)]
    pub strict: bool,
    /// Drop frames larger than this many bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct SelftestArgs {
    /// Frame size in bytes.
    #[arg(long, default_value = "800")]
    pub size: usize,
    /// Number of random frames to round-trip.
    #[arg(long, default_value = "1")]
    pub iterations: usize,
    /// RNG seed (default: random).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Read a file, or stdin when no path is given.
pub(crate) fn read_input(path: Option<&Path>) -> CliResult<Vec<u8>> {
    match path {
        Some(path) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}

pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).map_err(|err| CliError::new(USAGE, format!("--hex is not valid hex: {err}")))
}
