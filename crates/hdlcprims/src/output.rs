use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

const SCHEMA_BASE: &str = "https://schemas.3leaps.dev/hdlcprims/cli/v1";

/// Longest payload echoed in full by the table and pretty formats.
const PREVIEW_LIMIT: usize = 64;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    schema_id: String,
    index: usize,
    payload_size: usize,
    payload: String,
    payload_hex: String,
    timestamp: String,
}

pub fn print_frame(index: usize, payload: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                schema_id: format!("{SCHEMA_BASE}/frame-decoded.schema.json"),
                index,
                payload_size: payload.len(),
                payload: payload_preview(payload),
                payload_hex: hex::encode(payload),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FRAME", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    payload.len().to_string(),
                    payload_preview(payload),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} size={} payload={}",
                index,
                payload.len(),
                payload_preview(payload)
            );
        }
        OutputFormat::Raw => {
            print_raw(payload);
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput {
    schema_id: String,
    payload_size: usize,
    wire_size: usize,
    escaped: usize,
    wire_hex: String,
}

pub fn print_encoded(payload_size: usize, wire: &[u8], format: OutputFormat) {
    // body plus two flags; every escape adds one byte
    let escaped = wire.len().saturating_sub(payload_size + 2);
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                schema_id: format!("{SCHEMA_BASE}/frame-encoded.schema.json"),
                payload_size,
                wire_size: wire.len(),
                escaped,
                wire_hex: hex::encode(wire),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PAYLOAD", "WIRE", "ESCAPED", "BYTES"])
                .add_row(vec![
                    payload_size.to_string(),
                    wire.len().to_string(),
                    escaped.to_string(),
                    hex_preview(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "payload={} wire={} escaped={} bytes={}",
                payload_size,
                wire.len(),
                escaped,
                hex_preview(wire)
            );
        }
        OutputFormat::Raw => print_raw(wire),
    }
}

#[derive(Debug, Serialize)]
pub struct SelftestReport {
    pub size: usize,
    pub iterations: usize,
    pub seed: u64,
    pub escaped: usize,
    pub mismatches: usize,
    pub incomplete: usize,
}

impl SelftestReport {
    pub fn passed(&self) -> bool {
        self.mismatches == 0 && self.incomplete == 0
    }
}

#[derive(Serialize)]
struct SelftestOutput<'a> {
    schema_id: String,
    passed: bool,
    #[serde(flatten)]
    report: &'a SelftestReport,
}

pub fn print_selftest(report: &SelftestReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SelftestOutput {
                schema_id: format!("{SCHEMA_BASE}/selftest.schema.json"),
                passed: report.passed(),
                report,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "SIZE",
                    "ITERATIONS",
                    "SEED",
                    "ESCAPED",
                    "MISMATCHES",
                    "INCOMPLETE",
                    "RESULT",
                ])
                .add_row(vec![
                    report.size.to_string(),
                    report.iterations.to_string(),
                    report.seed.to_string(),
                    report.escaped.to_string(),
                    report.mismatches.to_string(),
                    report.incomplete.to_string(),
                    verdict(report).to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!(
                "{} size={} iterations={} seed={} escaped={} mismatches={} incomplete={}",
                verdict(report),
                report.size,
                report.iterations,
                report.seed,
                report.escaped,
                report.mismatches,
                report.incomplete
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn verdict(report: &SelftestReport) -> &'static str {
    if report.passed() {
        "ok"
    } else {
        "FAILED"
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if !text.chars().any(char::is_control) => text.to_string(),
        _ => hex_preview(payload),
    }
}

fn hex_preview(bytes: &[u8]) -> String {
    if bytes.len() <= PREVIEW_LIMIT {
        return hex::encode(bytes);
    }
    format!(
        "{}... ({} bytes)",
        hex::encode(&bytes[..PREVIEW_LIMIT]),
        bytes.len()
    )
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
