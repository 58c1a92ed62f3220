#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn hdlcprims(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hdlcprims"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("hdlcprims should run")
}

fn hdlcprims_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_hdlcprims"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("hdlcprims should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept bytes");

    child.wait_with_output().expect("hdlcprims should exit")
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "hdlccli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn encode_raw_writes_wire_bytes() {
    let output = hdlcprims(&["--format", "raw", "encode", "--hex", "017e02"]);

    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0x7E, 0x01, 0x7D, 0x5E, 0x02, 0x7E]);
}

#[test]
fn encode_json_reports_escapes() {
    let output = hdlcprims(&["--format", "json", "encode", "--hex", "017e02"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frame-encoded.schema.json"));
    assert!(stdout.contains("\"wire_hex\":\"7e017d5e027e\""));
    assert!(stdout.contains("\"escaped\":1"));
}

#[test]
fn encode_abort_after_ends_in_abort() {
    let output = hdlcprims(&[
        "--format",
        "raw",
        "encode",
        "--data",
        "hello",
        "--abort-after",
        "2",
    ]);

    assert!(output.status.success());
    assert_eq!(output.stdout, vec![0x7E, b'h', b'e', 0x7F]);
}

#[test]
fn encode_oversized_payload_fails() {
    let output = hdlcprims(&["encode", "--data", "hello", "--max-payload", "4"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("encode failed"));
}

#[test]
fn decode_reads_stdin() {
    let stream = [0x7E, 0x01, 0x7D, 0x5E, 0x02, 0x7E, b'o', b'k', 0x7E];
    let output = hdlcprims_with_stdin(&["--format", "json", "decode"], &stream);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"payload_hex\":\"017e02\""));
    assert!(lines[1].contains("\"payload\":\"ok\""));
    assert!(lines[1].contains("\"index\":1"));
}

#[test]
fn decode_reads_file() {
    let path = unique_temp_file("decode");
    std::fs::write(&path, [0x7E, b'h', b'i', 0x7E]).expect("stream file should be writable");

    let output = hdlcprims(&[
        "--format",
        "raw",
        "decode",
        "--file",
        path.to_str().expect("temp path should be utf-8"),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    assert_eq!(output.stdout, b"hi");
}

#[test]
fn decode_strict_fails_on_aborted_frame() {
    let output = hdlcprims(&["--format", "json", "decode", "--strict", "--hex", "7e017f7e027e"]);

    assert_eq!(output.status.code(), Some(60));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"payload_hex\":\"02\""));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 frame(s) aborted"));
}

#[test]
fn decode_strict_fails_on_truncated_stream() {
    let output = hdlcprims(&["--format", "json", "decode", "--strict", "--hex", "7e017e0203"]);

    assert_eq!(output.status.code(), Some(60));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"payload_hex\":\"01\""));
}

#[test]
fn encode_abort_after_respects_max_payload() {
    let output = hdlcprims(&[
        "encode",
        "--data",
        "hello",
        "--abort-after",
        "4",
        "--max-payload",
        "2",
    ]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn decode_lenient_skips_aborted_frame() {
    let output = hdlcprims(&["--format", "json", "decode", "--hex", "7e017f7e027e"]);
    assert!(output.status.success());
}

#[test]
fn decode_rejects_bad_hex() {
    let output = hdlcprims(&["decode", "--hex", "7e0"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn selftest_with_seed_passes() {
    let output = hdlcprims(&[
        "--format",
        "json",
        "selftest",
        "--size",
        "256",
        "--iterations",
        "8",
        "--seed",
        "42",
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("selftest.schema.json"));
    assert!(stdout.contains("\"passed\":true"));
    assert!(stdout.contains("\"seed\":42"));
    assert!(stdout.contains("\"mismatches\":0"));
}

#[test]
fn selftest_rejects_zero_size() {
    let output = hdlcprims(&["selftest", "--size", "0"]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn version_reports_name() {
    let output = hdlcprims(&["version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("hdlcprims "));
}
