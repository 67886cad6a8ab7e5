use std::path::{Path, PathBuf};

use assert_cmd::Command;
use etherparse::PacketBuilder;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, diff};
use serde_json::Value;
use tempfile::TempDir;

const MIDI1: &str = "5642414e2e0000004d4944493100000000000000000000009b000000b00270";
const STREAM3_HEADER: &str = "5642414e0366010153747265616d33000000000000000000ef211d00";

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("vban"))
}

fn stdout_json(assert: &assert_cmd::assert::Assert) -> Value {
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    serde_json::from_str(&stdout).expect("valid json")
}

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("hex"))
        .collect()
}

fn udp_frame(src_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([192, 168, 1, 10], [192, 168, 1, 20], 64)
        .udp(src_port, 6980);
    let mut frame = Vec::<u8>::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).expect("frame");
    frame
}

/// Legacy PCAP (Ethernet) with two audio frames, one MIDI frame and,
/// optionally, one audio frame with a reserved sample rate index.
fn write_capture(dir: &Path, name: &str, with_bad_datagram: bool) -> PathBuf {
    let mut audio = hex_to_bytes(STREAM3_HEADER);
    audio.extend(std::iter::repeat_n(0u8, 412));
    let mut next = audio.clone();
    next[24] += 1;
    let mut frames = vec![
        udp_frame(6980, &audio),
        udp_frame(6980, &next),
        udp_frame(6981, &hex_to_bytes(MIDI1)),
    ];
    if with_bad_datagram {
        let mut bad = next.clone();
        bad[4] = 0x1f;
        frames.push(udp_frame(6980, &bad));
    }

    let mut out = Vec::new();
    out.extend_from_slice(&0xa1b2_c3d4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&0i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&65535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (i, frame) in frames.iter().enumerate() {
        out.extend_from_slice(&(1_700_000_000 + i as u32).to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }

    let path = dir.join(name);
    std::fs::write(&path, out).expect("write capture");
    path
}

#[test]
fn help_supports_analyse_and_analyze() {
    cmd()
        .arg("capture")
        .arg("analyse")
        .arg("--help")
        .assert()
        .success();
    cmd()
        .arg("capture")
        .arg("analyze")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn decode_prints_packet_json() {
    let assert = cmd().arg("decode").arg(MIDI1).assert().success();
    let json = stdout_json(&assert);
    assert_eq!(json["type"], "serial");
    assert_eq!(json["stream_name"], "MIDI1");
    assert_eq!(json["frame_counter"], 155);
    assert_eq!(json["bit_speed"], 115200);
}

#[test]
fn decode_joins_split_arguments() {
    let assert = cmd()
        .arg("decode")
        .arg("5642414e 2e000000")
        .arg("4d4944493100000000000000000000009b000000")
        .arg("b00270")
        .assert()
        .success();
    assert_eq!(stdout_json(&assert)["stream_name"], "MIDI1");
}

#[test]
fn decode_rejects_bad_magic() {
    cmd()
        .arg("decode")
        .arg(MIDI1.replacen("5642414e", "41424344", 1))
        .assert()
        .failure()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn decode_rejects_odd_hex() {
    cmd()
        .arg("decode")
        .arg("5642414")
        .assert()
        .failure()
        .stderr(contains("invalid hex input"));
}

#[test]
fn encode_reverses_decode() {
    let temp = TempDir::new().expect("tempdir");
    let decoded = cmd().arg("decode").arg(MIDI1).assert().success();
    let packet = temp.path().join("packet.json");
    std::fs::write(&packet, &decoded.get_output().stdout).expect("write json");

    cmd()
        .arg("encode")
        .arg(&packet)
        .assert()
        .success()
        .stdout(diff(format!("{MIDI1}\n")));
}

#[test]
fn encode_reads_stdin() {
    let decoded = cmd().arg("decode").arg(MIDI1).assert().success();
    cmd()
        .arg("encode")
        .arg("-")
        .write_stdin(decoded.get_output().stdout.clone())
        .assert()
        .success()
        .stdout(diff(format!("{MIDI1}\n")));
}

#[test]
fn encode_rejects_invalid_json() {
    cmd()
        .arg("encode")
        .arg("-")
        .write_stdin(r#"{"type": "audio"}"#)
        .assert()
        .failure()
        .stderr(contains("invalid packet JSON").and(contains("hint:")));
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn stdout_outputs_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);
    let assert = cmd()
        .arg("capture")
        .arg("analyse")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let json = stdout_json(&assert);
    assert_eq!(json["capture_summary"]["vban_datagrams"], 3);
    assert_eq!(json["streams"][0]["stream_name"], "MIDI1");
    assert_eq!(json["streams"][1]["stream_name"], "Stream3");
    assert_eq!(json["streams"][1]["packets"], 2);
}

#[test]
fn port_and_stream_filters() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);

    let by_port = cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("--stdout")
        .arg("--port")
        .arg("6981")
        .assert()
        .success();
    let json = stdout_json(&by_port);
    assert_eq!(json["capture_summary"]["packets_total"], 3);
    assert_eq!(json["capture_summary"]["vban_datagrams"], 1);
    assert_eq!(json["streams"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["streams"][0]["stream_name"], "MIDI1");

    let by_stream = cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("--stdout")
        .arg("--stream")
        .arg("Stream3")
        .assert()
        .success();
    let json = stdout_json(&by_stream);
    assert_eq!(json["streams"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["streams"][0]["stream_name"], "Stream3");
}

#[test]
fn report_file_and_quiet() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK: report written"));
    let json: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).expect("report")).expect("json");
    assert_eq!(json["tool"]["name"], "vban");

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);
    let report = temp.path().join("report.json");

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);

    cmd()
        .arg("capture")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_must_not_overwrite_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "session.pcap", false);

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .failure()
        .stderr(contains("report path must differ from input"));
}

#[test]
fn glob_must_match_one_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = write_capture(temp.path(), "a.pcap", false);
    let pattern = temp.path().join("*.pcap");

    let assert = cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&pattern)
        .arg("--stdout")
        .assert()
        .success();
    assert_eq!(
        stdout_json(&assert)["input"]["path"],
        input.display().to_string()
    );

    write_capture(temp.path(), "b.pcap", false);
    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(&pattern)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("multiple files match pattern"));
}

#[test]
fn strict_fails_on_decode_errors() {
    let temp = TempDir::new().expect("tempdir");
    let clean = write_capture(temp.path(), "clean.pcap", false);
    let broken = write_capture(temp.path(), "broken.pcap", true);

    cmd()
        .arg("capture")
        .arg("analyse")
        .arg(clean)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .success();

    let assert = cmd()
        .arg("capture")
        .arg("analyse")
        .arg(broken)
        .arg("--stdout")
        .arg("--strict")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("1 VBAN datagram(s) failed to decode"));
    let json = stdout_json(&assert);
    assert_eq!(json["decode_errors"][0]["kind"], "unknown-sample-rate");
}
