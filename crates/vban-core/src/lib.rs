//! VBAN wire protocol codec and offline capture analysis.
//!
//! The codec (`protocols::vban`) turns raw datagrams into typed packets and
//! back: a fixed 28-byte header, a sub-protocol tag selecting audio, serial,
//! text or service semantics for three generic header bytes, and a payload
//! of at most 1436 bytes. Decoding an encoded packet gives back the same
//! packet; encoding a captured datagram gives back the same bytes.
//!
//! Codec calls are pure functions: no I/O, no logging, no shared state.
//! Frame counter bookkeeping lives in caller-owned objects
//! ([`FrameCounterTracker`], [`FrameCounters`]).
//!
//! On top of the codec, the analysis pipeline reads PCAP/PCAPNG captures
//! (`source`), extracts UDP datagrams, decodes the VBAN ones and aggregates
//! them into a deterministic [`Report`].
//!
//! Invariants:
//! - `encode` is all-or-nothing; no partial datagram is ever returned.
//! - Unknown sub-protocols and service types decode to [`UnknownPacket`].
//! - Report ordering is stable across runs.
//!
//! # Examples
//! ```
//! use vban_core::{Packet, TextContent, parse_hex};
//!
//! let bytes = parse_hex(
//!     "5642414e52000010436f6d6d616e64310000000000000000180000006d79207465737420746578743b",
//! )?;
//! let Packet::Text(text) = vban_core::decode(&bytes)? else {
//!     panic!("not a text packet");
//! };
//! assert_eq!(text.stream_name, "Command1");
//! assert_eq!(text.content, TextContent::Text("my test text;".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ```no_run
//! use std::path::Path;
//!
//! use vban_core::{AnalysisOptions, analyze_pcap_file};
//!
//! let report = analyze_pcap_file(Path::new("capture.pcapng"), &AnalysisOptions::default())?;
//! println!("{} streams", report.streams.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::{AnalysisError, AnalysisOptions, analyze_pcap_file, analyze_source};
pub use protocols::common::{HexError, hex_dump, parse_hex, to_hex};
pub use protocols::vban::layout::{
    DEFAULT_PORT, HEADER_LEN, MAX_DATAGRAM_LEN, MAX_FRAME_COUNTER, MAX_PAYLOAD_LEN,
    SERVICE_STREAM_NAME,
};
pub use protocols::vban::*;
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Aggregated capture report with deterministic ordering.
///
/// # Examples
/// ```
/// use vban_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, vban_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the report (last capture timestamp when known).
    pub generated_at: String,
    pub input: InputInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Streams ordered by name, sub-protocol and source.
    pub streams: Vec<StreamSummary>,
    /// Devices that answered or sent identification pings.
    pub devices: Vec<DeviceSummary>,
    /// Decode failures grouped by error kind.
    pub decode_errors: Vec<DecodeErrorSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture-wide counters (timestamps may be absent).
///
/// # Examples
/// ```
/// use vban_core::CaptureSummary;
///
/// let summary = CaptureSummary {
///     packets_total: 10,
///     udp_datagrams: 8,
///     vban_datagrams: 6,
///     time_start: None,
///     time_end: None,
/// };
/// assert_eq!(summary.packets_total, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Frames read from the capture.
    pub packets_total: u64,
    /// UDP datagrams matching the port filter.
    pub udp_datagrams: u64,
    /// Datagrams carrying the VBAN identification.
    pub vban_datagrams: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Per-stream metrics, keyed by stream name, sub-protocol and source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSummary {
    pub stream_name: String,
    /// `audio`, `serial`, `text`, `service` or `unknown`.
    pub sub_protocol: String,
    /// Source endpoint in `ip:port` form.
    pub source: String,
    pub packets: u64,
    /// Payload bytes, headers excluded.
    pub bytes: u64,
    /// Last audio sample rate seen, in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_resolution: Option<String>,
    /// Last serial or text bit speed seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_speed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_encoding: Option<String>,
    /// Service types seen, sorted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<String>,
    /// Jumps in the frame counter.
    pub frame_gaps: u64,
    /// Frames missing across all gaps.
    pub frames_lost: u64,
    pub frames_reordered: u64,
    pub frames_duplicated: u64,
}

/// Device identity from an identification packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSummary {
    /// Source endpoint in `ip:port` form.
    pub source: String,
    pub application_type: String,
    pub application_name: String,
    pub device_name: String,
    pub manufacturer_name: String,
    pub hostname: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,
    pub features: Vec<String>,
    /// Number of identification packets from this device.
    pub pings: u64,
    /// Whether any of them was a reply.
    pub replied: bool,
}

/// Decode failures sharing one error kind.
///
/// # Examples
/// ```
/// use vban_core::DecodeErrorSummary;
///
/// let summary = DecodeErrorSummary {
///     kind: "unknown-sample-rate".to_string(),
///     count: 2,
///     examples: vec!["10.0.0.1:6980 @ 1970-01-01T00:00:00Z: unknown sample rate (index 25)".to_string()],
/// };
/// assert_eq!(summary.count, 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodeErrorSummary {
    /// Stable error identifier (e.g. `invalid-header`).
    pub kind: String,
    pub count: u64,
    /// At most three examples, formatted as `source @ ts: message`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use vban_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert!(report.streams.is_empty());
/// assert_eq!(report.input.bytes, 123);
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "vban".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        streams: vec![],
        devices: vec![],
        decode_errors: vec![],
    }
}
