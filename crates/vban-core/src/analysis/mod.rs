use std::fs::File;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::{debug, info};

use crate::protocols::vban::header::parse_header;
use crate::protocols::vban::layout;
use crate::protocols::vban::packet::{Packet, decode};
use crate::protocols::vban::service::ServicePacket;
use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, InputInfo, Report, make_stub_report};

mod devices;
mod errors;
mod streams;
mod udp;

use devices::DeviceTable;
use errors::ErrorTable;
use streams::StreamTable;
use udp::parse_udp_datagram;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Which datagrams the analysis looks at.
///
/// # Examples
/// ```
/// use vban_core::AnalysisOptions;
///
/// let options = AnalysisOptions {
///     port: Some(vban_core::DEFAULT_PORT),
///     streams: vec!["Stream1".to_string()],
/// };
/// assert!(options.accepts_stream("Stream1"));
/// assert!(!options.accepts_stream("Stream2"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    /// Only datagrams to or from this UDP port; any port when `None`.
    pub port: Option<u16>,
    /// Stream name allow-list; every stream when empty.
    pub streams: Vec<String>,
}

impl AnalysisOptions {
    pub fn accepts_stream(&self, name: &str) -> bool {
        self.streams.is_empty() || self.streams.iter().any(|allowed| allowed == name)
    }
}

pub fn analyze_pcap_file(path: &Path, options: &AnalysisOptions) -> Result<Report, AnalysisError> {
    let file = File::open(path)?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: file.metadata()?.len(),
    };
    let source = PcapFileSource::from_reader(file)?;
    analyze_source(input, source, options)
}

pub fn analyze_source<S: PacketSource>(
    input: InputInfo,
    mut source: S,
    options: &AnalysisOptions,
) -> Result<Report, AnalysisError> {
    let mut packets_total = 0u64;
    let mut udp_datagrams = 0u64;
    let mut vban_datagrams = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut streams = StreamTable::default();
    let mut devices = DeviceTable::default();
    let mut errors = ErrorTable::default();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        let udp = match parse_udp_datagram(linktype, &data) {
            Ok(Some(udp)) => udp,
            Ok(None) => continue,
            Err(err) => {
                debug!(error = %err, "skipping unparsable frame");
                continue;
            }
        };
        if options.port.is_some_and(|port| !udp.uses_port(port)) {
            continue;
        }
        udp_datagrams += 1;
        if !udp.payload.starts_with(layout::VBAN_ID) {
            continue;
        }
        vban_datagrams += 1;

        match decode(udp.payload) {
            Ok(packet) => {
                if !options.accepts_stream(packet.stream_name()) {
                    continue;
                }
                let payload_len = udp.payload.len().saturating_sub(layout::HEADER_LEN);
                streams.add_packet(&packet, udp.src, payload_len, ts);
                if let Packet::Service(ServicePacket::Ping(ping)) = &packet {
                    devices.add_ping(ping, udp.src);
                }
            }
            Err(err) => {
                let filtered_out = parse_header(udp.payload)
                    .is_ok_and(|header| !options.accepts_stream(&header.stream_name));
                if !filtered_out {
                    errors.add(&err, udp.src, ts);
                }
            }
        }
    }

    let mut report = make_stub_report(&input.path, input.bytes);
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        udp_datagrams,
        vban_datagrams,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    let decode_failures = errors.total();
    report.streams = streams.into_summaries();
    report.devices = devices.into_summaries();
    report.decode_errors = errors.into_summaries();
    info!(
        packets = packets_total,
        vban = vban_datagrams,
        streams = report.streams.len(),
        devices = report.devices.len(),
        decode_failures,
        "capture analysed"
    );
    Ok(report)
}

pub(crate) fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let Some(ts) = ts else {
        return;
    };
    if first.is_none_or(|existing| ts < existing) {
        *first = Some(ts);
    }
    if last.is_none_or(|existing| ts > existing) {
        *last = Some(ts);
    }
}

pub(crate) fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}

#[cfg(test)]
mod tests {
    use super::{AnalysisOptions, ts_to_rfc3339, update_ts_bounds};

    #[test]
    fn ts_bounds_track_extremes() {
        let mut first = None;
        let mut last = None;
        for ts in [Some(5.0), None, Some(2.0), Some(9.0)] {
            update_ts_bounds(&mut first, &mut last, ts);
        }
        assert_eq!(first, Some(2.0));
        assert_eq!(last, Some(9.0));
    }

    #[test]
    fn rfc3339_formatting() {
        assert!(ts_to_rfc3339(Some(1.5)).unwrap().starts_with("1970-01-01T00:00:01.5"));
        assert!(ts_to_rfc3339(None).is_none());
    }

    #[test]
    fn empty_allow_list_accepts_everything() {
        let options = AnalysisOptions::default();
        assert!(options.accepts_stream("anything"));
    }
}
