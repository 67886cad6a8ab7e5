use std::collections::{BTreeSet, HashMap};
use std::net::SocketAddr;

use tracing::debug;

use crate::StreamSummary;
use crate::protocols::vban::frame_counter::{FrameCounterEvent, FrameCounterTracker};
use crate::protocols::vban::header::SubProtocol;
use crate::protocols::vban::packet::Packet;

use super::{ts_to_rfc3339, update_ts_bounds};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct StreamKey {
    pub name: String,
    pub sub_protocol: SubProtocol,
    pub source: SocketAddr,
}

#[derive(Debug, Default)]
pub(crate) struct StreamStats {
    pub packets: u64,
    pub bytes: u64,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub bit_resolution: Option<String>,
    pub bit_speed: Option<u32>,
    pub text_encoding: Option<String>,
    pub services: BTreeSet<&'static str>,
    pub first_ts: Option<f64>,
    pub last_ts: Option<f64>,
    pub frame_gaps: u64,
    pub frames_lost: u64,
    pub frames_reordered: u64,
    pub frames_duplicated: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StreamTable {
    stats: HashMap<StreamKey, StreamStats>,
    counters: FrameCounterTracker<StreamKey>,
}

impl StreamTable {
    pub fn add_packet(&mut self, packet: &Packet, source: SocketAddr, payload_len: usize, ts: Option<f64>) {
        let key = StreamKey {
            name: packet.stream_name().to_string(),
            sub_protocol: packet.sub_protocol(),
            source,
        };
        let event = self.counters.observe(key.clone(), packet.frame_counter());
        let entry = self.stats.entry(key.clone()).or_default();
        entry.packets += 1;
        entry.bytes += payload_len as u64;
        update_ts_bounds(&mut entry.first_ts, &mut entry.last_ts, ts);
        record_counter_event(entry, &key, event);

        match packet {
            Packet::Audio(audio) => {
                entry.sample_rate = Some(audio.sample_rate);
                entry.channels = Some(audio.channels);
                entry.bit_resolution = Some(audio.bit_resolution.to_string());
            }
            Packet::Serial(serial) => entry.bit_speed = Some(serial.bit_speed),
            Packet::Text(text) => {
                entry.bit_speed = Some(text.bit_speed);
                entry.text_encoding = Some(text.encoding.to_string());
            }
            Packet::Service(service) => {
                entry.services.insert(service.service_type().name());
            }
            Packet::Unknown(_) => {}
        }
    }

    pub fn into_summaries(self) -> Vec<StreamSummary> {
        let mut entries: Vec<_> = self.stats.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
            .into_iter()
            .map(|(key, stats)| StreamSummary {
                stream_name: key.name,
                sub_protocol: key.sub_protocol.name().to_string(),
                source: key.source.to_string(),
                packets: stats.packets,
                bytes: stats.bytes,
                sample_rate: stats.sample_rate,
                channels: stats.channels,
                bit_resolution: stats.bit_resolution,
                bit_speed: stats.bit_speed,
                text_encoding: stats.text_encoding,
                services: stats.services.into_iter().map(str::to_string).collect(),
                first_seen: ts_to_rfc3339(stats.first_ts),
                last_seen: ts_to_rfc3339(stats.last_ts),
                frame_gaps: stats.frame_gaps,
                frames_lost: stats.frames_lost,
                frames_reordered: stats.frames_reordered,
                frames_duplicated: stats.frames_duplicated,
            })
            .collect()
    }
}

fn record_counter_event(stats: &mut StreamStats, key: &StreamKey, event: FrameCounterEvent) {
    match event {
        FrameCounterEvent::Gap { missing } => {
            stats.frame_gaps += 1;
            stats.frames_lost += missing as u64;
            debug!(stream = %key.name, source = %key.source, missing, "frame counter gap");
        }
        FrameCounterEvent::Reordered { last } => {
            stats.frames_reordered += 1;
            debug!(stream = %key.name, source = %key.source, last, "frame counter went backwards");
        }
        FrameCounterEvent::Duplicate => {
            stats.frames_duplicated += 1;
            debug!(stream = %key.name, source = %key.source, "duplicate frame counter");
        }
        FrameCounterEvent::Untracked | FrameCounterEvent::First | FrameCounterEvent::InOrder => {}
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::StreamTable;
    use crate::protocols::vban::packet::Packet;
    use crate::protocols::vban::serial::{
        DataFormat, SerialBitMode, SerialPacket, SerialStreamType,
    };

    fn midi(name: &str, frame_counter: u32) -> Packet {
        Packet::Serial(SerialPacket {
            stream_name: name.to_string(),
            frame_counter,
            bit_speed: 115200,
            bit_mode: SerialBitMode::default(),
            channel_ident: 0,
            format: DataFormat::Byte8,
            stream_type: SerialStreamType::Midi,
            data: vec![0x90, 0x40, 0x7f],
        })
    }

    #[test]
    fn counts_gaps_per_stream() {
        let source: SocketAddr = "10.0.0.1:6980".parse().unwrap();
        let mut table = StreamTable::default();
        for counter in [1, 2, 5, 5, 4] {
            table.add_packet(&midi("MIDI1", counter), source, 3, Some(1.0));
        }
        table.add_packet(&midi("MIDI2", 9), source, 3, None);

        let summaries = table.into_summaries();
        assert_eq!(summaries.len(), 2);
        let first = &summaries[0];
        assert_eq!(first.stream_name, "MIDI1");
        assert_eq!(first.sub_protocol, "serial");
        assert_eq!(first.packets, 5);
        assert_eq!(first.bytes, 15);
        assert_eq!(first.bit_speed, Some(115200));
        assert_eq!(first.frame_gaps, 1);
        assert_eq!(first.frames_lost, 2);
        assert_eq!(first.frames_duplicated, 1);
        assert_eq!(first.frames_reordered, 1);
        assert_eq!(summaries[1].stream_name, "MIDI2");
        assert!(summaries[1].first_seen.is_none());
    }

    #[test]
    fn sources_are_separate_streams() {
        let mut table = StreamTable::default();
        table.add_packet(&midi("MIDI1", 1), "10.0.0.2:6980".parse().unwrap(), 3, None);
        table.add_packet(&midi("MIDI1", 7), "10.0.0.1:6980".parse().unwrap(), 3, None);
        let summaries = table.into_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].source, "10.0.0.1:6980");
        assert_eq!(summaries[0].frame_gaps, 0);
    }
}
