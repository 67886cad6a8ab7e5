use serde::{Deserialize, Serialize};

use super::error::{LookupError, LookupKey, VbanError};
use super::header::{CommonHeader, SubProtocol};
use super::layout;
use super::tables::{BIT_RESOLUTIONS, BitResolution, SAMPLE_RATES};

const MIN_SAMPLES: u16 = 1;
const MAX_SAMPLES: u16 = 256;
const MIN_CHANNELS: u16 = 1;
const MAX_CHANNELS: u16 = 256;

/// Audio codec carried in the high nibble of part 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    Pcm,
    Vbca,
    Vbcv,
    User,
}

impl Codec {
    pub fn value(self) -> u8 {
        match self {
            Codec::Pcm => 0x00,
            Codec::Vbca => 0x10,
            Codec::Vbcv => 0x20,
            Codec::User => 0xf0,
        }
    }
}

impl TryFrom<u8> for Codec {
    type Error = LookupError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Codec::Pcm),
            0x10 => Ok(Codec::Vbca),
            0x20 => Ok(Codec::Vbcv),
            0xf0 => Ok(Codec::User),
            other => Err(LookupError::UnknownCodec(LookupKey::Index(other))),
        }
    }
}

/// Audio frame: interleaved samples, opaque to the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioPacket {
    pub stream_name: String,
    pub frame_counter: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per channel, 1..=256.
    pub samples_per_frame: u16,
    /// Channel count, 1..=256.
    pub channels: u16,
    pub bit_resolution: BitResolution,
    pub codec: Codec,
    pub data: Vec<u8>,
}

impl AudioPacket {
    pub(crate) fn from_parts(header: CommonHeader, payload: &[u8]) -> Result<Self, VbanError> {
        let bit_resolution = BIT_RESOLUTIONS.value(header.part3 & layout::PART3_LOW_MASK)?;
        let codec = Codec::try_from(header.part3 & layout::PART3_HIGH_MASK)?;
        let sample_rate = SAMPLE_RATES.value(header.index)?;
        Ok(Self {
            stream_name: header.stream_name,
            frame_counter: header.frame_counter,
            sample_rate,
            samples_per_frame: header.part1 as u16 + 1,
            channels: header.part2 as u16 + 1,
            bit_resolution,
            codec,
            data: payload.to_vec(),
        })
    }

    pub(crate) fn to_header(&self) -> Result<CommonHeader, VbanError> {
        let part1 = pack_count("samples per frame", self.samples_per_frame, MIN_SAMPLES, MAX_SAMPLES)?;
        let part2 = pack_count("channels", self.channels, MIN_CHANNELS, MAX_CHANNELS)?;
        let resolution = BIT_RESOLUTIONS.index_of(self.bit_resolution)?;
        Ok(CommonHeader {
            sub_protocol: SubProtocol::Audio,
            index: SAMPLE_RATES.index_of(self.sample_rate)?,
            part1,
            part2,
            part3: self.codec.value() | resolution,
            stream_name: self.stream_name.clone(),
            frame_counter: self.frame_counter,
        })
    }

    /// Bytes in one multi-channel sample frame, if samples are byte aligned.
    pub fn bytes_per_frame(&self) -> Option<usize> {
        self.bit_resolution
            .bytes_per_sample()
            .map(|bytes| bytes * self.channels as usize)
    }

    /// Payload length a full PCM frame would have. Not enforced on decode.
    pub fn expected_payload_len(&self) -> Option<usize> {
        self.bytes_per_frame()
            .map(|bytes| bytes * self.samples_per_frame as usize)
    }
}

fn pack_count(field: &'static str, value: u16, min: u16, max: u16) -> Result<u8, VbanError> {
    if !(min..=max).contains(&value) {
        return Err(VbanError::out_of_range(field, value as u64, min as u64, max as u64));
    }
    Ok((value - 1) as u8)
}

#[cfg(test)]
mod tests {
    use super::{AudioPacket, Codec};
    use crate::protocols::common::parse_hex;
    use crate::protocols::vban::error::{LookupError, LookupKey, VbanError};
    use crate::protocols::vban::header::{build_header, split_datagram};
    use crate::protocols::vban::tables::BitResolution;

    const STREAM3_HEADER: &str = "5642414e0366010153747265616d33000000000000000000ef211d00";

    fn decode(bytes: &[u8]) -> Result<AudioPacket, VbanError> {
        let (header, payload) = split_datagram(bytes)?;
        AudioPacket::from_parts(header, payload)
    }

    fn encode(packet: &AudioPacket) -> Vec<u8> {
        build_header(&packet.to_header().unwrap(), &packet.data).unwrap()
    }

    fn sample() -> AudioPacket {
        AudioPacket {
            stream_name: "Stream2".to_string(),
            frame_counter: 7,
            sample_rate: 44100,
            samples_per_frame: 256,
            channels: 1,
            bit_resolution: BitResolution::FLOAT32,
            codec: Codec::Pcm,
            data: vec![0x11; 8],
        }
    }

    #[test]
    fn decode_stream3_header_fields() {
        let mut bytes = parse_hex(STREAM3_HEADER).unwrap();
        bytes.extend((0..412u32).map(|i| (i % 251) as u8));
        let packet = decode(&bytes).unwrap();
        assert_eq!(packet.stream_name, "Stream3");
        assert_eq!(packet.sample_rate, 48000);
        assert_eq!(packet.samples_per_frame, 103);
        assert_eq!(packet.channels, 2);
        assert_eq!(packet.bit_resolution, BitResolution::INT16);
        assert_eq!(packet.codec, Codec::Pcm);
        assert_eq!(packet.frame_counter, 1_909_231);
        assert_eq!(packet.expected_payload_len(), Some(412));
        assert_eq!(encode(&packet), bytes);
    }

    #[test]
    fn round_trip_constructed_packet() {
        let packet = sample();
        let bytes = encode(&packet);
        assert_eq!(bytes[4], 16);
        assert_eq!(bytes[5], 0xff);
        assert_eq!(bytes[6], 0x00);
        assert_eq!(bytes[7], 0x04);
        assert_eq!(decode(&bytes).unwrap(), packet);
    }

    #[test]
    fn short_payload_is_accepted() {
        let mut bytes = parse_hex(STREAM3_HEADER).unwrap();
        bytes.extend([0u8; 10]);
        let packet = decode(&bytes).unwrap();
        assert_eq!(packet.data.len(), 10);
    }

    #[test]
    fn reserved_sample_rate_index_fails() {
        let mut bytes = parse_hex(STREAM3_HEADER).unwrap();
        bytes[4] = 0x15;
        assert_eq!(
            decode(&bytes).unwrap_err(),
            VbanError::Lookup(LookupError::UnknownSampleRate(LookupKey::Index(21)))
        );
    }

    #[test]
    fn unknown_codec_fails() {
        let mut bytes = parse_hex(STREAM3_HEADER).unwrap();
        bytes[7] = 0x31;
        assert_eq!(
            decode(&bytes).unwrap_err(),
            VbanError::Lookup(LookupError::UnknownCodec(LookupKey::Index(0x30)))
        );
    }

    #[test]
    fn part_fields_are_independent() {
        let base = parse_hex(STREAM3_HEADER).unwrap();
        let reference = decode(&base).unwrap();

        let mut bytes = base.clone();
        bytes[5] = 0x00;
        let changed = decode(&bytes).unwrap();
        assert_eq!(changed.samples_per_frame, 1);
        assert_eq!(changed.channels, reference.channels);
        assert_eq!(changed.bit_resolution, reference.bit_resolution);

        let mut bytes = base;
        bytes[7] = 0x15;
        let changed = decode(&bytes).unwrap();
        assert_eq!(changed.codec, Codec::Vbca);
        assert_eq!(changed.bit_resolution, BitResolution::FLOAT64);
        assert_eq!(changed.samples_per_frame, reference.samples_per_frame);
        assert_eq!(changed.channels, reference.channels);
    }

    #[test]
    fn counts_out_of_range() {
        let mut packet = sample();
        packet.channels = 0;
        assert!(matches!(
            packet.to_header().unwrap_err(),
            VbanError::OutOfRange { field: "channels", value: 0, .. }
        ));
        packet.channels = 2;
        packet.samples_per_frame = 257;
        assert!(matches!(
            packet.to_header().unwrap_err(),
            VbanError::OutOfRange { field: "samples per frame", value: 257, .. }
        ));
    }

    #[test]
    fn unmapped_rate_fails_before_encoding() {
        let mut packet = sample();
        packet.sample_rate = 44000;
        assert_eq!(
            packet.to_header().unwrap_err(),
            VbanError::Lookup(LookupError::UnknownSampleRate(LookupKey::Value(
                "44000".to_string()
            )))
        );
    }

    #[test]
    fn packed_resolution_has_no_frame_size() {
        let mut packet = sample();
        packet.bit_resolution = BitResolution::BITS12;
        assert_eq!(packet.bytes_per_frame(), None);
        packet.bit_resolution = BitResolution::INT24;
        packet.channels = 2;
        assert_eq!(packet.bytes_per_frame(), Some(6));
        assert_eq!(packet.expected_payload_len(), Some(6 * 256));
    }

    #[test]
    fn reserved_resolution_bit_is_cleared_on_encode() {
        let mut bytes = parse_hex(STREAM3_HEADER).unwrap();
        bytes.extend(std::iter::repeat_n(0u8, 412));
        bytes[7] = 0x09;
        let packet = decode(&bytes).unwrap();
        assert_eq!(packet.bit_resolution, BitResolution::INT16);
        assert_eq!(encode(&packet)[7], 0x01);
    }
}
