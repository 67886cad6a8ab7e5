use serde::{Deserialize, Serialize};

use super::error::{HeaderError, VbanError};
use super::layout;
use super::reader::VbanReader;
use crate::protocols::common::strings::{read_fixed_str, write_fixed_str};

/// Top three bits of byte 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubProtocol {
    Audio,
    Serial,
    Text,
    Service,
    /// Any other tag, kept as the raw masked byte (`0x80`, `0xa0`, ...).
    Unknown(u8),
}

impl SubProtocol {
    pub fn from_tag(byte: u8) -> Self {
        match byte & layout::SUB_PROTOCOL_MASK {
            layout::SUB_PROTOCOL_AUDIO => SubProtocol::Audio,
            layout::SUB_PROTOCOL_SERIAL => SubProtocol::Serial,
            layout::SUB_PROTOCOL_TEXT => SubProtocol::Text,
            layout::SUB_PROTOCOL_SERVICE => SubProtocol::Service,
            other => SubProtocol::Unknown(other),
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            SubProtocol::Audio => layout::SUB_PROTOCOL_AUDIO,
            SubProtocol::Serial => layout::SUB_PROTOCOL_SERIAL,
            SubProtocol::Text => layout::SUB_PROTOCOL_TEXT,
            SubProtocol::Service => layout::SUB_PROTOCOL_SERVICE,
            SubProtocol::Unknown(tag) => tag & layout::SUB_PROTOCOL_MASK,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SubProtocol::Audio => "audio",
            SubProtocol::Serial => "serial",
            SubProtocol::Text => "text",
            SubProtocol::Service => "service",
            SubProtocol::Unknown(_) => "unknown",
        }
    }
}

/// The 28-byte header with its three sub-protocol specific bytes left raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonHeader {
    pub sub_protocol: SubProtocol,
    /// Sample rate or bit speed index (low five bits of byte 4).
    pub index: u8,
    pub part1: u8,
    pub part2: u8,
    pub part3: u8,
    pub stream_name: String,
    pub frame_counter: u32,
}

/// Parse the header and return it with the payload that follows.
///
/// The identification is checked before anything else.
pub fn split_datagram(bytes: &[u8]) -> Result<(CommonHeader, &[u8]), VbanError> {
    if let Some(found) = bytes.get(layout::ID_RANGE) {
        if found != layout::VBAN_ID {
            let mut id = [0u8; 4];
            id.copy_from_slice(found);
            return Err(HeaderError::BadIdentification { found: id }.into());
        }
    }
    if bytes.len() < layout::HEADER_LEN {
        return Err(HeaderError::TooShort {
            needed: layout::HEADER_LEN,
            actual: bytes.len(),
        }
        .into());
    }

    let reader = VbanReader::new(bytes);
    let packed = reader.read_u8(layout::SR_SUB_PROTOCOL_OFFSET)?;
    let header = CommonHeader {
        sub_protocol: SubProtocol::from_tag(packed),
        index: packed & layout::RATE_INDEX_MASK,
        part1: reader.read_u8(layout::PART1_OFFSET)?,
        part2: reader.read_u8(layout::PART2_OFFSET)?,
        part3: reader.read_u8(layout::PART3_OFFSET)?,
        stream_name: read_fixed_str(reader.read_slice(layout::STREAM_NAME_RANGE)?),
        frame_counter: reader.read_u32_le(layout::FRAME_COUNTER_RANGE)?,
    };
    Ok((header, &bytes[layout::HEADER_LEN..]))
}

pub fn parse_header(bytes: &[u8]) -> Result<CommonHeader, VbanError> {
    split_datagram(bytes).map(|(header, _)| header)
}

/// Serialize a header followed by `payload`.
///
/// Unknown sub-protocols have no encoder and are rejected; use
/// [`UnknownPacket`](super::unknown::UnknownPacket) to re-emit captured
/// datagrams verbatim.
pub fn build_header(header: &CommonHeader, payload: &[u8]) -> Result<Vec<u8>, VbanError> {
    if let SubProtocol::Unknown(tag) = header.sub_protocol {
        return Err(VbanError::UnroutablePacket { tag });
    }
    assemble(header, payload)
}

/// Serialize without routing checks.
pub(crate) fn assemble(header: &CommonHeader, payload: &[u8]) -> Result<Vec<u8>, VbanError> {
    if payload.len() > layout::MAX_PAYLOAD_LEN {
        return Err(VbanError::PayloadTooLarge {
            actual: payload.len(),
            max: layout::MAX_PAYLOAD_LEN,
        });
    }
    if header.index > layout::MAX_RATE_INDEX {
        return Err(VbanError::out_of_range(
            "rate index",
            header.index as u64,
            0,
            layout::MAX_RATE_INDEX as u64,
        ));
    }

    let mut out = Vec::with_capacity(layout::HEADER_LEN + payload.len());
    out.extend_from_slice(layout::VBAN_ID);
    out.push(header.sub_protocol.tag() | header.index);
    out.push(header.part1);
    out.push(header.part2);
    out.push(header.part3);
    write_fixed_str(&mut out, &header.stream_name, layout::STREAM_NAME_LEN);
    out.extend_from_slice(&header.frame_counter.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{CommonHeader, SubProtocol, assemble, build_header, parse_header, split_datagram};
    use crate::protocols::common::parse_hex;
    use crate::protocols::vban::error::{HeaderError, VbanError};
    use crate::protocols::vban::layout;

    fn header(sub_protocol: SubProtocol, stream_name: &str) -> CommonHeader {
        CommonHeader {
            sub_protocol,
            index: 3,
            part1: 0x66,
            part2: 0x01,
            part3: 0x01,
            stream_name: stream_name.to_string(),
            frame_counter: 1_909_231,
        }
    }

    #[test]
    fn parse_captured_audio_header() {
        let bytes = parse_hex("5642414e0366010153747265616d33000000000000000000ef211d00").unwrap();
        let (parsed, payload) = split_datagram(&bytes).unwrap();
        assert_eq!(parsed, header(SubProtocol::Audio, "Stream3"));
        assert!(payload.is_empty());
        assert_eq!(build_header(&parsed, payload).unwrap(), bytes);
    }

    #[test]
    fn bad_identification_fails_first() {
        let err = parse_header(b"VBAM").unwrap_err();
        assert_eq!(
            err,
            VbanError::InvalidHeader(HeaderError::BadIdentification { found: *b"VBAM" })
        );
    }

    #[test]
    fn short_header_fails() {
        let bytes = [b'V', b'B', b'A', b'N', 0, 0];
        let err = parse_header(&bytes).unwrap_err();
        assert_eq!(
            err,
            VbanError::InvalidHeader(HeaderError::TooShort {
                needed: layout::HEADER_LEN,
                actual: 6
            })
        );
        assert!(matches!(
            parse_header(b"VB").unwrap_err(),
            VbanError::InvalidHeader(HeaderError::TooShort { .. })
        ));
    }

    #[test]
    fn sub_protocol_tags() {
        assert_eq!(SubProtocol::from_tag(0x03), SubProtocol::Audio);
        assert_eq!(SubProtocol::from_tag(0x2e), SubProtocol::Serial);
        assert_eq!(SubProtocol::from_tag(0x52), SubProtocol::Text);
        assert_eq!(SubProtocol::from_tag(0x60), SubProtocol::Service);
        assert_eq!(SubProtocol::from_tag(0xa5), SubProtocol::Unknown(0xa0));
        assert_eq!(SubProtocol::Unknown(0xa0).tag(), 0xa0);
    }

    #[test]
    fn stream_name_full_width_has_no_terminator() {
        let name = "0123456789ABCDEF";
        let bytes = build_header(&header(SubProtocol::Audio, name), &[]).unwrap();
        assert_eq!(&bytes[layout::STREAM_NAME_RANGE], name.as_bytes());
        assert_eq!(parse_header(&bytes).unwrap().stream_name, name);
    }

    #[test]
    fn stream_name_is_truncated_and_padded() {
        let long = build_header(&header(SubProtocol::Audio, "a-much-longer-stream-name"), &[]).unwrap();
        assert_eq!(&long[layout::STREAM_NAME_RANGE], b"a-much-longer-st");

        let short = build_header(&header(SubProtocol::Audio, "ab"), &[]).unwrap();
        assert_eq!(&short[layout::STREAM_NAME_RANGE], b"ab\0\0\0\0\0\0\0\0\0\0\0\0\0\0");
    }

    #[test]
    fn payload_size_limit() {
        let h = header(SubProtocol::Audio, "s");
        let max = vec![0u8; layout::MAX_PAYLOAD_LEN];
        assert_eq!(build_header(&h, &max).unwrap().len(), layout::MAX_DATAGRAM_LEN);

        let over = vec![0u8; layout::MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            build_header(&h, &over).unwrap_err(),
            VbanError::PayloadTooLarge {
                actual: 1437,
                max: 1436
            }
        );
    }

    #[test]
    fn unknown_sub_protocol_is_unroutable() {
        let h = header(SubProtocol::Unknown(0x80), "s");
        assert_eq!(
            build_header(&h, &[]).unwrap_err(),
            VbanError::UnroutablePacket { tag: 0x80 }
        );
        assert_eq!(assemble(&h, &[]).unwrap()[4], 0x83);
    }

    #[test]
    fn rate_index_must_fit_five_bits() {
        let mut h = header(SubProtocol::Audio, "s");
        h.index = 32;
        assert!(matches!(
            build_header(&h, &[]).unwrap_err(),
            VbanError::OutOfRange { field: "rate index", .. }
        ));
    }
}
