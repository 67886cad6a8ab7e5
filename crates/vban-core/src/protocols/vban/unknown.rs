use serde::{Deserialize, Serialize};

use super::error::VbanError;
use super::header::{CommonHeader, SubProtocol, assemble, split_datagram};
use super::layout;
use crate::protocols::common::strings::read_fixed_str;

/// Datagram with no dedicated decoder, kept field by field.
///
/// Produced for unknown sub-protocol tags and unknown service types; encoding
/// re-emits the preserved fields so the datagram passes through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownPacket {
    pub sub_protocol: SubProtocol,
    pub index: u8,
    pub part1: u8,
    pub part2: u8,
    pub part3: u8,
    pub stream_name: String,
    /// Name field as captured, bytes past the first NUL included. Written
    /// back unchanged as long as `stream_name` still reads the same.
    #[serde(default)]
    pub stream_name_bytes: [u8; layout::STREAM_NAME_LEN],
    pub frame_counter: u32,
    pub data: Vec<u8>,
}

impl UnknownPacket {
    /// Keep a whole datagram opaque, whatever its sub-protocol.
    pub fn from_datagram(bytes: &[u8]) -> Result<Self, VbanError> {
        let (header, payload) = split_datagram(bytes)?;
        let mut stream_name_bytes = [0u8; layout::STREAM_NAME_LEN];
        stream_name_bytes.copy_from_slice(&bytes[layout::STREAM_NAME_RANGE]);
        Ok(Self {
            sub_protocol: header.sub_protocol,
            index: header.index,
            part1: header.part1,
            part2: header.part2,
            part3: header.part3,
            stream_name: header.stream_name,
            stream_name_bytes,
            frame_counter: header.frame_counter,
            data: payload.to_vec(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, VbanError> {
        let header = CommonHeader {
            sub_protocol: self.sub_protocol,
            index: self.index,
            part1: self.part1,
            part2: self.part2,
            part3: self.part3,
            stream_name: self.stream_name.clone(),
            frame_counter: self.frame_counter,
        };
        let mut out = assemble(&header, &self.data)?;
        // A renamed packet gets a freshly padded name.
        if read_fixed_str(&self.stream_name_bytes) == self.stream_name {
            out[layout::STREAM_NAME_RANGE].copy_from_slice(&self.stream_name_bytes);
        }
        Ok(out)
    }
}
