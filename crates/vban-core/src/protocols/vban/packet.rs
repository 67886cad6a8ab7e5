use serde::{Deserialize, Serialize};

use super::audio::AudioPacket;
use super::error::VbanError;
use super::header::{SubProtocol, build_header, split_datagram};
use super::serial::SerialPacket;
use super::service::{ServicePacket, decode_service};
use super::text::TextPacket;
use super::unknown::UnknownPacket;

/// Any VBAN datagram.
///
/// # Examples
/// ```
/// use vban_core::{Packet, SubProtocol, parse_hex};
///
/// let bytes = parse_hex(
///     "5642414e2e0000004d4944493100000000000000000000009b000000b00270",
/// )?;
/// let packet = Packet::decode(&bytes)?;
/// assert_eq!(packet.sub_protocol(), SubProtocol::Serial);
/// assert_eq!(packet.stream_name(), "MIDI1");
/// assert_eq!(packet.encode()?, bytes);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Packet {
    Audio(AudioPacket),
    Serial(SerialPacket),
    Text(TextPacket),
    Service(ServicePacket),
    Unknown(UnknownPacket),
}

/// Decode one datagram.
///
/// Unknown sub-protocol tags and service types decode to
/// [`Packet::Unknown`]; only a bad header, a truncated fixed-size payload or
/// an unmapped table index fail.
///
/// # Errors
/// Returns `VbanError` describing the first field that could not be decoded.
pub fn decode(bytes: &[u8]) -> Result<Packet, VbanError> {
    let (header, payload) = split_datagram(bytes)?;
    match header.sub_protocol {
        SubProtocol::Audio => AudioPacket::from_parts(header, payload).map(Packet::Audio),
        SubProtocol::Serial => SerialPacket::from_parts(header, payload).map(Packet::Serial),
        SubProtocol::Text => TextPacket::from_parts(header, payload).map(Packet::Text),
        SubProtocol::Service => match decode_service(header, payload)? {
            Some(service) => Ok(Packet::Service(service)),
            None => UnknownPacket::from_datagram(bytes).map(Packet::Unknown),
        },
        SubProtocol::Unknown(_) => UnknownPacket::from_datagram(bytes).map(Packet::Unknown),
    }
}

/// Encode one packet. Nothing is returned unless every field packs.
///
/// # Errors
/// Returns `VbanError` for oversized payloads, values with no wire index
/// and fields outside their bit range.
pub fn encode(packet: &Packet) -> Result<Vec<u8>, VbanError> {
    match packet {
        Packet::Audio(audio) => build_header(&audio.to_header()?, &audio.data),
        Packet::Serial(serial) => build_header(&serial.to_header()?, &serial.data),
        Packet::Text(text) => build_header(&text.to_header()?, &text.payload()?),
        Packet::Service(service) => {
            let (header, payload) = service.to_wire()?;
            build_header(&header, &payload)
        }
        Packet::Unknown(unknown) => unknown.encode(),
    }
}

impl Packet {
    pub fn decode(bytes: &[u8]) -> Result<Self, VbanError> {
        decode(bytes)
    }

    pub fn encode(&self) -> Result<Vec<u8>, VbanError> {
        encode(self)
    }

    pub fn sub_protocol(&self) -> SubProtocol {
        match self {
            Packet::Audio(_) => SubProtocol::Audio,
            Packet::Serial(_) => SubProtocol::Serial,
            Packet::Text(_) => SubProtocol::Text,
            Packet::Service(_) => SubProtocol::Service,
            Packet::Unknown(unknown) => unknown.sub_protocol,
        }
    }

    pub fn stream_name(&self) -> &str {
        match self {
            Packet::Audio(packet) => &packet.stream_name,
            Packet::Serial(packet) => &packet.stream_name,
            Packet::Text(packet) => &packet.stream_name,
            Packet::Service(packet) => &packet.header().stream_name,
            Packet::Unknown(packet) => &packet.stream_name,
        }
    }

    /// Rename the stream, e.g. before forwarding a datagram.
    pub fn set_stream_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Packet::Audio(packet) => packet.stream_name = name,
            Packet::Serial(packet) => packet.stream_name = name,
            Packet::Text(packet) => packet.stream_name = name,
            Packet::Service(packet) => packet.header_mut().stream_name = name,
            Packet::Unknown(packet) => packet.stream_name = name,
        }
    }

    pub fn frame_counter(&self) -> u32 {
        match self {
            Packet::Audio(packet) => packet.frame_counter,
            Packet::Serial(packet) => packet.frame_counter,
            Packet::Text(packet) => packet.frame_counter,
            Packet::Service(packet) => packet.header().frame_counter,
            Packet::Unknown(packet) => packet.frame_counter,
        }
    }

    pub fn set_frame_counter(&mut self, frame_counter: u32) {
        match self {
            Packet::Audio(packet) => packet.frame_counter = frame_counter,
            Packet::Serial(packet) => packet.frame_counter = frame_counter,
            Packet::Text(packet) => packet.frame_counter = frame_counter,
            Packet::Service(packet) => packet.header_mut().frame_counter = frame_counter,
            Packet::Unknown(packet) => packet.frame_counter = frame_counter,
        }
    }
}
