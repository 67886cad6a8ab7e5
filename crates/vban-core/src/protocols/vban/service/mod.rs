//! Service sub-protocol.
//!
//! Part 2 selects the service type and routes the datagram to a dedicated
//! payload layout. Part 1 carries the reply flag (bit 7) and the service
//! function (bits 0..=6). The rate index is unused and written as zero.
//!
//! An unrecognized service type is not an error: the datagram degrades to
//! an [`UnknownPacket`](super::unknown::UnknownPacket) so it can still be
//! re-emitted verbatim.

pub mod chat;
pub mod ping;
pub mod realtime;
pub mod request_reply;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::error::VbanError;
use super::header::{CommonHeader, SubProtocol};
use super::layout;

pub use chat::ChatPacket;
pub use ping::{ApplicationType, PingColor, PingData, PingFeatures, PingPacket};
pub use realtime::{
    RealTimePacket, RealTimeRegisterAnswerPacket, RealTimeRegisterPacket, RegisterAnswer,
};
pub use request_reply::RequestReplyPacket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Identification,
    ChatUtf8,
    RequestReply,
    RealTimePacketRegister,
    RealTimePacket,
}

impl ServiceType {
    pub fn from_value(value: u8) -> Option<Self> {
        match value {
            layout::SERVICE_IDENTIFICATION => Some(ServiceType::Identification),
            layout::SERVICE_CHAT_UTF8 => Some(ServiceType::ChatUtf8),
            layout::SERVICE_REQUEST_REPLY => Some(ServiceType::RequestReply),
            layout::SERVICE_RT_PACKET_REGISTER => Some(ServiceType::RealTimePacketRegister),
            layout::SERVICE_RT_PACKET => Some(ServiceType::RealTimePacket),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ServiceType::Identification => "identification",
            ServiceType::ChatUtf8 => "chat_utf8",
            ServiceType::RequestReply => "request_reply",
            ServiceType::RealTimePacketRegister => "rt_packet_register",
            ServiceType::RealTimePacket => "rt_packet",
        }
    }

    pub fn value(self) -> u8 {
        match self {
            ServiceType::Identification => layout::SERVICE_IDENTIFICATION,
            ServiceType::ChatUtf8 => layout::SERVICE_CHAT_UTF8,
            ServiceType::RequestReply => layout::SERVICE_REQUEST_REPLY,
            ServiceType::RealTimePacketRegister => layout::SERVICE_RT_PACKET_REGISTER,
            ServiceType::RealTimePacket => layout::SERVICE_RT_PACKET,
        }
    }
}

/// Header fields shared by every service packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceHeader {
    pub stream_name: String,
    pub frame_counter: u32,
    /// Service function, 0..=127.
    pub function: u8,
    pub is_reply: bool,
}

impl ServiceHeader {
    pub fn new(stream_name: impl Into<String>, frame_counter: u32) -> Self {
        Self {
            stream_name: stream_name.into(),
            frame_counter,
            function: layout::SERVICE_FUNCTION_PING0,
            is_reply: false,
        }
    }

    fn from_common(header: &CommonHeader) -> Self {
        Self {
            stream_name: header.stream_name.clone(),
            frame_counter: header.frame_counter,
            function: header.part1 & layout::SERVICE_FUNCTION_MASK,
            is_reply: header.part1 & layout::REPLY_BIT != 0,
        }
    }

    fn to_common(&self, service_type: ServiceType, part3: u8) -> Result<CommonHeader, VbanError> {
        if self.function > layout::SERVICE_FUNCTION_MASK {
            return Err(VbanError::out_of_range(
                "service function",
                self.function as u64,
                0,
                layout::SERVICE_FUNCTION_MASK as u64,
            ));
        }
        let reply = if self.is_reply { layout::REPLY_BIT } else { 0 };
        Ok(CommonHeader {
            sub_protocol: SubProtocol::Service,
            index: 0,
            part1: reply | self.function,
            part2: service_type.value(),
            part3,
            stream_name: self.stream_name.clone(),
            frame_counter: self.frame_counter,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "service", rename_all = "snake_case")]
pub enum ServicePacket {
    Ping(PingPacket),
    Chat(ChatPacket),
    RequestReply(RequestReplyPacket),
    RealTimeRegister(RealTimeRegisterPacket),
    RealTimeRegisterAnswer(RealTimeRegisterAnswerPacket),
    RealTime(RealTimePacket),
}

impl ServicePacket {
    pub fn header(&self) -> &ServiceHeader {
        match self {
            ServicePacket::Ping(packet) => &packet.header,
            ServicePacket::Chat(packet) => &packet.header,
            ServicePacket::RequestReply(packet) => &packet.header,
            ServicePacket::RealTimeRegister(packet) => &packet.header,
            ServicePacket::RealTimeRegisterAnswer(packet) => &packet.header,
            ServicePacket::RealTime(packet) => &packet.header,
        }
    }

    pub fn header_mut(&mut self) -> &mut ServiceHeader {
        match self {
            ServicePacket::Ping(packet) => &mut packet.header,
            ServicePacket::Chat(packet) => &mut packet.header,
            ServicePacket::RequestReply(packet) => &mut packet.header,
            ServicePacket::RealTimeRegister(packet) => &mut packet.header,
            ServicePacket::RealTimeRegisterAnswer(packet) => &mut packet.header,
            ServicePacket::RealTime(packet) => &mut packet.header,
        }
    }

    pub fn service_type(&self) -> ServiceType {
        match self {
            ServicePacket::Ping(_) => ServiceType::Identification,
            ServicePacket::Chat(_) => ServiceType::ChatUtf8,
            ServicePacket::RequestReply(_) => ServiceType::RequestReply,
            ServicePacket::RealTimeRegister(_) | ServicePacket::RealTimeRegisterAnswer(_) => {
                ServiceType::RealTimePacketRegister
            }
            ServicePacket::RealTime(_) => ServiceType::RealTimePacket,
        }
    }

    /// Header and payload as they go on the wire.
    pub(crate) fn to_wire(&self) -> Result<(CommonHeader, Cow<'_, [u8]>), VbanError> {
        let service_type = self.service_type();
        let (part3, payload) = match self {
            ServicePacket::Ping(packet) => (0, Cow::Owned(packet.data.to_payload())),
            ServicePacket::Chat(packet) => (0, Cow::Owned(packet.to_payload())),
            ServicePacket::RequestReply(packet) => (0, Cow::Borrowed(packet.answer.as_bytes())),
            ServicePacket::RealTimeRegister(packet) => (packet.timeout, Cow::Borrowed(&[][..])),
            ServicePacket::RealTimeRegisterAnswer(packet) => {
                (packet.answer_code, Cow::Borrowed(&[][..]))
            }
            ServicePacket::RealTime(packet) => (0, Cow::Borrowed(packet.data.as_slice())),
        };
        let header = self.header().to_common(service_type, part3)?;
        Ok((header, payload))
    }
}

/// Route a service datagram by service type; `None` for an unlisted type.
pub(crate) fn decode_service(
    header: CommonHeader,
    payload: &[u8],
) -> Result<Option<ServicePacket>, VbanError> {
    let Some(service_type) = ServiceType::from_value(header.part2) else {
        return Ok(None);
    };
    let service = ServiceHeader::from_common(&header);
    let packet = match service_type {
        ServiceType::Identification => ServicePacket::Ping(PingPacket {
            header: service,
            data: PingData::from_payload(payload)?,
        }),
        ServiceType::ChatUtf8 => ServicePacket::Chat(ChatPacket::from_payload(service, payload)),
        ServiceType::RequestReply => {
            ServicePacket::RequestReply(RequestReplyPacket::from_payload(service, payload))
        }
        ServiceType::RealTimePacketRegister if service.is_reply => {
            ServicePacket::RealTimeRegisterAnswer(RealTimeRegisterAnswerPacket {
                header: service,
                answer_code: header.part3,
            })
        }
        ServiceType::RealTimePacketRegister => {
            ServicePacket::RealTimeRegister(RealTimeRegisterPacket {
                header: service,
                timeout: header.part3,
            })
        }
        ServiceType::RealTimePacket => ServicePacket::RealTime(RealTimePacket {
            header: service,
            data: payload.to_vec(),
        }),
    };
    Ok(Some(packet))
}
