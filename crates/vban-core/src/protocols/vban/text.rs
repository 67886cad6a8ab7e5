use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{LookupError, LookupKey, VbanError};
use super::header::{CommonHeader, SubProtocol};
use super::layout;
use super::serial::DataFormat;
use super::tables::BIT_SPEEDS;

/// Text encoding (high nibble of part 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Ascii,
    Utf8,
    Utf16Le,
    /// Reserved nibble values `0x30..=0xe0`, kept raw.
    Undefined(u8),
    User,
}

impl TextEncoding {
    pub fn value(self) -> u8 {
        match self {
            TextEncoding::Ascii => 0x00,
            TextEncoding::Utf8 => 0x10,
            TextEncoding::Utf16Le => 0x20,
            TextEncoding::Undefined(value) => value,
            TextEncoding::User => 0xf0,
        }
    }

    /// Whether payloads in this encoding are decoded to text.
    pub fn is_decodable(self) -> bool {
        matches!(
            self,
            TextEncoding::Ascii | TextEncoding::Utf8 | TextEncoding::Utf16Le
        )
    }

    fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Ascii if bytes.is_ascii() => {
                Some(String::from_utf8_lossy(bytes).into_owned())
            }
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
            TextEncoding::Utf16Le if bytes.len() % 2 == 0 => {
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));
                char::decode_utf16(units).collect::<Result<String, _>>().ok()
            }
            _ => None,
        }
    }

    fn encode(self, text: &str) -> Result<Vec<u8>, VbanError> {
        match self {
            // Characters outside ASCII have no byte in this encoding.
            TextEncoding::Ascii => Ok(text
                .chars()
                .map(|ch| if ch.is_ascii() { ch as u8 } else { b'?' })
                .collect()),
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            other => Err(LookupError::UnknownTextEncoding(LookupKey::Value(other.to_string())).into()),
        }
    }
}

impl TryFrom<u8> for TextEncoding {
    type Error = LookupError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(TextEncoding::Ascii),
            0x10 => Ok(TextEncoding::Utf8),
            0x20 => Ok(TextEncoding::Utf16Le),
            0xf0 => Ok(TextEncoding::User),
            other if other & 0x0f == 0 => Ok(TextEncoding::Undefined(other)),
            other => Err(LookupError::UnknownTextEncoding(LookupKey::Index(other))),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Ascii => f.write_str("ascii"),
            TextEncoding::Utf8 => f.write_str("utf8"),
            TextEncoding::Utf16Le => f.write_str("utf16le"),
            TextEncoding::Undefined(value) => write!(f, "undefined({value:#04x})"),
            TextEncoding::User => f.write_str("user"),
        }
    }
}

/// Decoded text, or the raw payload when it cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextContent {
    Text(String),
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPacket {
    pub stream_name: String,
    pub frame_counter: u32,
    /// Informational bits per second; 0 means unspecified. A reserved
    /// index decodes as 0 rather than failing.
    pub bit_speed: u32,
    pub channel_ident: u8,
    pub format: DataFormat,
    pub encoding: TextEncoding,
    pub content: TextContent,
}

impl TextPacket {
    pub(crate) fn from_parts(header: CommonHeader, payload: &[u8]) -> Result<Self, VbanError> {
        let encoding = TextEncoding::try_from(header.part3 & layout::PART3_HIGH_MASK)?;
        let content = match encoding.decode(payload) {
            Some(text) => TextContent::Text(text),
            None => TextContent::Raw(payload.to_vec()),
        };
        Ok(Self {
            bit_speed: BIT_SPEEDS.value(header.index).unwrap_or(0),
            channel_ident: header.part2,
            format: DataFormat::try_from(header.part3 & layout::PART3_LOW_MASK)?,
            encoding,
            content,
            stream_name: header.stream_name,
            frame_counter: header.frame_counter,
        })
    }

    pub(crate) fn to_header(&self) -> Result<CommonHeader, VbanError> {
        Ok(CommonHeader {
            sub_protocol: SubProtocol::Text,
            index: BIT_SPEEDS.index_of(self.bit_speed)?,
            part1: 0,
            part2: self.channel_ident,
            part3: self.encoding.value() | self.format.value(),
            stream_name: self.stream_name.clone(),
            frame_counter: self.frame_counter,
        })
    }

    /// Decoded text, if the payload was decodable.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            TextContent::Text(text) => Some(text),
            TextContent::Raw(_) => None,
        }
    }

    /// Wire payload: text encoded with `encoding`, or the raw bytes as-is.
    pub fn payload(&self) -> Result<Cow<'_, [u8]>, VbanError> {
        match &self.content {
            TextContent::Text(text) => self.encoding.encode(text).map(Cow::Owned),
            TextContent::Raw(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}
