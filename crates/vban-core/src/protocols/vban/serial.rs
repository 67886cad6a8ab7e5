use serde::{Deserialize, Serialize};

use super::error::{LookupError, LookupKey, VbanError};
use super::header::{CommonHeader, SubProtocol};
use super::layout;
use super::tables::BIT_SPEEDS;

/// Stop bits advertised by a serial stream.
///
/// Serialized as the numeric value (`1`, `1.5`, `2`); any other number is
/// rejected with `InvalidStopMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub enum StopBits {
    One,
    OneAndHalf,
    Two,
}

/// Stop mode index (low two bits of part 1) to stop bits; index 3 is undefined.
const STOP_MODES: [Option<StopBits>; 4] = [
    Some(StopBits::One),
    Some(StopBits::OneAndHalf),
    Some(StopBits::Two),
    None,
];

impl StopBits {
    pub fn from_mode(mode: u8) -> Option<Self> {
        STOP_MODES
            .get((mode & layout::STOP_MODE_MASK) as usize)
            .copied()
            .flatten()
    }

    pub fn mode(stop: Option<Self>) -> u8 {
        STOP_MODES
            .iter()
            .position(|entry| *entry == stop)
            .map_or(layout::STOP_MODE_MASK, |index| index as u8)
    }
}

impl TryFrom<f32> for StopBits {
    type Error = VbanError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        if value == 1.0 {
            Ok(StopBits::One)
        } else if value == 1.5 {
            Ok(StopBits::OneAndHalf)
        } else if value == 2.0 {
            Ok(StopBits::Two)
        } else {
            Err(VbanError::InvalidStopMode { value })
        }
    }
}

impl From<StopBits> for f32 {
    fn from(value: StopBits) -> Self {
        match value {
            StopBits::One => 1.0,
            StopBits::OneAndHalf => 1.5,
            StopBits::Two => 2.0,
        }
    }
}

/// Serial bit mode flags (part 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SerialBitMode {
    pub stop: Option<StopBits>,
    pub start: bool,
    pub parity: bool,
    pub multipart: bool,
}

impl SerialBitMode {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            stop: StopBits::from_mode(byte),
            start: byte & layout::START_BIT != 0,
            parity: byte & layout::PARITY_BIT != 0,
            multipart: byte & layout::MULTIPART_BIT != 0,
        }
    }

    pub fn to_byte(&self) -> u8 {
        let mut byte = StopBits::mode(self.stop);
        if self.start {
            byte |= layout::START_BIT;
        }
        if self.parity {
            byte |= layout::PARITY_BIT;
        }
        if self.multipart {
            byte |= layout::MULTIPART_BIT;
        }
        byte
    }
}

/// Data format (low three bits of part 3). Only 8-bit bytes are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    #[default]
    Byte8,
}

impl DataFormat {
    pub fn value(self) -> u8 {
        match self {
            DataFormat::Byte8 => 0x00,
        }
    }
}

impl TryFrom<u8> for DataFormat {
    type Error = LookupError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(DataFormat::Byte8),
            other => Err(LookupError::UnknownFormat(LookupKey::Index(other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerialStreamType {
    Generic,
    Midi,
    User,
}

impl SerialStreamType {
    pub fn value(self) -> u8 {
        match self {
            SerialStreamType::Generic => 0x00,
            SerialStreamType::Midi => 0x10,
            SerialStreamType::User => 0xf0,
        }
    }
}

impl TryFrom<u8> for SerialStreamType {
    type Error = LookupError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(SerialStreamType::Generic),
            0x10 => Ok(SerialStreamType::Midi),
            0xf0 => Ok(SerialStreamType::User),
            other => Err(LookupError::UnknownStreamType(LookupKey::Index(other))),
        }
    }
}

/// Serial or MIDI bytes passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialPacket {
    pub stream_name: String,
    pub frame_counter: u32,
    /// Bits per second; 0 means unspecified.
    pub bit_speed: u32,
    pub bit_mode: SerialBitMode,
    /// Sub-channel identifier (part 2).
    pub channel_ident: u8,
    pub format: DataFormat,
    pub stream_type: SerialStreamType,
    pub data: Vec<u8>,
}

impl SerialPacket {
    pub(crate) fn from_parts(header: CommonHeader, payload: &[u8]) -> Result<Self, VbanError> {
        Ok(Self {
            bit_speed: BIT_SPEEDS.value(header.index)?,
            bit_mode: SerialBitMode::from_byte(header.part1),
            channel_ident: header.part2,
            format: DataFormat::try_from(header.part3 & layout::PART3_LOW_MASK)?,
            stream_type: SerialStreamType::try_from(header.part3 & layout::PART3_HIGH_MASK)?,
            stream_name: header.stream_name,
            frame_counter: header.frame_counter,
            data: payload.to_vec(),
        })
    }

    pub(crate) fn to_header(&self) -> Result<CommonHeader, VbanError> {
        Ok(CommonHeader {
            sub_protocol: SubProtocol::Serial,
            index: BIT_SPEEDS.index_of(self.bit_speed)?,
            part1: self.bit_mode.to_byte(),
            part2: self.channel_ident,
            part3: self.stream_type.value() | self.format.value(),
            stream_name: self.stream_name.clone(),
            frame_counter: self.frame_counter,
        })
    }
}
