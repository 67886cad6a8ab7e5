//! Identification (ping) service: a fixed 676-byte device description.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::ServiceHeader;
use crate::protocols::vban::error::VbanError;
use crate::protocols::vban::layout;
use crate::protocols::vban::reader::{VbanReader, VbanWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    #[default]
    Unknown,
    Receptor,
    Transmitter,
    ReceptorSpot,
    TransmitterSpot,
    VirtualDevice,
    VirtualMixer,
    Matrix,
    Daw,
    Server,
}

impl ApplicationType {
    /// Unlisted values decode as `Unknown`.
    pub fn from_value(value: u32) -> Self {
        match value {
            0x0000_0001 => ApplicationType::Receptor,
            0x0000_0002 => ApplicationType::Transmitter,
            0x0000_0004 => ApplicationType::ReceptorSpot,
            0x0000_0008 => ApplicationType::TransmitterSpot,
            0x0000_0010 => ApplicationType::VirtualDevice,
            0x0000_0020 => ApplicationType::VirtualMixer,
            0x0000_0040 => ApplicationType::Matrix,
            0x0000_0080 => ApplicationType::Daw,
            0x0100_0000 => ApplicationType::Server,
            _ => ApplicationType::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ApplicationType::Unknown => "unknown",
            ApplicationType::Receptor => "receptor",
            ApplicationType::Transmitter => "transmitter",
            ApplicationType::ReceptorSpot => "receptor_spot",
            ApplicationType::TransmitterSpot => "transmitter_spot",
            ApplicationType::VirtualDevice => "virtual_device",
            ApplicationType::VirtualMixer => "virtual_mixer",
            ApplicationType::Matrix => "matrix",
            ApplicationType::Daw => "daw",
            ApplicationType::Server => "server",
        }
    }

    pub fn value(self) -> u32 {
        match self {
            ApplicationType::Unknown => 0,
            ApplicationType::Receptor => 0x0000_0001,
            ApplicationType::Transmitter => 0x0000_0002,
            ApplicationType::ReceptorSpot => 0x0000_0004,
            ApplicationType::TransmitterSpot => 0x0000_0008,
            ApplicationType::VirtualDevice => 0x0000_0010,
            ApplicationType::VirtualMixer => 0x0000_0020,
            ApplicationType::Matrix => 0x0000_0040,
            ApplicationType::Daw => 0x0000_0080,
            ApplicationType::Server => 0x0100_0000,
        }
    }
}

bitflags! {
    /// Capabilities advertised in an identification packet.
    ///
    /// `MIDI` includes the `SERIAL` bit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct PingFeatures: u32 {
        const AUDIO = 0x0000_0001;
        const AOIP = 0x0000_0002;
        const VOIP = 0x0000_0004;
        const SERIAL = 0x0000_0100;
        const MIDI = 0x0000_0300;
        const FRAME = 0x0000_1000;
        const TXT = 0x0001_0000;
    }
}

/// Display color packed as `0x00RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PingColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl PingColor {
    pub fn from_packed(value: u32) -> Self {
        Self {
            red: (value >> 16) as u8,
            green: (value >> 8) as u8,
            blue: value as u8,
        }
    }

    pub fn packed(self) -> u32 {
        ((self.red as u32) << 16) | ((self.green as u32) << 8) | self.blue as u32
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingData {
    pub application_type: ApplicationType,
    pub features: PingFeatures,
    pub feature_ex: u32,
    pub preferred_rate: u32,
    pub min_rate: u32,
    pub max_rate: u32,
    pub color: PingColor,
    pub version: u32,
    pub gps_position: String,
    pub user_position: String,
    pub lang_code: String,
    pub reserved_ascii: String,
    pub reserved_ex: String,
    pub reserved_ex2: String,
    pub device_name: String,
    pub manufacturer_name: String,
    pub application_name: String,
    pub hostname: String,
    pub user_name: String,
    pub user_comment: String,
}

impl Default for PingData {
    fn default() -> Self {
        Self {
            application_type: ApplicationType::Server,
            features: PingFeatures::AUDIO
                | PingFeatures::MIDI
                | PingFeatures::TXT
                | PingFeatures::SERIAL,
            feature_ex: 0,
            preferred_rate: 0,
            min_rate: 6000,
            max_rate: 705_600,
            color: PingColor {
                red: 128,
                green: 128,
                blue: 0,
            },
            version: 0,
            gps_position: String::new(),
            user_position: String::new(),
            lang_code: "en-us".to_string(),
            reserved_ascii: String::new(),
            reserved_ex: String::new(),
            reserved_ex2: String::new(),
            device_name: String::new(),
            manufacturer_name: String::new(),
            application_name: env!("CARGO_PKG_NAME").to_string(),
            hostname: String::new(),
            user_name: String::new(),
            user_comment: String::new(),
        }
    }
}

impl PingData {
    /// Decode the identification payload. Bytes past 676 are ignored.
    pub fn from_payload(payload: &[u8]) -> Result<Self, VbanError> {
        let mut reader = VbanReader::new(payload);
        reader.require_len(layout::SERVICE_PAYLOAD_LEN)?;
        Ok(Self {
            application_type: ApplicationType::from_value(reader.take_u32_le()?),
            features: PingFeatures::from_bits_truncate(reader.take_u32_le()?),
            feature_ex: reader.take_u32_le()?,
            preferred_rate: reader.take_u32_le()?,
            min_rate: reader.take_u32_le()?,
            max_rate: reader.take_u32_le()?,
            color: PingColor::from_packed(reader.take_u32_le()?),
            version: reader.take_u32_le()?,
            gps_position: reader.take_fixed_str(layout::PING_GPS_POSITION_LEN)?,
            user_position: reader.take_fixed_str(layout::PING_USER_POSITION_LEN)?,
            lang_code: reader.take_fixed_str(layout::PING_LANG_CODE_LEN)?,
            reserved_ascii: reader.take_fixed_str(layout::PING_RESERVED_ASCII_LEN)?,
            reserved_ex: reader.take_fixed_str(layout::PING_RESERVED_EX_LEN)?,
            reserved_ex2: reader.take_fixed_str(layout::PING_RESERVED_EX2_LEN)?,
            device_name: reader.take_fixed_str(layout::PING_DEVICE_NAME_LEN)?,
            manufacturer_name: reader.take_fixed_str(layout::PING_MANUFACTURER_NAME_LEN)?,
            application_name: reader.take_fixed_str(layout::PING_APPLICATION_NAME_LEN)?,
            hostname: reader.take_fixed_str(layout::PING_HOSTNAME_LEN)?,
            user_name: reader.take_fixed_str(layout::PING_USER_NAME_LEN)?,
            user_comment: reader.take_fixed_str(layout::PING_USER_COMMENT_LEN)?,
        })
    }

    pub fn to_payload(&self) -> Vec<u8> {
        let mut writer = VbanWriter::with_capacity(layout::SERVICE_PAYLOAD_LEN);
        writer.put_u32_le(self.application_type.value());
        writer.put_u32_le(self.features.bits());
        writer.put_u32_le(self.feature_ex);
        writer.put_u32_le(self.preferred_rate);
        writer.put_u32_le(self.min_rate);
        writer.put_u32_le(self.max_rate);
        writer.put_u32_le(self.color.packed());
        writer.put_u32_le(self.version);
        writer.put_fixed_str(&self.gps_position, layout::PING_GPS_POSITION_LEN);
        writer.put_fixed_str(&self.user_position, layout::PING_USER_POSITION_LEN);
        writer.put_fixed_str(&self.lang_code, layout::PING_LANG_CODE_LEN);
        writer.put_fixed_str(&self.reserved_ascii, layout::PING_RESERVED_ASCII_LEN);
        writer.put_fixed_str(&self.reserved_ex, layout::PING_RESERVED_EX_LEN);
        writer.put_fixed_str(&self.reserved_ex2, layout::PING_RESERVED_EX2_LEN);
        writer.put_fixed_str(&self.device_name, layout::PING_DEVICE_NAME_LEN);
        writer.put_fixed_str(&self.manufacturer_name, layout::PING_MANUFACTURER_NAME_LEN);
        writer.put_fixed_str(&self.application_name, layout::PING_APPLICATION_NAME_LEN);
        writer.put_fixed_str(&self.hostname, layout::PING_HOSTNAME_LEN);
        writer.put_fixed_str(&self.user_name, layout::PING_USER_NAME_LEN);
        writer.put_fixed_str(&self.user_comment, layout::PING_USER_COMMENT_LEN);
        writer.into_inner()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingPacket {
    pub header: ServiceHeader,
    pub data: PingData,
}

impl PingPacket {
    /// Whether a receiver should answer this ping.
    pub fn wants_reply(&self) -> bool {
        !self.header.is_reply && self.header.function == layout::SERVICE_FUNCTION_PING0
    }

    /// Identification answer carrying `identity`.
    pub fn reply(&self, identity: PingData, frame_counter: u32) -> PingPacket {
        PingPacket {
            header: ServiceHeader {
                stream_name: layout::SERVICE_STREAM_NAME.to_string(),
                frame_counter,
                function: layout::SERVICE_FUNCTION_PING0,
                is_reply: true,
            },
            data: identity,
        }
    }
}
