//! VBAN datagram codec.
//!
//! A datagram is a fixed 28-byte header followed by at most 1436 payload
//! bytes. Byte 4 packs the sub-protocol tag (top three bits) with a rate or
//! bit-speed index (low five bits); bytes 5..=7 are interpreted per
//! sub-protocol, which is where audio, serial, text and service packets
//! diverge. Service packets dispatch a second time on their service type.
//!
//! Decoding is lenient about what it does not know: unknown sub-protocol
//! tags and service types become [`UnknownPacket`]s that re-encode byte for
//! byte. It is strict about what it does know: a reserved table index or a
//! short identification payload is an error. Encoding is all-or-nothing and
//! enforces the payload limit.
//!
//! Offsets and masks live in `layout`, bounds-checked access in `reader`,
//! index tables in `tables`.

pub mod audio;
pub mod error;
pub mod frame_counter;
pub mod header;
pub mod layout;
pub mod packet;
pub mod reader;
pub mod serial;
pub mod service;
pub mod tables;
pub mod text;
pub mod unknown;

pub use audio::{AudioPacket, Codec};
pub use error::{HeaderError, LookupError, LookupKey, VbanError};
pub use frame_counter::{FrameCounterEvent, FrameCounterTracker, FrameCounters, next_counter};
pub use header::{CommonHeader, SubProtocol, build_header, parse_header, split_datagram};
pub use packet::{Packet, decode, encode};
pub use serial::{DataFormat, SerialBitMode, SerialPacket, SerialStreamType, StopBits};
pub use service::{
    ApplicationType, ChatPacket, PingColor, PingData, PingFeatures, PingPacket, RealTimePacket,
    RealTimeRegisterAnswerPacket, RealTimeRegisterPacket, RegisterAnswer, RequestReplyPacket,
    ServiceHeader, ServicePacket, ServiceType,
};
pub use tables::{BIT_RESOLUTIONS, BIT_SPEEDS, BitResolution, LookupTable, SAMPLE_RATES};
pub use text::{TextContent, TextEncoding, TextPacket};
pub use unknown::UnknownPacket;
