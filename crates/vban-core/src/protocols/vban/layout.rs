use std::ops::Range;

pub const VBAN_ID: &[u8; 4] = b"VBAN";
pub const DEFAULT_PORT: u16 = 6980;

pub const HEADER_LEN: usize = 28;
pub const MAX_PAYLOAD_LEN: usize = 1436;
pub const MAX_DATAGRAM_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN;

pub const ID_RANGE: Range<usize> = 0..4;
pub const SR_SUB_PROTOCOL_OFFSET: usize = 4;
pub const PART1_OFFSET: usize = 5;
pub const PART2_OFFSET: usize = 6;
pub const PART3_OFFSET: usize = 7;
pub const STREAM_NAME_RANGE: Range<usize> = 8..24;
pub const STREAM_NAME_LEN: usize = 16;
pub const FRAME_COUNTER_RANGE: Range<usize> = 24..28;

pub const MAX_FRAME_COUNTER: u32 = u32::MAX;

// Byte 4
pub const SUB_PROTOCOL_MASK: u8 = 0xe0;
pub const RATE_INDEX_MASK: u8 = 0x1f;
pub const MAX_RATE_INDEX: u8 = RATE_INDEX_MASK;

pub const SUB_PROTOCOL_AUDIO: u8 = 0x00;
pub const SUB_PROTOCOL_SERIAL: u8 = 0x20;
pub const SUB_PROTOCOL_TEXT: u8 = 0x40;
pub const SUB_PROTOCOL_SERVICE: u8 = 0x60;

// Part 3 split shared by audio, serial and text.
pub const PART3_LOW_MASK: u8 = 0x07;
pub const PART3_HIGH_MASK: u8 = 0xf0;

// Serial bit mode (part 1).
pub const STOP_MODE_MASK: u8 = 0x03;
pub const START_BIT: u8 = 0x04;
pub const PARITY_BIT: u8 = 0x08;
pub const MULTIPART_BIT: u8 = 0x80;

// Service part 1.
pub const REPLY_BIT: u8 = 0x80;
pub const SERVICE_FUNCTION_MASK: u8 = 0x7f;
pub const SERVICE_FUNCTION_PING0: u8 = 0x00;
pub const SERVICE_STREAM_NAME: &str = "VBAN Service";

pub const SERVICE_IDENTIFICATION: u8 = 0x00;
pub const SERVICE_CHAT_UTF8: u8 = 0x01;
pub const SERVICE_REQUEST_REPLY: u8 = 0x02;
pub const SERVICE_RT_PACKET_REGISTER: u8 = 0x20;
pub const SERVICE_RT_PACKET: u8 = 0x21;

/// Fixed payload size of identification and chat services.
pub const SERVICE_PAYLOAD_LEN: usize = 676;

// Identification payload: eight little-endian u32 followed by fixed-width strings.
pub const PING_NUMERIC_LEN: usize = 8 * 4;
pub const PING_GPS_POSITION_LEN: usize = 8;
pub const PING_USER_POSITION_LEN: usize = 8;
pub const PING_LANG_CODE_LEN: usize = 8;
pub const PING_RESERVED_ASCII_LEN: usize = 8;
pub const PING_RESERVED_EX_LEN: usize = 64;
pub const PING_RESERVED_EX2_LEN: usize = 36;
pub const PING_DEVICE_NAME_LEN: usize = 64;
pub const PING_MANUFACTURER_NAME_LEN: usize = 64;
pub const PING_APPLICATION_NAME_LEN: usize = 64;
pub const PING_HOSTNAME_LEN: usize = 64;
pub const PING_USER_NAME_LEN: usize = 128;
pub const PING_USER_COMMENT_LEN: usize = 128;

const _: () = assert!(
    PING_NUMERIC_LEN
        + PING_GPS_POSITION_LEN
        + PING_USER_POSITION_LEN
        + PING_LANG_CODE_LEN
        + PING_RESERVED_ASCII_LEN
        + PING_RESERVED_EX_LEN
        + PING_RESERVED_EX2_LEN
        + PING_DEVICE_NAME_LEN
        + PING_MANUFACTURER_NAME_LEN
        + PING_APPLICATION_NAME_LEN
        + PING_HOSTNAME_LEN
        + PING_USER_NAME_LEN
        + PING_USER_COMMENT_LEN
        == SERVICE_PAYLOAD_LEN
);
