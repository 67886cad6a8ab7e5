use std::fmt;

use thiserror::Error;

/// Failures of the fixed 28-byte header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("datagram too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("bad identification {found:02x?}, expected \"VBAN\"")]
    BadIdentification { found: [u8; 4] },
}

/// Key that had no entry in a lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Wire index seen while decoding.
    Index(u8),
    /// Semantic value given while encoding.
    Value(String),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Index(index) => write!(f, "index {index}"),
            LookupKey::Value(value) => write!(f, "value {value}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown sample rate ({0})")]
    UnknownSampleRate(LookupKey),
    #[error("unknown bit speed ({0})")]
    UnknownBitSpeed(LookupKey),
    #[error("unknown bit resolution ({0})")]
    UnknownBitResolution(LookupKey),
    #[error("unknown codec ({0})")]
    UnknownCodec(LookupKey),
    #[error("unknown data format ({0})")]
    UnknownFormat(LookupKey),
    #[error("unknown stream type ({0})")]
    UnknownStreamType(LookupKey),
    #[error("unknown text encoding ({0})")]
    UnknownTextEncoding(LookupKey),
}

impl LookupError {
    pub fn key(&self) -> &LookupKey {
        match self {
            LookupError::UnknownSampleRate(key)
            | LookupError::UnknownBitSpeed(key)
            | LookupError::UnknownBitResolution(key)
            | LookupError::UnknownCodec(key)
            | LookupError::UnknownFormat(key)
            | LookupError::UnknownStreamType(key)
            | LookupError::UnknownTextEncoding(key) => key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::UnknownSampleRate(_) => "unknown-sample-rate",
            LookupError::UnknownBitSpeed(_) => "unknown-bit-speed",
            LookupError::UnknownBitResolution(_) => "unknown-bit-resolution",
            LookupError::UnknownCodec(_) => "unknown-codec",
            LookupError::UnknownFormat(_) => "unknown-format",
            LookupError::UnknownStreamType(_) => "unknown-stream-type",
            LookupError::UnknownTextEncoding(_) => "unknown-text-encoding",
        }
    }
}

/// Errors returned by VBAN decoding and encoding.
///
/// Every variant maps to a stable identifier through [`VbanError::kind`],
/// which capture analysis uses to aggregate failures.
///
/// # Examples
/// ```
/// use vban_core::{VbanError, decode};
///
/// let err = decode(b"NOPE").unwrap_err();
/// assert!(matches!(err, VbanError::InvalidHeader(_)));
/// assert_eq!(err.kind(), "invalid-header");
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VbanError {
    #[error("invalid header: {0}")]
    InvalidHeader(#[from] HeaderError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TruncatedPayload { needed: usize, actual: usize },
    #[error("payload too large: {actual} bytes, max {max}")]
    PayloadTooLarge { actual: usize, max: usize },
    #[error("no encoder for sub-protocol tag {tag:#04x}")]
    UnroutablePacket { tag: u8 },
    #[error("invalid stop mode {value}, expected 1, 1.5 or 2")]
    InvalidStopMode { value: f32 },
    #[error("{field} {value} out of range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

impl VbanError {
    pub fn kind(&self) -> &'static str {
        match self {
            VbanError::InvalidHeader(_) => "invalid-header",
            VbanError::Lookup(err) => err.kind(),
            VbanError::TruncatedPayload { .. } => "truncated-payload",
            VbanError::PayloadTooLarge { .. } => "payload-too-large",
            VbanError::UnroutablePacket { .. } => "unroutable-packet",
            VbanError::InvalidStopMode { .. } => "invalid-stop-mode",
            VbanError::OutOfRange { .. } => "out-of-range",
        }
    }

    pub(crate) fn out_of_range(field: &'static str, value: u64, min: u64, max: u64) -> Self {
        VbanError::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }
}
