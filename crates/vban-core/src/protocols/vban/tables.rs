//! Index tables for the packed header fields.
//!
//! Each table maps a 5-bit (or 3-bit) wire index to its semantic value.
//! Reserved slots are `None`; forward lookups of those slots and reverse
//! lookups of values with no slot both fail with the table's `LookupError`.
//! Reverse maps are built on first use and never mutated afterwards.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::error::{LookupError, LookupKey};

pub struct LookupTable<T: 'static> {
    slots: &'static [Option<T>],
    reverse: HashMap<T, u8>,
    missing: fn(LookupKey) -> LookupError,
}

impl<T> LookupTable<T>
where
    T: Copy + Eq + Hash + fmt::Display,
{
    fn new(slots: &'static [Option<T>], missing: fn(LookupKey) -> LookupError) -> Self {
        let reverse = slots
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (value, index as u8)))
            .collect();
        Self {
            slots,
            reverse,
            missing,
        }
    }

    pub fn value(&self, index: u8) -> Result<T, LookupError> {
        self.slots
            .get(index as usize)
            .copied()
            .flatten()
            .ok_or_else(|| (self.missing)(LookupKey::Index(index)))
    }

    pub fn index_of(&self, value: T) -> Result<u8, LookupError> {
        self.reverse
            .get(&value)
            .copied()
            .ok_or_else(|| (self.missing)(LookupKey::Value(value.to_string())))
    }

    /// Defined `(index, value)` pairs in index order.
    pub fn entries(&self) -> impl Iterator<Item = (u8, T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.map(|value| (index as u8, value)))
    }

    /// Number of slots, reserved ones included.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

static SAMPLE_RATE_SLOTS: [Option<u32>; 32] = [
    Some(6000),
    Some(12000),
    Some(24000),
    Some(48000),
    Some(96000),
    Some(192000),
    Some(384000),
    Some(8000),
    Some(16000),
    Some(32000),
    Some(64000),
    Some(128000),
    Some(256000),
    Some(512000),
    Some(11025),
    Some(22050),
    Some(44100),
    Some(88200),
    Some(176400),
    Some(352800),
    Some(705600),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

static BIT_SPEED_SLOTS: [Option<u32>; 32] = [
    Some(0),
    Some(110),
    Some(150),
    Some(300),
    Some(600),
    Some(1200),
    Some(2400),
    Some(4800),
    Some(9600),
    Some(14400),
    Some(19200),
    Some(31250),
    Some(38400),
    Some(57600),
    Some(115200),
    Some(128000),
    Some(230400),
    Some(250000),
    Some(256000),
    Some(460800),
    Some(921600),
    Some(1000000),
    Some(1500000),
    Some(2000000),
    Some(3000000),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

static BIT_RESOLUTION_SLOTS: [Option<BitResolution>; 8] = [
    Some(BitResolution::BYTE8),
    Some(BitResolution::INT16),
    Some(BitResolution::INT24),
    Some(BitResolution::INT32),
    Some(BitResolution::FLOAT32),
    Some(BitResolution::FLOAT64),
    Some(BitResolution::BITS12),
    Some(BitResolution::BITS10),
];

/// Audio sample rates in Hz, indexed by the 5-bit rate field.
pub static SAMPLE_RATES: LazyLock<LookupTable<u32>> =
    LazyLock::new(|| LookupTable::new(&SAMPLE_RATE_SLOTS, LookupError::UnknownSampleRate));

/// Serial and text bit speeds in bits per second; index 0 means unspecified.
pub static BIT_SPEEDS: LazyLock<LookupTable<u32>> =
    LazyLock::new(|| LookupTable::new(&BIT_SPEED_SLOTS, LookupError::UnknownBitSpeed));

pub static BIT_RESOLUTIONS: LazyLock<LookupTable<BitResolution>> = LazyLock::new(|| {
    LookupTable::new(&BIT_RESOLUTION_SLOTS, LookupError::UnknownBitResolution)
});

/// Audio sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitResolution {
    pub bit_depth: u8,
    pub signed: bool,
    pub float: bool,
}

impl BitResolution {
    pub const BYTE8: Self = Self::new(8, false, false);
    pub const INT16: Self = Self::new(16, true, false);
    pub const INT24: Self = Self::new(24, true, false);
    pub const INT32: Self = Self::new(32, true, false);
    pub const FLOAT32: Self = Self::new(32, true, true);
    pub const FLOAT64: Self = Self::new(64, true, true);
    pub const BITS12: Self = Self::new(12, true, false);
    pub const BITS10: Self = Self::new(10, true, false);

    pub const fn new(bit_depth: u8, signed: bool, float: bool) -> Self {
        Self {
            bit_depth,
            signed,
            float,
        }
    }

    /// Whole bytes per sample, `None` for the packed 10 and 12 bit formats.
    pub fn bytes_per_sample(&self) -> Option<usize> {
        if self.bit_depth % 8 == 0 {
            Some(self.bit_depth as usize / 8)
        } else {
            None
        }
    }
}

impl fmt::Display for BitResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.float, self.signed) {
            (true, _) => "float",
            (false, true) => "signed int",
            (false, false) => "unsigned int",
        };
        write!(f, "{}-bit {kind}", self.bit_depth)
    }
}
