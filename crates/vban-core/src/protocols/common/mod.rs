//! Byte helpers shared by protocol decoders.

pub mod hex;
pub mod strings;

pub use hex::{HexError, hex_dump, parse_hex, to_hex};
