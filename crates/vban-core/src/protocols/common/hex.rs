use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("odd number of hex digits ({digits})")]
    OddLength { digits: usize },
    #[error("invalid hex digit {found:?} at position {position}")]
    InvalidDigit { found: char, position: usize },
}

/// Render bytes as upper-case, space-separated hex pairs (`"00 01 FF"`).
///
/// # Examples
/// ```
/// use vban_core::hex_dump;
///
/// assert_eq!(hex_dump(&[0x00, 0x01, 0xff]), "00 01 FF");
/// ```
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (idx, byte) in bytes.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}

/// Render bytes as contiguous lower-case hex, the form `parse_hex` reads back.
///
/// # Examples
/// ```
/// use vban_core::to_hex;
///
/// assert_eq!(to_hex(b"VBAN"), "5642414e");
/// ```
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parse hex digits into bytes, ignoring any whitespace between them.
///
/// # Examples
/// ```
/// use vban_core::parse_hex;
///
/// assert_eq!(parse_hex("56 42\n41 4e").unwrap(), b"VBAN");
/// assert!(parse_hex("564").is_err());
/// ```
///
/// # Errors
/// Returns `HexError` on an odd digit count or a non-hex character.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let mut digits = Vec::with_capacity(input.len());
    for (position, ch) in input.chars().enumerate() {
        if ch.is_whitespace() {
            continue;
        }
        let value = ch
            .to_digit(16)
            .ok_or(HexError::InvalidDigit { found: ch, position })?;
        digits.push(value as u8);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddLength {
            digits: digits.len(),
        });
    }
    Ok(digits
        .chunks_exact(2)
        .map(|pair| (pair[0] << 4) | pair[1])
        .collect())
}
