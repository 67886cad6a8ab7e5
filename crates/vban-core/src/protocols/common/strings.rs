/// Decode a null-padded fixed-width field.
///
/// Bytes after the first NUL are ignored; invalid UTF-8 sequences are
/// replaced rather than rejected so a single bad field never fails a whole
/// datagram.
pub fn read_fixed_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Longest prefix of `value` that fits in `width` bytes without splitting a
/// UTF-8 sequence.
pub fn truncate_to_width(value: &str, width: usize) -> &[u8] {
    if value.len() <= width {
        return value.as_bytes();
    }
    let mut end = width;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value.as_bytes()[..end]
}

/// Write `value` into a zero-filled buffer of exactly `width` bytes.
pub fn write_fixed_str(out: &mut Vec<u8>, value: &str, width: usize) {
    let bytes = truncate_to_width(value, width);
    out.extend_from_slice(bytes);
    out.resize(out.len() + (width - bytes.len()), 0);
}

/// Strip trailing NUL padding.
pub fn trim_nul_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::{read_fixed_str, trim_nul_padding, truncate_to_width, write_fixed_str};

    #[test]
    fn read_stops_at_first_nul() {
        assert_eq!(read_fixed_str(b"MIDI1\0\0\0garbage\0"), "MIDI1");
    }

    #[test]
    fn read_full_width_without_terminator() {
        assert_eq!(read_fixed_str(b"0123456789abcdef"), "0123456789abcdef");
    }

    #[test]
    fn read_keeps_surrounding_whitespace() {
        assert_eq!(read_fixed_str(b" name \0\0"), " name ");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        // "é" is two bytes; a width of 2 cannot hold "aé".
        assert_eq!(truncate_to_width("aé", 2), b"a");
        assert_eq!(truncate_to_width("aé", 3), "aé".as_bytes());
    }

    #[test]
    fn write_pads_and_truncates() {
        let mut out = Vec::new();
        write_fixed_str(&mut out, "abc", 5);
        write_fixed_str(&mut out, "overflow", 4);
        assert_eq!(out, b"abc\0\0over");
    }

    #[test]
    fn trim_only_trailing_padding() {
        assert_eq!(trim_nul_padding(b"a\0b\0\0"), b"a\0b");
        assert_eq!(trim_nul_padding(b"\0\0"), b"");
    }
}
