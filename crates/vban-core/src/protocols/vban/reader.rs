use std::ops::Range;

use super::error::VbanError;
use crate::protocols::common::strings::{read_fixed_str, write_fixed_str};

/// Bounds-checked view over a VBAN payload.
///
/// Offset reads (`read_*`) leave the cursor untouched; sequential reads
/// (`take*`) advance it. Every read checks bounds and reports how many bytes
/// were needed.
pub struct VbanReader<'a> {
    payload: &'a [u8],
    cursor: usize,
}

impl<'a> VbanReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, cursor: 0 }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), VbanError> {
        if self.payload.len() < needed {
            return Err(self.too_short(needed));
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, VbanError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(self.too_short(offset + 1))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], VbanError> {
        self.payload
            .get(range.clone())
            .ok_or(self.too_short(range.end))
    }

    pub fn read_u32_le(&self, range: Range<usize>) -> Result<u32, VbanError> {
        let bytes = self.read_slice(range)?;
        let bytes: [u8; 4] = bytes.try_into().map_err(|_| VbanError::TruncatedPayload {
            needed: 4,
            actual: bytes.len(),
        })?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], VbanError> {
        let end = self
            .cursor
            .checked_add(len)
            .ok_or(self.too_short(usize::MAX))?;
        let bytes = self.read_slice(self.cursor..end)?;
        self.cursor = end;
        Ok(bytes)
    }

    pub fn take_u32_le(&mut self) -> Result<u32, VbanError> {
        let start = self.cursor;
        let value = self.read_u32_le(start..start + 4)?;
        self.cursor += 4;
        Ok(value)
    }

    /// Read a null-padded string field of `width` bytes.
    pub fn take_fixed_str(&mut self, width: usize) -> Result<String, VbanError> {
        self.take(width).map(read_fixed_str)
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    fn too_short(&self, needed: usize) -> VbanError {
        VbanError::TruncatedPayload {
            needed,
            actual: self.payload.len(),
        }
    }
}

/// Append-only payload builder mirroring [`VbanReader`].
#[derive(Debug, Default)]
pub struct VbanWriter {
    buf: Vec<u8>,
}

impl VbanWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn put_u32_le(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write `value` truncated or null-padded to exactly `width` bytes.
    pub fn put_fixed_str(&mut self, value: &str, width: usize) {
        write_fixed_str(&mut self.buf, value, width);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::{VbanReader, VbanWriter};
    use crate::protocols::vban::error::VbanError;

    #[test]
    fn read_u8_out_of_bounds() {
        let reader = VbanReader::new(&[1, 2]);
        assert_eq!(reader.read_u8(1).unwrap(), 2);
        assert_eq!(
            reader.read_u8(2).unwrap_err(),
            VbanError::TruncatedPayload {
                needed: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn sequential_reads_advance() {
        let bytes = [0x01, 0x00, 0x00, 0x00, b'a', b'b', 0, 0, 0xff];
        let mut reader = VbanReader::new(&bytes);
        assert_eq!(reader.take_u32_le().unwrap(), 1);
        assert_eq!(reader.take_fixed_str(4).unwrap(), "ab");
        assert_eq!(reader.position(), 8);
        assert_eq!(reader.read_u8(8).unwrap(), 0xff);
    }

    #[test]
    fn take_past_end_does_not_advance() {
        let bytes = [0u8; 3];
        let mut reader = VbanReader::new(&bytes);
        let err = reader.take_u32_le().unwrap_err();
        assert!(matches!(err, VbanError::TruncatedPayload { needed: 4, actual: 3 }));
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.take(3).unwrap().len(), 3);
        assert_eq!(reader.position(), 3);
    }

    #[test]
    fn require_len_reports_sizes() {
        let reader = VbanReader::new(&[0u8; 10]);
        assert!(reader.require_len(10).is_ok());
        let msg = reader.require_len(676).unwrap_err().to_string();
        assert!(msg.contains("need 676 bytes, got 10"));
    }

    #[test]
    fn writer_fixed_width_fields() {
        let mut writer = VbanWriter::with_capacity(16);
        writer.put_u32_le(0x0102_0304);
        writer.put_fixed_str("fr-fr", 8);
        assert_eq!(
            writer.into_inner(),
            [4, 3, 2, 1, b'f', b'r', b'-', b'f', b'r', 0, 0, 0]
        );
    }
}
