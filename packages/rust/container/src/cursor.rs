//! Sequential, bounds-checked reader over a byte slice.

use byteorder::{ByteOrder, LittleEndian};

use helpbook_shared::{HelpBookError, Result};

/// Width of a length field: 8 hex digits followed by one terminator byte.
pub const HEX_LENGTH_WIDTH: usize = 9;

const HEX_DIGITS: usize = 8;

/// Cursor over container bytes.
///
/// Every read checks its bounds; running past the end is a format error,
/// never a panic.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Jump to an absolute offset.
    pub fn seek(&mut self, offset: usize) -> Result<()> {
        if offset > self.data.len() {
            return Err(HelpBookError::format(format!(
                "seek to {offset} past end of {} bytes",
                self.data.len()
            )));
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count, "skip").map(|_| ())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count, "read")
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.take(4, "i32").map(LittleEndian::read_i32)
    }

    /// Read an 8-digit ASCII hex length and its terminator byte.
    pub fn read_hex_length(&mut self) -> Result<usize> {
        let at = self.pos;
        let field = self.take(HEX_LENGTH_WIDTH, "length field")?;
        let digits = std::str::from_utf8(&field[..HEX_DIGITS])
            .ok()
            .filter(|s| s.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| {
                HelpBookError::format(format!("length field at {at} is not 8 hex digits"))
            })?;
        usize::from_str_radix(digits, 16)
            .map_err(|e| HelpBookError::format(format!("length field at {at}: {e}")))
    }

    fn take(&mut self, count: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                HelpBookError::format(format!(
                    "{what} of {count} bytes at {} overruns {} bytes",
                    self.pos,
                    self.data.len()
                ))
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_integers() {
        let mut cursor = ByteCursor::new(&[0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0x7f]);
        assert_eq!(cursor.read_i32_le().unwrap(), 1);
        assert_eq!(cursor.read_i32_le().unwrap(), i32::MAX);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn hex_length_consumes_terminator() {
        let mut cursor = ByteCursor::new(b"0000001f 00000200 ");
        assert_eq!(cursor.read_hex_length().unwrap(), 0x1f);
        assert_eq!(cursor.position(), HEX_LENGTH_WIDTH);
        assert_eq!(cursor.read_hex_length().unwrap(), 0x200);
    }

    #[test]
    fn non_hex_length_is_a_format_error() {
        let mut cursor = ByteCursor::new(b"0000zz1f ");
        let err = cursor.read_hex_length().unwrap_err();
        assert!(matches!(err, HelpBookError::Format { .. }));
    }

    #[test]
    fn overrun_is_an_error_not_a_panic() {
        let mut cursor = ByteCursor::new(&[1, 2, 3]);
        assert!(cursor.read_i32_le().is_err());
        assert_eq!(cursor.position(), 0);
        assert!(cursor.skip(usize::MAX).is_err());
        assert!(cursor.seek(4).is_err());
        cursor.seek(3).unwrap();
        assert_eq!(cursor.read_bytes(0).unwrap(), &[] as &[u8]);
    }
}
