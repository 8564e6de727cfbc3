//! Cursor-based primitives over a protobuf-encoded byte buffer.
//!
//! [`WireReader`] knows nothing about GTFS-RT. It reads varints, fixed-width
//! scalars, and length-delimited slices, and reports how far it has advanced.
//! Fixed-width reads return the raw little-endian bit pattern; interpreting
//! it (float, double, unsigned) is the schema layer's job.

use crate::error::WireError;

/// Longest legal varint: 64 payload bits in 7-bit groups.
const MAX_VARINT_BYTES: usize = 10;

/// A forward-only cursor over an immutable byte buffer.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Wraps a buffer, starting at offset 0.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in the buffer.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True once the cursor has consumed the whole buffer.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Reads a base-128 varint with full 64-bit accumulation.
    ///
    /// GTFS timestamps and negative int32 fields need more than 32 bits of
    /// payload; a 32-bit accumulator would truncate them silently.
    ///
    /// # Errors
    ///
    /// [`WireError::MalformedVarint`] if the buffer ends while the
    /// continuation bit is set, or the varint runs past ten bytes.
    pub fn read_varint(&mut self) -> Result<u64, WireError> {
        let start = self.pos;
        let mut value: u64 = 0;
        let mut shift: u32 = 0;

        while self.pos < self.buf.len() && self.pos - start < MAX_VARINT_BYTES {
            let byte = self.buf[self.pos];
            self.pos += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }

        self.pos = start;
        Err(WireError::MalformedVarint { offset: start })
    }

    /// Reads a little-endian 32-bit scalar, returning the raw bit pattern.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than four bytes remain.
    pub fn read_fixed32(&mut self) -> Result<u32, WireError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a little-endian 64-bit scalar, returning the raw bit pattern.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if fewer than eight bytes remain.
    pub fn read_fixed64(&mut self) -> Result<u64, WireError> {
        let b = self.take(8)?;
        Ok(u64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    /// Reads a varint length followed by that many raw bytes.
    ///
    /// Returns a subslice of the input, not a copy: submessage bytes get
    /// re-walked by the field walker and strings decode in place.
    ///
    /// # Errors
    ///
    /// [`WireError::MalformedVarint`] for a bad length prefix,
    /// [`WireError::UnexpectedEof`] if the declared length overruns the
    /// buffer.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], WireError> {
        let start = self.pos;
        let len = self.read_varint()?;
        // A length that does not fit usize cannot fit the buffer either;
        // saturate and let the bounds check below report it.
        let len = usize::try_from(len).unwrap_or(usize::MAX);
        match self.take(len) {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                self.pos = start;
                Err(e)
            }
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < len {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_single_byte() {
        let mut r = WireReader::new(&[0x00]);
        assert_eq!(r.read_varint().unwrap(), 0);
        assert!(r.is_at_end());

        let mut r = WireReader::new(&[0x7F]);
        assert_eq!(r.read_varint().unwrap(), 127);
    }

    #[test]
    fn test_varint_multi_byte() {
        // 300 = 0b10_0101100 -> 0xAC 0x02
        let mut r = WireReader::new(&[0xAC, 0x02]);
        assert_eq!(r.read_varint().unwrap(), 300);
        assert_eq!(r.position(), 2);
    }

    #[test]
    fn test_varint_needs_64_bits() {
        // 1700000000 (a GTFS timestamp) is fine in 32 bits, but u64::MAX
        // needs the full ten-byte encoding.
        let max = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01];
        let mut r = WireReader::new(&max);
        assert_eq!(r.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_varint_truncated() {
        let mut r = WireReader::new(&[0x80]);
        assert_eq!(
            r.read_varint().unwrap_err(),
            WireError::MalformedVarint { offset: 0 }
        );
        // Cursor rewinds so the caller can report a stable offset.
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_fixed32_little_endian() {
        let mut r = WireReader::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(r.read_fixed32().unwrap(), 0x0403_0201);
    }

    #[test]
    fn test_fixed32_as_float() {
        let bits = 35.1_f32.to_le_bytes();
        let mut r = WireReader::new(&bits);
        assert_eq!(f32::from_bits(r.read_fixed32().unwrap()), 35.1);
    }

    #[test]
    fn test_fixed64_short_buffer() {
        let mut r = WireReader::new(&[0x00; 5]);
        assert_eq!(
            r.read_fixed64().unwrap_err(),
            WireError::UnexpectedEof {
                offset: 0,
                needed: 8,
                available: 5
            }
        );
    }

    #[test]
    fn test_length_delimited_is_subslice() {
        let buf = [0x03, b'a', b'b', b'c', 0xFF];
        let mut r = WireReader::new(&buf);
        let slice = r.read_length_delimited().unwrap();
        assert_eq!(slice, b"abc");
        assert_eq!(r.position(), 4);
        // Zero-copy: the slice points into the original buffer.
        assert!(std::ptr::eq(slice.as_ptr(), buf[1..].as_ptr()));
    }

    #[test]
    fn test_length_delimited_overrun() {
        let mut r = WireReader::new(&[0x05, b'a', b'b']);
        assert_eq!(
            r.read_length_delimited().unwrap_err(),
            WireError::UnexpectedEof {
                offset: 1,
                needed: 5,
                available: 2
            }
        );
    }
}
