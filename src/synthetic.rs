//! Hand-built protobuf encoders for constructing test feeds.
//!
//! The decoder never needs to emit wire bytes, but its tests and fixtures do.
//! [`MessageBuilder`] encodes the handful of shapes the GTFS-RT schema uses;
//! it makes no attempt at full protobuf coverage.

/// Encodes a value as a base-128 varint.
pub fn varint(mut v: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(10);
    loop {
        let byte = (v & 0x7F) as u8;
        v >>= 7;
        if v == 0 {
            out.push(byte);
            return out;
        }
        out.push(byte | 0x80);
    }
}

/// Encodes a field key: `(field_number << 3) | wire_type`.
pub fn tag(field: u32, wire_type: u8) -> Vec<u8> {
    varint(u64::from(field) << 3 | u64::from(wire_type))
}

/// Accumulates encoded fields into one message body.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a varint field (wire type 0).
    pub fn varint(mut self, field: u32, v: u64) -> Self {
        self.buf.extend_from_slice(&tag(field, 0));
        self.buf.extend_from_slice(&varint(v));
        self
    }

    /// Appends an int32 field, sign-extended to 64 bits as proto2 does.
    pub fn int32(self, field: u32, v: i32) -> Self {
        self.varint(field, v as i64 as u64)
    }

    /// Appends a fixed64 field (wire type 1) from a raw bit pattern.
    pub fn fixed64(mut self, field: u32, bits: u64) -> Self {
        self.buf.extend_from_slice(&tag(field, 1));
        self.buf.extend_from_slice(&bits.to_le_bytes());
        self
    }

    /// Appends an IEEE double as a fixed64 field.
    pub fn double(self, field: u32, v: f64) -> Self {
        self.fixed64(field, v.to_bits())
    }

    /// Appends a length-delimited field (wire type 2).
    pub fn bytes(mut self, field: u32, payload: &[u8]) -> Self {
        self.buf.extend_from_slice(&tag(field, 2));
        self.buf.extend_from_slice(&varint(payload.len() as u64));
        self.buf.extend_from_slice(payload);
        self
    }

    /// Appends a UTF-8 string as a length-delimited field.
    pub fn string(self, field: u32, s: &str) -> Self {
        self.bytes(field, s.as_bytes())
    }

    /// Appends a nested message as a length-delimited field.
    pub fn message(self, field: u32, nested: MessageBuilder) -> Self {
        let body = nested.build();
        self.bytes(field, &body)
    }

    /// Appends a fixed32 field (wire type 5) from a raw bit pattern.
    pub fn fixed32(mut self, field: u32, bits: u32) -> Self {
        self.buf.extend_from_slice(&tag(field, 5));
        self.buf.extend_from_slice(&bits.to_le_bytes());
        self
    }

    /// Appends an IEEE float as a fixed32 field.
    pub fn float(self, field: u32, v: f32) -> Self {
        self.fixed32(field, v.to_bits())
    }

    /// Finishes the message body.
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::WireReader;

    #[test]
    fn test_varint_round_trip() {
        // Boundary values around each continuation-byte threshold.
        for v in [
            0u64,
            1,
            127,
            128,
            16383,
            16384,
            (1 << 31) - 1,
            (1 << 32) - 1,
        ] {
            let encoded = varint(v);
            let mut r = WireReader::new(&encoded);
            assert_eq!(r.read_varint().unwrap(), v, "value {v}");
            assert!(r.is_at_end());
        }
    }

    #[test]
    fn test_varint_known_encodings() {
        assert_eq!(varint(0), vec![0x00]);
        assert_eq!(varint(127), vec![0x7F]);
        assert_eq!(varint(128), vec![0x80, 0x01]);
        assert_eq!(varint(300), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_int32_sign_extends() {
        // -1 encodes as the full ten-byte varint in proto2.
        let body = MessageBuilder::new().int32(1, -1).build();
        assert_eq!(body.len(), 1 + 10);
        let mut r = WireReader::new(&body[1..]);
        assert_eq!(r.read_varint().unwrap(), u64::MAX);
    }

    #[test]
    fn test_nested_message_layout() {
        let body = MessageBuilder::new()
            .message(2, MessageBuilder::new().varint(1, 7))
            .build();
        // tag(2,2), length 2, then tag(1,0) + value.
        assert_eq!(body, vec![0x12, 0x02, 0x08, 0x07]);
    }
}
