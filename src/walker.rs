//! Schema-free field walker.
//!
//! Turns one message body into an ordered list of `(field_number, value)`
//! pairs. The walker is pure syntax and never consults the GTFS-RT schema,
//! so the same pass serves the top-level FeedMessage and every nested
//! submessage. Length-delimited payloads are captured as raw subslices; only
//! the schema layer knows whether they are UTF-8 strings or messages.

use tracing::warn;

use crate::error::WireError;
use crate::wire::WireReader;

/// Protobuf wire type numbers.
const WIRE_VARINT: u8 = 0;
const WIRE_FIXED64: u8 = 1;
const WIRE_LENGTH_DELIMITED: u8 = 2;
const WIRE_FIXED32: u8 = 5;

/// A decoded field value, still uninterpreted.
///
/// Fixed-width values carry the raw bit pattern; whether a `Fixed64` is a
/// double or a uint64 is decided by the assembler that owns the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireValue<'a> {
    Varint(u64),
    Fixed64(u64),
    LengthDelimited(&'a [u8]),
    Fixed32(u32),
}

/// One field occurrence in wire encounter order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField<'a> {
    pub number: u32,
    pub value: WireValue<'a>,
}

/// The result of walking one message body.
///
/// `fields` holds everything parsed before the first fault; `fault` is `None`
/// for a clean walk. Returning both closes the gap where a truncated feed is
/// indistinguishable from a complete one.
#[derive(Debug, Default)]
pub struct FieldList<'a> {
    pub fields: Vec<RawField<'a>>,
    pub fault: Option<WireError>,
}

impl<'a> FieldList<'a> {
    /// First occurrence of a field number, if any.
    pub fn first(&self, number: u32) -> Option<&WireValue<'a>> {
        self.fields
            .iter()
            .find(|f| f.number == number)
            .map(|f| &f.value)
    }
}

/// Walks one message body into an ordered field list.
///
/// Upstream feeds occasionally truncate under load, so any fault degrades to
/// a partial result rather than an error: every field parsed before the cut
/// point is kept and the fault is reported alongside. Deprecated group wire
/// types (3/4) terminate the walk the same way: GTFS-RT never legitimately
/// emits them and a crash would be disproportionate.
pub fn walk(body: &[u8]) -> FieldList<'_> {
    let mut reader = WireReader::new(body);
    let mut out = FieldList::default();

    while !reader.is_at_end() {
        let key_offset = reader.position();
        let key = match reader.read_varint() {
            Ok(key) => key,
            Err(e) => {
                out.fault = Some(e);
                break;
            }
        };
        let number = (key >> 3) as u32;
        let wire_type = (key & 0x7) as u8;

        let value = match wire_type {
            WIRE_VARINT => reader.read_varint().map(WireValue::Varint),
            WIRE_FIXED64 => reader.read_fixed64().map(WireValue::Fixed64),
            WIRE_LENGTH_DELIMITED => reader
                .read_length_delimited()
                .map(WireValue::LengthDelimited),
            WIRE_FIXED32 => reader.read_fixed32().map(WireValue::Fixed32),
            // 3/4 are deprecated groups, 6/7 are not assigned.
            _ => Err(WireError::UnsupportedWireType {
                offset: key_offset,
                field_number: number,
                wire_type,
            }),
        };

        match value {
            Ok(value) => out.fields.push(RawField { number, value }),
            Err(e) => {
                out.fault = Some(e);
                break;
            }
        }
    }

    if let Some(fault) = &out.fault {
        warn!(
            parsed = out.fields.len(),
            %fault,
            "walk degraded to partial field list"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::{self, MessageBuilder};

    #[test]
    fn test_empty_body() {
        let list = walk(&[]);
        assert!(list.fields.is_empty());
        assert!(list.fault.is_none());
    }

    #[test]
    fn test_single_varint_field() {
        let body = MessageBuilder::new().varint(3, 150).build();
        let list = walk(&body);
        assert!(list.fault.is_none());
        assert_eq!(
            list.fields,
            vec![RawField {
                number: 3,
                value: WireValue::Varint(150)
            }]
        );
    }

    #[test]
    fn test_all_wire_types() {
        let body = MessageBuilder::new()
            .varint(1, 42)
            .fixed64(2, 0x0102_0304_0506_0708)
            .bytes(3, b"hi")
            .fixed32(4, 0xDEAD_BEEF)
            .build();
        let list = walk(&body);
        assert!(list.fault.is_none());
        assert_eq!(list.fields.len(), 4);
        assert_eq!(list.first(2), Some(&WireValue::Fixed64(0x0102_0304_0506_0708)));
        assert_eq!(
            list.first(3),
            Some(&WireValue::LengthDelimited(b"hi".as_slice()))
        );
        assert_eq!(list.first(4), Some(&WireValue::Fixed32(0xDEAD_BEEF)));
    }

    #[test]
    fn test_repeated_fields_kept_in_order() {
        for n in [0usize, 1, 5] {
            let mut b = MessageBuilder::new();
            for i in 0..n {
                b = b.varint(7, i as u64);
            }
            let body = b.build();
            let list = walk(&body);
            let values: Vec<_> = list.fields.iter().filter(|f| f.number == 7).collect();
            assert_eq!(values.len(), n);
            for (i, f) in values.iter().enumerate() {
                assert_eq!(f.value, WireValue::Varint(i as u64));
            }
        }
    }

    #[test]
    fn test_truncated_mid_varint_keeps_prefix() {
        let mut body = MessageBuilder::new().varint(1, 5).build();
        body.extend_from_slice(&[0x10, 0x80]); // field 2, varint with no final byte
        let list = walk(&body);
        assert_eq!(list.fields.len(), 1);
        assert!(matches!(
            list.fault,
            Some(WireError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_length_overrun_keeps_prefix() {
        let mut body = MessageBuilder::new().varint(1, 5).build();
        body.extend_from_slice(&[0x12, 0x09, b'x']); // claims 9 bytes, has 1
        let list = walk(&body);
        assert_eq!(list.fields.len(), 1);
        assert!(matches!(list.fault, Some(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_group_wire_type_terminates_walk() {
        let mut body = MessageBuilder::new().varint(1, 5).build();
        body.extend_from_slice(&synthetic::tag(2, 3)); // start-group
        body.extend_from_slice(&MessageBuilder::new().varint(4, 9).build());
        let list = walk(&body);
        // Fail-soft: fields before the group survive, nothing after is read.
        assert_eq!(list.fields.len(), 1);
        assert_eq!(
            list.fault,
            Some(WireError::UnsupportedWireType {
                offset: 2,
                field_number: 2,
                wire_type: 3
            })
        );
    }

    #[test]
    fn test_identical_input_identical_output() {
        let body = MessageBuilder::new()
            .varint(1, 1)
            .bytes(2, b"abc")
            .varint(1, 2)
            .build();
        let a = walk(&body);
        let b = walk(&body);
        assert_eq!(a.fields, b.fields);
    }
}
