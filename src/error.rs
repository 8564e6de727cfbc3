//! Error taxonomy for the wire decoder.
//!
//! Faults never abort a decode. The walker degrades to a partial field list
//! and reports the fault as a [`WireError`]; the assemblers collect those
//! into [`Diagnostic`] values so callers can tell a clean decode apart from a
//! truncated one.

use thiserror::Error;

/// A fault encountered while reading the protobuf wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended while a varint's continuation bit was still set.
    #[error("buffer ended mid-varint at offset {offset}")]
    MalformedVarint {
        /// Offset where the varint started.
        offset: usize,
    },

    /// A field's declared length extends past the end of the buffer.
    #[error("field needs {needed} bytes at offset {offset} but only {available} remain")]
    UnexpectedEof {
        /// Offset where the read started.
        offset: usize,
        /// Bytes the field claimed.
        needed: usize,
        /// Bytes actually remaining.
        available: usize,
    },

    /// A deprecated group wire type (3 or 4) was encountered.
    #[error("unsupported wire type {wire_type} on field {field_number} at offset {offset}")]
    UnsupportedWireType {
        /// Offset of the field key.
        offset: usize,
        /// Field number carrying the unsupported type.
        field_number: u32,
        /// The offending wire type.
        wire_type: u8,
    },
}

/// A non-fatal condition recorded during a decode.
///
/// The `context` names the message type being assembled when the fault
/// occurred (e.g. `"VehiclePosition"`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A message body could only be partially walked.
    #[error("{context}: {error}")]
    Truncated {
        /// Message type whose body was being walked.
        context: &'static str,
        /// The underlying wire fault.
        error: WireError,
    },

    /// The feed carried more entities than the configured cap.
    #[error("entity limit of {limit} reached, remaining entities dropped")]
    EntityLimitReached {
        /// The configured cap.
        limit: usize,
    },

    /// A submessage was nested deeper than the configured cap.
    #[error("{context}: nesting exceeded depth limit of {limit}, submessage skipped")]
    DepthLimitReached {
        /// Message type whose submessage was skipped.
        context: &'static str,
        /// The configured cap.
        limit: usize,
    },
}
