//! Hand-written decoder for GTFS-Realtime feeds.
//!
//! Implements the protobuf wire format (varints, fixed-width scalars,
//! length-delimited fields, nested submessages) directly, with no generated
//! bindings, then layers a schema-aware assembler on top that knows, per
//! GTFS-RT message type, which field numbers mean what.
//!
//! The pipeline is pure and stateless: bytes in, typed [`messages`] out,
//! optionally flattened by [`project`] into UI-friendly views. Fetching feed
//! bytes and serializing the output are external collaborators' jobs; this
//! crate does no I/O.
//!
//! ```
//! use gtfs_rt_decoder::{decode_feed, project};
//!
//! let decoded = decode_feed(&[]);
//! assert!(decoded.is_clean());
//! assert!(project::extract_vehicles(&decoded.feed).is_empty());
//! ```
//!
//! Decoding is deliberately forgiving: unknown fields are skipped, enum
//! values pass through unvalidated, and a truncated buffer yields whatever
//! parsed before the cut plus diagnostics. Upstream feeds occasionally
//! truncate under load, and partial vehicle data beats none.

pub mod assemble;
pub mod error;
pub mod messages;
pub mod project;
pub mod synthetic;
pub mod walker;
pub mod wire;

pub use assemble::{DecodeLimits, Decoded, decode_feed, decode_feed_with_limits};
pub use error::{Diagnostic, WireError};
