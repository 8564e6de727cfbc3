//! Schema assemblers: one per GTFS-RT message type.
//!
//! Each assembler consumes the field walker's output for one message body
//! and produces a typed struct from [`crate::messages`]. Field numbers are
//! the published GTFS-RT ones and are never remapped. Length-delimited
//! fields are disambiguated here: string fields decode as UTF-8, message
//! fields re-enter the walker. Unknown field numbers fall through a single
//! `_ => {}` arm per assembler; feed producers add fields over time and
//! that must never be an error.
//!
//! Assembly never fails outright. Wire faults and resource-limit hits are
//! collected as [`Diagnostic`] values on the returned [`Decoded`] so callers
//! can tell a clean decode from a degraded one.

use tracing::{debug, warn};

use crate::error::Diagnostic;
use crate::messages::{
    Alert, EntitySelector, FeedEntity, FeedHeader, FeedMessage, Position, StopTimeEvent,
    StopTimeUpdate, TimeRange, TranslatedString, TripDescriptor, TripUpdate, VehicleDescriptor,
    VehiclePosition,
};
use crate::walker::{self, RawField, WireValue};

/// Caps on untrusted input.
///
/// The GTFS-RT schema nests at most four levels deep and real feeds top out
/// around a few thousand entities; the defaults leave generous headroom
/// while keeping an adversarial feed from ballooning the decode.
#[derive(Debug, Clone)]
pub struct DecodeLimits {
    /// Maximum entities assembled from one feed.
    pub max_entities: usize,
    /// Maximum submessage nesting depth.
    pub max_depth: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_entities: 50_000,
            max_depth: 8,
        }
    }
}

/// A decoded feed plus everything that went wrong along the way.
#[derive(Debug)]
pub struct Decoded {
    pub feed: FeedMessage,
    pub diagnostics: Vec<Diagnostic>,
}

impl Decoded {
    /// True when the feed decoded without truncation or limit hits.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Decodes a serialized FeedMessage with default limits.
pub fn decode_feed(bytes: &[u8]) -> Decoded {
    decode_feed_with_limits(bytes, &DecodeLimits::default())
}

/// Decodes a serialized FeedMessage with caller-supplied limits.
pub fn decode_feed_with_limits(bytes: &[u8], limits: &DecodeLimits) -> Decoded {
    let mut asm = Assembler {
        limits,
        diagnostics: Vec::new(),
    };
    let feed = asm.feed_message(bytes);
    debug!(
        entities = feed.entity.len(),
        diagnostics = asm.diagnostics.len(),
        "decoded feed"
    );
    Decoded {
        feed,
        diagnostics: asm.diagnostics,
    }
}

struct Assembler<'l> {
    limits: &'l DecodeLimits,
    diagnostics: Vec<Diagnostic>,
}

impl Assembler<'_> {
    /// Walks a message body, recording any fault against `context`.
    fn walk<'a>(&mut self, context: &'static str, body: &'a [u8]) -> Vec<RawField<'a>> {
        let list = walker::walk(body);
        if let Some(error) = list.fault {
            self.diagnostics.push(Diagnostic::Truncated { context, error });
        }
        list.fields
    }

    /// Assembles a nested message field, honoring the depth cap.
    ///
    /// Returns `None` when the value is not length-delimited (a malformed
    /// producer put the wrong wire type on the field) or the cap is hit.
    fn submessage<'a, T>(
        &mut self,
        value: WireValue<'a>,
        depth: usize,
        context: &'static str,
        assemble: fn(&mut Self, &'a [u8], usize) -> T,
    ) -> Option<T> {
        let WireValue::LengthDelimited(body) = value else {
            return None;
        };
        if depth >= self.limits.max_depth {
            warn!(context, limit = self.limits.max_depth, "submessage skipped");
            self.diagnostics.push(Diagnostic::DepthLimitReached {
                context,
                limit: self.limits.max_depth,
            });
            return None;
        }
        Some(assemble(self, body, depth + 1))
    }

    fn feed_message(&mut self, body: &[u8]) -> FeedMessage {
        let mut out = FeedMessage::default();
        let mut entity_cap_hit = false;
        for f in self.walk("FeedMessage", body) {
            match f.number {
                1 => {
                    if let Some(h) = self.submessage(f.value, 0, "FeedHeader", Self::feed_header) {
                        out.header = h;
                    }
                }
                2 => {
                    if out.entity.len() >= self.limits.max_entities {
                        if !entity_cap_hit {
                            entity_cap_hit = true;
                            warn!(limit = self.limits.max_entities, "entity cap reached");
                            self.diagnostics.push(Diagnostic::EntityLimitReached {
                                limit: self.limits.max_entities,
                            });
                        }
                    } else if let Some(e) =
                        self.submessage(f.value, 0, "FeedEntity", Self::feed_entity)
                    {
                        out.entity.push(e);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn feed_header(&mut self, body: &[u8], _depth: usize) -> FeedHeader {
        let mut out = FeedHeader::default();
        for f in self.walk("FeedHeader", body) {
            match f.number {
                1 => set_string(&mut out.gtfs_realtime_version, f.value),
                2 => set_enum(&mut out.incrementality, f.value),
                3 => set_u64(&mut out.timestamp, f.value),
                4 => set_string(&mut out.feed_version, f.value),
                _ => {}
            }
        }
        out
    }

    /// Assembles one entity. The oneof convention says at most one of
    /// trip_update/vehicle/alert is set, but the wire does not enforce it,
    /// so each payload is attempted independently.
    fn feed_entity(&mut self, body: &[u8], depth: usize) -> FeedEntity {
        let mut out = FeedEntity::default();
        for f in self.walk("FeedEntity", body) {
            match f.number {
                1 => set_string(&mut out.id, f.value),
                2 => set_bool(&mut out.is_deleted, f.value),
                3 => {
                    if let Some(t) = self.submessage(f.value, depth, "TripUpdate", Self::trip_update)
                    {
                        out.trip_update = Some(t);
                    }
                }
                4 => {
                    if let Some(v) =
                        self.submessage(f.value, depth, "VehiclePosition", Self::vehicle_position)
                    {
                        out.vehicle = Some(v);
                    }
                }
                5 => {
                    if let Some(a) = self.submessage(f.value, depth, "Alert", Self::alert) {
                        out.alert = Some(a);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn vehicle_position(&mut self, body: &[u8], depth: usize) -> VehiclePosition {
        let mut out = VehiclePosition::default();
        for f in self.walk("VehiclePosition", body) {
            match f.number {
                1 => {
                    if let Some(t) =
                        self.submessage(f.value, depth, "TripDescriptor", Self::trip_descriptor)
                    {
                        out.trip = Some(t);
                    }
                }
                2 => {
                    if let Some(p) = self.submessage(f.value, depth, "Position", Self::position) {
                        out.position = Some(p);
                    }
                }
                3 => set_u32(&mut out.current_stop_sequence, f.value),
                4 => set_enum(&mut out.current_status, f.value),
                5 => set_u64(&mut out.timestamp, f.value),
                6 => set_enum(&mut out.congestion_level, f.value),
                7 => set_string(&mut out.stop_id, f.value),
                8 => {
                    if let Some(v) = self.submessage(
                        f.value,
                        depth,
                        "VehicleDescriptor",
                        Self::vehicle_descriptor,
                    ) {
                        out.vehicle = Some(v);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn position(&mut self, body: &[u8], _depth: usize) -> Position {
        let mut out = Position::default();
        for f in self.walk("Position", body) {
            match f.number {
                1 => set_f32(&mut out.latitude, f.value),
                2 => set_f32(&mut out.longitude, f.value),
                3 => set_f32(&mut out.bearing, f.value),
                // The schema's one fixed64 field; the raw bit pattern is an
                // IEEE double here.
                4 => set_f64(&mut out.odometer, f.value),
                5 => set_f32(&mut out.speed, f.value),
                _ => {}
            }
        }
        out
    }

    fn trip_update(&mut self, body: &[u8], depth: usize) -> TripUpdate {
        let mut out = TripUpdate::default();
        for f in self.walk("TripUpdate", body) {
            match f.number {
                1 => {
                    if let Some(t) =
                        self.submessage(f.value, depth, "TripDescriptor", Self::trip_descriptor)
                    {
                        out.trip = Some(t);
                    }
                }
                2 => {
                    if let Some(s) =
                        self.submessage(f.value, depth, "StopTimeUpdate", Self::stop_time_update)
                    {
                        out.stop_time_update.push(s);
                    }
                }
                3 => {
                    if let Some(v) = self.submessage(
                        f.value,
                        depth,
                        "VehicleDescriptor",
                        Self::vehicle_descriptor,
                    ) {
                        out.vehicle = Some(v);
                    }
                }
                4 => set_u64(&mut out.timestamp, f.value),
                5 => set_i32(&mut out.delay, f.value),
                _ => {}
            }
        }
        out
    }

    fn stop_time_update(&mut self, body: &[u8], depth: usize) -> StopTimeUpdate {
        let mut out = StopTimeUpdate::default();
        for f in self.walk("StopTimeUpdate", body) {
            match f.number {
                1 => set_u32(&mut out.stop_sequence, f.value),
                2 => {
                    if let Some(e) =
                        self.submessage(f.value, depth, "StopTimeEvent", Self::stop_time_event)
                    {
                        out.arrival = Some(e);
                    }
                }
                3 => {
                    if let Some(e) =
                        self.submessage(f.value, depth, "StopTimeEvent", Self::stop_time_event)
                    {
                        out.departure = Some(e);
                    }
                }
                4 => set_string(&mut out.stop_id, f.value),
                5 => set_enum(&mut out.schedule_relationship, f.value),
                _ => {}
            }
        }
        out
    }

    fn stop_time_event(&mut self, body: &[u8], _depth: usize) -> StopTimeEvent {
        let mut out = StopTimeEvent::default();
        for f in self.walk("StopTimeEvent", body) {
            match f.number {
                1 => {
                    if let WireValue::Varint(v) = f.value {
                        out.delay = Some(signed_delay(v));
                    }
                }
                2 => {
                    if let WireValue::Varint(v) = f.value {
                        out.time = Some(v as i64);
                    }
                }
                3 => set_i32(&mut out.uncertainty, f.value),
                _ => {}
            }
        }
        out
    }

    fn trip_descriptor(&mut self, body: &[u8], _depth: usize) -> TripDescriptor {
        let mut out = TripDescriptor::default();
        for f in self.walk("TripDescriptor", body) {
            match f.number {
                1 => set_string(&mut out.trip_id, f.value),
                2 => set_string(&mut out.start_time, f.value),
                3 => set_string(&mut out.start_date, f.value),
                4 => set_enum(&mut out.schedule_relationship, f.value),
                5 => set_string(&mut out.route_id, f.value),
                6 => set_u32(&mut out.direction_id, f.value),
                _ => {}
            }
        }
        out
    }

    fn vehicle_descriptor(&mut self, body: &[u8], _depth: usize) -> VehicleDescriptor {
        let mut out = VehicleDescriptor::default();
        for f in self.walk("VehicleDescriptor", body) {
            match f.number {
                1 => set_string(&mut out.id, f.value),
                2 => set_string(&mut out.label, f.value),
                3 => set_string(&mut out.license_plate, f.value),
                _ => {}
            }
        }
        out
    }

    fn alert(&mut self, body: &[u8], depth: usize) -> Alert {
        let mut out = Alert::default();
        for f in self.walk("Alert", body) {
            match f.number {
                1 => {
                    if let Some(r) = self.submessage(f.value, depth, "TimeRange", Self::time_range) {
                        out.active_period.push(r);
                    }
                }
                5 => {
                    if let Some(s) =
                        self.submessage(f.value, depth, "EntitySelector", Self::entity_selector)
                    {
                        out.informed_entity.push(s);
                    }
                }
                6 => set_enum(&mut out.cause, f.value),
                7 => set_enum(&mut out.effect, f.value),
                8 => {
                    if let Some(mut t) = self.submessage(
                        f.value,
                        depth,
                        "TranslatedString",
                        Self::translated_string,
                    ) {
                        out.url.append(&mut t);
                    }
                }
                10 => {
                    if let Some(mut t) = self.submessage(
                        f.value,
                        depth,
                        "TranslatedString",
                        Self::translated_string,
                    ) {
                        out.header_text.append(&mut t);
                    }
                }
                11 => {
                    if let Some(mut t) = self.submessage(
                        f.value,
                        depth,
                        "TranslatedString",
                        Self::translated_string,
                    ) {
                        out.description_text.append(&mut t);
                    }
                }
                14 => set_enum(&mut out.severity_level, f.value),
                _ => {}
            }
        }
        out
    }

    fn time_range(&mut self, body: &[u8], _depth: usize) -> TimeRange {
        let mut out = TimeRange::default();
        for f in self.walk("TimeRange", body) {
            match f.number {
                1 => set_u64(&mut out.start, f.value),
                2 => set_u64(&mut out.end, f.value),
                _ => {}
            }
        }
        out
    }

    fn entity_selector(&mut self, body: &[u8], depth: usize) -> EntitySelector {
        let mut out = EntitySelector::default();
        for f in self.walk("EntitySelector", body) {
            match f.number {
                1 => set_string(&mut out.agency_id, f.value),
                2 => set_string(&mut out.route_id, f.value),
                3 => set_enum(&mut out.route_type, f.value),
                4 => {
                    if let Some(t) =
                        self.submessage(f.value, depth, "TripDescriptor", Self::trip_descriptor)
                    {
                        out.trip = Some(t);
                    }
                }
                5 => set_string(&mut out.stop_id, f.value),
                6 => set_u32(&mut out.direction_id, f.value),
                _ => {}
            }
        }
        out
    }

    /// On the wire a TranslatedString is one message holding repeated
    /// Translation submessages; this flattens it into the translation list
    /// in wire order.
    fn translated_string(&mut self, body: &[u8], depth: usize) -> Vec<TranslatedString> {
        let mut out = Vec::new();
        for f in self.walk("TranslatedString", body) {
            match f.number {
                1 => {
                    if let Some(t) =
                        self.submessage(f.value, depth, "Translation", Self::translation)
                    {
                        out.push(t);
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn translation(&mut self, body: &[u8], _depth: usize) -> TranslatedString {
        let mut out = TranslatedString::default();
        for f in self.walk("Translation", body) {
            match f.number {
                1 => set_string(&mut out.text, f.value),
                2 => set_string(&mut out.language, f.value),
                _ => {}
            }
        }
        out
    }
}

/// Reinterprets an unsigned varint as a signed 32-bit two's-complement
/// value. GTFS-RT delays are plain int32, not zigzag-encoded, so a negative
/// delay arrives as a large unsigned value.
fn signed_delay(v: u64) -> i32 {
    if v > 0x7FFF_FFFF {
        v.wrapping_sub(0x1_0000_0000) as i32
    } else {
        v as i32
    }
}

// Scalar setters. A value of the wrong wire type for the field is treated
// like an unknown field and skipped.

fn set_u64(slot: &mut Option<u64>, value: WireValue<'_>) {
    if let WireValue::Varint(v) = value {
        *slot = Some(v);
    }
}

fn set_u32(slot: &mut Option<u32>, value: WireValue<'_>) {
    if let WireValue::Varint(v) = value {
        *slot = Some(v as u32);
    }
}

fn set_i32(slot: &mut Option<i32>, value: WireValue<'_>) {
    if let WireValue::Varint(v) = value {
        *slot = Some(v as i32);
    }
}

/// Enums pass through as raw integers with no range validation, so a future
/// enum value is preserved verbatim rather than rejected.
fn set_enum(slot: &mut Option<i32>, value: WireValue<'_>) {
    set_i32(slot, value);
}

fn set_bool(slot: &mut Option<bool>, value: WireValue<'_>) {
    if let WireValue::Varint(v) = value {
        *slot = Some(v == 1);
    }
}

fn set_f32(slot: &mut Option<f32>, value: WireValue<'_>) {
    if let WireValue::Fixed32(bits) = value {
        *slot = Some(f32::from_bits(bits));
    }
}

fn set_f64(slot: &mut Option<f64>, value: WireValue<'_>) {
    if let WireValue::Fixed64(bits) = value {
        *slot = Some(f64::from_bits(bits));
    }
}

fn set_string(slot: &mut Option<String>, value: WireValue<'_>) {
    if let WireValue::LengthDelimited(bytes) = value {
        *slot = Some(String::from_utf8_lossy(bytes).into_owned());
    }
}
