//! Typed GTFS-Realtime message structs.
//!
//! Shapes follow the published GTFS-RT proto2 schema. Every scalar is
//! optional: proto2 presence is meaningful, so absence is represented as
//! `None`, never as a zero/empty sentinel. Repeated fields keep wire
//! encounter order. Enum-typed fields (`current_status`, `congestion_level`,
//! `schedule_relationship`, `cause`, `effect`, `severity_level`,
//! `incrementality`) carry the raw integer so out-of-range or future values
//! survive a decode unchanged.

use serde::Serialize;

/// A complete decoded feed: one header plus the entity list.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeedMessage {
    pub header: FeedHeader,
    pub entity: Vec<FeedEntity>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeedHeader {
    pub gtfs_realtime_version: Option<String>,
    pub incrementality: Option<i32>,
    pub timestamp: Option<u64>,
    pub feed_version: Option<String>,
}

/// One update record in a feed.
///
/// By the oneof convention exactly one of `trip_update`, `vehicle`, `alert`
/// is populated, but the wire format does not enforce that and neither does
/// the decoder: whichever payloads are present are assembled.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct FeedEntity {
    pub id: Option<String>,
    pub is_deleted: Option<bool>,
    pub trip_update: Option<TripUpdate>,
    pub vehicle: Option<VehiclePosition>,
    pub alert: Option<Alert>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct VehiclePosition {
    pub trip: Option<TripDescriptor>,
    pub vehicle: Option<VehicleDescriptor>,
    pub position: Option<Position>,
    pub current_stop_sequence: Option<u32>,
    pub current_status: Option<i32>,
    pub stop_id: Option<String>,
    pub timestamp: Option<u64>,
    pub congestion_level: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Position {
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub bearing: Option<f32>,
    pub odometer: Option<f64>,
    pub speed: Option<f32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TripUpdate {
    pub trip: Option<TripDescriptor>,
    pub vehicle: Option<VehicleDescriptor>,
    pub stop_time_update: Vec<StopTimeUpdate>,
    pub timestamp: Option<u64>,
    pub delay: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StopTimeUpdate {
    pub stop_sequence: Option<u32>,
    pub stop_id: Option<String>,
    pub arrival: Option<StopTimeEvent>,
    pub departure: Option<StopTimeEvent>,
    pub schedule_relationship: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StopTimeEvent {
    pub delay: Option<i32>,
    pub time: Option<i64>,
    pub uncertainty: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TripDescriptor {
    pub trip_id: Option<String>,
    pub start_time: Option<String>,
    pub start_date: Option<String>,
    pub schedule_relationship: Option<i32>,
    pub route_id: Option<String>,
    pub direction_id: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct VehicleDescriptor {
    pub id: Option<String>,
    pub label: Option<String>,
    pub license_plate: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub active_period: Vec<TimeRange>,
    pub informed_entity: Vec<EntitySelector>,
    pub cause: Option<i32>,
    pub effect: Option<i32>,
    pub url: Vec<TranslatedString>,
    pub header_text: Vec<TranslatedString>,
    pub description_text: Vec<TranslatedString>,
    pub severity_level: Option<i32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct EntitySelector {
    pub agency_id: Option<String>,
    pub route_id: Option<String>,
    pub route_type: Option<i32>,
    pub trip: Option<TripDescriptor>,
    pub stop_id: Option<String>,
    pub direction_id: Option<u32>,
}

/// One translation of an alert text field.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedString {
    pub text: Option<String>,
    pub language: Option<String>,
}
