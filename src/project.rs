//! Flat, UI-friendly views over a decoded feed.
//!
//! Three pure transforms over `FeedMessage.entity`, one per payload kind.
//! Each is independent per entity with no shared state, so callers are free
//! to run them concurrently over slices of the entity list. The views derive
//! `Serialize` so the response-formatting collaborator can emit them as-is;
//! this crate never serializes anything itself.

use serde::Serialize;

use crate::messages::{FeedMessage, TimeRange, TranslatedString};

/// One vehicle position, flattened across its descriptors.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct VehicleView {
    pub id: Option<String>,
    pub vehicle_id: Option<String>,
    pub label: Option<String>,
    pub license_plate: Option<String>,
    pub trip_id: Option<String>,
    pub route_id: Option<String>,
    pub direction_id: Option<u32>,
    pub latitude: Option<f32>,
    pub longitude: Option<f32>,
    pub bearing: Option<f32>,
    pub speed: Option<f32>,
    pub current_stop_sequence: Option<u32>,
    pub stop_id: Option<String>,
    pub current_status: Option<i32>,
    pub timestamp: Option<u64>,
}

/// One trip update, flattened, with its per-stop predictions in wire order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TripUpdateView {
    pub id: Option<String>,
    pub trip_id: Option<String>,
    pub route_id: Option<String>,
    pub direction_id: Option<u32>,
    pub vehicle_id: Option<String>,
    pub label: Option<String>,
    pub timestamp: Option<u64>,
    pub delay: Option<i32>,
    pub stop_time_updates: Vec<StopTimeView>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct StopTimeView {
    pub stop_sequence: Option<u32>,
    pub stop_id: Option<String>,
    pub arrival_delay: Option<i32>,
    pub arrival_time: Option<i64>,
    pub departure_delay: Option<i32>,
    pub departure_time: Option<i64>,
    pub schedule_relationship: Option<i32>,
}

/// One service alert with its text fields reduced to a single translation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct AlertView {
    pub id: Option<String>,
    pub active_period: Vec<TimeRange>,
    pub informed_entity: Vec<InformedEntityView>,
    pub cause: Option<i32>,
    pub effect: Option<i32>,
    pub severity_level: Option<i32>,
    pub url: Option<String>,
    pub header_text: Option<String>,
    pub description_text: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct InformedEntityView {
    pub agency_id: Option<String>,
    pub route_id: Option<String>,
    pub route_type: Option<i32>,
    pub trip_id: Option<String>,
    pub stop_id: Option<String>,
    pub direction_id: Option<u32>,
}

/// Flattens every entity carrying a vehicle payload, in feed order.
pub fn extract_vehicles(feed: &FeedMessage) -> Vec<VehicleView> {
    feed.entity
        .iter()
        .filter_map(|e| {
            let vp = e.vehicle.as_ref()?;
            let trip = vp.trip.as_ref();
            let desc = vp.vehicle.as_ref();
            let pos = vp.position.as_ref();
            Some(VehicleView {
                id: e.id.clone(),
                vehicle_id: desc.and_then(|d| d.id.clone()),
                label: desc.and_then(|d| d.label.clone()),
                license_plate: desc.and_then(|d| d.license_plate.clone()),
                trip_id: trip.and_then(|t| t.trip_id.clone()),
                route_id: trip.and_then(|t| t.route_id.clone()),
                direction_id: trip.and_then(|t| t.direction_id),
                latitude: pos.and_then(|p| p.latitude),
                longitude: pos.and_then(|p| p.longitude),
                bearing: pos.and_then(|p| p.bearing),
                speed: pos.and_then(|p| p.speed),
                current_stop_sequence: vp.current_stop_sequence,
                stop_id: vp.stop_id.clone(),
                current_status: vp.current_status,
                timestamp: vp.timestamp,
            })
        })
        .collect()
}

/// Flattens every entity carrying a trip-update payload, in feed order.
pub fn extract_trip_updates(feed: &FeedMessage) -> Vec<TripUpdateView> {
    feed.entity
        .iter()
        .filter_map(|e| {
            let tu = e.trip_update.as_ref()?;
            let trip = tu.trip.as_ref();
            let desc = tu.vehicle.as_ref();
            let stop_time_updates = tu
                .stop_time_update
                .iter()
                .map(|s| StopTimeView {
                    stop_sequence: s.stop_sequence,
                    stop_id: s.stop_id.clone(),
                    arrival_delay: s.arrival.as_ref().and_then(|ev| ev.delay),
                    arrival_time: s.arrival.as_ref().and_then(|ev| ev.time),
                    departure_delay: s.departure.as_ref().and_then(|ev| ev.delay),
                    departure_time: s.departure.as_ref().and_then(|ev| ev.time),
                    schedule_relationship: s.schedule_relationship,
                })
                .collect();
            Some(TripUpdateView {
                id: e.id.clone(),
                trip_id: trip.and_then(|t| t.trip_id.clone()),
                route_id: trip.and_then(|t| t.route_id.clone()),
                direction_id: trip.and_then(|t| t.direction_id),
                vehicle_id: desc.and_then(|d| d.id.clone()),
                label: desc.and_then(|d| d.label.clone()),
                timestamp: tu.timestamp,
                delay: tu.delay,
                stop_time_updates,
            })
        })
        .collect()
}

/// Flattens every entity carrying an alert payload, in feed order.
///
/// Text fields take the first translation in wire order, whatever its
/// language. A preferred-language lookup would go here if callers ever need
/// one.
pub fn extract_alerts(feed: &FeedMessage) -> Vec<AlertView> {
    feed.entity
        .iter()
        .filter_map(|e| {
            let alert = e.alert.as_ref()?;
            Some(AlertView {
                id: e.id.clone(),
                active_period: alert.active_period.clone(),
                informed_entity: alert
                    .informed_entity
                    .iter()
                    .map(|s| InformedEntityView {
                        agency_id: s.agency_id.clone(),
                        route_id: s.route_id.clone(),
                        route_type: s.route_type,
                        trip_id: s.trip.as_ref().and_then(|t| t.trip_id.clone()),
                        stop_id: s.stop_id.clone(),
                        direction_id: s.direction_id,
                    })
                    .collect(),
                cause: alert.cause,
                effect: alert.effect,
                severity_level: alert.severity_level,
                url: first_text(&alert.url),
                header_text: first_text(&alert.header_text),
                description_text: first_text(&alert.description_text),
            })
        })
        .collect()
}

fn first_text(translations: &[TranslatedString]) -> Option<String> {
    translations.first().and_then(|t| t.text.clone())
}
