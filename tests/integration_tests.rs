use gtfs_rt_decoder::project::{extract_alerts, extract_trip_updates, extract_vehicles};
use gtfs_rt_decoder::synthetic::MessageBuilder;
use gtfs_rt_decoder::{Diagnostic, decode_feed};

/// Bytes for: header{version="2.0", timestamp=1700000000} plus one entity
/// {id="42", vehicle{trip{route_id="10"}, position{lat=35.1, lon=33.3,
/// bearing=90}, current_status=1, vehicle{id="veh-1"}}}.
fn sample_feed() -> Vec<u8> {
    MessageBuilder::new()
        .message(
            1,
            MessageBuilder::new().string(1, "2.0").varint(3, 1_700_000_000),
        )
        .message(
            2,
            MessageBuilder::new().string(1, "42").message(
                4,
                MessageBuilder::new()
                    .message(1, MessageBuilder::new().string(5, "10"))
                    .message(
                        2,
                        MessageBuilder::new()
                            .float(1, 35.1)
                            .float(2, 33.3)
                            .float(3, 90.0),
                    )
                    .varint(4, 1)
                    .message(8, MessageBuilder::new().string(1, "veh-1")),
            ),
        )
        .build()
}

#[test]
fn test_full_pipeline() {
    let bytes = sample_feed();
    let decoded = decode_feed(&bytes);
    assert!(decoded.is_clean(), "diagnostics: {:?}", decoded.diagnostics);

    let feed = &decoded.feed;
    assert_eq!(feed.header.gtfs_realtime_version.as_deref(), Some("2.0"));
    assert_eq!(feed.header.timestamp, Some(1_700_000_000));
    assert_eq!(feed.entity.len(), 1);

    let vp = feed.entity[0].vehicle.as_ref().expect("vehicle payload");
    let pos = vp.position.as_ref().expect("position");
    assert!((pos.latitude.unwrap() - 35.1).abs() < 1e-5);
    assert!((pos.longitude.unwrap() - 33.3).abs() < 1e-5);
    assert_eq!(pos.bearing, Some(90.0));
    assert_eq!(vp.trip.as_ref().unwrap().route_id.as_deref(), Some("10"));
    assert_eq!(vp.current_status, Some(1));

    let vehicles = extract_vehicles(feed);
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].vehicle_id.as_deref(), Some("veh-1"));
    assert_eq!(vehicles[0].route_id.as_deref(), Some("10"));
    assert!(extract_trip_updates(feed).is_empty());
    assert!(extract_alerts(feed).is_empty());
}

#[test]
fn test_truncated_feed_keeps_decoded_prefix() {
    let mut bytes = sample_feed();
    // Cut inside the entity's length-delimited body.
    bytes.truncate(bytes.len() - 4);
    let decoded = decode_feed(&bytes);

    // The header parsed before the cut survives, and the truncation is
    // reported instead of silently dropped.
    assert_eq!(
        decoded.feed.header.gtfs_realtime_version.as_deref(),
        Some("2.0")
    );
    assert!(!decoded.is_clean());
    assert!(
        decoded
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Truncated { .. }))
    );
}

#[test]
fn test_views_serialize_to_json() {
    let decoded = decode_feed(&sample_feed());
    let vehicles = extract_vehicles(&decoded.feed);
    let json = serde_json::to_value(&vehicles).unwrap();
    assert_eq!(json[0]["id"], "42");
    assert_eq!(json[0]["vehicle_id"], "veh-1");
}
