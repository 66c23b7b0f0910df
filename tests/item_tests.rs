//! Tests for the item model and event serialization.

use vidq::queue::{ItemStatus, QueueEvent};

mod common;
use common::helpers::*;

#[test]
fn test_new_items_start_queued_with_empty_metrics() {
    let (queue, _engine, _dir) = mock_queue(10);
    let ids = queue.add_urls(URL_A);
    let item = queue.item(ids[0]).unwrap();

    assert_eq!(item.url, URL_A);
    assert_eq!(item.progress, 0.0);
    assert!(item.destination.is_none());
    assert!(item.error.is_none());
}

#[test]
fn test_item_serializes_with_lowercase_status() {
    let (queue, _engine, _dir) = mock_queue(1);
    let ids = queue.add_urls(&format!("{URL_A}\n{URL_B}"));

    let item = queue.item(ids[1]).unwrap();
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["status"], "queued");
    assert_eq!(json["url"], URL_B);
    assert_eq!(json["id"], serde_json::json!(ids[1]));
}

#[test]
fn test_status_display_matches_labels() {
    assert_eq!(ItemStatus::Queued.to_string(), "Queued");
    assert_eq!(ItemStatus::Downloading.to_string(), "Downloading");
    assert_eq!(ItemStatus::Paused.to_string(), "Paused");
    assert_eq!(ItemStatus::Completed.to_string(), "Completed");
    assert_eq!(ItemStatus::Cancelled.to_string(), "Cancelled");
    assert_eq!(ItemStatus::Failed.to_string(), "Failed");
}

#[test]
fn test_events_serialize_with_a_tag() {
    let (queue, engine, _dir) = mock_queue(1);
    let mut events = queue.subscribe();
    let ids = queue.add_urls(URL_A);

    let added = events.try_recv().unwrap();
    let json = serde_json::to_value(&added).unwrap();
    assert_eq!(json["event"], "added");
    assert_eq!(json["url"], URL_A);

    engine.fail(ids[0], "no formats found");
    let status_event = loop {
        match events.try_recv().unwrap() {
            event @ QueueEvent::StatusChanged {
                status: ItemStatus::Failed,
                ..
            } => break event,
            _ => continue,
        }
    };
    let json = serde_json::to_value(&status_event).unwrap();
    assert_eq!(json["event"], "status_changed");
    assert_eq!(json["status"], "failed");
    assert_eq!(json["error"], "no formats found");
}
