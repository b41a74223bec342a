use std::time::Duration;

use homesim_api::models::DeviceType;
use homesim_client::transport::Operation;
use homesim_client::{CancellationToken, ClientError, ClientSettings, Position};
use serde_json::json;

mod common;
use common::*;

#[tokio::test]
async fn test_fetch_resolves_missing_coordinates() {
    let app = TestSimulator::new(ClientSettings::default());
    app.backend.insert_device(device_request(DeviceType::Light, "Lamp", None));
    app.backend.insert_device(device_request(DeviceType::Fan, "Fan", Some((300, 40))));

    let devices = app.simulator.devices.fetch_devices(&CancellationToken::new()).await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].position, Position::FALLBACK);
    assert_eq!(devices[1].position, Position::new(300, 40));
    assert_eq!(app.simulator.devices.devices(), devices);
    assert!(!app.simulator.devices.loading());
}

#[tokio::test]
async fn test_failed_fetch_records_error() {
    let app = TestSimulator::new(ClientSettings::default());
    app.backend
        .fail_next(Operation::ListDevices, ClientError::Http(String::from("connection refused")));

    let error = app
        .simulator
        .devices
        .fetch_devices(&CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(error, ClientError::Http(String::from("connection refused")));
    assert_eq!(
        app.simulator.devices.error().as_deref(),
        Some("HTTP request failed: connection refused")
    );

    app.simulator.devices.clear_error();
    assert_eq!(app.simulator.devices.error(), None);
}

#[tokio::test]
async fn test_create_appends_to_local_list() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let store = &app.simulator.devices;

    store
        .create_device(&device_request(DeviceType::Light, "One", None), &cancel)
        .await
        .unwrap();
    store
        .create_device(&device_request(DeviceType::Fan, "Two", Some((5, 6))), &cancel)
        .await
        .unwrap();

    let names: Vec<_> = store.devices().into_iter().map(|device| device.name).collect();
    assert_eq!(names, vec!["One", "Two"]);
}

#[tokio::test]
async fn test_local_update_then_persist() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Light, "Lamp", Some((1, 2)))).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store
        .update_device_local(id, settings(json!({ "brightness": 30, "power": true })))
        .unwrap();

    // visible before anything reaches the backend
    assert_eq!(store.device(id).unwrap().settings["brightness"], json!(30));
    assert_eq!(app.backend.devices()[0].settings["brightness"], json!(100));
    assert!(store.has_pending_edits(id));

    let device = store.persist_device(id, &cancel).await.unwrap();

    assert_eq!(device.settings["brightness"], json!(30));
    assert_eq!(device.settings["colorTemp"], json!("warm"));
    assert_eq!(app.backend.devices()[0].settings["power"], json!(true));
    assert_eq!(app.backend.devices()[0].position_x, Some(1));
    assert!(!store.has_pending_edits(id));
}

#[tokio::test]
async fn test_local_update_of_unknown_device() {
    let app = TestSimulator::new(ClientSettings::default());

    let error = app
        .simulator
        .devices
        .update_device_local(42, settings(json!({ "power": true })))
        .unwrap_err();

    assert!(error.is_not_found());
    assert!(app.simulator.devices.error().is_some());
}

#[tokio::test]
async fn test_failed_persist_rolls_back_only_unchanged_fields() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Light, "Lamp", None)).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store
        .update_device_local(id, settings(json!({ "power": true, "brightness": 10 })))
        .unwrap();

    app.backend.set_latency(Duration::from_millis(50));
    app.backend
        .fail_next(Operation::UpdateDevice, ClientError::api(500, "Internal server error"));

    let (result, ()) = tokio::join!(store.persist_device(id, &cancel), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store
            .update_device_local(id, settings(json!({ "brightness": 20 })))
            .unwrap();
    });

    assert!(result.is_err());
    let device = store.device(id).unwrap();
    assert_eq!(device.settings["power"], json!(false));
    assert_eq!(device.settings["brightness"], json!(20));
    assert!(store.has_pending_edits(id));
    assert_eq!(store.error().as_deref(), Some("Internal server error"));

    store.persist_device(id, &cancel).await.unwrap();

    assert_eq!(app.backend.devices()[0].settings["brightness"], json!(20));
    assert_eq!(app.backend.devices()[0].settings["power"], json!(false));
    assert!(!store.has_pending_edits(id));
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn test_rollback_removes_keys_that_did_not_exist() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Fan, "Fan", None)).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store.update_device_local(id, settings(json!({ "oscillate": true }))).unwrap();
    app.backend
        .fail_next(Operation::UpdateDevice, ClientError::Http(String::from("timeout")));

    assert!(store.persist_device(id, &cancel).await.is_err());
    assert!(store.device(id).unwrap().settings.get("oscillate").is_none());
}

#[tokio::test]
async fn test_success_keeps_edits_made_while_in_flight() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Fan, "Fan", None)).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store.update_device_local(id, settings(json!({ "speed": 30 }))).unwrap();
    app.backend.set_latency(Duration::from_millis(50));

    let (result, ()) = tokio::join!(store.persist_device(id, &cancel), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.update_device_local(id, settings(json!({ "speed": 70 }))).unwrap();
    });

    assert_eq!(result.unwrap().settings["speed"], json!(70));
    assert_eq!(store.device(id).unwrap().settings["speed"], json!(70));
    assert_eq!(app.backend.devices()[0].settings["speed"], json!(30));
    assert!(store.has_pending_edits(id));
}

#[tokio::test]
async fn test_late_response_does_not_overwrite_newer_one() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Light, "Lamp", None)).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    // the first update reaches the backend first but is answered last
    app.backend
        .delay_next_response(Operation::UpdateDevice, Duration::from_millis(200));

    store.update_device_local(id, settings(json!({ "brightness": 10 }))).unwrap();
    let (first, second) = tokio::join!(store.persist_device(id, &cancel), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.update_device_local(id, settings(json!({ "brightness": 20 }))).unwrap();
        store.persist_device(id, &cancel).await
    });

    assert_eq!(second.unwrap().settings["brightness"], json!(20));
    assert_eq!(first.unwrap().settings["brightness"], json!(20));

    assert_eq!(app.backend.devices()[0].settings["brightness"], json!(20));
    assert_eq!(store.device(id).unwrap().settings["brightness"], json!(20));
    assert!(!store.has_pending_edits(id));
}

#[tokio::test]
async fn test_cancelled_action_leaves_state_untouched() {
    let app = TestSimulator::new(ClientSettings::default());
    app.backend.set_latency(Duration::from_millis(200));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let error = app
        .simulator
        .devices
        .create_device(&device_request(DeviceType::Light, "Lamp", None), &cancel)
        .await
        .unwrap_err();

    assert_eq!(error, ClientError::Cancelled);
    assert!(app.simulator.devices.devices().is_empty());
    assert_eq!(app.simulator.devices.error(), None);
    assert!(!app.simulator.devices.loading());
    assert!(app.backend.devices().is_empty());
}

#[tokio::test]
async fn test_loading_while_request_outstanding() {
    let app = TestSimulator::new(ClientSettings::default());
    app.backend.set_latency(Duration::from_millis(50));
    let cancel = CancellationToken::new();
    let store = &app.simulator.devices;

    let (_, observed) = tokio::join!(store.fetch_devices(&cancel), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        store.loading()
    });

    assert!(observed);
    assert!(!store.loading());
}

#[tokio::test]
async fn test_delete_and_delete_all() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let first = app.backend.insert_device(device_request(DeviceType::Light, "A", None)).id;
    app.backend.insert_device(device_request(DeviceType::Fan, "B", None));
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store.delete_device(first, &cancel).await.unwrap();
    assert_eq!(store.devices().len(), 1);

    let error = store.delete_device(first, &cancel).await.unwrap_err();
    assert!(error.is_not_found());
    assert_eq!(store.devices().len(), 1);

    store.delete_all_devices(&cancel).await.unwrap();
    assert!(store.devices().is_empty());
    assert!(app.backend.devices().is_empty());
}

#[tokio::test]
async fn test_refresh_device_replaces_local_copy() {
    let app = TestSimulator::new(ClientSettings::default());
    let cancel = CancellationToken::new();
    let id = app.backend.insert_device(device_request(DeviceType::Fan, "Fan", None)).id;
    let store = &app.simulator.devices;
    store.fetch_devices(&cancel).await.unwrap();

    store.update_device_local(id, settings(json!({ "speed": 90 }))).unwrap();
    let device = store.refresh_device(id, &cancel).await.unwrap();

    assert_eq!(device.settings["speed"], json!(0));
    assert_eq!(store.device(id).unwrap().settings["speed"], json!(0));
    assert!(!store.has_pending_edits(id));
}
