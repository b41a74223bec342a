use std::sync::Arc;

use homesim_api::models::{CreateDeviceRequest, CreatePresetRequest, DeviceTemplate, DeviceType, Settings};
use homesim_client::transport::MemoryBackend;
use homesim_client::{ClientSettings, RecordingNotifier, Simulator};
use serde_json::Value;

pub struct TestSimulator {
    pub backend: Arc<MemoryBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub simulator: Simulator,
}

impl TestSimulator {
    pub fn new(settings: ClientSettings) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let simulator = Simulator::with_backend(backend.clone(), &settings, notifier.clone());

        Self {
            backend,
            notifier,
            simulator,
        }
    }
}

pub fn settings(value: Value) -> Settings {
    match value {
        Value::Object(map) => map,
        _ => panic!("settings must be an object"),
    }
}

pub fn device_request(device_type: DeviceType, name: &str, position: Option<(i32, i32)>) -> CreateDeviceRequest {
    CreateDeviceRequest {
        device_type,
        name: name.to_string(),
        settings: device_type.default_settings(),
        position_x: position.map(|(x, _)| x),
        position_y: position.map(|(_, y)| y),
    }
}

pub fn template(device_type: DeviceType, name: &str, settings: Settings) -> DeviceTemplate {
    DeviceTemplate {
        device_type,
        name: name.to_string(),
        settings,
    }
}

pub fn preset_request(name: &str, devices: Vec<DeviceTemplate>) -> CreatePresetRequest {
    CreatePresetRequest {
        name: name.to_string(),
        description: None,
        devices,
    }
}
