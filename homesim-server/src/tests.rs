//! Fixtures shared by the integration tests, compiled only with the `mock` feature.

use std::sync::Arc;

use homesim_api::models::{CreateDeviceRequest, CreatePresetRequest, DeviceTemplate, DeviceType};

use crate::configs::{Database, SchemaManager, Storage};
use crate::models::{Device, Preset};
use crate::repositories::{DeviceRepository, PresetRepository};

pub async fn create_test_storage() -> Arc<Storage> {
    Arc::new(
        Storage::new(
            Database {
                migration_path: None,
                clean_start: true,
                url: String::from("sqlite::memory:"),
            },
            SchemaManager::default(),
        )
        .await
        .unwrap(),
    )
}

pub async fn create_test_device(
    storage: Arc<Storage>,
    device_type: DeviceType,
    name: &str,
    position: Option<(i32, i32)>,
) -> Device {
    let repository = DeviceRepository::new(storage);
    let device = Device::new(CreateDeviceRequest {
        device_type,
        name: name.to_string(),
        settings: device_type.default_settings(),
        position_x: position.map(|(x, _)| x),
        position_y: position.map(|(_, y)| y),
    });

    let mut tx = repository.get_pool().begin().await.unwrap();
    let id = repository.create(&device, &mut tx).await.unwrap();
    tx.commit().await.unwrap();

    repository.find_by_id(id).await.unwrap().unwrap()
}

pub async fn create_test_preset(
    storage: Arc<Storage>,
    name: &str,
    devices: Vec<DeviceTemplate>,
) -> Preset {
    let repository = PresetRepository::new(storage);
    let preset = Preset::new(CreatePresetRequest {
        name: name.to_string(),
        description: None,
        devices,
    });

    let mut tx = repository.get_pool().begin().await.unwrap();
    let id = repository.create(&preset, &mut tx).await.unwrap();
    tx.commit().await.unwrap();

    repository.find_by_id(id).await.unwrap().unwrap()
}

pub fn test_template(device_type: DeviceType, name: &str) -> DeviceTemplate {
    DeviceTemplate {
        device_type,
        name: name.to_string(),
        settings: device_type.default_settings(),
    }
}
