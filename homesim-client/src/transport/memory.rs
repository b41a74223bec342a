use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use homesim_api::models::*;
use time::OffsetDateTime;

use super::{DeviceApi, PresetApi};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDevices,
    GetDevice,
    CreateDevice,
    UpdateDevice,
    DeleteDevice,
    DeleteAllDevices,
    ListPresets,
    GetPreset,
    CreatePreset,
    UpdatePreset,
    DeletePreset,
    LoadPreset,
}

struct Failure {
    operation: Operation,
    /// Matching calls that still succeed before this one fires
    skip: usize,
    error: ClientError,
}

#[derive(Default)]
struct Inner {
    devices: BTreeMap<Id, DeviceResponse>,
    presets: BTreeMap<Id, PresetResponse>,
    next_device_id: Id,
    next_preset_id: Id,
    failures: Vec<Failure>,
    /// Applied immediately but answered late, once per entry
    delayed_responses: Vec<(Operation, Duration)>,
    log: Vec<Operation>,
    latency: Option<Duration>,
}

/// In-process stand-in for the HTTP API with scripted failures.
#[derive(Default)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: ClientError) {
        self.fail_after(operation, 0, error);
    }

    /// Lets `skip` calls of `operation` through, then fails the following one.
    pub fn fail_after(&self, operation: Operation, skip: usize, error: ClientError) {
        self.lock().failures.push(Failure {
            operation,
            skip,
            error,
        });
    }

    /// Delays every call, leaving room to cancel in-flight requests.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Applies the next call of `operation` at once but holds its response
    /// back for `delay`, as a slow network would.
    pub fn delay_next_response(&self, operation: Operation, delay: Duration) {
        self.lock().delayed_responses.push((operation, delay));
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.lock().log.clone()
    }

    pub fn devices(&self) -> Vec<DeviceResponse> {
        self.lock().devices.values().cloned().collect()
    }

    pub fn presets(&self) -> Vec<PresetResponse> {
        self.lock().presets.values().cloned().collect()
    }

    pub fn insert_device(&self, request: CreateDeviceRequest) -> DeviceResponse {
        self.lock().insert_device(request)
    }

    pub fn insert_preset(&self, request: CreatePresetRequest) -> PresetResponse {
        self.lock().insert_preset(request)
    }

    async fn call<T>(
        &self,
        operation: Operation,
        handler: impl FnOnce(&mut Inner) -> Result<T>,
    ) -> Result<T> {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let (result, delay) = {
            let mut inner = self.lock();
            inner.log.push(operation);

            if let Some(error) = inner.take_failure(operation) {
                return Err(error);
            }

            let delay = inner.take_delay(operation);
            (handler(&mut inner), delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        result
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

fn device_not_found() -> ClientError {
    ClientError::api(404, "Device not found")
}

fn preset_not_found() -> ClientError {
    ClientError::api(404, "Preset not found")
}

impl Inner {
    fn take_failure(&mut self, operation: Operation) -> Option<ClientError> {
        let index = self
            .failures
            .iter()
            .position(|failure| failure.operation == operation)?;

        if self.failures[index].skip > 0 {
            self.failures[index].skip -= 1;
            return None;
        }

        Some(self.failures.remove(index).error)
    }

    fn take_delay(&mut self, operation: Operation) -> Option<Duration> {
        let index = self
            .delayed_responses
            .iter()
            .position(|(delayed, _)| *delayed == operation)?;

        Some(self.delayed_responses.remove(index).1)
    }

    fn insert_device(&mut self, request: CreateDeviceRequest) -> DeviceResponse {
        self.next_device_id += 1;
        let now = now();
        let device = DeviceResponse {
            id: self.next_device_id,
            device_type: request.device_type,
            name: request.name,
            settings: request.settings,
            position_x: request.position_x,
            position_y: request.position_y,
            created_at: now,
            updated_at: now,
        };

        self.devices.insert(device.id, device.clone());
        device
    }

    fn insert_preset(&mut self, request: CreatePresetRequest) -> PresetResponse {
        self.next_preset_id += 1;
        let now = now();
        let preset = PresetResponse {
            id: self.next_preset_id,
            name: request.name,
            description: request.description,
            devices: request.devices,
            created_at: now,
            updated_at: now,
        };

        self.presets.insert(preset.id, preset.clone());
        preset
    }
}

#[async_trait]
impl DeviceApi for MemoryBackend {
    async fn list_devices(&self) -> Result<Vec<DeviceResponse>> {
        self.call(Operation::ListDevices, |inner| {
            Ok(inner.devices.values().cloned().collect())
        })
        .await
    }

    async fn get_device(&self, id: Id) -> Result<DeviceResponse> {
        self.call(Operation::GetDevice, |inner| {
            inner.devices.get(&id).cloned().ok_or_else(device_not_found)
        })
        .await
    }

    async fn create_device(&self, request: &CreateDeviceRequest) -> Result<DeviceResponse> {
        let request = request.clone();
        self.call(Operation::CreateDevice, |inner| Ok(inner.insert_device(request)))
            .await
    }

    async fn update_device(&self, id: Id, request: &UpdateDeviceRequest) -> Result<DeviceResponse> {
        let request = request.clone();
        self.call(Operation::UpdateDevice, |inner| {
            let device = inner.devices.get_mut(&id).ok_or_else(device_not_found)?;

            if let Some(device_type) = request.device_type {
                device.device_type = device_type;
            }
            if let Some(name) = request.name {
                device.name = name;
            }
            if let Some(settings) = request.settings {
                device.settings = settings;
            }
            if let Some(position_x) = request.position_x {
                device.position_x = position_x;
            }
            if let Some(position_y) = request.position_y {
                device.position_y = position_y;
            }
            device.updated_at = now();

            Ok(device.clone())
        })
        .await
    }

    async fn delete_device(&self, id: Id) -> Result<()> {
        self.call(Operation::DeleteDevice, |inner| {
            inner.devices.remove(&id).map(|_| ()).ok_or_else(device_not_found)
        })
        .await
    }

    async fn delete_all_devices(&self) -> Result<()> {
        self.call(Operation::DeleteAllDevices, |inner| {
            inner.devices.clear();
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl PresetApi for MemoryBackend {
    async fn list_presets(&self) -> Result<Vec<PresetResponse>> {
        self.call(Operation::ListPresets, |inner| {
            Ok(inner.presets.values().cloned().collect())
        })
        .await
    }

    async fn get_preset(&self, id: Id) -> Result<PresetResponse> {
        self.call(Operation::GetPreset, |inner| {
            inner.presets.get(&id).cloned().ok_or_else(preset_not_found)
        })
        .await
    }

    async fn create_preset(&self, request: &CreatePresetRequest) -> Result<PresetResponse> {
        let request = request.clone();
        self.call(Operation::CreatePreset, |inner| {
            if request.devices.is_empty() {
                let mut errors = FieldErrors::new();
                errors.insert(
                    String::from("devices"),
                    vec![String::from("The devices field is required.")],
                );
                return Err(ClientError::Api {
                    status: 422,
                    message: String::from("Validation error"),
                    errors,
                });
            }

            Ok(inner.insert_preset(request))
        })
        .await
    }

    async fn update_preset(&self, id: Id, request: &UpdatePresetRequest) -> Result<PresetResponse> {
        let request = request.clone();
        self.call(Operation::UpdatePreset, |inner| {
            let preset = inner.presets.get_mut(&id).ok_or_else(preset_not_found)?;

            if let Some(name) = request.name {
                preset.name = name;
            }
            if let Some(description) = request.description {
                preset.description = description;
            }
            if let Some(devices) = request.devices {
                preset.devices = devices;
            }
            preset.updated_at = now();

            Ok(preset.clone())
        })
        .await
    }

    async fn delete_preset(&self, id: Id) -> Result<()> {
        self.call(Operation::DeletePreset, |inner| {
            inner.presets.remove(&id).map(|_| ()).ok_or_else(preset_not_found)
        })
        .await
    }

    async fn load_preset(&self, id: Id) -> Result<PresetResponse> {
        self.call(Operation::LoadPreset, |inner| {
            inner.presets.get(&id).cloned().ok_or_else(preset_not_found)
        })
        .await
    }
}
