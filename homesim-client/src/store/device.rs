use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use homesim_api::models::*;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::{InFlight, cancellable};
use crate::error::{ClientError, Result};
use crate::settings::Position;
use crate::transport::DeviceApi;

/// A device as the canvas renders it: coordinates always resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalDevice {
    pub id: Id,
    pub device_type: DeviceType,
    pub name: String,
    pub position: Position,
    pub settings: Settings,
}

impl LocalDevice {
    pub fn from_response(device: DeviceResponse, fallback: Position) -> Self {
        Self {
            id: device.id,
            device_type: device.device_type,
            name: device.name,
            position: Position::new(
                device.position_x.unwrap_or(fallback.x),
                device.position_y.unwrap_or(fallback.y),
            ),
            settings: device.settings,
        }
    }

    pub fn template(&self) -> DeviceTemplate {
        DeviceTemplate {
            device_type: self.device_type,
            name: self.name.clone(),
            settings: self.settings.clone(),
        }
    }

    pub fn create_request(&self) -> CreateDeviceRequest {
        CreateDeviceRequest {
            device_type: self.device_type,
            name: self.name.clone(),
            settings: self.settings.clone(),
            position_x: Some(self.position.x),
            position_y: Some(self.position.y),
        }
    }

    fn update_request(&self) -> UpdateDeviceRequest {
        UpdateDeviceRequest {
            device_type: Some(self.device_type),
            name: Some(self.name.clone()),
            settings: Some(self.settings.clone()),
            position_x: Some(Some(self.position.x)),
            position_y: Some(Some(self.position.y)),
        }
    }
}

/// Optimistic edit of one settings key that the backend has not confirmed yet.
struct PendingEdit {
    generation: u64,
    /// Last value known to be stored server side; `None` if the key was absent
    confirmed: Option<Value>,
}

#[derive(Default)]
struct DeviceState {
    devices: Vec<LocalDevice>,
    pending: HashMap<Id, HashMap<String, PendingEdit>>,
    next_generation: u64,
    /// Stamped on every request that can replace a device record
    next_sequence: u64,
    /// Sequence of the newest response reconciled per device
    applied: HashMap<Id, u64>,
    error: Option<String>,
}

pub struct DeviceStore {
    api: Arc<dyn DeviceApi>,
    fallback: Position,
    state: RwLock<DeviceState>,
    in_flight: AtomicUsize,
}

impl DeviceStore {
    pub fn new(api: Arc<dyn DeviceApi>, fallback: Position) -> Self {
        Self {
            api,
            fallback,
            state: RwLock::default(),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DeviceState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DeviceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn devices(&self) -> Vec<LocalDevice> {
        self.read().devices.clone()
    }

    pub fn device(&self, id: Id) -> Option<LocalDevice> {
        self.read().devices.iter().find(|device| device.id == id).cloned()
    }

    pub fn fallback(&self) -> Position {
        self.fallback
    }

    pub fn loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// True while `id` has optimistic edits the backend has not confirmed.
    pub fn has_pending_edits(&self, id: Id) -> bool {
        self.read().pending.contains_key(&id)
    }

    pub(crate) fn record_error(&self, error: &ClientError) {
        if !error.is_cancelled() {
            self.write().error = Some(error.to_string());
        }
    }

    fn fail<T>(&self, error: ClientError) -> Result<T> {
        if !error.is_cancelled() {
            self.write().error = Some(error.to_string());
        }
        Err(error)
    }

    fn not_found<T>(&self, id: Id) -> Result<T> {
        self.fail(ClientError::NotFound {
            resource: "Device",
            id,
        })
    }

    /// Replaces the local list with the backend's.
    pub async fn fetch_devices(&self, cancel: &CancellationToken) -> Result<Vec<LocalDevice>> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.list_devices()).await {
            Ok(devices) => {
                let devices: Vec<_> = devices
                    .into_iter()
                    .map(|device| LocalDevice::from_response(device, self.fallback))
                    .collect();

                let mut state = self.write();
                state.devices = devices.clone();
                state.pending.clear();
                state.next_sequence += 1;
                let sequence = state.next_sequence;
                state.applied = devices.iter().map(|device| (device.id, sequence)).collect();
                state.error = None;
                Ok(devices)
            }
            Err(error) => self.fail(error),
        }
    }

    pub async fn refresh_device(&self, id: Id, cancel: &CancellationToken) -> Result<LocalDevice> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.get_device(id)).await {
            Ok(device) => {
                let device = LocalDevice::from_response(device, self.fallback);

                let mut state = self.write();
                match state.devices.iter_mut().find(|local| local.id == id) {
                    Some(local) => *local = device.clone(),
                    None => state.devices.push(device.clone()),
                }
                state.pending.remove(&id);
                state.next_sequence += 1;
                let sequence = state.next_sequence;
                state.applied.insert(id, sequence);
                state.error = None;
                Ok(device)
            }
            Err(error) => self.fail(error),
        }
    }

    /// Appends the confirmed record; the canvas decides whether others stay.
    pub async fn create_device(
        &self,
        request: &CreateDeviceRequest,
        cancel: &CancellationToken,
    ) -> Result<LocalDevice> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.create_device(request)).await {
            Ok(device) => {
                let device = LocalDevice::from_response(device, self.fallback);

                let mut state = self.write();
                state.devices.push(device.clone());
                state.error = None;
                Ok(device)
            }
            Err(error) => self.fail(error),
        }
    }

    /// Merges `partial` into the local settings before anything is sent.
    pub fn update_device_local(&self, id: Id, partial: Settings) -> Result<()> {
        let mut guard = self.write();

        let Some(index) = guard.devices.iter().position(|device| device.id == id) else {
            drop(guard);
            return self.not_found(id);
        };

        let state = &mut *guard;
        let device = &mut state.devices[index];
        let pending = state.pending.entry(id).or_default();

        for (key, value) in partial {
            state.next_generation += 1;
            let generation = state.next_generation;

            match pending.get_mut(&key) {
                Some(edit) => edit.generation = generation,
                None => {
                    let confirmed = device.settings.get(&key).cloned();
                    pending.insert(key.clone(), PendingEdit { generation, confirmed });
                }
            }
            device.settings.insert(key, value);
        }

        Ok(())
    }

    /// Sends the device's current local shape. On failure only the keys
    /// that were not edited again since this call started are rolled back.
    pub async fn persist_device(&self, id: Id, cancel: &CancellationToken) -> Result<LocalDevice> {
        let snapshot = {
            let mut guard = self.write();
            guard.next_sequence += 1;
            let sequence = guard.next_sequence;

            let state = &*guard;
            let snapshot = state.devices.iter().find(|device| device.id == id).map(|device| {
                let issued: HashMap<String, u64> = state
                    .pending
                    .get(&id)
                    .map(|edits| {
                        edits
                            .iter()
                            .map(|(key, edit)| (key.clone(), edit.generation))
                            .collect()
                    })
                    .unwrap_or_default();

                (device.update_request(), issued, sequence)
            });
            snapshot
        };
        let Some((request, issued, sequence)) = snapshot else {
            return self.not_found(id);
        };

        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.update_device(id, &request)).await {
            Ok(device) => Ok(self.confirm(device, &issued, sequence)),
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(error) => {
                self.rollback(id, &issued);
                tracing::warn!(device_id = id, "device update failed, rolled back: {}", error);
                self.fail(error)
            }
        }
    }

    /// Reconciles a successful update. A response older than one already
    /// reconciled for the same device is discarded.
    fn confirm(&self, device: DeviceResponse, issued: &HashMap<String, u64>, sequence: u64) -> LocalDevice {
        let mut confirmed = LocalDevice::from_response(device, self.fallback);
        let id = confirmed.id;

        let mut guard = self.write();
        let state = &mut *guard;

        if state.applied.get(&id).is_some_and(|&applied| applied > sequence) {
            tracing::debug!(device_id = id, sequence, "discarding out-of-order device update response");
            return state
                .devices
                .iter()
                .find(|device| device.id == id)
                .cloned()
                .unwrap_or(confirmed);
        }
        state.applied.insert(id, sequence);

        if let Some(pending) = state.pending.get_mut(&id) {
            let local = state.devices.iter().find(|device| device.id == id);

            pending.retain(|key, edit| {
                if issued.get(key) == Some(&edit.generation) {
                    return false;
                }

                // edited again while in flight: the newer local value wins
                edit.confirmed = confirmed.settings.get(key).cloned();
                match local.and_then(|device| device.settings.get(key)) {
                    Some(value) => confirmed.settings.insert(key.clone(), value.clone()),
                    None => confirmed.settings.remove(key),
                };
                true
            });

            if pending.is_empty() {
                state.pending.remove(&id);
            }
        }

        if let Some(local) = state.devices.iter_mut().find(|device| device.id == id) {
            *local = confirmed.clone();
        }
        state.error = None;

        confirmed
    }

    fn rollback(&self, id: Id, issued: &HashMap<String, u64>) {
        let mut guard = self.write();
        let state = &mut *guard;

        let Some(pending) = state.pending.get_mut(&id) else {
            return;
        };
        let mut device = state.devices.iter_mut().find(|device| device.id == id);

        pending.retain(|key, edit| {
            if issued.get(key) != Some(&edit.generation) {
                return true;
            }

            if let Some(device) = device.as_mut() {
                match &edit.confirmed {
                    Some(value) => device.settings.insert(key.clone(), value.clone()),
                    None => device.settings.remove(key),
                };
            }
            false
        });

        if pending.is_empty() {
            state.pending.remove(&id);
        }
    }

    pub async fn delete_device(&self, id: Id, cancel: &CancellationToken) -> Result<()> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.delete_device(id)).await {
            Ok(()) => {
                let mut state = self.write();
                state.devices.retain(|device| device.id != id);
                state.pending.remove(&id);
                state.applied.remove(&id);
                state.error = None;
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }

    pub async fn delete_all_devices(&self, cancel: &CancellationToken) -> Result<()> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.delete_all_devices()).await {
            Ok(()) => {
                let mut state = self.write();
                state.devices.clear();
                state.pending.clear();
                state.applied.clear();
                state.error = None;
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }
}
