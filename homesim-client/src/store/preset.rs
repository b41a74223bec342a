use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use homesim_api::models::*;
use tokio_util::sync::CancellationToken;

use super::{InFlight, LocalDevice, cancellable};
use crate::error::{ClientError, Result};
use crate::transport::PresetApi;

#[derive(Default)]
struct PresetState {
    presets: Vec<PresetResponse>,
    error: Option<String>,
}

/// Saved presets. Mutations are never optimistic: the list only changes
/// once the backend has confirmed.
pub struct PresetStore {
    api: Arc<dyn PresetApi>,
    state: RwLock<PresetState>,
    in_flight: AtomicUsize,
}

impl PresetStore {
    pub fn new(api: Arc<dyn PresetApi>) -> Self {
        Self {
            api,
            state: RwLock::default(),
            in_flight: AtomicUsize::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, PresetState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PresetState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn presets(&self) -> Vec<PresetResponse> {
        self.read().presets.clone()
    }

    pub fn preset(&self, id: Id) -> Option<PresetResponse> {
        self.read().presets.iter().find(|preset| preset.id == id).cloned()
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

    fn fail<T>(&self, error: ClientError) -> Result<T> {
        if !error.is_cancelled() {
            self.write().error = Some(error.to_string());
        }
        Err(error)
    }

    pub async fn fetch_presets(&self, cancel: &CancellationToken) -> Result<Vec<PresetResponse>> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.list_presets()).await {
            Ok(presets) => {
                let mut state = self.write();
                state.presets = presets.clone();
                state.error = None;
                Ok(presets)
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(error) => {
                self.write().presets.clear();
                self.fail(error)
            }
        }
    }

    /// Snapshots `devices` into a new preset, dropping their positions.
    pub async fn save_preset(
        &self,
        name: &str,
        description: Option<String>,
        devices: &[LocalDevice],
        cancel: &CancellationToken,
    ) -> Result<PresetResponse> {
        if name.trim().is_empty() {
            return self.fail(ClientError::Validation(String::from("Please enter a preset name")));
        }
        if devices.is_empty() {
            return self.fail(ClientError::EmptyPreset);
        }

        let request = CreatePresetRequest {
            name: name.trim().to_string(),
            description,
            devices: devices.iter().map(LocalDevice::template).collect(),
        };

        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.create_preset(&request)).await {
            Ok(preset) => {
                let mut state = self.write();
                state.presets.push(preset.clone());
                state.error = None;
                tracing::debug!(preset_id = preset.id, "preset saved");
                Ok(preset)
            }
            Err(error) => self.fail(error),
        }
    }

    pub async fn update_preset(
        &self,
        id: Id,
        request: &UpdatePresetRequest,
        cancel: &CancellationToken,
    ) -> Result<PresetResponse> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.update_preset(id, request)).await {
            Ok(preset) => {
                self.store(preset.clone());
                Ok(preset)
            }
            Err(error) => self.fail(error),
        }
    }

    pub async fn delete_preset(&self, id: Id, cancel: &CancellationToken) -> Result<()> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.delete_preset(id)).await {
            Ok(()) => {
                let mut state = self.write();
                state.presets.retain(|preset| preset.id != id);
                state.error = None;
                Ok(())
            }
            Err(error) => self.fail(error),
        }
    }

    /// Re-reads one preset through the plain resource route.
    pub async fn refresh_preset(&self, id: Id, cancel: &CancellationToken) -> Result<PresetResponse> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.get_preset(id)).await {
            Ok(preset) => {
                self.store(preset.clone());
                Ok(preset)
            }
            Err(error) => self.fail(error),
        }
    }

    /// Re-reads one preset through the load route and caches the fresh copy.
    pub async fn load_preset(&self, id: Id, cancel: &CancellationToken) -> Result<PresetResponse> {
        let _guard = InFlight::start(&self.in_flight);

        match cancellable(cancel, self.api.load_preset(id)).await {
            Ok(preset) => {
                self.store(preset.clone());
                Ok(preset)
            }
            Err(error) => self.fail(error),
        }
    }

    fn store(&self, preset: PresetResponse) {
        let mut state = self.write();
        match state.presets.iter_mut().find(|cached| cached.id == preset.id) {
            Some(cached) => *cached = preset,
            None => state.presets.push(preset),
        }
        state.error = None;
    }
}
