//! The drop target.
//!
//! A drop is a short saga: optionally clear the canvas, then create one or
//! more devices. When any step fails the devices created so far are deleted
//! and, if the canvas was cleared, the previous devices are recreated.

use std::sync::Arc;

use homesim_api::models::*;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::notify::{Notification, Notifier};
use crate::settings::{CanvasMode, Position};
use crate::store::{DeviceStore, LocalDevice, PresetStore};

/// What was dragged onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DropPayload {
    /// A device type from the palette
    Device { device_type: DeviceType },
    /// A saved preset as captured when the drag started
    Preset(PresetResponse),
}

struct DropPlan {
    clear: bool,
    requests: Vec<CreateDeviceRequest>,
    success: String,
}

#[derive(Default)]
struct SagaLog {
    cleared: bool,
    created: Vec<LocalDevice>,
}

pub struct CanvasController {
    devices: Arc<DeviceStore>,
    presets: Arc<PresetStore>,
    notifier: Arc<dyn Notifier>,
    mode: CanvasMode,
}

impl CanvasController {
    pub fn new(
        devices: Arc<DeviceStore>,
        presets: Arc<PresetStore>,
        notifier: Arc<dyn Notifier>,
        mode: CanvasMode,
    ) -> Self {
        Self {
            devices,
            presets,
            notifier,
            mode,
        }
    }

    pub fn mode(&self) -> CanvasMode {
        self.mode
    }

    /// Places the dropped payload at `position` (or the fallback position)
    /// and returns the devices created for it.
    pub async fn handle_drop(
        &self,
        payload: DropPayload,
        position: Option<Position>,
        cancel: &CancellationToken,
    ) -> Result<Vec<LocalDevice>> {
        let failure = match payload {
            DropPayload::Device { .. } => "Failed to create device. Please try again.",
            DropPayload::Preset(_) => "Failed to load preset. Please try again.",
        };
        let position = position.unwrap_or_else(|| self.devices.fallback());

        let plan = match self.plan(payload, position, cancel).await {
            Ok(plan) => plan,
            Err(error) => return Err(self.report(error, failure)),
        };

        let previous = self.devices.devices();
        let mut log = SagaLog::default();

        match self.execute(&plan, &mut log, cancel).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(plan.success));
                Ok(log.created)
            }
            Err(error) => {
                self.compensate(log, previous).await;
                self.devices.record_error(&error);
                Err(self.report(error, failure))
            }
        }
    }

    async fn plan(
        &self,
        payload: DropPayload,
        position: Position,
        cancel: &CancellationToken,
    ) -> Result<DropPlan> {
        let at = |template: DeviceTemplate| CreateDeviceRequest {
            device_type: template.device_type,
            name: template.name,
            settings: template.settings,
            position_x: Some(position.x),
            position_y: Some(position.y),
        };

        match payload {
            DropPayload::Device { device_type } => {
                let name = device_type.default_name();
                Ok(DropPlan {
                    clear: self.mode == CanvasMode::Single,
                    requests: vec![at(DeviceTemplate {
                        device_type,
                        name: name.clone(),
                        settings: device_type.default_settings(),
                    })],
                    success: format!("{name} added"),
                })
            }
            DropPayload::Preset(snapshot) => {
                // the drag payload may be stale; only its id is trusted
                let preset = self.presets.load_preset(snapshot.id, cancel).await?;
                if preset.devices.is_empty() {
                    return Err(ClientError::EmptyPreset);
                }

                let take = match self.mode {
                    CanvasMode::Single => 1,
                    CanvasMode::Multi => preset.devices.len(),
                };

                Ok(DropPlan {
                    clear: true,
                    requests: preset.devices.into_iter().take(take).map(at).collect(),
                    success: format!("Preset \"{}\" loaded", preset.name),
                })
            }
        }
    }

    async fn execute(
        &self,
        plan: &DropPlan,
        log: &mut SagaLog,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if plan.clear {
            match self.devices.delete_all_devices(cancel).await {
                Ok(()) => log.cleared = true,
                Err(ClientError::Cancelled) => {
                    log.cleared = self.clear_outcome().await;
                    return Err(ClientError::Cancelled);
                }
                Err(error) => return Err(error),
            }
        }

        for request in &plan.requests {
            let device = self.devices.create_device(request, cancel).await?;
            log.created.push(device);
        }

        Ok(())
    }

    /// A clear abandoned mid-flight may still have reached the backend, so
    /// the local list is re-read under a fresh token. Returns whether the
    /// canvas ended up empty.
    async fn clear_outcome(&self) -> bool {
        match self.devices.fetch_devices(&CancellationToken::new()).await {
            Ok(devices) => devices.is_empty(),
            Err(error) => {
                tracing::warn!("could not resynchronize after cancelled clear: {}", error);
                false
            }
        }
    }

    /// Undoes a partially applied drop. Runs to completion even when the
    /// caller's token has fired.
    async fn compensate(&self, log: SagaLog, previous: Vec<LocalDevice>) {
        let cancel = CancellationToken::new();

        for device in log.created.iter().rev() {
            if let Err(error) = self.devices.delete_device(device.id, &cancel).await {
                tracing::warn!(device_id = device.id, "compensation could not delete device: {}", error);
            }
        }

        if log.cleared {
            for device in &previous {
                if let Err(error) = self.devices.create_device(&device.create_request(), &cancel).await {
                    tracing::warn!(device_id = device.id, "compensation could not restore device: {}", error);
                }
            }
        }

        tracing::warn!(
            removed = log.created.len(),
            restored = if log.cleared { previous.len() } else { 0 },
            "drop failed, canvas restored"
        );
    }

    fn report(&self, error: ClientError, message: &str) -> ClientError {
        if !error.is_cancelled() {
            self.notifier.notify(Notification::error(message));
        }
        error
    }

    /// Saves every device currently on the canvas as a new preset.
    pub async fn save_current_as_preset(
        &self,
        name: &str,
        description: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<PresetResponse> {
        let devices = self.devices.devices();

        match self.presets.save_preset(name, description, &devices, cancel).await {
            Ok(preset) => {
                self.notifier.notify(Notification::success("Preset saved successfully!"));
                Ok(preset)
            }
            Err(error) => {
                let message = match &error {
                    ClientError::Validation(message) => message.clone(),
                    ClientError::EmptyPreset => String::from("No devices to save"),
                    other => format!("Failed to save preset: {other}"),
                };
                Err(self.report(error, &message))
            }
        }
    }

    pub async fn remove_preset(&self, id: Id, cancel: &CancellationToken) -> Result<()> {
        match self.presets.delete_preset(id, cancel).await {
            Ok(()) => {
                self.notifier.notify(Notification::success("Preset deleted"));
                Ok(())
            }
            Err(error) => {
                let message = format!("Failed to delete preset: {error}");
                Err(self.report(error, &message))
            }
        }
    }
}
