//! State layer for the smart-home simulator: device and preset stores, the
//! canvas drop controller and per-device control panels, all talking to the
//! backend through [`transport`].

pub mod canvas;
pub mod error;
pub mod notify;
pub mod panel;
pub mod settings;
pub mod store;
pub mod transport;

use std::sync::Arc;

pub use canvas::{CanvasController, DropPayload};
pub use error::{ClientError, Result};
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use panel::{FanPanel, FanView, LightPanel, LightView};
pub use settings::{CanvasMode, ClientSettings, Position};
pub use store::{DeviceStore, LocalDevice, PresetStore};
pub use tokio_util::sync::CancellationToken;
pub use transport::{DeviceApi, HttpClient, PresetApi};

use homesim_api::models::Id;

/// Stores, canvas and notifier wired onto one backend.
pub struct Simulator {
    pub devices: Arc<DeviceStore>,
    pub presets: Arc<PresetStore>,
    pub canvas: CanvasController,
    notifier: Arc<dyn Notifier>,
}

impl Simulator {
    /// Talks to the HTTP API at `settings.base_url` and logs notifications.
    pub fn connect(settings: &ClientSettings) -> Result<Self> {
        let client = Arc::new(HttpClient::new(settings)?);
        Ok(Self::with_backend(client, settings, Arc::new(TracingNotifier)))
    }

    pub fn with_backend<B>(backend: Arc<B>, settings: &ClientSettings, notifier: Arc<dyn Notifier>) -> Self
    where
        B: DeviceApi + PresetApi + 'static,
    {
        let devices = Arc::new(DeviceStore::new(backend.clone(), settings.fallback_position));
        let presets = Arc::new(PresetStore::new(backend));
        let canvas = CanvasController::new(
            devices.clone(),
            presets.clone(),
            notifier.clone(),
            settings.canvas_mode,
        );

        Self {
            devices,
            presets,
            canvas,
            notifier,
        }
    }

    pub fn light_panel(&self, device_id: Id) -> LightPanel {
        LightPanel::new(self.devices.clone(), self.notifier.clone(), device_id)
    }

    pub fn fan_panel(&self, device_id: Id) -> FanPanel {
        FanPanel::new(self.devices.clone(), self.notifier.clone(), device_id)
    }
}
