//! Per-device control panels: a derived view plus actions that edit the
//! local copy first and persist afterwards.

use std::sync::Arc;

use homesim_api::models::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::error::{ClientError, Result};
use crate::notify::{Notification, Notifier};
use crate::store::{DeviceStore, LocalDevice};

const FASTEST_ROTATION_SECS: f32 = 0.3;
const SLOWEST_ROTATION_SECS: f32 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LightView {
    pub power: bool,
    pub brightness: u8,
    pub color_temp: ColorTemp,
    pub color_hex: &'static str,
    /// Glow intensity in `0.0..=1.0`; zero while switched off
    pub opacity: f32,
}

impl From<LightSettings> for LightView {
    fn from(settings: LightSettings) -> Self {
        Self {
            power: settings.power,
            brightness: settings.brightness,
            color_temp: settings.color_temp,
            color_hex: settings.color_temp.hex(),
            opacity: if settings.power {
                f32::from(settings.brightness) / 100.0
            } else {
                0.0
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FanView {
    pub power: bool,
    pub speed: u8,
    /// Seconds per blade revolution; `None` while the fan stands still
    pub rotation_period: Option<f32>,
}

impl From<FanSettings> for FanView {
    fn from(settings: FanSettings) -> Self {
        let rotation_period = (settings.power && settings.speed > 0).then(|| {
            SLOWEST_ROTATION_SECS
                - f32::from(settings.speed) / 100.0 * (SLOWEST_ROTATION_SECS - FASTEST_ROTATION_SECS)
        });

        Self {
            power: settings.power,
            speed: settings.speed,
            rotation_period,
        }
    }
}

fn percent(value: i32) -> i32 {
    value.clamp(0, 100)
}

fn single(key: &str, value: serde_json::Value) -> Settings {
    let mut settings = Settings::new();
    settings.insert(key.to_string(), value);
    settings
}

/// Optimistic edit followed by a persist; failures raise a notification.
async fn dispatch(
    devices: &DeviceStore,
    notifier: &dyn Notifier,
    device_id: Id,
    partial: Settings,
    cancel: &CancellationToken,
) -> Result<LocalDevice> {
    devices.update_device_local(device_id, partial)?;

    match devices.persist_device(device_id, cancel).await {
        Ok(device) => Ok(device),
        Err(error) => {
            if !error.is_cancelled() {
                notifier.notify(Notification::error(format!("Failed to update device: {error}")));
            }
            Err(error)
        }
    }
}

pub struct LightPanel {
    devices: Arc<DeviceStore>,
    notifier: Arc<dyn Notifier>,
    device_id: Id,
}

impl LightPanel {
    pub fn new(devices: Arc<DeviceStore>, notifier: Arc<dyn Notifier>, device_id: Id) -> Self {
        Self {
            devices,
            notifier,
            device_id,
        }
    }

    /// `None` when the device is gone or is not a light.
    pub fn view(&self) -> Option<LightView> {
        let device = self.devices.device(self.device_id)?;
        (device.device_type == DeviceType::Light)
            .then(|| LightSettings::from_settings(&device.settings).into())
    }

    pub async fn set_brightness(&self, brightness: i32, cancel: &CancellationToken) -> Result<LocalDevice> {
        self.apply(single(BRIGHTNESS, json!(percent(brightness))), cancel).await
    }

    pub async fn set_color(&self, color: ColorTemp, cancel: &CancellationToken) -> Result<LocalDevice> {
        self.apply(single(COLOR_TEMP, json!(color.as_str())), cancel).await
    }

    pub async fn toggle_power(&self, cancel: &CancellationToken) -> Result<LocalDevice> {
        let view = self.view().ok_or(ClientError::NotFound {
            resource: "Light",
            id: self.device_id,
        })?;

        self.apply(single(POWER, json!(!view.power)), cancel).await
    }

    async fn apply(&self, partial: Settings, cancel: &CancellationToken) -> Result<LocalDevice> {
        dispatch(&self.devices, self.notifier.as_ref(), self.device_id, partial, cancel).await
    }
}

pub struct FanPanel {
    devices: Arc<DeviceStore>,
    notifier: Arc<dyn Notifier>,
    device_id: Id,
}

impl FanPanel {
    pub fn new(devices: Arc<DeviceStore>, notifier: Arc<dyn Notifier>, device_id: Id) -> Self {
        Self {
            devices,
            notifier,
            device_id,
        }
    }

    pub fn view(&self) -> Option<FanView> {
        let device = self.devices.device(self.device_id)?;
        (device.device_type == DeviceType::Fan)
            .then(|| FanSettings::from_settings(&device.settings).into())
    }

    pub async fn set_speed(&self, speed: i32, cancel: &CancellationToken) -> Result<LocalDevice> {
        self.apply(single(SPEED, json!(percent(speed))), cancel).await
    }

    pub async fn toggle_power(&self, cancel: &CancellationToken) -> Result<LocalDevice> {
        let view = self.view().ok_or(ClientError::NotFound {
            resource: "Fan",
            id: self.device_id,
        })?;

        self.apply(single(POWER, json!(!view.power)), cancel).await
    }

    async fn apply(&self, partial: Settings, cancel: &CancellationToken) -> Result<LocalDevice> {
        dispatch(&self.devices, self.notifier.as_ref(), self.device_id, partial, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_view_opacity() {
        let view = LightView::from(LightSettings {
            power: true,
            brightness: 40,
            color_temp: ColorTemp::Pink,
        });
        assert!((view.opacity - 0.4).abs() < f32::EPSILON);
        assert_eq!(view.color_hex, "#FFB6C1");

        let view = LightView::from(LightSettings {
            power: false,
            brightness: 40,
            color_temp: ColorTemp::Pink,
        });
        assert_eq!(view.opacity, 0.0);
    }

    #[test]
    fn test_fan_rotation_period() {
        let period = |power, speed| FanView::from(FanSettings { power, speed }).rotation_period;

        assert_eq!(period(true, 0), None);
        assert_eq!(period(false, 80), None);
        assert!((period(true, 100).unwrap() - 0.3).abs() < 1e-6);
        assert!((period(true, 50).unwrap() - 1.65).abs() < 1e-6);
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(percent(-5), 0);
        assert_eq!(percent(150), 100);
        assert_eq!(percent(42), 42);
    }
}
