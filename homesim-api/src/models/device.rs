use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;

use super::{Id, Settings, deserialize_some};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// Dimmable light with color temperature
    Light,
    /// Variable speed fan
    Fan,
}

impl DeviceType {
    pub const ALL: [DeviceType; 2] = [DeviceType::Light, DeviceType::Fan];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Light => "light",
            DeviceType::Fan => "fan",
        }
    }

    /// Name given to a freshly dropped device, e.g. "Light Device".
    pub fn default_name(&self) -> String {
        match self {
            DeviceType::Light => String::from("Light Device"),
            DeviceType::Fan => String::from("Fan Device"),
        }
    }

    pub fn default_settings(&self) -> Settings {
        let value = match self {
            DeviceType::Light => json!({ "power": false, "brightness": 100, "colorTemp": "warm" }),
            DeviceType::Fan => json!({ "power": false, "speed": 0 }),
        };

        match value {
            serde_json::Value::Object(map) => map,
            _ => Settings::new(),
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownDeviceType(pub String);

impl fmt::Display for UnknownDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown device type: {}", self.0)
    }
}

impl std::error::Error for UnknownDeviceType {}

impl FromStr for DeviceType {
    type Err = UnknownDeviceType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(DeviceType::Light),
            "fan" => Ok(DeviceType::Fan),
            other => Err(UnknownDeviceType(other.to_string())),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = UnknownDeviceType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeviceRequest {
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Display name, at most 255 characters
    pub name: String,
    /// Type dependent control state
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub settings: Settings,
    /// Canvas x coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<i32>,
    /// Canvas y coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<i32>,
}

/// Partial device update. `None` leaves a field untouched; for coordinates,
/// `Some(None)` clears the stored value.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDeviceRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "docs", schema(value_type = Option<Object>))]
    pub settings: Option<Settings>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "docs", schema(value_type = Option<i32>))]
    pub position_x: Option<Option<i32>>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "docs", schema(value_type = Option<i32>))]
    pub position_y: Option<Option<i32>>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceResponse {
    /// Device identifier
    pub id: Id,
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Display name
    pub name: String,
    /// Control state
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub settings: Settings,
    /// Canvas x coordinate
    pub position_x: Option<i32>,
    /// Canvas y coordinate
    pub position_y: Option<i32>,
    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Position-agnostic device description stored inside a preset.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Display name
    pub name: String,
    /// Control state captured when the preset was saved
    #[cfg_attr(feature = "docs", schema(value_type = Object))]
    pub settings: Settings,
}
