use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{DeviceTemplate, Id, deserialize_some};

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePresetRequest {
    /// Preset name, at most 255 characters
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Non-empty list of device templates
    pub devices: Vec<DeviceTemplate>,
}

/// Partial preset update. A supplied `devices` list replaces the stored one.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePresetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_some",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "docs", schema(value_type = Option<String>))]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devices: Option<Vec<DeviceTemplate>>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Preset identifier
    pub id: Id,
    /// Preset name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Snapshot of the devices taken at save time
    pub devices: Vec<DeviceTemplate>,
    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
