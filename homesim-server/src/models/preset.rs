use homesim_api::models::{
    CreatePresetRequest, DeviceTemplate, PresetResponse, UpdatePresetRequest,
};
use sqlx::types::Json;
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Preset {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// Snapshot of device templates; never linked back to live devices.
    pub devices: Json<Vec<DeviceTemplate>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Preset {
    pub fn new(request: CreatePresetRequest) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: 0,
            name: request.name,
            description: request.description,
            devices: Json(request.devices),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, request: UpdatePresetRequest) {
        if let Some(name) = request.name {
            self.name = name;
        }
        if let Some(description) = request.description {
            self.description = description;
        }
        if let Some(devices) = request.devices {
            self.devices = Json(devices);
        }
        self.updated_at = OffsetDateTime::now_utc();
    }
}

impl From<Preset> for PresetResponse {
    fn from(preset: Preset) -> Self {
        PresetResponse {
            id: preset.id,
            name: preset.name,
            description: preset.description,
            devices: preset.devices.0,
            created_at: preset.created_at,
            updated_at: preset.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PresetTable;

impl Table for PresetTable {
    fn name(&self) -> &'static str {
        "presets"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS presets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                devices JSON NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS presets;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
