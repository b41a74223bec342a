use homesim_api::models::{
    CreateDeviceRequest, DeviceResponse, DeviceType, Settings, UpdateDeviceRequest,
};
use sqlx::types::Json;
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Device {
    pub id: i32,
    #[sqlx(try_from = "String")]
    pub device_type: DeviceType,
    pub name: String,
    pub settings: Json<Settings>,
    pub position_x: Option<i32>,
    pub position_y: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Device {
    pub fn new(request: CreateDeviceRequest) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            id: 0,
            device_type: request.device_type,
            name: request.name,
            settings: Json(request.settings),
            position_x: request.position_x,
            position_y: request.position_y,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges the supplied fields; `settings` is replaced as a whole.
    pub fn apply(&mut self, request: UpdateDeviceRequest) {
        if let Some(device_type) = request.device_type {
            self.device_type = device_type;
        }
        if let Some(name) = request.name {
            self.name = name;
        }
        if let Some(settings) = request.settings {
            self.settings = Json(settings);
        }
        if let Some(position_x) = request.position_x {
            self.position_x = position_x;
        }
        if let Some(position_y) = request.position_y {
            self.position_y = position_y;
        }
        self.updated_at = OffsetDateTime::now_utc();
    }
}

impl From<Device> for DeviceResponse {
    fn from(device: Device) -> Self {
        DeviceResponse {
            id: device.id,
            device_type: device.device_type,
            name: device.name,
            settings: device.settings.0,
            position_x: device.position_x,
            position_y: device.position_y,
            created_at: device.created_at,
            updated_at: device.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_type VARCHAR(16) NOT NULL CHECK (device_type IN ('light', 'fan')),
                name VARCHAR(255) NOT NULL,
                settings JSON NOT NULL,
                position_x INTEGER,
                position_y INTEGER,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
