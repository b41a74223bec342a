//! Backend access behind two trait seams so the stores can run against the
//! real HTTP API or an in-memory double.

mod http;
#[cfg(feature = "mock")]
mod memory;

pub use http::HttpClient;
#[cfg(feature = "mock")]
pub use memory::{MemoryBackend, Operation};

use async_trait::async_trait;
use homesim_api::models::*;

use crate::error::Result;

#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<DeviceResponse>>;

    async fn get_device(&self, id: Id) -> Result<DeviceResponse>;

    async fn create_device(&self, request: &CreateDeviceRequest) -> Result<DeviceResponse>;

    async fn update_device(&self, id: Id, request: &UpdateDeviceRequest) -> Result<DeviceResponse>;

    async fn delete_device(&self, id: Id) -> Result<()>;

    async fn delete_all_devices(&self) -> Result<()>;
}

#[async_trait]
pub trait PresetApi: Send + Sync {
    async fn list_presets(&self) -> Result<Vec<PresetResponse>>;

    async fn get_preset(&self, id: Id) -> Result<PresetResponse>;

    async fn create_preset(&self, request: &CreatePresetRequest) -> Result<PresetResponse>;

    async fn update_preset(&self, id: Id, request: &UpdatePresetRequest) -> Result<PresetResponse>;

    async fn delete_preset(&self, id: Id) -> Result<()>;

    /// Fetches the stored snapshot through the dedicated load route.
    async fn load_preset(&self, id: Id) -> Result<PresetResponse>;
}
