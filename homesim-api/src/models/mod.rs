mod device;
mod preset;
mod response;
mod settings;

pub use device::*;
pub use preset::*;
pub use response::*;
pub use settings::*;

use serde::{Deserialize, Deserializer};

pub type Id = i32;

/// Open key/value bag describing a device's control state.
pub type Settings = serde_json::Map<String, serde_json::Value>;

/// Distinguishes an absent field from an explicit `null` on partial updates.
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
