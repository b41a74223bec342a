mod device_handle;
mod preset_handle;
mod user_handle;

pub use device_handle::*;
pub use preset_handle::*;
pub use user_handle::*;
