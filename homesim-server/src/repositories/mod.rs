mod device;
mod preset;

pub use device::DeviceRepository;
pub use preset::PresetRepository;
