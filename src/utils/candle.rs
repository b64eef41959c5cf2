// src/utils/candle.rs
use candle_core::Device;
use once_cell::sync::Lazy;

// All crops share one device for the life of the process.
static CANDLE_DEVICE: Lazy<Device> = Lazy::new(|| {
    log::info!("Using Candle CPU device for inference.");
    Device::Cpu
});

pub fn inference_device() -> &'static Device {
    &CANDLE_DEVICE
}
