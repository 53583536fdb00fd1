#![allow(missing_docs, reason = "consumed by the viewer crates only")]
#![cfg_attr(test, allow(clippy::unwrap_used, reason = "tests"))]

pub mod image_source;
pub mod logging;
pub mod render_device;

pub use image_source::{FetchError, FileImageSource, ImageSource, MemoryImageSource};
pub use logging::init_logger;
pub use render_device::{
    DeviceError, FilterMode, Primitive, RecordingDevice, RenderDevice, SamplerSettings,
    ShaderStage, TextureImage, WrapMode,
};
#[cfg(target_family = "wasm")]
pub use render_device::WebGlDevice;
