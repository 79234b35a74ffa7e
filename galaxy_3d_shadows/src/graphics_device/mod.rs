/// Graphics device module - the GPU resource layer consumed by the shadow subsystem

pub mod graphics_device;
pub mod buffer;

pub use graphics_device::*;
pub use buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
