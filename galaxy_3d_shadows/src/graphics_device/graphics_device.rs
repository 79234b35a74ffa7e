/// GraphicsDevice trait - factory for GPU buffers and shader-input lookup

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{Buffer, BufferDesc};

/// GPU resource factory
///
/// Implemented by backend-specific devices. The shadow subsystem only needs
/// buffer allocation and the binding slot of named shader inputs.
pub trait GraphicsDevice: Send + Sync {
    /// Create a buffer
    ///
    /// # Arguments
    ///
    /// * `desc` - Buffer descriptor (debug name, size in bytes, usage)
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Binding index of a named shader input (e.g. "m_projectedShadows")
    ///
    /// Returns None when no shader layout declares the input.
    fn shader_input_index(&self, name: &str) -> Option<u32>;
}
