/// Structured GPU buffer of fixed-stride records.
///
/// Wraps a device `Buffer` holding an array of `T`. The buffer grows by
/// powers of two when a full update no longer fits; growing recreates the
/// device buffer and rewrites every element. The shader binding slot is
/// resolved by name once, at creation.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use bytemuck::Pod;
use crate::error::Result;
use crate::{engine_bail, engine_err, engine_debug, engine_warn};
use crate::graphics_device::{Buffer, BufferDesc, BufferUsage, GraphicsDevice};

/// Descriptor for creating a GpuBufferHandler
#[derive(Debug, Clone)]
pub struct GpuBufferHandlerDesc {
    /// Debug name of the device buffer
    pub name: String,
    /// Shader input the buffer is bound to
    pub shader_input_name: String,
    /// Elements allocated up front (at least 1)
    pub initial_capacity: u32,
}

pub struct GpuBufferHandler<T: Pod> {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    name: String,
    shader_input_index: Option<u32>,
    buffer: Arc<dyn Buffer>,
    capacity: u32,
    _element: PhantomData<T>,
}

impl<T: Pod> GpuBufferHandler<T> {
    const STRIDE: u64 = std::mem::size_of::<T>() as u64;

    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, desc: GpuBufferHandlerDesc) -> Result<Self> {
        let capacity = desc.initial_capacity.max(1);
        let (buffer, shader_input_index) = {
            let mut locked = device.lock()
                .map_err(|_| engine_err!("galaxy3d::GpuBufferHandler",
                    "GraphicsDevice lock poisoned while creating '{}'", desc.name))?;
            let shader_input_index = locked.shader_input_index(&desc.shader_input_name);
            let buffer = locked.create_buffer(BufferDesc {
                name: desc.name.clone(),
                size: Self::STRIDE * capacity as u64,
                usage: BufferUsage::Storage,
            })?;
            (buffer, shader_input_index)
        };

        if shader_input_index.is_none() {
            engine_warn!("galaxy3d::GpuBufferHandler",
                "Shader input '{}' not found, '{}' will not be bound",
                desc.shader_input_name, desc.name);
        }

        Ok(Self {
            device,
            name: desc.name,
            shader_input_index,
            buffer,
            capacity,
            _element: PhantomData,
        })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str { &self.name }

    /// Elements the device buffer can hold
    pub fn capacity(&self) -> u32 { self.capacity }

    /// Size of one element in bytes
    pub fn stride(&self) -> u64 { Self::STRIDE }

    /// Binding slot of the shader input, if any shader declares it
    pub fn shader_input_index(&self) -> Option<u32> { self.shader_input_index }

    pub fn buffer(&self) -> &Arc<dyn Buffer> { &self.buffer }

    // ===== UPDATES =====

    /// Write `elements` from index 0, growing the buffer if they do not fit
    ///
    /// A grown buffer replaces the current one only once the write into it
    /// succeeded; on error the handler still points at the previous buffer.
    pub fn update_buffer(&mut self, elements: &[T]) -> Result<()> {
        let count = elements.len() as u32;
        if count > self.capacity {
            let (buffer, capacity) = self.allocate(count)?;
            buffer.update(0, bytemuck::cast_slice(elements))?;

            engine_debug!("galaxy3d::GpuBufferHandler",
                "Grew '{}' from {} to {} elements", self.name, self.capacity, capacity);
            self.buffer = buffer;
            self.capacity = capacity;
            return Ok(());
        }
        if elements.is_empty() {
            return Ok(());
        }
        self.buffer.update(0, bytemuck::cast_slice(elements))
    }

    /// Write `elements` starting at element `first`
    ///
    /// # Errors
    ///
    /// Returns an error if the range exceeds the current capacity.
    pub fn update_range(&self, first: u32, elements: &[T]) -> Result<()> {
        let end = first as u64 + elements.len() as u64;
        if end > self.capacity as u64 {
            engine_bail!("galaxy3d::GpuBufferHandler",
                "Range [{}, {}) exceeds capacity {} of '{}'", first, end, self.capacity, self.name);
        }
        if elements.is_empty() {
            return Ok(());
        }
        self.buffer.update(Self::STRIDE * first as u64, bytemuck::cast_slice(elements))
    }

    fn allocate(&self, required: u32) -> Result<(Arc<dyn Buffer>, u32)> {
        let capacity = required.next_power_of_two();
        let buffer = self.device.lock()
            .map_err(|_| engine_err!("galaxy3d::GpuBufferHandler",
                "GraphicsDevice lock poisoned while growing '{}'", self.name))?
            .create_buffer(BufferDesc {
                name: self.name.clone(),
                size: Self::STRIDE * capacity as u64,
                usage: BufferUsage::Storage,
            })?;
        Ok((buffer, capacity))
    }
}

#[cfg(test)]
#[path = "gpu_buffer_handler_tests.rs"]
mod tests;
