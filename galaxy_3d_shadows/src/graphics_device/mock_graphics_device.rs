/// Mock GraphicsDevice for unit tests (no GPU required)
///
/// Buffers keep a CPU copy of their contents and a log of every write, so
/// tests can check which byte ranges a flush touched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use rustc_hash::FxHashMap;
use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graphics_device::{Buffer, BufferDesc, GraphicsDevice};

// ============================================================================
// Mock Buffer
// ============================================================================

/// One recorded `Buffer::update` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockWrite {
    pub offset: u64,
    pub len: usize,
}

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub name: String,
    contents: Mutex<Vec<u8>>,
    writes: Mutex<Vec<MockWrite>>,
    fail_updates: Arc<AtomicBool>,
}

impl MockBuffer {
    pub fn new(size: u64, name: String) -> Self {
        Self::with_failure_switch(size, name, Arc::new(AtomicBool::new(false)))
    }

    fn with_failure_switch(size: u64, name: String, fail_updates: Arc<AtomicBool>) -> Self {
        Self {
            size,
            name,
            contents: Mutex::new(vec![0u8; size as usize]),
            writes: Mutex::new(Vec::new()),
            fail_updates,
        }
    }

    /// Every write since creation (or the last `clear_writes`)
    pub fn writes(&self) -> Vec<MockWrite> {
        self.writes.lock().unwrap().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// Copy of the bytes in `[offset, offset + len)`
    pub fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        let contents = self.contents.lock().unwrap();
        contents[offset as usize..offset as usize + len].to_vec()
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(Error::BackendError(format!("mock buffer '{}' rejected update", self.name)));
        }
        let end = offset + data.len() as u64;
        if end > self.size {
            engine_bail!("galaxy3d::mock",
                "write [{}, {}) exceeds buffer '{}' size {}", offset, end, self.name, self.size);
        }
        self.contents.lock().unwrap()[offset as usize..end as usize].copy_from_slice(data);
        self.writes.lock().unwrap().push(MockWrite { offset, len: data.len() });
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

pub struct MockGraphicsDevice {
    created_buffers: Arc<Mutex<Vec<Arc<MockBuffer>>>>,
    shader_inputs: FxHashMap<String, u32>,
    fail_updates: Arc<AtomicBool>,
    fail_creation: bool,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            created_buffers: Arc::new(Mutex::new(Vec::new())),
            shader_inputs: FxHashMap::default(),
            fail_updates: Arc::new(AtomicBool::new(false)),
            fail_creation: false,
        }
    }

    /// Declare a shader input name with its binding index
    pub fn with_shader_input(mut self, name: &str, index: u32) -> Self {
        self.shader_inputs.insert(name.to_string(), index);
        self
    }

    /// Make every `create_buffer` call fail
    pub fn with_failing_creation(mut self) -> Self {
        self.fail_creation = true;
        self
    }

    /// Shared view of every buffer the device created, in creation order
    pub fn created_buffers(&self) -> Arc<Mutex<Vec<Arc<MockBuffer>>>> {
        self.created_buffers.clone()
    }

    /// Switch that makes every buffer update fail while set
    pub fn update_failure_switch(&self) -> Arc<AtomicBool> {
        self.fail_updates.clone()
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>> {
        if self.fail_creation {
            return Err(Error::OutOfMemory);
        }
        let buffer = Arc::new(MockBuffer::with_failure_switch(
            desc.size,
            desc.name,
            self.fail_updates.clone(),
        ));
        self.created_buffers.lock().unwrap().push(buffer.clone());
        Ok(buffer)
    }

    fn shader_input_index(&self, name: &str) -> Option<u32> {
        self.shader_inputs.get(name).copied()
    }
}

/// Latest buffer created under `name`
pub fn latest_buffer(buffers: &Arc<Mutex<Vec<Arc<MockBuffer>>>>, name: &str) -> Option<Arc<MockBuffer>> {
    buffers.lock().unwrap().iter().rev().find(|b| b.name == name).cloned()
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
