/// Issues and reclaims opaque shadow handles.
///
/// A `ShadowId` packs a slot index and a generation counter. Releasing a
/// handle bumps its slot's generation, so a stale handle never compares
/// equal to the handle that later reuses the slot.

use slotmap::{Key, SlotMap};
use crate::error::{Error, Result};
use crate::engine_warn;

slotmap::new_key_type! {
    /// Opaque handle to one projected shadow caster
    pub struct ShadowId;
}

impl ShadowId {
    /// Packed (generation << 32 | slot) representation, stable for logging
    pub fn to_bits(self) -> u64 {
        self.data().as_ffi()
    }
}

pub struct HandleAllocator {
    handles: SlotMap<ShadowId, ()>,
    capacity: usize,
}

impl HandleAllocator {
    /// Create an allocator that holds at most `capacity` live handles
    pub fn new(capacity: usize) -> Self {
        Self {
            handles: SlotMap::with_key(),
            capacity,
        }
    }

    /// Issue a fresh handle
    ///
    /// # Errors
    ///
    /// `Error::HandleExhausted` when `capacity` handles are live.
    pub fn acquire(&mut self) -> Result<ShadowId> {
        if self.handles.len() >= self.capacity {
            engine_warn!("galaxy3d::HandleAllocator",
                "Shadow handle capacity ({}) exhausted", self.capacity);
            return Err(Error::HandleExhausted { capacity: self.capacity });
        }
        Ok(self.handles.insert(()))
    }

    /// Invalidate a handle
    ///
    /// # Errors
    ///
    /// `Error::InvalidHandle` on double release or a foreign handle.
    pub fn release(&mut self, id: ShadowId) -> Result<()> {
        match self.handles.remove(id) {
            Some(()) => Ok(()),
            None => Err(Error::InvalidHandle(format!("{:?} is not live", id))),
        }
    }

    /// Whether `id` is currently live
    pub fn contains(&self, id: ShadowId) -> bool {
        self.handles.contains_key(id)
    }

    /// Number of live handles
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Maximum number of live handles
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
#[path = "handle_allocator_tests.rs"]
mod tests;
