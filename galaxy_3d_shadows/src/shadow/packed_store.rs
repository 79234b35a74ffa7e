/// Dense, iteration-friendly storage indexed by `ShadowId`.
///
/// Values live contiguously in a `Vec`. Removing one moves the last value
/// into the hole (swap-with-last) and reports the move, so anything keyed
/// on the dense position (GPU buffer slots) can follow it.

use slotmap::SecondaryMap;
use crate::error::{Error, Result};
use super::handle_allocator::ShadowId;

/// A value moved from one dense position to another by a removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    pub id: ShadowId,
    pub from: u32,
    pub to: u32,
}

pub struct PackedStore<T> {
    values: Vec<T>,
    /// Back-reference: dense position -> owning handle
    owners: Vec<ShadowId>,
    /// Handle -> dense position
    dense_index: SecondaryMap<ShadowId, u32>,
}

impl<T> PackedStore<T> {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            owners: Vec::new(),
            dense_index: SecondaryMap::new(),
        }
    }

    /// Append a value for `id` and return its dense position
    ///
    /// # Errors
    ///
    /// `Error::InvalidHandle` if `id` already owns a value.
    pub fn insert(&mut self, id: ShadowId, value: T) -> Result<u32> {
        if self.dense_index.contains_key(id) {
            return Err(Error::InvalidHandle(format!("{:?} already has a value", id)));
        }
        let index = self.values.len() as u32;
        self.values.push(value);
        self.owners.push(id);
        self.dense_index.insert(id, index);
        Ok(index)
    }

    /// Remove the value of `id`, compacting with swap-with-last
    ///
    /// Returns the value and, when another value had to move into the
    /// freed position, where it came from.
    pub fn remove(&mut self, id: ShadowId) -> Result<(T, Option<Relocation>)> {
        let index = self.dense_index.remove(id)
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} has no value", id)))?;

        let last = self.values.len() as u32 - 1;
        let value = self.values.swap_remove(index as usize);
        self.owners.swap_remove(index as usize);

        if index == last {
            return Ok((value, None));
        }

        let moved = self.owners[index as usize];
        self.dense_index.insert(moved, index);
        Ok((value, Some(Relocation { id: moved, from: last, to: index })))
    }

    pub fn get(&self, id: ShadowId) -> Result<&T> {
        let index = self.index_of(id)?;
        Ok(&self.values[index as usize])
    }

    pub fn get_mut(&mut self, id: ShadowId) -> Result<&mut T> {
        let index = self.index_of(id)?;
        Ok(&mut self.values[index as usize])
    }

    /// Dense position of `id`
    pub fn index_of(&self, id: ShadowId) -> Result<u32> {
        self.dense_index.get(id)
            .copied()
            .ok_or_else(|| Error::InvalidHandle(format!("{:?} has no value", id)))
    }

    /// Handle stored at a dense position
    pub fn owner(&self, index: u32) -> Option<ShadowId> {
        self.owners.get(index as usize).copied()
    }

    pub fn contains(&self, id: ShadowId) -> bool {
        self.dense_index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in dense order
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// `(handle, value)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (ShadowId, &T)> {
        self.owners.iter().copied().zip(self.values.iter())
    }
}

impl<T> Default for PackedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "packed_store_tests.rs"]
mod tests;
