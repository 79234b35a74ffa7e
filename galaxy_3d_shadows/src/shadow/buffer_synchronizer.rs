/// Reconciles dirty caster state into the two GPU buffers.
///
/// Setters only mark handles dirty. `flush` runs once per frame and:
///
/// - re-derives filter kernels of dirty ESM casters when an ESM pass exists,
/// - re-places shadow maps in the atlas when a resolution changed,
/// - repacks the records of dirty casters (all of them when the layout,
///   the filter table or the caster count changed),
/// - uploads one contiguous range per buffer covering every changed
///   record, or the whole buffer on a full rebuild.
///
/// All work happens on copies. State is committed only when every upload
/// succeeded, so a failed frame leaves the handles dirty for the next one.
/// A failed upload also schedules a full rebuild, since the device may hold
/// part of the new data or a freshly grown buffer.

use std::ops::Range;
use std::sync::{Arc, Mutex};
use bitflags::bitflags;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_debug;
use crate::graphics_device::GraphicsDevice;
use super::atlas::ShadowmapAtlas;
use super::filter::{derive_filter_kernel, FilterInputs, FilterKernel};
use super::gpu_buffer_handler::{GpuBufferHandler, GpuBufferHandlerDesc};
use super::gpu_data::{FilterParameterRecord, ShadowRecord};
use super::handle_allocator::ShadowId;
use super::packed_store::PackedStore;
use super::shadow_property::ShadowProperty;

pub const SHADOW_BUFFER_NAME: &str = "ProjectedShadowBuffer";
pub const SHADOW_SHADER_INPUT: &str = "m_projectedShadows";
pub const FILTER_BUFFER_NAME: &str = "ProjectedFilterParamsBuffer";
pub const FILTER_SHADER_INPUT: &str = "m_projectedFilterParams";

bitflags! {
    /// What a property change invalidates
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// The caster's ShadowRecord
        const RECORD = 1 << 0;
        /// The filter kernel and FilterParameterRecord
        const FILTER = 1 << 1;
        /// The shadow map size, hence the atlas placement
        const LAYOUT = 1 << 2;
    }
}

/// Which consuming passes the pipelines currently provide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassAvailability {
    pub projected_shadowmaps: bool,
    pub esm_shadowmaps: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No active pipeline renders projected shadow maps
    NoConsumingPass,
}

/// Result of one flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing consumes the buffers; dirty state is kept
    Skipped(SkipReason),
    /// Nothing was dirty
    Clean,
    /// Dirty state was reconciled; ranges are element indices written
    Uploaded {
        shadow_range: Option<Range<u32>>,
        filter_range: Option<Range<u32>>,
        full_rebuild: bool,
    },
}

pub struct BufferSynchronizer {
    shadow_buffer: GpuBufferHandler<ShadowRecord>,
    filter_buffer: GpuBufferHandler<FilterParameterRecord>,
    dirty: FxHashMap<ShadowId, DirtyFlags>,
    full_rebuild: bool,
    // Filter state was last flushed without an ESM pass
    filter_stale: bool,
    // Committed state, mirrors what the GPU holds
    shadow_records: Vec<ShadowRecord>,
    filter_records: Vec<FilterParameterRecord>,
    filter_table: Vec<f32>,
    kernels: FxHashMap<ShadowId, FilterKernel>,
    atlas: ShadowmapAtlas,
}

/// Filter-side state computed by a flush
struct FilterState {
    table: Vec<f32>,
    records: Vec<FilterParameterRecord>,
    range: Option<Range<u32>>,
    full: bool,
}

impl BufferSynchronizer {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>, initial_capacity: u32) -> Result<Self> {
        let shadow_buffer = GpuBufferHandler::new(device.clone(), GpuBufferHandlerDesc {
            name: SHADOW_BUFFER_NAME.to_string(),
            shader_input_name: SHADOW_SHADER_INPUT.to_string(),
            initial_capacity,
        })?;
        let filter_buffer = GpuBufferHandler::new(device, GpuBufferHandlerDesc {
            name: FILTER_BUFFER_NAME.to_string(),
            shader_input_name: FILTER_SHADER_INPUT.to_string(),
            initial_capacity,
        })?;

        Ok(Self {
            shadow_buffer,
            filter_buffer,
            dirty: FxHashMap::default(),
            full_rebuild: false,
            filter_stale: false,
            shadow_records: Vec::new(),
            filter_records: Vec::new(),
            filter_table: Vec::new(),
            kernels: FxHashMap::default(),
            atlas: ShadowmapAtlas::default(),
        })
    }

    // ===== DIRTY TRACKING =====

    pub fn mark_dirty(&mut self, id: ShadowId, flags: DirtyFlags) {
        *self.dirty.entry(id).or_default() |= flags;
    }

    /// Drop everything tracked for a released handle
    pub fn forget(&mut self, id: ShadowId) {
        self.dirty.remove(&id);
        self.kernels.remove(&id);
    }

    /// Rebuild every record and upload whole buffers on the next flush
    pub fn request_full_rebuild(&mut self) {
        self.full_rebuild = true;
    }

    pub fn is_dirty(&self, id: ShadowId) -> bool {
        self.dirty.contains_key(&id)
    }

    pub fn needs_flush(&self) -> bool {
        self.full_rebuild || !self.dirty.is_empty()
    }

    // ===== COMMITTED STATE =====

    /// Records as last uploaded, in dense order
    pub fn shadow_records(&self) -> &[ShadowRecord] {
        &self.shadow_records
    }

    pub fn filter_records(&self) -> &[FilterParameterRecord] {
        &self.filter_records
    }

    /// Concatenated Gaussian half-kernels of every ESM caster
    pub fn filter_table(&self) -> &[f32] {
        &self.filter_table
    }

    pub fn atlas(&self) -> &ShadowmapAtlas {
        &self.atlas
    }

    /// Kernel of an ESM caster, as of the last successful flush with an ESM pass
    pub fn kernel(&self, id: ShadowId) -> Option<&FilterKernel> {
        self.kernels.get(&id)
    }

    pub fn shadow_buffer(&self) -> &GpuBufferHandler<ShadowRecord> {
        &self.shadow_buffer
    }

    pub fn filter_buffer(&self) -> &GpuBufferHandler<FilterParameterRecord> {
        &self.filter_buffer
    }

    // ===== FLUSH =====

    pub fn flush(
        &mut self,
        properties: &PackedStore<ShadowProperty>,
        passes: PassAvailability,
    ) -> Result<FlushOutcome> {
        if !passes.projected_shadowmaps {
            return Ok(FlushOutcome::Skipped(SkipReason::NoConsumingPass));
        }
        let esm = passes.esm_shadowmaps;
        let count = properties.len();
        let full = self.full_rebuild || count != self.shadow_records.len();
        if !full && self.dirty.is_empty() && !(esm && self.filter_stale) {
            return Ok(FlushOutcome::Clean);
        }

        let flags_at = |index: usize| -> DirtyFlags {
            if full {
                return DirtyFlags::all();
            }
            properties.owner(index as u32)
                .and_then(|id| self.dirty.get(&id).copied())
                .unwrap_or_default()
        };

        // Phase 1: filter kernels, only when a pass consumes them
        let filter_all = full || self.filter_stale;
        let filter_flags_at = |index: usize| -> DirtyFlags {
            if filter_all { DirtyFlags::all() } else { flags_at(index) }
        };
        let mut kernels = if esm { self.kernels.clone() } else { FxHashMap::default() };
        if esm {
            if filter_all {
                kernels.retain(|id, _| properties.contains(*id));
            }
            for (index, (id, property)) in properties.iter().enumerate() {
                if !filter_flags_at(index).contains(DirtyFlags::FILTER) {
                    continue;
                }
                let desc = &property.descriptor;
                if desc.filter_method.uses_esm() && desc.shadowmap_max_resolution.texels() > 0 {
                    kernels.insert(id, derive_filter_kernel(&FilterInputs::from_descriptor(desc)));
                } else {
                    kernels.remove(&id);
                }
            }
        }

        // Phase 2: atlas placement
        let relayout = full || (0..count).any(|i| flags_at(i).contains(DirtyFlags::LAYOUT));
        let atlas = if relayout {
            let sizes: Vec<u32> = properties.values().iter()
                .map(|p| p.descriptor.shadowmap_max_resolution.texels())
                .collect();
            ShadowmapAtlas::pack(&sizes)
        } else {
            self.atlas.clone()
        };
        let layout_changed = atlas != self.atlas;

        // Phase 3: shadow records
        let mut shadow_records = if full {
            vec![ShadowRecord::default(); count]
        } else {
            self.shadow_records.clone()
        };
        for (index, (_, property)) in properties.iter().enumerate() {
            if layout_changed || !flags_at(index).is_empty() {
                shadow_records[index] = ShadowRecord::new(
                    &property.descriptor,
                    &property.view.view_projection_matrix(),
                    atlas.slot(index as u32),
                    atlas.slice_size(),
                );
            }
        }
        let shadow_range = if full {
            (count > 0).then(|| 0..count as u32)
        } else {
            changed_range(&self.shadow_records, &shadow_records)
        };

        // Phase 4: filter records, only when a pass consumes them
        let filter = esm.then(|| {
            self.build_filter_state(properties, &kernels, &atlas, full,
                layout_changed || self.filter_stale, &filter_flags_at)
        });

        // Phase 5: upload
        if let Err(err) = self.upload(&shadow_records, &shadow_range, full, filter.as_ref()) {
            self.full_rebuild = true;
            return Err(err);
        }

        // Phase 6: commit
        let filter_range = filter.as_ref().and_then(|f| f.range.clone());
        if let Some(filter) = filter {
            self.filter_table = filter.table;
            self.filter_records = filter.records;
        }
        self.shadow_records = shadow_records;
        self.kernels = kernels;
        self.atlas = atlas;
        self.dirty.clear();
        self.full_rebuild = false;
        self.filter_stale = !esm;

        engine_debug!("galaxy3d::BufferSynchronizer",
            "Flushed {} casters (shadow {:?}, filter {:?}, full: {})",
            count, shadow_range, filter_range, full);

        Ok(FlushOutcome::Uploaded { shadow_range, filter_range, full_rebuild: full })
    }

    fn upload(
        &mut self,
        shadow_records: &[ShadowRecord],
        shadow_range: &Option<Range<u32>>,
        full: bool,
        filter: Option<&FilterState>,
    ) -> Result<()> {
        match shadow_range {
            Some(_) if full => self.shadow_buffer.update_buffer(shadow_records)?,
            Some(range) => self.shadow_buffer.update_range(
                range.start, &shadow_records[range.start as usize..range.end as usize])?,
            None => {}
        }
        if let Some(filter) = filter {
            match &filter.range {
                Some(_) if filter.full => self.filter_buffer.update_buffer(&filter.records)?,
                Some(range) => self.filter_buffer.update_range(
                    range.start, &filter.records[range.start as usize..range.end as usize])?,
                None => {}
            }
        }
        Ok(())
    }

    fn build_filter_state(
        &self,
        properties: &PackedStore<ShadowProperty>,
        kernels: &FxHashMap<ShadowId, FilterKernel>,
        atlas: &ShadowmapAtlas,
        full: bool,
        relayout: bool,
        flags_at: &dyn Fn(usize) -> DirtyFlags,
    ) -> FilterState {
        let count = properties.len();

        // Kernels are laid out back to back in dense order
        let mut table = Vec::new();
        let mut spans = Vec::with_capacity(count);
        for (id, _) in properties.iter() {
            match kernels.get(&id) {
                Some(kernel) => {
                    spans.push(Some((table.len() as u32, kernel.weights.len() as u32)));
                    table.extend_from_slice(&kernel.weights);
                }
                None => spans.push(None),
            }
        }

        let full = full || self.filter_records.len() != count;
        let rewrite_all = full || relayout || table != self.filter_table;
        let mut records = if full {
            vec![FilterParameterRecord::disabled(); count]
        } else {
            self.filter_records.clone()
        };
        for (index, (_, property)) in properties.iter().enumerate() {
            if !rewrite_all && !flags_at(index).intersects(DirtyFlags::FILTER | DirtyFlags::LAYOUT) {
                continue;
            }
            records[index] = match (spans[index], atlas.slot(index as u32)) {
                (Some(span), Some(slot)) => FilterParameterRecord::new(&property.descriptor, slot, span),
                _ => FilterParameterRecord::disabled(),
            };
        }

        let range = if full {
            (count > 0).then(|| 0..count as u32)
        } else {
            changed_range(&self.filter_records, &records)
        };
        FilterState { table, records, range, full }
    }
}

/// Smallest element range covering every byte difference
fn changed_range<T: bytemuck::Pod>(old: &[T], new: &[T]) -> Option<Range<u32>> {
    let differs = |i: &usize| bytemuck::bytes_of(&old[*i]) != bytemuck::bytes_of(&new[*i]);
    let first = (0..new.len()).find(differs)?;
    let last = (0..new.len()).rev().find(differs)?;
    Some(first as u32..last as u32 + 1)
}

#[cfg(test)]
#[path = "buffer_synchronizer_tests.rs"]
mod tests;
