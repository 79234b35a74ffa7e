/// ProjectedShadowFeatureProcessor: public entry point of the subsystem.
///
/// Owns the handle allocator, the packed property store, the buffer
/// synchronizer and the pass cache. Client code acquires a `ShadowId`,
/// edits it through setters and calls `simulate` once per frame; the
/// renderer reads the buffers and pass inputs afterwards.
///
/// All operations run on the frame-simulation thread. Setters and
/// `simulate` must not overlap.

use std::sync::{Arc, Mutex};
use glam::Mat4;
use crate::error::{Error, Result};
use crate::engine::Engine;
use crate::{engine_debug, engine_info, engine_trace};
use crate::graphics_device::GraphicsDevice;
use crate::render_graph::{EsmSampleOffsets, PassInput, RenderGraphManager, ShadowmapRequest};
use super::buffer_synchronizer::{BufferSynchronizer, DirtyFlags, FlushOutcome, PassAvailability};
use super::descriptor::{
    PcfMethod, ProjectedShadowDescriptor, ShadowConfig, ShadowFilterMethod, ShadowmapSize,
    clamp_aspect_ratio, clamp_field_of_view, clamp_near_far,
    MAX_FILTERING_SAMPLE_COUNT, MAX_PREDICTION_SAMPLE_COUNT,
};
use super::filter::FilterKernel;
use super::handle_allocator::{HandleAllocator, ShadowId};
use super::packed_store::PackedStore;
use super::pass_cache::{PassCache, PassRole};
use super::shadow_property::ShadowProperty;
use super::shadow_view::ShadowView;

const SOURCE: &str = "galaxy3d::ProjectedShadows";

/// Which derived view data a setter invalidates
#[derive(Clone, Copy)]
enum ViewUpdate {
    None,
    Transform,
    Projection,
}

pub struct ProjectedShadowFeatureProcessor {
    config: ShadowConfig,
    handles: HandleAllocator,
    properties: PackedStore<ShadowProperty>,
    synchronizer: BufferSynchronizer,
    pass_cache: PassCache,
}

impl ProjectedShadowFeatureProcessor {
    /// Create the processor on `device`, watching the pipelines of `manager`
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        manager: &mut RenderGraphManager,
        config: ShadowConfig,
    ) -> Result<Self> {
        let synchronizer = BufferSynchronizer::new(device, config.initial_capacity)?;
        let pass_cache = PassCache::new(manager, config.esm_enabled);

        engine_info!(SOURCE, "Projected shadows ready (max {} casters, ESM {})",
            config.max_shadows, if config.esm_enabled { "on" } else { "off" });

        Ok(Self {
            config,
            handles: HandleAllocator::new(config.max_shadows),
            properties: PackedStore::new(),
            synchronizer,
            pass_cache,
        })
    }

    /// Create the processor on the device registered with the Engine
    pub fn from_engine(manager: &mut RenderGraphManager, config: ShadowConfig) -> Result<Self> {
        Self::new(Engine::graphics_device()?, manager, config)
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    // ===== HANDLES =====

    /// Create a caster with default properties
    pub fn acquire_shadow(&mut self) -> Result<ShadowId> {
        let id = self.handles.acquire()?;
        let property = ShadowProperty::new(id, ProjectedShadowDescriptor::default());
        if let Err(error) = self.properties.insert(id, property) {
            self.handles.release(id)?;
            return Err(error);
        }
        self.synchronizer.mark_dirty(id, DirtyFlags::all());
        engine_debug!(SOURCE, "Acquired {:?} ({} live)", id, self.properties.len());
        Ok(id)
    }

    /// Destroy a caster; its handle is never valid again
    pub fn release_shadow(&mut self, id: ShadowId) -> Result<()> {
        self.handles.release(id)?;
        let (_, relocation) = self.properties.remove(id)?;
        self.synchronizer.forget(id);

        if let Some(relocation) = relocation {
            engine_trace!(SOURCE, "{:?} moved from slot {} to {}",
                relocation.id, relocation.from, relocation.to);
            self.synchronizer.mark_dirty(relocation.id, DirtyFlags::all());
        }
        engine_debug!(SOURCE, "Released {:?} ({} live)", id, self.properties.len());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    // ===== SETTERS =====

    fn modify(
        &mut self,
        id: ShadowId,
        flags: DirtyFlags,
        view_update: ViewUpdate,
        edit: impl FnOnce(&mut ProjectedShadowDescriptor),
    ) -> Result<()> {
        let property = self.properties.get_mut(id)?;
        edit(&mut property.descriptor);
        match view_update {
            ViewUpdate::None => {}
            ViewUpdate::Transform => property.view.set_transform(&property.descriptor.transform),
            ViewUpdate::Projection => property.view.set_projection(&property.descriptor),
        }
        self.synchronizer.mark_dirty(id, flags);
        Ok(())
    }

    pub fn set_shadow_transform(&mut self, id: ShadowId, transform: Mat4) -> Result<()> {
        self.modify(id, DirtyFlags::RECORD, ViewUpdate::Transform, |d| d.transform = transform)
    }

    /// Near is raised to a small positive minimum and far kept beyond it
    pub fn set_near_far_planes(&mut self, id: ShadowId, near: f32, far: f32) -> Result<()> {
        let (near, far) = clamp_near_far(near, far);
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::Projection, |d| {
            d.near_plane = near;
            d.far_plane = far;
        })
    }

    pub fn set_aspect_ratio(&mut self, id: ShadowId, aspect_ratio: f32) -> Result<()> {
        let aspect_ratio = clamp_aspect_ratio(aspect_ratio);
        self.modify(id, DirtyFlags::RECORD, ViewUpdate::Projection, |d| d.aspect_ratio = aspect_ratio)
    }

    pub fn set_field_of_view_y(&mut self, id: ShadowId, field_of_view_y: f32) -> Result<()> {
        let field_of_view_y = clamp_field_of_view(field_of_view_y);
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::Projection,
            |d| d.field_of_view_y = field_of_view_y)
    }

    pub fn set_shadowmap_max_resolution(&mut self, id: ShadowId, size: ShadowmapSize) -> Result<()> {
        self.modify(id, DirtyFlags::all(), ViewUpdate::None, |d| d.shadowmap_max_resolution = size)
    }

    pub fn set_pcf_method(&mut self, id: ShadowId, method: PcfMethod) -> Result<()> {
        self.modify(id, DirtyFlags::RECORD, ViewUpdate::None, |d| d.pcf_method = method)
    }

    pub fn set_shadow_filter_method(&mut self, id: ShadowId, method: ShadowFilterMethod) -> Result<()> {
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::None, |d| d.filter_method = method)
    }

    /// Width of the softened shadow boundary, as an angle in radians
    pub fn set_softening_boundary_width_angle(&mut self, id: ShadowId, width: f32) -> Result<()> {
        let width = width.max(0.0);
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::None,
            |d| d.softening_boundary_width = width)
    }

    pub fn set_prediction_sample_count(&mut self, id: ShadowId, count: u16) -> Result<()> {
        let count = count.min(MAX_PREDICTION_SAMPLE_COUNT);
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::None,
            |d| d.prediction_sample_count = count)
    }

    pub fn set_filtering_sample_count(&mut self, id: ShadowId, count: u16) -> Result<()> {
        let count = count.min(MAX_FILTERING_SAMPLE_COUNT);
        self.modify(id, DirtyFlags::RECORD | DirtyFlags::FILTER, ViewUpdate::None,
            |d| d.filtering_sample_count = count)
    }

    pub fn set_shadow_bias(&mut self, id: ShadowId, bias: f32) -> Result<()> {
        self.modify(id, DirtyFlags::RECORD, ViewUpdate::None, |d| d.bias = bias)
    }

    /// Replace every property at once
    pub fn set_shadow_properties(&mut self, id: ShadowId, descriptor: ProjectedShadowDescriptor) -> Result<()> {
        let descriptor = descriptor.clamped();
        let property = self.properties.get_mut(id)?;
        property.descriptor = descriptor;
        property.view = ShadowView::from_descriptor(&descriptor);
        self.synchronizer.mark_dirty(id, DirtyFlags::all());
        Ok(())
    }

    // ===== GETTERS =====

    pub fn shadow_properties(&self, id: ShadowId) -> Result<&ProjectedShadowDescriptor> {
        Ok(&self.properties.get(id)?.descriptor)
    }

    pub fn shadow_view(&self, id: ShadowId) -> Result<&ShadowView> {
        Ok(&self.properties.get(id)?.view)
    }

    /// Dense index of the caster in the GPU buffers
    pub fn gpu_index(&self, id: ShadowId) -> Result<u32> {
        self.properties.index_of(id)
    }

    /// ESM kernel of the caster as of the last successful frame
    ///
    /// None when the caster does not use an ESM filter method.
    pub fn filter_kernel(&self, id: ShadowId) -> Result<Option<&FilterKernel>> {
        if !self.properties.contains(id) {
            return Err(Error::InvalidHandle(format!("{:?} has no value", id)));
        }
        Ok(self.synchronizer.kernel(id))
    }

    pub fn synchronizer(&self) -> &BufferSynchronizer {
        &self.synchronizer
    }

    pub fn pass_cache(&self) -> &PassCache {
        &self.pass_cache
    }

    // ===== FRAME =====

    /// Per-frame update: apply pipeline changes, flush dirty casters,
    /// then hand the new data to the consuming passes
    ///
    /// A frame without any projected-shadowmap pass is skipped and keeps
    /// its dirty state. A failed upload keeps it as well and is reported.
    pub fn simulate(&mut self, manager: &RenderGraphManager) -> Result<FlushOutcome> {
        if self.pass_cache.process_events(manager) {
            self.synchronizer.request_full_rebuild();
        }

        let availability = PassAvailability {
            projected_shadowmaps: self.pass_cache.has_live_pass(PassRole::ProjectedShadowmaps),
            esm_shadowmaps: self.pass_cache.has_live_pass(PassRole::EsmShadowmaps),
        };

        let outcome = self.synchronizer.flush(&self.properties, availability)?;
        if !matches!(outcome, FlushOutcome::Uploaded { .. }) {
            return Ok(outcome);
        }

        let projected = self.pass_cache.live_passes(PassRole::ProjectedShadowmaps);
        let esm = if availability.esm_shadowmaps {
            self.pass_cache.live_passes(PassRole::EsmShadowmaps)
        } else {
            Vec::new()
        };

        let requests = PassInput::ShadowmapRequests {
            atlas_size: self.synchronizer.atlas().slice_size(),
            requests: self.shadowmap_requests(),
        };
        for pass in &projected {
            pass.submit(requests.clone());
        }

        if !esm.is_empty() {
            let filter = PassInput::EsmFilter {
                filter_table: self.synchronizer.filter_table().to_vec(),
                parameters: self.synchronizer.filter_records().to_vec(),
                sample_offsets: self.sample_offsets(),
            };
            for pass in &esm {
                pass.submit(filter.clone());
            }
        }
        Ok(outcome)
    }

    fn sample_offsets(&self) -> Vec<EsmSampleOffsets> {
        self.properties.iter()
            .enumerate()
            .filter_map(|(index, (id, _))| {
                let kernel = self.synchronizer.kernel(id)?;
                Some(EsmSampleOffsets {
                    shadow_index: index as u32,
                    prediction: kernel.prediction_offsets.clone(),
                    filtering: kernel.filtering_offsets.clone(),
                })
            })
            .collect()
    }

    /// One request per caster that owns a region of the atlas
    fn shadowmap_requests(&self) -> Vec<ShadowmapRequest> {
        let atlas = self.synchronizer.atlas();
        self.properties.iter()
            .enumerate()
            .filter_map(|(index, (_, property))| {
                let slot = atlas.slot(index as u32)?;
                Some(ShadowmapRequest {
                    shadow_index: index as u32,
                    view_projection: property.view.view_projection_matrix(),
                    array_slice: slot.array_slice,
                    origin: slot.origin,
                    size: slot.size,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "feature_processor_tests.rs"]
mod tests;
