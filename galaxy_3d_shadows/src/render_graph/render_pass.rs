/// Render pass node in a render graph.
///
/// A pass is identified by its name inside the graph and by the
/// template it was instantiated from; feature processors locate the
/// passes they feed by template. Inputs are pushed by value and the
/// latest one replaces the previous.

use std::sync::Mutex;
use glam::Mat4;
use crate::shadow::FilterParameterRecord;

/// One shadow map the projected-shadowmaps pass must render
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowmapRequest {
    /// Dense GPU index of the caster
    pub shadow_index: u32,
    /// Light view-projection used to render the depth map
    pub view_projection: Mat4,
    /// Texture-array slice in the shadowmap atlas
    pub array_slice: u32,
    /// Texel origin inside the slice
    pub origin: [u32; 2],
    /// Width = height in texels
    pub size: u32,
}

/// Disk sample positions of one ESM caster
#[derive(Debug, Clone, PartialEq)]
pub struct EsmSampleOffsets {
    /// Dense GPU index of the caster
    pub shadow_index: u32,
    pub prediction: Vec<[f32; 2]>,
    pub filtering: Vec<[f32; 2]>,
}

/// Data a feature processor hands to a pass
#[derive(Debug, Clone, PartialEq)]
pub enum PassInput {
    /// Shadow maps to render, plus the atlas slice size
    ShadowmapRequests {
        atlas_size: u32,
        requests: Vec<ShadowmapRequest>,
    },
    /// ESM Gaussian table, the per-caster filter records and the sample
    /// offsets of every caster that has a kernel
    EsmFilter {
        filter_table: Vec<f32>,
        parameters: Vec<FilterParameterRecord>,
        sample_offsets: Vec<EsmSampleOffsets>,
    },
}

pub struct RenderPass {
    name: String,
    template: String,
    input: Mutex<Option<PassInput>>,
}

impl RenderPass {
    pub(crate) fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
            input: Mutex::new(None),
        }
    }

    /// Pass name (unique within its graph)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template the pass was instantiated from
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace the pass input
    pub fn submit(&self, input: PassInput) {
        if let Ok(mut slot) = self.input.lock() {
            *slot = Some(input);
        }
    }

    /// Latest submitted input
    pub fn input(&self) -> Option<PassInput> {
        self.input.lock().ok().and_then(|slot| slot.clone())
    }
}
