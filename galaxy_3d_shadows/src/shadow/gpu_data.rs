/// GPU records for projected shadows.
///
/// Both records are `#[repr(C)]` + bytemuck Pod and are uploaded as-is.
/// The shader binds them as `m_projectedShadows` and
/// `m_projectedFilterParams`, indexed by the caster's dense index.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use super::atlas::AtlasSlot;
use super::descriptor::ProjectedShadowDescriptor;

/// Array slice written for casters that have no shadow map
pub const NO_SHADOWMAP: u32 = u32::MAX;

// ===== SHADOW RECORD =====

/// Per-caster data read when sampling shadows (96 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ShadowRecord {
    /// World position to atlas UV + depth
    pub depth_bias_matrix: [[f32; 4]; 4],
    pub shadowmap_array_slice: u32,
    pub shadow_filter_method: u16,
    pub pcf_method: u16,
    pub boundary_scale: f32,
    pub prediction_sample_count: u32,
    pub filtering_sample_count: u32,
    /// `linear_depth = c0 / (c1 - depth)`
    pub unproject_constants: [f32; 2],
    pub bias: f32,
}

impl ShadowRecord {
    pub fn new(
        desc: &ProjectedShadowDescriptor,
        view_projection: &Mat4,
        slot: Option<&AtlasSlot>,
        atlas_size: u32,
    ) -> Self {
        let (depth_bias_matrix, shadowmap_array_slice) = match slot {
            Some(slot) => (depth_bias_matrix(view_projection, slot, atlas_size), slot.array_slice),
            None => (Mat4::IDENTITY, NO_SHADOWMAP),
        };

        Self {
            depth_bias_matrix: depth_bias_matrix.to_cols_array_2d(),
            shadowmap_array_slice,
            shadow_filter_method: desc.filter_method as u16,
            pcf_method: desc.pcf_method as u16,
            boundary_scale: desc.softening_boundary_width / 2.0,
            prediction_sample_count: desc.prediction_sample_count as u32,
            filtering_sample_count: desc.filtering_sample_count as u32,
            unproject_constants: unproject_constants(desc.near_plane, desc.far_plane),
            bias: desc.bias,
        }
    }
}

// ===== FILTER PARAMETER RECORD =====

/// Per-caster ESM filtering data (48 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct FilterParameterRecord {
    pub is_enabled: u32,
    /// Texel origin inside the atlas slice
    pub shadowmap_origin: [u32; 2],
    pub shadowmap_size: u32,
    /// First weight of this caster's kernel in the filter table
    pub parameter_offset: u32,
    pub parameter_count: u32,
    /// Light distance normalization: `n / (f - n)`, `n - f`, `f`
    pub n_over_f_minus_n: f32,
    pub n_minus_f: f32,
    pub far: f32,
    pub _padding: [u32; 3],
}

impl FilterParameterRecord {
    /// Record of a caster with a convolution kernel at `parameters`
    /// (offset, count) in the filter table
    pub fn new(desc: &ProjectedShadowDescriptor, slot: &AtlasSlot, parameters: (u32, u32)) -> Self {
        let (near, far) = (desc.near_plane, desc.far_plane);
        Self {
            is_enabled: 1,
            shadowmap_origin: slot.origin,
            shadowmap_size: slot.size,
            parameter_offset: parameters.0,
            parameter_count: parameters.1,
            n_over_f_minus_n: near / (far - near),
            n_minus_f: near - far,
            far,
            _padding: [0; 3],
        }
    }

    /// Record skipped by the filter pass
    pub fn disabled() -> Self {
        Self::default()
    }
}

// ===== DERIVATIONS =====

/// Constants turning a [0, 1] perspective depth back into view distance
pub fn unproject_constants(near: f32, far: f32) -> [f32; 2] {
    let range = far - near;
    [near * far / range, far / range]
}

/// Clip space to atlas texture space for a caster placed at `slot`
///
/// NDC x/y in [-1, 1] (y up) land in the slot's UV rectangle (v down);
/// depth passes through.
pub fn depth_bias_matrix(view_projection: &Mat4, slot: &AtlasSlot, atlas_size: u32) -> Mat4 {
    let atlas_size = atlas_size.max(1) as f32;
    let scale = slot.size as f32 / atlas_size;
    let origin_u = slot.origin[0] as f32 / atlas_size;
    let origin_v = slot.origin[1] as f32 / atlas_size;

    Mat4::from_translation(Vec3::new(origin_u + scale * 0.5, origin_v + scale * 0.5, 0.0))
        * Mat4::from_scale(Vec3::new(scale * 0.5, -scale * 0.5, 1.0))
        * *view_projection
}

#[cfg(test)]
#[path = "gpu_data_tests.rs"]
mod tests;
