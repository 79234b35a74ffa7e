/// ShadowView: the view a caster's shadow map is rendered from.
///
/// Derived from the descriptor whenever the transform or the projection
/// parameters change. Depth is mapped to [0, 1] (right-handed, looking
/// down -Z).

use glam::{Mat4, Vec3};
use super::descriptor::{ProjectedShadowDescriptor, clamp_field_of_view};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowView {
    view_matrix: Mat4,
    projection_matrix: Mat4,
}

impl ShadowView {
    pub fn from_descriptor(desc: &ProjectedShadowDescriptor) -> Self {
        let mut view = Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
        };
        view.set_transform(&desc.transform);
        view.set_projection(desc);
        view
    }

    pub(crate) fn set_transform(&mut self, transform: &Mat4) {
        self.view_matrix = transform.inverse();
    }

    pub(crate) fn set_projection(&mut self, desc: &ProjectedShadowDescriptor) {
        self.projection_matrix = Mat4::perspective_rh(
            clamp_field_of_view(desc.field_of_view_y),
            desc.aspect_ratio,
            desc.near_plane,
            desc.far_plane,
        );
    }

    // ===== GETTERS =====

    /// World-to-light matrix
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view)
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Light position in world space
    pub fn position(&self) -> Vec3 {
        self.view_matrix.inverse().w_axis.truncate()
    }
}

#[cfg(test)]
#[path = "shadow_view_tests.rs"]
mod tests;
