/// CPU-side state of one caster, as kept in the packed store

use super::descriptor::ProjectedShadowDescriptor;
use super::handle_allocator::ShadowId;
use super::shadow_view::ShadowView;

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowProperty {
    /// Owning handle
    pub id: ShadowId,
    pub descriptor: ProjectedShadowDescriptor,
    /// Kept in step with `descriptor` by every setter
    pub view: ShadowView,
}

impl ShadowProperty {
    pub fn new(id: ShadowId, descriptor: ProjectedShadowDescriptor) -> Self {
        Self {
            id,
            view: ShadowView::from_descriptor(&descriptor),
            descriptor,
        }
    }
}
