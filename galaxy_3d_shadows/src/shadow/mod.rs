//! Projected shadow module
//!
//! Resource table for projected (spot-light) shadow casters. A caster is
//! addressed by a generational `ShadowId`; its properties live in a packed
//! store whose dense order is also the order of the GPU records. Once per
//! frame the processor reconciles dirty casters into two structured
//! buffers and feeds the render passes that consume them.

mod handle_allocator;
mod packed_store;
mod descriptor;
mod shadow_view;
mod shadow_property;
mod atlas;
mod gpu_data;
mod filter;
mod gpu_buffer_handler;
mod buffer_synchronizer;
mod pass_cache;
mod feature_processor;

pub use handle_allocator::{HandleAllocator, ShadowId};
pub use packed_store::{PackedStore, Relocation};
pub use descriptor::{
    ProjectedShadowDescriptor, ShadowConfig, ShadowFilterMethod, PcfMethod, ShadowmapSize,
    MINIMUM_FIELD_OF_VIEW, MINIMUM_NEAR_PLANE, MAX_PREDICTION_SAMPLE_COUNT, MAX_FILTERING_SAMPLE_COUNT,
};
pub use shadow_view::ShadowView;
pub use shadow_property::ShadowProperty;
pub use atlas::{AtlasSlot, ShadowmapAtlas};
pub use gpu_data::{ShadowRecord, FilterParameterRecord, NO_SHADOWMAP, unproject_constants, depth_bias_matrix};
pub use filter::{derive_filter_kernel, FilterInputs, FilterKernel, RELIABLE_SECTION_FACTOR, MAX_KERNEL_HALF_WIDTH};
pub use gpu_buffer_handler::{GpuBufferHandler, GpuBufferHandlerDesc};
pub use buffer_synchronizer::{
    BufferSynchronizer, DirtyFlags, FlushOutcome, PassAvailability, SkipReason,
    SHADOW_BUFFER_NAME, SHADOW_SHADER_INPUT, FILTER_BUFFER_NAME, FILTER_SHADER_INPUT,
};
pub use pass_cache::{PassCache, PassRole};
pub use feature_processor::ProjectedShadowFeatureProcessor;
