//! Render graph management module
//!
//! A render graph is one render pipeline: an ordered list of passes.
//! The manager owns every active graph and publishes a
//! `RenderGraphEvent` to its subscribers whenever a graph is added,
//! removed or has its pass list changed. Consumers drain those events
//! at a fixed point of their frame instead of being called back.

mod render_graph;
mod render_graph_manager;
mod render_pass;

pub use render_graph::RenderGraph;
pub use render_graph_manager::{RenderGraphManager, RenderGraphEvent};
pub use render_pass::{RenderPass, PassInput, ShadowmapRequest, EsmSampleOffsets};
