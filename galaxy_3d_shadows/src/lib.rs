/*!
# Galaxy 3D Shadows

Projected shadow subsystem for the Galaxy 3D rendering engine.

Shadow casters are addressed by opaque generational handles. Their
properties are kept in a dense store, mirrored into GPU-visible buffers
once per frame, and handed to whichever render passes currently consume
them.

## Architecture

- **ProjectedShadowFeatureProcessor**: public entry point (acquire, edit, simulate)
- **HandleAllocator / PackedStore**: handle issuance and dense property storage
- **BufferSynchronizer**: dirty tracking and minimal-range GPU uploads
- **PassCache**: consuming passes, re-resolved on pipeline events
- **GraphicsDevice / Buffer**: GPU resource layer, implemented by backends
- **RenderGraphManager**: active pipelines and their passes
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod render_graph;
pub mod shadow;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Shadow processor
    pub use crate::shadow::{ProjectedShadowFeatureProcessor, ShadowId};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // GPU resource layer
    pub mod graphics_device {
        pub use crate::graphics_device::*;
    }

    // Pipelines and passes
    pub mod render_graph {
        pub use crate::render_graph::*;
    }

    // Shadow resource table
    pub mod shadow {
        pub use crate::shadow::*;
    }
}

// Re-export math library at crate root
pub use glam;
