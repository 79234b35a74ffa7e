//! Error types for the Galaxy3D shadow subsystem
//!
//! This module defines the error types used throughout the crate, including
//! GPU backend failures, handle bookkeeping errors and initialization errors.

use std::fmt;

/// Result type for Galaxy3D shadow operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D shadow errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (GPU layer, lock poisoning, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, pass, descriptor, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, processor, subsystems)
    InitializationFailed(String),

    /// The handle allocator reached its capacity ceiling
    HandleExhausted {
        capacity: usize,
    },

    /// Operation on a released or foreign handle
    InvalidHandle(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::HandleExhausted { capacity } => {
                write!(f, "Handle capacity exhausted ({} live handles)", capacity)
            }
            Error::InvalidHandle(msg) => write!(f, "Invalid handle: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an `Error::BackendError` from it
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("galaxy3d::GpuBufferHandler", "Buffer '{}' is missing", name);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::galaxy3d::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return early with an `Error::BackendError`
///
/// # Example
///
/// ```ignore
/// engine_bail!("galaxy3d::RenderGraphManager", "RenderGraph '{}' already exists", name);
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
