/// Galaxy3D Engine - process-wide services for the shadow subsystem
///
/// Holds the logger, the minimum log severity and the graphics device
/// registry. All state lives in thread-safe statics guarded by RwLock.

use std::sync::{OnceLock, RwLock, Arc, Mutex};
use std::time::SystemTime;
use crate::graphics_device::GraphicsDevice;
use crate::error::{Result, Error};
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine state storage
static ENGINE_STATE: OnceLock<EngineState> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Entries below this severity are dropped
static LOG_LEVEL: OnceLock<RwLock<LogSeverity>> = OnceLock::new();

/// Internal state structure holding engine singletons
struct EngineState {
    /// Graphics device singleton
    graphics_device: RwLock<Option<Arc<Mutex<dyn GraphicsDevice>>>>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            graphics_device: RwLock::new(None),
        }
    }
}

fn logger_lock() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn log_level_lock() -> &'static RwLock<LogSeverity> {
    LOG_LEVEL.get_or_init(|| RwLock::new(LogSeverity::Info))
}

// ===== PUBLIC API =====

/// Engine singleton manager
///
/// # Example
///
/// ```ignore
/// use galaxy_3d_shadows::galaxy3d::Engine;
///
/// Engine::initialize()?;
/// Engine::create_graphics_device(my_device)?;
/// let device = Engine::graphics_device()?;
/// Engine::shutdown();
/// # Ok::<(), galaxy_3d_shadows::galaxy3d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Log an error before handing it back to the caller
    fn log_and_return_error(error: Error) -> Error {
        crate::engine_error!("galaxy3d::Engine", "{}", error);
        error
    }

    fn state() -> Result<&'static EngineState> {
        ENGINE_STATE.get()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("Engine not initialized. Call Engine::initialize() first.".to_string())
            ))
    }

    /// Initialize the engine (idempotent)
    pub fn initialize() -> Result<()> {
        ENGINE_STATE.get_or_init(EngineState::new);
        Ok(())
    }

    /// Drop every singleton. `initialize()` keeps working afterwards.
    pub fn shutdown() {
        if let Some(state) = ENGINE_STATE.get() {
            if let Ok(mut device) = state.graphics_device.write() {
                *device = None;
            }
        }
    }

    // ===== GRAPHICS DEVICE API =====

    /// Wrap a device in `Arc<Mutex<_>>` and register it as the singleton
    ///
    /// # Errors
    ///
    /// - The engine is not initialized
    /// - A graphics device is already registered
    /// - The registry lock is poisoned
    pub fn create_graphics_device<D: GraphicsDevice + 'static>(device: D) -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(device));
        let state = Self::state()?;

        let mut lock = state.graphics_device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice lock poisoned".to_string())
            ))?;

        if lock.is_some() {
            return Err(Self::log_and_return_error(
                Error::InitializationFailed("GraphicsDevice already exists. Call Engine::destroy_graphics_device() first.".to_string())
            ));
        }

        *lock = Some(device.clone());
        crate::engine_info!("galaxy3d::Engine", "GraphicsDevice singleton created");
        Ok(device)
    }

    /// Get the graphics device singleton
    pub fn graphics_device() -> Result<Arc<Mutex<dyn GraphicsDevice>>> {
        let state = Self::state()?;

        let lock = state.graphics_device.read()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice lock poisoned".to_string())
            ))?;

        lock.clone()
            .ok_or_else(|| Self::log_and_return_error(
                Error::InitializationFailed("GraphicsDevice not created. Call Engine::create_graphics_device() first.".to_string())
            ))
    }

    /// Remove the graphics device singleton
    ///
    /// Existing `Arc` clones stay valid until dropped.
    pub fn destroy_graphics_device() -> Result<()> {
        let state = Self::state()?;

        let mut lock = state.graphics_device.write()
            .map_err(|_| Self::log_and_return_error(
                Error::BackendError("GraphicsDevice lock poisoned".to_string())
            ))?;

        *lock = None;
        crate::engine_info!("galaxy3d::Engine", "GraphicsDevice singleton destroyed");
        Ok(())
    }

    // ===== LOGGING API =====

    /// Replace the logger
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(logger);
        }
    }

    /// Restore the DefaultLogger
    pub fn reset_logger() {
        if let Ok(mut lock) = logger_lock().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Set the minimum severity forwarded to the logger
    pub fn set_log_level(level: LogSeverity) {
        if let Ok(mut lock) = log_level_lock().write() {
            *lock = level;
        }
    }

    /// Current minimum severity
    pub fn log_level() -> LogSeverity {
        log_level_lock().read()
            .map(|level| *level)
            .unwrap_or(LogSeverity::Info)
    }

    fn dispatch(entry: LogEntry) {
        if entry.severity < Self::log_level() {
            return;
        }
        if let Ok(lock) = logger_lock().read() {
            lock.log(&entry);
        }
    }

    /// Log without location (used by engine_trace! .. engine_warn!)
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: None,
            line: None,
        });
    }

    /// Log with file:line (used by engine_error!)
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file: Some(file),
            line: Some(line),
        });
    }

    /// Reset singletons and logging for tests
    #[cfg(test)]
    pub fn reset_for_testing() {
        Self::shutdown();
        Self::reset_logger();
        Self::set_log_level(LogSeverity::Info);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
