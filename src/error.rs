//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the sphere-menu crate.
///
/// Only initialization and configuration failures surface here; per-item
/// thumbnail failures are absorbed by the atlas builder.
#[derive(Debug)]
pub enum MenuError {
    /// GPU context initialization failure. The menu cannot render.
    Gpu(RenderContextError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// Failed to spawn the atlas build thread.
    ThreadSpawn(std::io::Error),
    /// TOML options or item list parsing/serialization failure.
    OptionsParse(String),
    /// Window or event-loop failure.
    Viewer(String),
}

impl fmt::Display for MenuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ThreadSpawn(e) => {
                write!(f, "failed to spawn thread: {e}")
            }
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for MenuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Io(e) | Self::ThreadSpawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for MenuError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for MenuError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
