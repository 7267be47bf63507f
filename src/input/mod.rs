//! Pointer input: event types and the tracker that turns raw button and
//! cursor notifications into [`InputEvent`]s.

/// Platform-agnostic input events.
pub mod event;
/// Cursor position and button state tracking.
pub mod pointer;

pub use event::{InputEvent, MouseButton};
pub use pointer::{PointerTracker, Release};
