/// Platform-agnostic pointer events.
///
/// Coordinates are in the same units the engine was sized with (the viewer
/// uses logical pixels).
///
/// # Example
///
/// ```ignore
/// engine.handle_input(InputEvent::PointerDown { x: 100.0, y: 200.0 });
/// engine.handle_input(InputEvent::PointerMoved { x: 140.0, y: 200.0 });
/// engine.handle_input(InputEvent::PointerUp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary pointer pressed at a position.
    PointerDown {
        /// Horizontal position.
        x: f32,
        /// Vertical position (down is positive).
        y: f32,
    },
    /// Primary pointer released.
    PointerUp,
    /// Pointer left the surface.
    PointerLeave,
    /// Pointer moved to an absolute position.
    PointerMoved {
        /// Horizontal position.
        x: f32,
        /// Vertical position (down is positive).
        y: f32,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) button; drives the sphere.
    Left,
    /// Any other button; ignored by the menu.
    Other,
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => Self::Left,
            _ => Self::Other,
        }
    }
}
