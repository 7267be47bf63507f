//! Pointer input for MenuRenderEngine

use super::MenuRenderEngine;
use crate::input::InputEvent;

impl MenuRenderEngine {
    /// Forward a pointer event to the arcball.
    ///
    /// Coordinates are in pointer units (physical pixels divided by the
    /// pixel ratio). Moves only matter while the pointer is down.
    ///
    /// # Example
    ///
    /// ```ignore
    /// engine.handle_input(InputEvent::PointerDown { x, y });
    /// engine.handle_input(InputEvent::PointerUp);
    /// ```
    pub fn handle_input(&mut self, event: InputEvent) {
        let control = self.frame.control_mut();
        match event {
            InputEvent::PointerDown { x, y } => control.pointer_down(x, y),
            InputEvent::PointerUp => control.pointer_up(),
            InputEvent::PointerLeave => control.pointer_leave(),
            InputEvent::PointerMoved { x, y } => control.pointer_move(x, y),
        }
    }
}
