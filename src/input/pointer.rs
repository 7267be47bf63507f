use super::{InputEvent, MouseButton};

/// Pointer travel (in event units) beyond which a press becomes a drag.
const CLICK_SLOP: f32 = 4.0;

/// Outcome of a primary button release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// The pointer barely moved and the sphere was at rest when pressed.
    Click,
    /// The pointer barely moved, but the press caught a moving sphere.
    Catch,
    /// The press turned into a drag.
    Drag,
}

/// Tracks cursor position and primary button state.
///
/// Windowing systems report button changes without a position; the tracker
/// supplies the last known cursor position so the engine always sees
/// positioned presses.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: (f32, f32),
    pressed_at: Option<(f32, f32)>,
    pressed_at_rest: bool,
    dragged: bool,
}

impl PointerTracker {
    /// Tracker with the cursor at the origin and no button held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cursor move.
    pub fn cursor_moved(&mut self, x: f32, y: f32) -> InputEvent {
        self.position = (x, y);
        if let Some((px, py)) = self.pressed_at {
            if (x - px).hypot(y - py) > CLICK_SLOP {
                self.dragged = true;
            }
        }
        InputEvent::PointerMoved { x, y }
    }

    /// Record a button change. Only the primary button produces events.
    ///
    /// `at_rest` is whether the sphere was still before this event. It is
    /// sampled at the press, since the press itself keeps the sphere
    /// counted as moving until the release.
    pub fn button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        at_rest: bool,
    ) -> Option<(InputEvent, Option<Release>)> {
        if button != MouseButton::Left {
            return None;
        }
        let (x, y) = self.position;
        if pressed {
            self.pressed_at = Some((x, y));
            self.pressed_at_rest = at_rest;
            self.dragged = false;
            Some((InputEvent::PointerDown { x, y }, None))
        } else {
            let release = self.pressed_at.take().map(|_| {
                if self.dragged {
                    Release::Drag
                } else if self.pressed_at_rest {
                    Release::Click
                } else {
                    Release::Catch
                }
            });
            Some((InputEvent::PointerUp, release))
        }
    }

    /// The cursor left the surface; any press is abandoned.
    pub fn cursor_left(&mut self) -> InputEvent {
        self.pressed_at = None;
        self.dragged = false;
        InputEvent::PointerLeave
    }

    /// Whether the primary button is held.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.pressed_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_uses_last_cursor_position() {
        let mut t = PointerTracker::new();
        let _ = t.cursor_moved(12.0, 34.0);
        let (event, release) = t.button(MouseButton::Left, true, true).unwrap();
        assert_eq!(event, InputEvent::PointerDown { x: 12.0, y: 34.0 });
        assert!(release.is_none());
        assert!(t.is_pressed());
    }

    #[test]
    fn small_travel_is_a_click() {
        let mut t = PointerTracker::new();
        let _ = t.button(MouseButton::Left, true, true);
        let _ = t.cursor_moved(2.0, 1.0);
        let (event, release) =
            t.button(MouseButton::Left, false, false).unwrap();
        assert_eq!(event, InputEvent::PointerUp);
        assert_eq!(release, Some(Release::Click));
    }

    #[test]
    fn long_travel_is_a_drag() {
        let mut t = PointerTracker::new();
        let _ = t.button(MouseButton::Left, true, true);
        let _ = t.cursor_moved(50.0, 0.0);
        let _ = t.cursor_moved(1.0, 0.0);
        let (_, release) = t.button(MouseButton::Left, false, false).unwrap();
        assert_eq!(release, Some(Release::Drag));
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut t = PointerTracker::new();
        assert!(t.button(MouseButton::Other, true, true).is_none());
        assert!(!t.is_pressed());
    }

    #[test]
    fn leaving_abandons_the_press() {
        let mut t = PointerTracker::new();
        let _ = t.button(MouseButton::Left, true, true);
        assert_eq!(t.cursor_left(), InputEvent::PointerLeave);
        let (_, release) = t.button(MouseButton::Left, false, false).unwrap();
        assert!(release.is_none());
    }

    #[test]
    fn press_on_a_moving_sphere_is_a_catch() {
        let mut t = PointerTracker::new();
        let _ = t.button(MouseButton::Left, true, false);
        let (_, release) = t.button(MouseButton::Left, false, true).unwrap();
        assert_eq!(release, Some(Release::Catch));
    }

    #[test]
    fn rest_is_judged_at_the_press_not_the_release() {
        use crate::engine::frame::MenuFrame;
        use crate::options::MenuOptions;

        let mut frame = MenuFrame::new(MenuOptions::default(), 5, 800, 600);
        for _ in 0..600 {
            let _ = frame.update(1.0 / 60.0);
        }
        assert!(!frame.is_moving());

        let mut t = PointerTracker::new();
        let _ = t.cursor_moved(400.0, 300.0);
        let (down, _) =
            t.button(MouseButton::Left, true, !frame.is_moving()).unwrap();
        assert_eq!(down, InputEvent::PointerDown { x: 400.0, y: 300.0 });
        frame.control_mut().pointer_down(400.0, 300.0);
        for _ in 0..6 {
            let _ = frame.update(1.0 / 60.0);
        }
        // Holding the button counts as moving.
        assert!(frame.is_moving());

        let (_, release) =
            t.button(MouseButton::Left, false, !frame.is_moving()).unwrap();
        assert_eq!(release, Some(Release::Click));
    }
}
