//! Standalone menu window backed by winit.
//!
//! ```no_run
//! # use sphere_menu::{MenuItem, Viewer};
//! Viewer::builder()
//!     .with_items(vec![MenuItem {
//!         image: "thumbs/work.png".into(),
//!         link: "/work".into(),
//!         title: "Work".into(),
//!         description: "Selected projects".into(),
//!     }])
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::{cell::RefCell, rc::Rc, sync::Arc};

use winit::{
    application::ApplicationHandler,
    error::EventLoopError,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    error::MenuError,
    input::{PointerTracker, Release},
    items::MenuItem,
    options::{MenuConfig, MenuOptions},
    util::FrameTiming,
    MenuCallbacks, MenuRenderEngine, MouseButton,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    items: Vec<MenuItem>,
    options: MenuOptions,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            options: MenuOptions::default(),
            title: "Sphere Menu".into(),
        }
    }

    /// Set the items shown on the sphere.
    #[must_use]
    pub fn with_items(mut self, items: Vec<MenuItem>) -> Self {
        self.items = items;
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Take both items and options from a menu definition.
    #[must_use]
    pub fn with_config(self, config: MenuConfig) -> Self {
        self.with_items(config.items).with_options(config.options)
    }

    /// Set the base window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            items: self.items,
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the spherical menu.
///
/// The window title doubles as the item overlay: at rest it names the
/// front-facing item, while the sphere moves it falls back to the base
/// title. Clicking (press and release without dragging) on a sphere that
/// was at rest when pressed activates the front item; the viewer logs its
/// link.
pub struct Viewer {
    items: Vec<MenuItem>,
    options: MenuOptions,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Viewer`] if the event loop or the window cannot
    /// be created, or the loop fails while running. Returns the engine's
    /// error (such as [`MenuError::Gpu`]) if the renderer cannot start.
    pub fn run(self) -> Result<(), MenuError> {
        let event_loop =
            EventLoop::new().map_err(|e| MenuError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            timing: FrameTiming::new(),
            pointer: PointerTracker::new(),
            pixel_ratio: 1.0,
            overlay: Rc::new(RefCell::new(Overlay::default())),
            items: Some(self.items),
            options: self.options,
            title: self.title,
            fatal: None,
        };

        let ran = event_loop.run_app(&mut app);
        outcome(ran, app.fatal.take())
    }
}

/// Result of a finished event loop. A startup failure recorded by the app
/// wins over the loop's own exit status.
fn outcome(
    ran: Result<(), EventLoopError>,
    fatal: Option<MenuError>,
) -> Result<(), MenuError> {
    if let Some(error) = fatal {
        return Err(error);
    }
    ran.map_err(|e| MenuError::Viewer(e.to_string()))
}

// ── Overlay ──────────────────────────────────────────────────────────────

/// What the callbacks have reported since the title was last refreshed.
#[derive(Debug, Default)]
struct Overlay {
    dirty: bool,
}

/// Window title for the current item and motion.
fn caption(base: &str, item: Option<&MenuItem>, moving: bool) -> String {
    let Some(item) = item.filter(|_| !moving) else {
        return base.to_owned();
    };
    let mut parts = vec![base];
    for part in [&item.title, &item.description, &item.link] {
        if !part.is_empty() {
            parts.push(part);
        }
    }
    parts.join(" · ")
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<MenuRenderEngine>,
    timing: FrameTiming,
    pointer: PointerTracker,
    /// Physical pixels per logical pixel.
    pixel_ratio: f64,
    overlay: Rc<RefCell<Overlay>>,
    /// Handed to the engine on first resume.
    items: Option<Vec<MenuItem>>,
    options: MenuOptions,
    title: String,
    /// Startup failure that ended the event loop.
    fatal: Option<MenuError>,
}

impl ViewerApp {
    fn callbacks(&self) -> MenuCallbacks {
        let active = Rc::clone(&self.overlay);
        let movement = Rc::clone(&self.overlay);
        MenuCallbacks {
            on_active_item_change: Box::new(move |_| {
                active.borrow_mut().dirty = true;
            }),
            on_movement_change: Box::new(move |moving| {
                log::debug!("sphere moving: {moving}");
                movement.borrow_mut().dirty = true;
            }),
            on_init: Some(Box::new(|engine| {
                log::info!("menu ready with {} items", engine.items().len());
            })),
        }
    }

    fn refresh_title(&self) {
        if !std::mem::take(&mut self.overlay.borrow_mut().dirty) {
            return;
        }
        let (Some(window), Some(engine)) = (&self.window, &self.engine) else {
            return;
        };
        if !engine.is_moving() {
            log::debug!("settled at {:.0} fps", self.timing.fps());
        }
        window.set_title(&caption(
            &self.title,
            engine.active_item(),
            engine.is_moving(),
        ));
    }

    fn redraw(&mut self) {
        let dt = self.timing.tick();
        if let Some(engine) = &mut self.engine {
            engine.update(dt);
        }
        self.refresh_title();

        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };
        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                let inner = window.inner_size();
                engine.resize(inner.width, inner.height);
            }
            Err(e) => {
                log::error!("render error: {e:?}");
            }
        }
        window.request_redraw();
    }

    fn pointer_button(&mut self, button: MouseButton, pressed: bool) {
        let Some(engine) = &mut self.engine else {
            return;
        };
        let at_rest = !engine.is_moving();
        let Some((event, release)) =
            self.pointer.button(button, pressed, at_rest)
        else {
            return;
        };
        engine.handle_input(event);
        if release == Some(Release::Click) {
            if let Some(item) = engine.active_item() {
                log::info!(
                    "open {} ({})",
                    item.link,
                    if item.is_external_link() {
                        "external"
                    } else {
                        "local"
                    }
                );
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: MenuError) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn rescale(&mut self, scale_factor: f64) {
        self.pixel_ratio = scale_factor;
        let inner = self.window.as_ref().map(|w| w.inner_size());
        if let Some(engine) = &mut self.engine {
            engine.set_pixel_ratio(scale_factor as f32);
            if let Some(inner) = inner {
                engine.resize(inner.width, inner.height);
            }
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.6) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.6) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_transparent(true)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes()
                .with_title(&self.title)
                .with_transparent(true)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(
                    event_loop,
                    MenuError::Viewer(format!("failed to create window: {e}")),
                );
                return;
            }
        };

        let inner = window.inner_size();
        let engine_result = pollster::block_on(MenuRenderEngine::new(
            Arc::clone(&window),
            (inner.width.max(1), inner.height.max(1)),
            self.items.take().unwrap_or_default(),
            self.callbacks(),
            self.options.clone(),
        ));
        let mut engine = match engine_result {
            Ok(e) => e,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        self.pixel_ratio = window.scale_factor();
        engine.set_pixel_ratio(self.pixel_ratio as f32);

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(size) => {
                if let Some(engine) = &mut self.engine {
                    engine.resize(size.width, size.height);
                }
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.rescale(scale_factor);
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::MouseInput { button, state, .. } => {
                self.pointer_button(
                    MouseButton::from(button),
                    state == ElementState::Pressed,
                );
            }

            WindowEvent::CursorMoved { position, .. } => {
                let x = (position.x / self.pixel_ratio) as f32;
                let y = (position.y / self.pixel_ratio) as f32;
                let event = self.pointer.cursor_moved(x, y);
                if let Some(engine) = &mut self.engine {
                    engine.handle_input(event);
                }
            }

            WindowEvent::CursorLeft { .. } => {
                let event = self.pointer.cursor_left();
                if let Some(engine) = &mut self.engine {
                    engine.handle_input(event);
                }
            }

            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // The surface borrows the window; release it first.
        self.engine = None;
        self.window = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> MenuItem {
        MenuItem {
            image: "a.png".into(),
            link: "https://example.com/".into(),
            title: "Work".into(),
            description: String::new(),
        }
    }

    #[test]
    fn caption_names_the_item_at_rest() {
        assert_eq!(
            caption("Menu", Some(&item()), false),
            "Menu · Work · https://example.com/"
        );
    }

    #[test]
    fn startup_failure_is_returned_from_run() {
        let err = outcome(Ok(()), Some(MenuError::Viewer("no window".into())))
            .unwrap_err();
        assert!(matches!(err, MenuError::Viewer(ref m) if m == "no window"));

        let err = outcome(
            Err(EventLoopError::ExitFailure(1)),
            Some(MenuError::Viewer("no adapter".into())),
        )
        .unwrap_err();
        assert!(matches!(err, MenuError::Viewer(ref m) if m == "no adapter"));
    }

    #[test]
    fn clean_exit_is_ok() {
        assert!(outcome(Ok(()), None).is_ok());
        assert!(matches!(
            outcome(Err(EventLoopError::ExitFailure(2)), None),
            Err(MenuError::Viewer(_))
        ));
    }

    #[test]
    fn caption_hides_the_item_while_moving() {
        assert_eq!(caption("Menu", Some(&item()), true), "Menu");
        assert_eq!(caption("Menu", None, false), "Menu");
    }
}
