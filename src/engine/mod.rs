//! The menu render engine.
//!
//! [`MenuRenderEngine`] owns the GPU context, the card pass and the
//! per-frame [`frame::MenuFrame`] state. Hosts drive it with
//! [`update`](MenuRenderEngine::update) and
//! [`render`](MenuRenderEngine::render) once per frame, forward pointer
//! events through [`handle_input`](MenuRenderEngine::handle_input), and hear
//! back through [`MenuCallbacks`].

/// GPU-free per-frame state: control, camera, instances, notifications.
pub mod frame;
mod input;

use std::sync::Arc;

use self::frame::{FrameEvents, MenuFrame};
use crate::atlas::{atlas_size, AtlasBuilder, ImageFetcher, SourceFetcher};
use crate::error::MenuError;
use crate::geometry::Geometry;
use crate::gpu::atlas_texture::AtlasTexture;
use crate::gpu::render_context::RenderContext;
use crate::items::{with_placeholder, MenuItem};
use crate::options::MenuOptions;
use crate::renderer::disc_pass::{DiscPass, MenuUniform};

/// The spin velocity sent to the shader is slightly exaggerated.
const SHADER_VELOCITY_GAIN: f32 = 1.1;

/// Lifecycle of a [`MenuRenderEngine`]. Until the future returned by
/// [`MenuRenderEngine::new`] resolves there is no engine to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; no frame has been advanced yet.
    Ready,
    /// The frame loop has started.
    Running,
}

/// Host notifications.
pub struct MenuCallbacks {
    /// Called with the item index whenever the front-facing item changes.
    pub on_active_item_change: Box<dyn FnMut(usize)>,
    /// Called when the sphere starts (`true`) or stops (`false`) moving.
    pub on_movement_change: Box<dyn FnMut(bool)>,
    /// Called once, at the end of construction.
    pub on_init: Option<Box<dyn FnOnce(&MenuRenderEngine)>>,
}

impl Default for MenuCallbacks {
    fn default() -> Self {
        Self {
            on_active_item_change: Box::new(|_| {}),
            on_movement_change: Box::new(|_| {}),
            on_init: None,
        }
    }
}

/// Spherical menu renderer.
pub struct MenuRenderEngine {
    context: RenderContext,
    frame: MenuFrame,
    pass: DiscPass,
    atlas: AtlasTexture,
    atlas_builder: Option<AtlasBuilder>,
    fetcher: Arc<dyn ImageFetcher>,
    items: Vec<MenuItem>,
    callbacks: MenuCallbacks,
    uniform: MenuUniform,
    state: EngineState,
    pixel_ratio: f32,
    atlas_uploaded: bool,
}

impl MenuRenderEngine {
    /// Create the engine on a window surface of `size` physical pixels.
    ///
    /// Thumbnails are fetched with [`SourceFetcher`]. An empty `items` list
    /// is replaced by a single placeholder item.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::Gpu`] if no adapter, device or surface
    /// configuration is available, or [`MenuError::ThreadSpawn`] if the
    /// atlas thread cannot start.
    #[allow(clippy::future_not_send)]
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        items: Vec<MenuItem>,
        callbacks: MenuCallbacks,
        options: MenuOptions,
    ) -> Result<Self, MenuError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(
            context,
            items,
            callbacks,
            options,
            Arc::new(SourceFetcher),
        )
    }

    /// Create the engine on an open [`RenderContext`] with a custom image
    /// fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::ThreadSpawn`] if the atlas thread cannot start.
    pub fn from_context(
        context: RenderContext,
        items: Vec<MenuItem>,
        callbacks: MenuCallbacks,
        options: MenuOptions,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Result<Self, MenuError> {
        let items = with_placeholder(items);
        let (width, height) = context.size();

        let requested_cell_size = options.cell_size;
        let scale_factor = options.scale;

        let disc = Geometry::disc(1.0);
        let frame = MenuFrame::new(options, items.len(), width, height);
        log::info!(
            "sphere menu: {} items on {} slots",
            items.len(),
            frame.instance_count()
        );

        let atlas = AtlasTexture::placeholder(&context.device, &context.queue);
        let pass = DiscPass::new(
            &context,
            &disc,
            frame.instance_count() as u32,
            &atlas,
        );

        let atlas_builder = spawn_atlas(
            &context,
            &items,
            &fetcher,
            requested_cell_size,
        )?;

        let uniform = MenuUniform {
            item_count: items.len() as u32,
            scale_factor,
            ..MenuUniform::default()
        };

        let mut engine = Self {
            context,
            frame,
            pass,
            atlas,
            atlas_builder: Some(atlas_builder),
            fetcher,
            items,
            callbacks,
            uniform,
            state: EngineState::Ready,
            pixel_ratio: 1.0,
            atlas_uploaded: false,
        };

        if let Some(on_init) = engine.callbacks.on_init.take() {
            on_init(&engine);
        }
        Ok(engine)
    }

    /// Replace the item list and rebuild the atlas.
    ///
    /// The sphere keeps its orientation. Cards show the placeholder texture
    /// until the new atlas lands, and the active item is reported again on
    /// the next [`update`](Self::update). An unfinished build for the old
    /// list is detached.
    ///
    /// # Errors
    ///
    /// Returns [`MenuError::ThreadSpawn`] if the atlas thread cannot start;
    /// the engine then keeps its current items.
    pub fn set_items(
        &mut self,
        items: Vec<MenuItem>,
    ) -> Result<(), MenuError> {
        let items = with_placeholder(items);
        let builder = spawn_atlas(
            &self.context,
            &items,
            &self.fetcher,
            self.frame.options().cell_size,
        )?;
        self.atlas_builder = Some(builder);
        let (device, queue) = (&self.context.device, &self.context.queue);
        self.atlas = AtlasTexture::placeholder(device, queue);
        self.pass.set_atlas(device, &self.atlas);
        self.atlas_uploaded = false;
        self.frame.set_item_count(items.len());
        self.uniform.item_count = items.len() as u32;
        log::info!("sphere menu: {} items, rebuilding atlas", items.len());
        self.items = items;
        Ok(())
    }

    /// Advance the menu by `dt` seconds: poll the atlas, step the arcball
    /// and camera, and fire callbacks for anything that changed.
    pub fn update(&mut self, dt: f32) {
        self.state = EngineState::Running;
        self.poll_atlas();
        let events = self.frame.update(dt);
        self.dispatch(events);
    }

    fn dispatch(&mut self, events: FrameEvents) {
        if let Some(moving) = events.movement {
            (self.callbacks.on_movement_change)(moving);
        }
        if let Some(index) = events.active_item {
            log::debug!("active item -> {index}");
            (self.callbacks.on_active_item_change)(index);
        }
    }

    fn poll_atlas(&mut self) {
        let Some(builder) = self.atlas_builder.as_mut() else {
            return;
        };
        let Some(image) = builder.try_recv() else {
            return;
        };
        self.atlas = AtlasTexture::upload(
            &self.context.device,
            &self.context.queue,
            &image,
        );
        self.pass.set_atlas(&self.context.device, &self.atlas);
        self.atlas_builder = None;
        self.atlas_uploaded = true;
        log::info!("texture upload complete");
    }

    /// Render one frame to the window surface.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the swapchain texture cannot be
    /// acquired; `Lost`/`Outdated` should be answered with
    /// [`resize`](Self::resize).
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.context.acquire_frame()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.draw(&view);
        output.present();
        Ok(())
    }

    fn draw(&mut self, view: &wgpu::TextureView) {
        let camera = self.frame.camera();
        self.uniform
            .set_camera(camera.view(), camera.projection(), camera.eye);
        let control = self.frame.control();
        self.uniform.set_rotation(
            control.rotation_axis(),
            self.frame.smooth_rotation_velocity() * SHADER_VELOCITY_GAIN,
        );
        self.uniform.atlas_size = self.atlas.atlas_size;
        self.uniform.frames = self.frame.frames();

        self.pass
            .upload(&self.context.queue, &self.uniform, self.frame.instances());
        let mut encoder = self.context.create_encoder();
        self.pass.draw(&mut encoder, view);
        self.context.submit(encoder);
    }

    /// Resize to `width` x `height` physical pixels. Zero sizes are
    /// ignored; repeating a size is harmless.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.pass.resize(&self.context.device, width, height);
        let (w, h) = self.logical_size(width, height);
        self.frame.resize(w, h);
    }

    /// Device pixels per pointer unit. Pointer events and the arcball work
    /// in `physical / ratio` units.
    pub fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.max(f32::EPSILON);
        let (width, height) = self.context.size();
        let (w, h) = self.logical_size(width, height);
        self.frame.resize(w, h);
    }

    fn logical_size(&self, width: u32, height: u32) -> (u32, u32) {
        let to_logical =
            |v: u32| ((v as f32 / self.pixel_ratio).round() as u32).max(1);
        (to_logical(width), to_logical(height))
    }

    /// Release the atlas build. Further frames keep the current texture.
    pub fn shutdown(&mut self) {
        if self.atlas_builder.take().is_some() {
            log::debug!("atlas build abandoned at shutdown");
        }
    }

    /// Lifecycle state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Whether the real atlas has been uploaded.
    #[must_use]
    pub fn atlas_ready(&self) -> bool {
        self.atlas_uploaded
    }

    /// Items in slot order (never empty).
    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// The item currently facing the viewer, once known.
    #[must_use]
    pub fn active_item(&self) -> Option<&MenuItem> {
        self.frame.active_item().and_then(|i| self.items.get(i))
    }

    /// Whether the sphere is being dragged or still spinning.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.frame.is_moving()
    }

    /// Per-frame state.
    #[must_use]
    pub fn frame(&self) -> &MenuFrame {
        &self.frame
    }

    /// GPU context.
    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }
}

impl Drop for MenuRenderEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start an atlas build for `items`, fitting the cell size to the device.
fn spawn_atlas(
    context: &RenderContext,
    items: &[MenuItem],
    fetcher: &Arc<dyn ImageFetcher>,
    requested_cell_size: u32,
) -> Result<AtlasBuilder, MenuError> {
    let max_dimension = context.device.limits().max_texture_dimension_2d;
    let cell_size =
        fit_cell_size(requested_cell_size, items.len(), max_dimension);
    if cell_size != requested_cell_size {
        log::warn!(
            "atlas cell size lowered to {cell_size}px to fit \
             {max_dimension}px textures"
        );
    }
    AtlasBuilder::spawn(items.to_vec(), Arc::clone(fetcher), cell_size)
        .map_err(MenuError::ThreadSpawn)
}

/// Largest cell size not above `requested` whose grid fits in a
/// `max_dimension` texture.
#[must_use]
pub fn fit_cell_size(
    requested: u32,
    item_count: usize,
    max_dimension: u32,
) -> u32 {
    let grid = atlas_size(item_count);
    requested.min(max_dimension / grid).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_size_is_kept_when_it_fits() {
        assert_eq!(fit_cell_size(512, 9, 8192), 512);
    }

    #[test]
    fn cell_size_shrinks_for_large_grids() {
        // 30 items -> 6x6 grid; 2048 / 6 = 341
        assert_eq!(fit_cell_size(512, 30, 2048), 341);
        assert!(atlas_size(30) * fit_cell_size(512, 30, 2048) <= 2048);
    }

    #[test]
    fn default_callbacks_are_inert() {
        let mut callbacks = MenuCallbacks::default();
        (callbacks.on_active_item_change)(3);
        (callbacks.on_movement_change)(true);
        assert!(callbacks.on_init.is_none());
    }
}
