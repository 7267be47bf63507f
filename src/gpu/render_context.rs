use std::fmt;

/// Why the menu could not get a GPU to draw with.
#[derive(Debug)]
pub enum RenderContextError {
    /// The window handle cannot back a surface.
    Surface(wgpu::CreateSurfaceError),
    /// No adapter presents to that surface.
    Adapter(wgpu::RequestAdapterError),
    /// The adapter refused the menu's limits.
    Device(wgpu::RequestDeviceError),
    /// The adapter has no configuration for the surface.
    UnsupportedSurface,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Surface(e) => write!(f, "cannot create a surface: {e}"),
            Self::Adapter(e) => write!(f, "no adapter for the surface: {e}"),
            Self::Device(e) => write!(f, "device request failed: {e}"),
            Self::UnsupportedSurface => {
                write!(f, "the adapter cannot configure this surface")
            }
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Surface(e) => Some(e),
            Self::Adapter(e) => Some(e),
            Self::Device(e) => Some(e),
            Self::UnsupportedSurface => None,
        }
    }
}

/// Device, queue and the window surface the menu presents to.
///
/// The menu clears to transparent, so a non-opaque composite mode is picked
/// whenever the surface offers one.
pub struct RenderContext {
    /// Logical device.
    pub device: wgpu::Device,
    /// Command queue.
    pub queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

impl RenderContext {
    /// Open a device presenting to `window` at `size` physical pixels.
    ///
    /// Limits start from the WebGL2 downlevel set raised to what the
    /// adapter allows, so large atlases fit where the hardware permits.
    ///
    /// # Errors
    ///
    /// Returns [`RenderContextError`] if the surface, adapter or device
    /// cannot be created, or the surface cannot be configured.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(RenderContextError::Surface)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::Adapter)?;
        log::info!("using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Sphere Menu Device"),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await
            .map_err(RenderContextError::Device)?;

        let mut config = surface
            .get_default_config(&adapter, size.0.max(1), size.1.max(1))
            .ok_or(RenderContextError::UnsupportedSurface)?;
        config.present_mode = wgpu::PresentMode::Fifo;
        let caps = surface.get_capabilities(&adapter);
        config.alpha_mode = preferred_alpha_mode(&caps.alpha_modes);
        log::debug!(
            "surface {:?}, alpha {:?}",
            config.format,
            config.alpha_mode
        );
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }

    /// Color target format.
    #[must_use]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Surface size in physical pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Reconfigure the surface for a new physical size. Zero dimensions
    /// are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Next swapchain texture.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the surface is lost, outdated or
    /// timed out.
    pub fn acquire_frame(
        &self,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    /// New command encoder.
    #[must_use]
    pub fn create_encoder(&self) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Sphere Menu Encoder"),
            })
    }

    /// Finish and submit `encoder`.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
    }
}

/// First non-opaque composite mode on offer, so the transparent clear
/// reaches the compositor; otherwise whatever the surface lists first.
fn preferred_alpha_mode(
    offered: &[wgpu::CompositeAlphaMode],
) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|mode| offered.contains(mode))
    .or_else(|| offered.first().copied())
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use wgpu::CompositeAlphaMode as Mode;

    use super::*;

    #[test]
    fn premultiplied_alpha_is_preferred() {
        let offered = [Mode::Opaque, Mode::PostMultiplied, Mode::PreMultiplied];
        assert_eq!(preferred_alpha_mode(&offered), Mode::PreMultiplied);
        let offered = [Mode::Opaque, Mode::PostMultiplied];
        assert_eq!(preferred_alpha_mode(&offered), Mode::PostMultiplied);
    }

    #[test]
    fn opaque_surfaces_keep_their_mode() {
        assert_eq!(preferred_alpha_mode(&[Mode::Opaque]), Mode::Opaque);
        assert_eq!(preferred_alpha_mode(&[]), Mode::Auto);
    }
}
