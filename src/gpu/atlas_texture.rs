//! GPU side of the thumbnail atlas.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::atlas::AtlasImage;

/// Sampled atlas texture plus the grid size the shader needs for lookup.
pub struct AtlasTexture {
    /// Backing texture (RGBA8 sRGB, mipmapped).
    pub texture: wgpu::Texture,
    /// Full-chain view bound to the card pass.
    pub view: wgpu::TextureView,
    /// Cells per atlas side.
    pub atlas_size: u32,
}

impl AtlasTexture {
    /// 1x1 transparent texture bound until the real atlas arrives; every card
    /// samples nothing and stays invisible.
    #[must_use]
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let image = RgbaImage::new(1, 1);
        Self::from_levels(device, queue, &[image], 1, "Atlas Placeholder")
    }

    /// Upload a composed atlas with a full CPU-generated mip chain.
    #[must_use]
    pub fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        atlas: &AtlasImage,
    ) -> Self {
        let levels = mip_chain(&atlas.image);
        log::debug!(
            "uploading atlas {}x{} with {} mip levels",
            atlas.image.width(),
            atlas.image.height(),
            levels.len()
        );
        Self::from_levels(device, queue, &levels, atlas.atlas_size, "Atlas")
    }

    fn from_levels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        levels: &[RgbaImage],
        atlas_size: u32,
        label: &str,
    ) -> Self {
        let (width, height) = levels.first().map_or((1, 1), RgbaImage::dimensions);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: levels.len().max(1) as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, image) in levels.iter().enumerate() {
            let (w, h) = image.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                image.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            atlas_size,
        }
    }
}

/// Base image followed by successive half-size reductions down to 1x1.
#[must_use]
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let mut levels = vec![base.clone()];
    let (mut w, mut h) = base.dimensions();
    while w > 1 || h > 1 {
        w = (w / 2).max(1);
        h = (h / 2).max(1);
        let Some(prev) = levels.last() else { break };
        let next = imageops::resize(prev, w, h, FilterType::Triangle);
        levels.push(next);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let base = RgbaImage::new(1536, 1536);
        let sizes: Vec<_> =
            mip_chain(&base).iter().map(RgbaImage::dimensions).collect();
        assert_eq!(sizes.first(), Some(&(1536, 1536)));
        assert_eq!(sizes[1], (768, 768));
        assert_eq!(sizes.last(), Some(&(1, 1)));
        // floor(log2(1536)) + 1
        assert_eq!(sizes.len(), 11);
    }

    #[test]
    fn single_pixel_has_one_level() {
        assert_eq!(mip_chain(&RgbaImage::new(1, 1)).len(), 1);
    }
}
