//! 2D sprite texture implementation.

use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::core::Id;

/// Errors that can occur when creating a texture.
#[derive(Error, Debug)]
pub enum TextureError {
    /// The encoded image bytes could not be decoded.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// A 2D texture used as a particle sprite or alpha mask.
pub struct Texture2D {
    /// Unique ID.
    id: Id,
    /// Texture width.
    width: u32,
    /// Texture height.
    height: u32,
    /// The GPU texture.
    texture: wgpu::Texture,
    /// Texture view.
    view: wgpu::TextureView,
    /// Texture format.
    format: wgpu::TextureFormat,
}

impl Texture2D {
    /// Create a new texture from RGBA8 data.
    /// Uses wgpu's create_texture_with_data which handles row alignment automatically.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: Option<&str>,
    ) -> Self {
        let format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label,
                size,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            id: Id::new(),
            width,
            height,
            texture,
            view,
            format,
        }
    }

    /// Create a texture from encoded image bytes (PNG, JPEG, BMP).
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        label: Option<&str>,
    ) -> Result<Self, TextureError> {
        use image::GenericImageView;

        let img = image::load_from_memory(data)?;
        let rgba = img.to_rgba8();
        let (width, height) = img.dimensions();

        Ok(Self::from_rgba8(
            device,
            queue,
            rgba.as_raw(),
            width,
            height,
            label,
        ))
    }

    /// Create a solid white texture (1x1), the no-mask sprite.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba8(device, queue, &[255, 255, 255, 255], 1, 1, Some("White Sprite"))
    }

    /// Create a procedural radial-falloff sprite: opaque white at the
    /// center fading quadratically to transparent at the rim. A built-in
    /// stand-in for a hand-painted alpha mask.
    pub fn radial_falloff(device: &wgpu::Device, queue: &wgpu::Queue, size: u32) -> Self {
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        let half = size as f32 / 2.0;

        for y in 0..size {
            for x in 0..size {
                let dx = (x as f32 + 0.5 - half) / half;
                let dy = (y as f32 + 0.5 - half) / half;
                let d = (dx * dx + dy * dy).sqrt().min(1.0);
                let fade = (1.0 - d) * (1.0 - d);
                let v = (fade * 255.0) as u8;
                data.extend_from_slice(&[v, v, v, v]);
            }
        }

        Self::from_rgba8(device, queue, &data, size, size, Some("Radial Falloff Sprite"))
    }

    /// Get the unique ID.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get texture width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get texture height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the texture format.
    #[inline]
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Get the underlying wgpu texture.
    #[inline]
    pub fn wgpu_texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the texture view.
    #[inline]
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
