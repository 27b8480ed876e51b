use super::ident::IdentPassConfig;
use super::{RenderTarget, TargetFormats};

/// Offscreen color + depth attachments for the identification pass.
///
/// The color texture is `COPY_SRC` so hosts can read identities back; the
/// readback itself is up to them.
pub struct IdentTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: wgpu::Texture,
    depth_view: wgpu::TextureView,

    formats: TargetFormats,
    width: u32,
    height: u32,
}

impl IdentTarget {
    /// Creates attachments of `width` x `height` pixels.
    ///
    /// Zero extents are clamped to 1; wgpu rejects zero-sized textures.
    pub fn new(device: &wgpu::Device, width: u32, height: u32, config: &IdentPassConfig) -> Self {
        let (width, height) = clamp_extent(width, height);
        let formats = config.formats();
        let (color, color_view) =
            create_attachment(device, "identpass ident color", formats.color, width, height);
        let (depth, depth_view) =
            create_attachment(device, "identpass ident depth", formats.depth, width, height);

        Self {
            color,
            color_view,
            depth,
            depth_view,
            formats,
            width,
            height,
        }
    }

    /// Recreates the attachments if the size changed. Returns whether it did.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        let (width, height) = clamp_extent(width, height);
        if (width, height) == (self.width, self.height) {
            return false;
        }

        (self.color, self.color_view) =
            create_attachment(device, "identpass ident color", self.formats.color, width, height);
        (self.depth, self.depth_view) =
            create_attachment(device, "identpass ident depth", self.formats.depth, width, height);
        self.width = width;
        self.height = height;

        log::debug!("IdentTarget: resized to {width}x{height}");
        true
    }

    /// Size in pixels.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn formats(&self) -> TargetFormats {
        self.formats
    }

    #[inline]
    pub fn color_texture(&self) -> &wgpu::Texture {
        &self.color
    }

    #[inline]
    pub fn depth_texture(&self) -> &wgpu::Texture {
        &self.depth
    }

    /// Borrows the attachments for one recording into `encoder`.
    #[inline]
    pub fn render_target<'a>(&'a self, encoder: &'a mut wgpu::CommandEncoder) -> RenderTarget<'a> {
        RenderTarget::new(encoder, &self.color_view, &self.depth_view, self.formats)
    }
}

fn create_attachment(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn clamp_extent(width: u32, height: u32) -> (u32, u32) {
    (width.max(1), height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_extent_clamps_to_one() {
        assert_eq!(clamp_extent(0, 0), (1, 1));
        assert_eq!(clamp_extent(0, 480), (1, 480));
        assert_eq!(clamp_extent(640, 480), (640, 480));
    }
}
