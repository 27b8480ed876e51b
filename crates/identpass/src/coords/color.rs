/// Linear RGBA color written by the identification fragment stage.
///
/// The pass writes it unmodified (no blending, no sRGB conversion with the
/// default `Rgba8Unorm` target), so every draw lands in the target as exactly
/// this value quantized to the target format. How a host maps object ids to
/// colors is its own business.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn transparent() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0, 1.0)
    }

    /// Creates a color from 8-bit channels.
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u8_maps_full_range() {
        let c = ColorRgba::from_u8(0, 255, 51, 255);
        assert_eq!(c, ColorRgba::new(0.0, 1.0, 0.2, 1.0));
    }

    #[test]
    fn non_finite_channel_detected() {
        assert!(ColorRgba::white().is_finite());
        assert!(!ColorRgba::new(f32::NAN, 0.0, 0.0, 1.0).is_finite());
        assert!(!ColorRgba::new(0.0, 0.0, f32::INFINITY, 1.0).is_finite());
    }
}
