use glam::Vec4;

/// Clip-space depth offset pulling identification geometry towards the viewer.
///
/// The value is subtracted from clip-space Z before the perspective divide, so
/// wireframe strokes drawn over coplanar faces win the `Less` depth test.
/// Only Z is touched; X, Y and W are never biased.
///
/// The offset is constant in clip space. It does not scale with the depth range
/// or the near/far planes, so hosts with unusual projections should tune it
/// through `IdentPassConfig::depth_bias`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthBias(f32);

impl DepthBias {
    /// Offset applied by default.
    pub const DEFAULT: DepthBias = DepthBias(1e-4);

    /// No offset.
    pub const NONE: DepthBias = DepthBias(0.0);

    /// Returns `None` for NaN or infinite values.
    #[inline]
    pub fn new(value: f32) -> Option<Self> {
        value.is_finite().then_some(Self(value))
    }

    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Subtracts the offset from the Z component of a clip-space position.
    #[inline]
    pub fn apply(self, clip: Vec4) -> Vec4 {
        Vec4::new(clip.x, clip.y, clip.z - self.0, clip.w)
    }
}

impl Default for DepthBias {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_one_ten_thousandth() {
        assert_eq!(DepthBias::default().value(), 1e-4);
        assert_eq!(DepthBias::default(), DepthBias::DEFAULT);
    }

    #[test]
    fn rejects_non_finite() {
        assert!(DepthBias::new(f32::NAN).is_none());
        assert!(DepthBias::new(f32::INFINITY).is_none());
        assert!(DepthBias::new(f32::NEG_INFINITY).is_none());
        assert_eq!(DepthBias::new(-2e-3).map(DepthBias::value), Some(-2e-3));
    }

    #[test]
    fn apply_touches_z_only() {
        let clip = Vec4::new(0.5, -0.25, 0.75, 2.0);
        let out = DepthBias::DEFAULT.apply(clip);
        assert_eq!(out.x, clip.x);
        assert_eq!(out.y, clip.y);
        assert_eq!(out.w, clip.w);
        assert_eq!(out.z, 0.75 - 1e-4);
    }

    #[test]
    fn none_is_identity() {
        let clip = Vec4::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(DepthBias::NONE.apply(clip), clip);
    }
}
