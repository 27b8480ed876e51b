use glam::{Mat4, Vec3, Vec4};

use crate::coords::ColorRgba;
use crate::render::IdentUniform;

use super::DepthBias;

/// Uniform state of one identification draw.
///
/// `view` already carries the object's model transform (`scene_view * model`);
/// the stage itself never sees a separate model matrix. Matrices are used as
/// given: nothing checks that they are invertible or even initialized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VertexTransform {
    pub view: Mat4,
    pub proj: Mat4,
    pub bias: DepthBias,
}

impl VertexTransform {
    /// Transform with the default depth bias.
    #[inline]
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self {
            view,
            proj,
            bias: DepthBias::DEFAULT,
        }
    }

    #[inline]
    pub fn with_bias(self, bias: DepthBias) -> Self {
        Self { bias, ..self }
    }

    /// Folds an object's model matrix into the view (`view * model`).
    #[inline]
    pub fn with_model(self, model: Mat4) -> Self {
        Self {
            view: self.view * model,
            ..self
        }
    }

    /// Clip-space position of a local-space vertex.
    #[inline]
    pub fn clip_position(&self, position: Vec3) -> Vec4 {
        let clip = self.proj * self.view * position.extend(1.0);
        self.bias.apply(clip)
    }

    pub fn clip_positions(&self, positions: &[Vec3]) -> Vec<Vec4> {
        positions.iter().map(|&p| self.clip_position(p)).collect()
    }

    /// GPU uniform for this transform, drawn with `color`.
    pub fn uniform(&self, color: ColorRgba) -> IdentUniform {
        IdentUniform {
            view: self.view.to_cols_array_2d(),
            proj: self.proj.to_cols_array_2d(),
            bias: [self.bias.value(), 0.0, 0.0, 0.0],
            color: color.to_array(),
        }
    }
}

impl Default for VertexTransform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn sample_view() -> Mat4 {
        Mat4::look_at_rh(Vec3::new(3.0, -4.0, 5.0), Vec3::ZERO, Vec3::Z)
    }

    fn sample_proj() -> Mat4 {
        Mat4::perspective_rh(60f32.to_radians(), 4.0 / 3.0, 0.1, 100.0)
    }

    // ── identity ──────────────────────────────────────────────────────────

    #[test]
    fn identity_without_bias_is_homogeneous_position() {
        let t = VertexTransform::default().with_bias(DepthBias::NONE);
        let p = Vec3::new(-0.5, 7.0, 2.25);
        assert_eq!(t.clip_position(p), Vec4::new(-0.5, 7.0, 2.25, 1.0));
    }

    #[test]
    fn identity_scenario_subtracts_bias_from_z() {
        let out = VertexTransform::default().clip_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(out, Vec4::new(1.0, 2.0, 3.0 - 1e-4, 1.0));
    }

    // ── arbitrary matrices ────────────────────────────────────────────────

    #[test]
    fn matches_proj_view_product_minus_bias() {
        let (view, proj) = (sample_view(), sample_proj());
        let t = VertexTransform::new(view, proj);

        for p in [
            Vec3::ZERO,
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-10.0, 0.5, 4.0),
            Vec3::new(0.25, -0.75, -8.0),
        ] {
            let expected = proj * view * Vec4::new(p.x, p.y, p.z, 1.0) - Vec4::new(0.0, 0.0, 1e-4, 0.0);
            let got = t.clip_position(p);
            assert!(got.abs_diff_eq(expected, EPS), "{p:?}: {got:?} != {expected:?}");
        }
    }

    #[test]
    fn bias_is_independent_of_matrices() {
        let p = Vec3::new(0.3, -1.2, 2.0);
        for (view, proj) in [
            (Mat4::IDENTITY, Mat4::IDENTITY),
            (sample_view(), sample_proj()),
            (Mat4::from_scale(Vec3::splat(40.0)), Mat4::orthographic_rh(-1.0, 1.0, -1.0, 1.0, 0.0, 10.0)),
        ] {
            let biased = VertexTransform::new(view, proj).clip_position(p);
            let plain = VertexTransform::new(view, proj)
                .with_bias(DepthBias::NONE)
                .clip_position(p);

            assert_eq!(biased.x, plain.x);
            assert_eq!(biased.y, plain.y);
            assert_eq!(biased.w, plain.w);
            assert!((plain.z - biased.z - 1e-4).abs() < EPS);
        }
    }

    #[test]
    fn zero_matrices_yield_negative_bias_only() {
        let t = VertexTransform::new(Mat4::ZERO, Mat4::ZERO);
        let out = t.clip_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(out, Vec4::new(0.0, 0.0, -1e-4, 0.0));
    }

    #[test]
    fn non_finite_input_propagates_without_panicking() {
        let t = VertexTransform::new(Mat4::from_cols_array(&[f32::NAN; 16]), Mat4::IDENTITY);
        let out = t.clip_position(Vec3::ONE);
        assert!(out.is_nan());
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn with_model_folds_into_view() {
        let model = Mat4::from_translation(Vec3::new(5.0, 0.0, -1.0));
        let t = VertexTransform::new(sample_view(), sample_proj()).with_model(model);
        assert_eq!(t.view, sample_view() * model);

        let p = Vec3::new(1.0, 1.0, 1.0);
        let direct = VertexTransform::new(sample_view(), sample_proj())
            .clip_position(model.transform_point3(p));
        assert!(t.clip_position(p).abs_diff_eq(direct, 1e-4));
    }

    #[test]
    fn clip_positions_maps_each_vertex() {
        let t = VertexTransform::default();
        let out = t.clip_positions(&[Vec3::X, Vec3::Y]);
        assert_eq!(out, vec![Vec4::new(1.0, 0.0, -1e-4, 1.0), Vec4::new(0.0, 1.0, -1e-4, 1.0)]);
    }

    // ── uniform ───────────────────────────────────────────────────────────

    #[test]
    fn uniform_carries_column_major_matrices_and_bias() {
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let t = VertexTransform::new(view, Mat4::IDENTITY)
            .with_bias(DepthBias::new(2e-4).unwrap());
        let u = t.uniform(ColorRgba::new(0.1, 0.2, 0.3, 1.0));

        // Translation lives in the fourth column.
        assert_eq!(u.view[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(u.proj, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(u.bias, [2e-4, 0.0, 0.0, 0.0]);
        assert_eq!(u.color, [0.1, 0.2, 0.3, 1.0]);
    }
}
