//! 2D affine transforms in homogeneous form.
//!
//! All angles are radians unless the function name ends in `_deg`.
//! Composition reads in application order: `a.then(b)` applies `a` first.

use nalgebra::{Matrix2, Matrix3, Point2, Vector2, Vector3};
use serde::{Deserialize, Serialize};

/// Errors from constructing or inverting transforms.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    #[error("skew angle {angle} rad has no finite shear factor")]
    SingularSkew { angle: f64 },
    #[error("transform is not invertible (det={det})")]
    Singular { det: f64 },
}

/// 2x2 counter-clockwise rotation matrix.
#[inline]
pub fn rotation_matrix(theta: f64) -> Matrix2<f64> {
    let (s, c) = theta.sin_cos();
    Matrix2::new(c, -s, s, c)
}

#[inline]
pub fn midpoint(a: Point2<f64>, b: Point2<f64>) -> Point2<f64> {
    Point2::from((a.coords + b.coords) * 0.5)
}

/// Affine map `p' = A p + t`, stored as a homogeneous 3x3 matrix with last row `[0, 0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Affine2 {
    pub m: Matrix3<f64>,
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Linear part only, no translation.
    pub fn from_linear(a: Matrix2<f64>) -> Self {
        Self {
            m: Matrix3::new(
                a[(0, 0)], a[(0, 1)], 0.0, //
                a[(1, 0)], a[(1, 1)], 0.0, //
                0.0, 0.0, 1.0,
            ),
        }
    }

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            m: Matrix3::new(
                1.0, 0.0, dx, //
                0.0, 1.0, dy, //
                0.0, 0.0, 1.0,
            ),
        }
    }

    pub fn rotation(theta: f64) -> Self {
        Self::from_linear(rotation_matrix(theta))
    }

    pub fn rotation_deg(deg: f64) -> Self {
        Self::rotation(deg.to_radians())
    }

    /// Horizontal shear `[[1, k], [0, 1]]`: `x' = x + k*y`.
    pub fn shear_x(k: f64) -> Self {
        Self::from_linear(Matrix2::new(1.0, k, 0.0, 1.0))
    }

    /// Vertical shear `[[1, 0], [k, 1]]`: `y' = y + k*x`.
    pub fn shear_y(k: f64) -> Self {
        Self::from_linear(Matrix2::new(1.0, 0.0, k, 1.0))
    }

    /// Horizontal shear by a skew angle, `k = tan(phi)`.
    pub fn shear_x_angle(phi: f64) -> Result<Self, TransformError> {
        Ok(Self::shear_x(skew_factor(phi)?))
    }

    /// Vertical shear by a skew angle, `k = tan(phi)`.
    pub fn shear_y_angle(phi: f64) -> Result<Self, TransformError> {
        Ok(Self::shear_y(skew_factor(phi)?))
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_linear(Matrix2::new(sx, 0.0, 0.0, sy))
    }

    /// Apply `self` first, then `next`.
    #[inline]
    pub fn then(&self, next: &Affine2) -> Affine2 {
        Affine2 { m: next.m * self.m }
    }

    /// Fold transforms in application order. An empty slice yields the identity.
    pub fn compose(steps: &[Affine2]) -> Affine2 {
        steps
            .iter()
            .fold(Affine2::identity(), |acc, step| acc.then(step))
    }

    pub fn linear(&self) -> Matrix2<f64> {
        self.m.fixed_view::<2, 2>(0, 0).into_owned()
    }

    pub fn translation_part(&self) -> Vector2<f64> {
        Vector2::new(self.m[(0, 2)], self.m[(1, 2)])
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Point2<f64> {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point2::new(v[0], v[1])
    }

    /// Directions ignore the translation part.
    #[inline]
    pub fn apply_vector(&self, v: Vector2<f64>) -> Vector2<f64> {
        self.linear() * v
    }

    pub fn apply_all(&self, pts: &[Point2<f64>]) -> Vec<Point2<f64>> {
        pts.iter().map(|&p| self.apply(p)).collect()
    }

    pub fn apply_in_place(&self, pts: &mut [Point2<f64>]) {
        for p in pts.iter_mut() {
            *p = self.apply(*p);
        }
    }

    pub fn inverse(&self) -> Result<Affine2, TransformError> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < 1e-15 {
            return Err(TransformError::Singular { det });
        }
        self.m
            .try_inverse()
            .map(|m| Affine2 { m })
            .ok_or(TransformError::Singular { det })
    }
}

fn skew_factor(phi: f64) -> Result<f64, TransformError> {
    if !phi.is_finite() || phi.cos().abs() < 1e-12 {
        return Err(TransformError::SingularSkew { angle: phi });
    }
    Ok(phi.tan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn rotation_quarter_turn_maps_x_to_y() {
        let r = Affine2::rotation(FRAC_PI_2);
        assert_abs_diff_eq!(
            r.apply(Point2::new(1.0, 0.0)),
            Point2::new(0.0, 1.0),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            Affine2::rotation_deg(90.0).m,
            r.m,
            epsilon = 1e-12
        );
    }

    #[test]
    fn composition_is_ordered() {
        let t = Affine2::translation(10.0, 0.0);
        let r = Affine2::rotation(FRAC_PI_2);
        let p = Point2::new(1.0, 0.0);

        // translate then rotate: (11, 0) -> (0, 11)
        assert_abs_diff_eq!(t.then(&r).apply(p), Point2::new(0.0, 11.0), epsilon = 1e-12);
        // rotate then translate: (0, 1) -> (10, 1)
        assert_abs_diff_eq!(r.then(&t).apply(p), Point2::new(10.0, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(
            Affine2::compose(&[t, r]).m,
            t.then(&r).m,
            epsilon = 1e-12
        );
    }

    #[test]
    fn shears_act_on_the_expected_axis() {
        let p = Point2::new(2.0, 3.0);
        assert_eq!(Affine2::shear_x(0.5).apply(p), Point2::new(3.5, 3.0));
        assert_eq!(Affine2::shear_y(-1.0).apply(p), Point2::new(2.0, 1.0));
        let sx = Affine2::shear_x_angle(FRAC_PI_4).expect("finite skew");
        assert_abs_diff_eq!(sx.apply(p), Point2::new(5.0, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn right_angle_skew_is_rejected() {
        assert!(matches!(
            Affine2::shear_x_angle(FRAC_PI_2),
            Err(TransformError::SingularSkew { .. })
        ));
        assert!(Affine2::shear_y_angle(-FRAC_PI_2).is_err());
    }

    #[test]
    fn inverse_round_trips_and_rejects_singular() {
        let a = Affine2::compose(&[
            Affine2::translation(-3.0, 4.0),
            Affine2::rotation(0.3),
            Affine2::shear_x(0.2),
            Affine2::scale(2.0, 0.5),
        ]);
        let inv = a.inverse().expect("invertible");
        for p in [Point2::new(0.0, 0.0), Point2::new(12.5, -7.0)] {
            assert_abs_diff_eq!(inv.apply(a.apply(p)), p, epsilon = 1e-9);
        }
        assert!(Affine2::scale(1.0, 0.0).inverse().is_err());
    }

    #[test]
    fn vectors_ignore_translation() {
        let a = Affine2::translation(5.0, 5.0).then(&Affine2::scale(2.0, 3.0));
        assert_eq!(a.apply_vector(Vector2::new(1.0, 1.0)), Vector2::new(2.0, 3.0));
        assert_eq!(a.translation_part(), Vector2::new(10.0, 15.0));
    }
}
