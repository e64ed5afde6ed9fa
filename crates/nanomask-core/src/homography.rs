//! Projective maps between quadrilaterals.
//!
//! Four points in general position fix a projective frame: three of them
//! span homogeneous space and the fourth sets the per-column weights. The
//! map between two such frames is the 4-point homography, obtained in
//! closed form from two 3×3 inverses.

use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

/// Relative size below which a triangle area or frame weight counts as zero.
const FRAME_EPS: f64 = 1e-12;

/// Projective map `p' ~ H p` on homogeneous coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_fn(|r, c| rows[r][c]))
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.h[(r, c)]))
    }

    /// Map a point; `None` when it lands on the line at infinity.
    #[inline]
    pub fn apply(&self, p: Point2<f64>) -> Option<Point2<f64>> {
        let v = self.h * homogeneous(p);
        let w = v.z;
        if !w.is_finite() || w.abs() < FRAME_EPS {
            return None;
        }
        Some(Point2::new(v.x / w, v.y / w))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Largest distance between `H * src[i]` and `dst[i]`.
    pub fn max_transfer_error(&self, src: &[Point2<f64>], dst: &[Point2<f64>]) -> Option<f64> {
        src.iter().zip(dst).try_fold(0.0_f64, |worst, (&s, d)| {
            let mapped = self.apply(s)?;
            Some(worst.max((mapped - d).norm()))
        })
    }
}

#[inline]
fn homogeneous(p: Point2<f64>) -> Vector3<f64> {
    Vector3::new(p.x, p.y, 1.0)
}

/// Twice the signed area of triangle `abc`, compared against `tol * |ab| * |ac|`.
pub fn are_collinear(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>, tol: f64) -> bool {
    let ab = b - a;
    let ac = c - a;
    let cross = ab.x * ac.y - ab.y * ac.x;
    let scale = ab.norm() * ac.norm();
    scale <= f64::EPSILON || cross.abs() <= tol * scale
}

/// Matrix sending `e1, e2, e3, (1, 1, 1)` to `pts[0..4]`.
///
/// `None` when the points are not in general position.
fn projective_frame(pts: &[Point2<f64>; 4]) -> Option<Matrix3<f64>> {
    let [a, b, c, d] = *pts;
    if are_collinear(a, b, c, FRAME_EPS) {
        return None;
    }
    let basis = Matrix3::from_columns(&[homogeneous(a), homogeneous(b), homogeneous(c)]);
    let weights = basis.try_inverse()? * homogeneous(d);
    // A vanishing weight puts the fourth point on a line through two others.
    let largest = weights.amax();
    if !largest.is_finite() || weights.iter().any(|w| w.abs() <= FRAME_EPS * largest) {
        return None;
    }
    Some(basis * Matrix3::from_diagonal(&weights))
}

/// Compute H such that `dst ~ H * src` from exactly 4 correspondences.
///
/// Corner order must match between `src` and `dst`. Returns `None` when
/// either quadrilateral has three collinear corners.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip_all))]
pub fn homography_from_4pt(src: &[Point2<f64>; 4], dst: &[Point2<f64>; 4]) -> Option<Homography> {
    let from_src = projective_frame(src)?.try_inverse()?;
    let to_dst = projective_frame(dst)?;
    let h = to_dst * from_src;

    // Fix the free scale: h33 = 1 when possible, unit norm otherwise.
    let norm = h.norm();
    let s = if h[(2, 2)].abs() > FRAME_EPS * norm {
        h[(2, 2)]
    } else {
        norm
    };
    let h = h / s;
    h.iter().all(|v| v.is_finite()).then_some(Homography::new(h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn die(width: f64, height: f64) -> [Point2<f64>; 4] {
        [
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(0.0, height),
            Point2::new(width, height),
        ]
    }

    /// Marker corners read off a screenshot with y growing downwards, in the
    /// same bl, br, tl, tr order as the die corners.
    fn screenshot_corners() -> [Point2<f64>; 4] {
        [
            Point2::new(196.0, 952.0),
            Point2::new(1124.0, 974.0),
            Point2::new(219.0, 21.0),
            Point2::new(1148.0, 46.0),
        ]
    }

    #[test]
    fn identical_quads_give_identity() {
        let rect = die(300.0, 300.0);
        let h = homography_from_4pt(&rect, &rect).expect("general position");
        assert_abs_diff_eq!(h.h, Matrix3::identity(), epsilon = 1e-10);
    }

    #[test]
    fn screenshot_quad_maps_onto_die_rectangle() {
        let src = screenshot_corners();
        let dst = die(300.0, 200.0);
        let h = homography_from_4pt(&src, &dst).expect("general position");

        assert!(h.max_transfer_error(&src, &dst).expect("finite") < 1e-9);
        assert_abs_diff_eq!(h.h[(2, 2)], 1.0, epsilon = 1e-15);

        // Image y points down while die y points up, so the map flips
        // orientation: the determinant of the linear part is negative.
        let linear = h.h.fixed_view::<2, 2>(0, 0).determinant();
        assert!(linear < 0.0, "{linear}");

        // Mid-edge points stay on the corresponding die edges.
        let bottom_mid = Point2::new((196.0 + 1124.0) / 2.0, (952.0 + 974.0) / 2.0);
        assert_abs_diff_eq!(h.apply(bottom_mid).expect("finite").y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn reverse_fit_matches_inverse() {
        let src = screenshot_corners();
        let dst = die(300.0, 300.0);
        let forward = homography_from_4pt(&src, &dst).expect("forward");
        let backward = homography_from_4pt(&dst, &src).expect("backward");
        let inverse = forward.inverse().expect("invertible");

        for p in [Point2::new(150.0, 150.0), Point2::new(12.5, 280.0)] {
            assert_abs_diff_eq!(
                backward.apply(p).expect("finite"),
                inverse.apply(p).expect("finite"),
                epsilon = 1e-7
            );
        }
    }

    #[test]
    fn corner_on_a_die_edge_is_rejected() {
        let rect = die(300.0, 300.0);
        // Top-right dragged onto the line through bottom-right and top-left.
        let squashed = [rect[0], rect[1], rect[2], Point2::new(150.0, 150.0)];
        assert!(homography_from_4pt(&squashed, &rect).is_none());
        assert!(homography_from_4pt(&rect, &squashed).is_none());

        let flat = [
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(200.0, 0.0),
            Point2::new(50.0, 80.0),
        ];
        assert!(are_collinear(flat[0], flat[1], flat[2], 1e-9));
        assert!(homography_from_4pt(&flat, &rect).is_none());
    }

    #[test]
    fn points_on_the_vanishing_line_map_to_none() {
        let h = Homography::from_array([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.01, 0.0, 1.0]]);
        assert!(h.apply(Point2::new(-100.0, 5.0)).is_none());
        assert_eq!(h.to_array()[2], [0.01, 0.0, 1.0]);
        assert!(h
            .max_transfer_error(&[Point2::new(-100.0, 0.0)], &[Point2::origin()])
            .is_none());
    }
}
