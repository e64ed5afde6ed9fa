use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::decode::ContourPath;
use crate::segment::CurveSegment;

/// A closed contour as a clamped, uniform, piecewise-cubic B-spline.
///
/// Every segment is converted to a cubic Bézier; consecutive pieces share
/// their end point, so there are `3k + 1` control points for `k` segments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CubicSpline {
    pub control_points: Vec<Point2<f64>>,
    /// Knots normalized to `[0, 1]`, length `control_points.len() + 4`.
    pub knots: Vec<f64>,
}

impl CubicSpline {
    pub const DEGREE: usize = 3;

    pub fn from_contour(path: &ContourPath) -> Self {
        let Some(start) = path.start() else {
            return Self::default();
        };
        let mut control_points = Vec::with_capacity(3 * path.len() + 1);
        control_points.push(start);
        for segment in &path.segments {
            let [_, c1, c2, end] = segment.cubic_points();
            control_points.extend([c1, c2, end]);
        }
        Self {
            control_points,
            knots: clamped_knots(path.len()),
        }
    }

    pub fn segment_count(&self) -> usize {
        self.control_points.len().saturating_sub(1) / Self::DEGREE
    }

    /// The Bézier pieces, in order.
    pub fn bezier_segments(&self) -> impl Iterator<Item = CurveSegment> + '_ {
        self.control_points
            .windows(4)
            .step_by(Self::DEGREE)
            .map(|w| CurveSegment::Cubic {
                p0: w[0],
                p1: w[1],
                p2: w[2],
                p3: w[3],
            })
    }
}

/// `[0, 0,0,0, 1,1,1, …, k,k,k, k] / k` for `k` Bézier pieces.
fn clamped_knots(segments: usize) -> Vec<f64> {
    if segments == 0 {
        return Vec::new();
    }
    let k = segments as f64;
    let mut knots = Vec::with_capacity(3 * segments + 5);
    knots.push(0.0);
    for i in 0..=segments {
        let u = i as f64 / k;
        knots.extend([u, u, u]);
    }
    knots.push(1.0);
    knots
}
