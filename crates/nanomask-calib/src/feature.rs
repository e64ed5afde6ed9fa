use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// A straight feature (e.g. a nanowire) given by two calibrated endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl FeatureSegment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    /// Angle from +x, radians in `(-π, π]`.
    pub fn angle(&self) -> f64 {
        let d = self.direction();
        d.y.atan2(d.x)
    }

    pub fn midpoint(&self) -> Point2<f64> {
        nanomask_core::midpoint(self.start, self.end)
    }
}
