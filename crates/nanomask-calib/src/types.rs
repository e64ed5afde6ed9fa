use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Role of a measured corner of the alignment cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCorner {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl MarkerCorner {
    /// Storage order used by [`MarkerSet`].
    pub const ALL: [MarkerCorner; 4] = [
        MarkerCorner::BottomLeft,
        MarkerCorner::BottomRight,
        MarkerCorner::TopLeft,
        MarkerCorner::TopRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            MarkerCorner::BottomLeft => 0,
            MarkerCorner::BottomRight => 1,
            MarkerCorner::TopLeft => 2,
            MarkerCorner::TopRight => 3,
        }
    }

    /// Where this corner lands in the die frame (origin bottom-left, y up).
    pub fn ideal(self, die: DieDimensions) -> Point2<f64> {
        match self {
            MarkerCorner::BottomLeft => Point2::new(0.0, 0.0),
            MarkerCorner::BottomRight => Point2::new(die.width, 0.0),
            MarkerCorner::TopLeft => Point2::new(0.0, die.height),
            MarkerCorner::TopRight => Point2::new(die.width, die.height),
        }
    }
}

/// Physical size the marker square must map onto, in output units (typically µm).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DieDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for DieDimensions {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 300.0,
        }
    }
}

impl DieDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if !ok(self.width) || !ok(self.height) {
            return Err(CalibrationError::InvalidDieDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Sign convention of the measured y axis.
///
/// Stage readouts are usually y-up; image editors put the origin at the
/// top-left with y growing downwards. `YDown` inputs get their y negated
/// before calibration. Output is always in the die frame: origin at the
/// bottom-left marker corner, x right, y up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputAxes {
    #[default]
    YUp,
    YDown,
}

impl InputAxes {
    #[inline]
    pub fn to_working(self, p: Point2<f64>) -> Point2<f64> {
        match self {
            InputAxes::YUp => p,
            InputAxes::YDown => Point2::new(p.x, -p.y),
        }
    }
}

/// Four measured corners of the alignment cross, stored as
/// (bottom-left, bottom-right, top-left, top-right).
///
/// Corner roles refer to the physical die; with [`InputAxes::YDown`] the
/// "bottom" corners are the ones with the larger image y.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerSet {
    pub corners: [Point2<f64>; 4],
}

impl MarkerSet {
    pub fn new(
        bottom_left: Point2<f64>,
        bottom_right: Point2<f64>,
        top_left: Point2<f64>,
        top_right: Point2<f64>,
    ) -> Self {
        Self {
            corners: [bottom_left, bottom_right, top_left, top_right],
        }
    }

    /// Corners of the die rectangle itself.
    pub fn ideal(die: DieDimensions) -> Self {
        Self {
            corners: MarkerCorner::ALL.map(|c| c.ideal(die)),
        }
    }

    pub fn from_slice(pts: &[Point2<f64>]) -> Result<Self, CalibrationError> {
        let corners: [Point2<f64>; 4] = pts
            .try_into()
            .map_err(|_| CalibrationError::MarkerArity { got: pts.len() })?;
        Ok(Self { corners })
    }

    /// Build from `[x0, y0, x1, y1, ...]`.
    pub fn from_flat(xy: &[f64]) -> Result<Self, CalibrationError> {
        Self::from_slice(&points_from_flat(xy)?)
    }

    #[inline]
    pub fn corner(&self, role: MarkerCorner) -> Point2<f64> {
        self.corners[role.index()]
    }

    pub fn as_slice(&self) -> &[Point2<f64>] {
        &self.corners
    }

    /// Corners in the working frame, rejecting NaN/inf.
    pub(crate) fn to_working(&self, axes: InputAxes) -> Result<[Point2<f64>; 4], CalibrationError> {
        ensure_finite(&self.corners)?;
        Ok(self.corners.map(|p| axes.to_working(p)))
    }

    /// Largest distance of any corner from the given corner.
    pub fn extent_from(&self, role: MarkerCorner) -> f64 {
        let o = self.corner(role);
        self.corners
            .iter()
            .map(|p| (p - o).norm())
            .fold(0.0, f64::max)
    }
}

/// Convert a flat `[x0, y0, x1, y1, ...]` list into points.
pub fn points_from_flat(xy: &[f64]) -> Result<Vec<Point2<f64>>, CalibrationError> {
    if xy.len() % 2 != 0 {
        return Err(CalibrationError::UnpairedCoordinates { len: xy.len() });
    }
    Ok(xy.chunks_exact(2).map(|c| Point2::new(c[0], c[1])).collect())
}

pub(crate) fn ensure_finite(pts: &[Point2<f64>]) -> Result<(), CalibrationError> {
    if pts.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        Ok(())
    } else {
        Err(CalibrationError::NonFiniteInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_set_requires_four_points() {
        let three = [Point2::new(0.0, 0.0); 3];
        assert_eq!(
            MarkerSet::from_slice(&three),
            Err(CalibrationError::MarkerArity { got: 3 })
        );
        let flat = [0.0, 0.0, 300.0, 0.0, 0.0, 300.0, 300.0, 300.0];
        let m = MarkerSet::from_flat(&flat).expect("four pairs");
        assert_eq!(m.corner(MarkerCorner::TopLeft), Point2::new(0.0, 300.0));
        assert_eq!(m, MarkerSet::ideal(DieDimensions::default()));
    }

    #[test]
    fn flat_lists_must_be_pairs() {
        assert_eq!(
            points_from_flat(&[1.0, 2.0, 3.0]),
            Err(CalibrationError::UnpairedCoordinates { len: 3 })
        );
        assert_eq!(
            MarkerSet::from_flat(&[0.0; 7]),
            Err(CalibrationError::UnpairedCoordinates { len: 7 })
        );
        assert_eq!(
            MarkerSet::from_flat(&[0.0; 10]),
            Err(CalibrationError::MarkerArity { got: 5 })
        );
        assert!(points_from_flat(&[]).expect("empty is fine").is_empty());
    }

    #[test]
    fn die_dimensions_are_validated() {
        assert!(DieDimensions::default().validate().is_ok());
        assert!(DieDimensions::new(0.0, 300.0).validate().is_err());
        assert!(DieDimensions::new(300.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn y_down_negates_y_only() {
        let p = Point2::new(196.0, 952.0);
        assert_eq!(InputAxes::YDown.to_working(p), Point2::new(196.0, -952.0));
        assert_eq!(InputAxes::YUp.to_working(p), p);
    }

    #[test]
    fn non_finite_corners_are_rejected() {
        let mut m = MarkerSet::ideal(DieDimensions::default());
        m.corners[3].x = f64::INFINITY;
        assert_eq!(
            m.to_working(InputAxes::YUp),
            Err(CalibrationError::NonFiniteInput)
        );
    }
}
