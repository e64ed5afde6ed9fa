//! Perspective (homography) calibration.
//!
//! For corner measurements taken from an optical image rather than a stage
//! readout: the four corners are mapped exactly onto the die rectangle by
//! the unique projective transform through the four correspondences.

use log::debug;
use nalgebra::Point2;
use nanomask_core::{are_collinear, homography_from_4pt, Homography};
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationStage};
use crate::params::{CalibrationParams, PerspectiveParams};
use crate::types::{ensure_finite, DieDimensions, InputAxes, MarkerCorner, MarkerSet};

/// Index triples covering every way of picking 3 of the 4 corners.
const CORNER_TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// Fitted projective calibration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCalibration {
    pub input_axes: InputAxes,
    pub die: DieDimensions,
    pub view: PerspectiveParams,
    /// Working frame → view frame (die rectangle after view offset/scale).
    pub homography: Homography,
}

impl PerspectiveCalibration {
    /// Map one measured point into the die frame.
    pub fn map(&self, p: Point2<f64>) -> Result<Point2<f64>, CalibrationError> {
        let w = self.input_axes.to_working(p);
        let v = self
            .homography
            .apply(w)
            .ok_or(CalibrationError::degenerate(CalibrationStage::Projection, 0.0))?;
        let [ox, oy] = self.view.view_offset;
        let s = self.view.view_scale;
        Ok(Point2::new((v.x - ox) / s, (v.y - oy) / s))
    }

    pub fn map_all(&self, pts: &[Point2<f64>]) -> Result<Vec<Point2<f64>>, CalibrationError> {
        ensure_finite(pts)?;
        pts.iter().map(|&p| self.map(p)).collect()
    }

    /// Homography straight into the die frame, with the view placement undone.
    pub fn die_homography(&self) -> Homography {
        let [ox, oy] = self.view.view_offset;
        let s = self.view.view_scale;
        let undo = nalgebra::Matrix3::new(
            1.0 / s, 0.0, -ox / s, //
            0.0, 1.0 / s, -oy / s, //
            0.0, 0.0, 1.0,
        );
        Homography::new(undo * self.homography.h)
    }
}

/// Destination corners: the die rectangle placed by the view offset/scale.
fn view_corners(die: DieDimensions, view: &PerspectiveParams) -> [Point2<f64>; 4] {
    let [ox, oy] = view.view_offset;
    MarkerCorner::ALL.map(|c| {
        let p = c.ideal(die);
        Point2::new(ox + view.view_scale * p.x, oy + view.view_scale * p.y)
    })
}

pub fn fit_perspective(
    markers: &MarkerSet,
    params: &CalibrationParams,
    view: &PerspectiveParams,
) -> Result<PerspectiveCalibration, CalibrationError> {
    params.validate()?;
    view.validate()?;
    let src = markers.to_working(params.input_axes)?;

    for [a, b, c] in CORNER_TRIPLES {
        if are_collinear(src[a], src[b], src[c], params.degeneracy_tol) {
            return Err(CalibrationError::degenerate(
                CalibrationStage::PerspectiveCollinear,
                0.0,
            ));
        }
    }

    let dst = view_corners(params.die, view);
    let homography = homography_from_4pt(&src, &dst).ok_or(CalibrationError::degenerate(
        CalibrationStage::PerspectiveSolve,
        0.0,
    ))?;

    debug!(
        "perspective calibration: h = {:?}, corner transfer error {:?}",
        homography.to_array(),
        homography.max_transfer_error(&src, &dst)
    );

    Ok(PerspectiveCalibration {
        input_axes: params.input_axes,
        die: params.die,
        view: *view,
        homography,
    })
}
