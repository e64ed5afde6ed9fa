//! Averaged-extent calibration.
//!
//! Deskews in x then y exactly like the affine pipeline but skips the
//! diagonal rotation, then stretches by the die size over the mean of the
//! opposite edge extents instead of a single edge. There is no distortion
//! step; the far corner absorbs whatever the averaging leaves over.

use log::debug;
use nalgebra::Vector2;
use nanomask_core::Affine2;

use crate::affine::{assemble, AffineCalibration, Pipeline};
use crate::error::{CalibrationError, CalibrationStage};
use crate::params::CalibrationParams;
use crate::types::{MarkerCorner, MarkerSet};

pub fn fit_averaged(
    markers: &MarkerSet,
    params: &CalibrationParams,
) -> Result<AffineCalibration, CalibrationError> {
    let mut pipe = Pipeline::recentered(markers, params)?;
    let origin = params
        .input_axes
        .to_working(markers.corner(MarkerCorner::BottomLeft));

    let x_skew = pipe.deskew_x()?;
    let y_skew = pipe.deskew_y()?;

    let bl = pipe.corner(MarkerCorner::BottomLeft);
    let br = pipe.corner(MarkerCorner::BottomRight);
    let tl = pipe.corner(MarkerCorner::TopLeft);
    let tr = pipe.corner(MarkerCorner::TopRight);

    let width = ((br.x - bl.x).abs() + (tr.x - tl.x).abs()) / 2.0;
    let height = ((tr.y - br.y).abs() + (tl.y - bl.y).abs()) / 2.0;
    let width = pipe.nonzero(CalibrationStage::Scale, width)?;
    let height = pipe.nonzero(CalibrationStage::Scale, height)?;

    let scale = Vector2::new(params.die.width / width, params.die.height / height);
    pipe.push(Affine2::scale(scale.x, scale.y));

    debug!(
        "averaged-extent calibration: x_skew={:.6} y_skew={:.6} mean extent=({:.4}, {:.4})",
        x_skew, y_skew, width, height
    );

    Ok(assemble(params, &pipe, origin, x_skew, y_skew, scale))
}
