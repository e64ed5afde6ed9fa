//! Affine marker calibration.
//!
//! Every step is derived from the current marker corners only and then
//! applied to markers and features alike:
//!
//! 1. re-center on the bottom-left corner,
//! 2. rotate so the bottom-left → top-right diagonal sits at 45°,
//! 3. x-deskew with `[[1, -tl.x/tl.y], [0, 1]]`,
//! 4. y-deskew with `[[1, 0], [-br.y/br.x, 1]]`,
//! 5. stretch each axis onto the die dimensions,
//! 6. (optional) far-corner distortion correction.
//!
//! Step 6 is not linear: each point is divided component-wise by
//! `1 + c * x * y`, with `c` chosen so the top-right corner lands exactly on
//! `(width, height)`. Corners with `x * y = 0` are left untouched, so the
//! other three corners keep their exact affine positions.

use std::f64::consts::FRAC_PI_4;

use log::{debug, warn};
use nalgebra::{Point2, Vector2};
use nanomask_core::Affine2;
use serde::{Deserialize, Serialize};

use crate::error::{CalibrationError, CalibrationStage};
use crate::params::CalibrationParams;
use crate::types::{ensure_finite, DieDimensions, InputAxes, MarkerCorner, MarkerSet};

/// Relative residual at the far corner above which the affine model is
/// considered a poor fit.
const RESIDUAL_WARN_REL: f64 = 0.05;

/// Parameters recovered at each stage of the affine pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStages {
    /// Bottom-left corner in the working frame (after the axis flip).
    pub origin: Point2<f64>,
    /// Rotation applied in step 2, radians.
    pub rotation: f64,
    /// Shear ratio removed in step 3.
    pub x_skew: f64,
    /// Shear ratio removed in step 4.
    pub y_skew: f64,
    /// Per-axis stretch applied in step 5.
    pub scale: Vector2<f64>,
    /// Distortion coefficients of step 6, when enabled.
    pub distortion: Option<Vector2<f64>>,
}

/// Fitted affine calibration (plus optional distortion correction).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineCalibration {
    pub input_axes: InputAxes,
    pub die: DieDimensions,
    /// Steps 1–5 composed, acting on working-frame points.
    pub affine: Affine2,
    pub stages: CalibrationStages,
    /// Top-right corner after step 5 minus `(width, height)`.
    pub residual: Vector2<f64>,
    tol: f64,
}

impl AffineCalibration {
    /// Map one measured point into the die frame.
    pub fn map(&self, p: Point2<f64>) -> Result<Point2<f64>, CalibrationError> {
        let q = self.affine.apply(self.input_axes.to_working(p));
        match self.stages.distortion {
            Some(c) => correct_distortion(q, c, self.tol),
            None => Ok(q),
        }
    }

    pub fn map_all(&self, pts: &[Point2<f64>]) -> Result<Vec<Point2<f64>>, CalibrationError> {
        ensure_finite(pts)?;
        pts.iter().map(|&p| self.map(p)).collect()
    }

    /// Far-corner residual before distortion correction, relative to the die size.
    pub fn relative_residual(&self) -> f64 {
        (self.residual.x / self.die.width)
            .abs()
            .max((self.residual.y / self.die.height).abs())
    }
}

/// Marker corners plus the transforms that produced them.
pub(crate) struct Pipeline {
    pts: [Point2<f64>; 4],
    steps: Vec<Affine2>,
    extent: f64,
    tol: f64,
}

impl Pipeline {
    /// Step 1: move the bottom-left corner to the origin.
    pub(crate) fn recentered(
        markers: &MarkerSet,
        params: &CalibrationParams,
    ) -> Result<Self, CalibrationError> {
        params.validate()?;
        let pts = markers.to_working(params.input_axes)?;
        let origin = pts[MarkerCorner::BottomLeft.index()];
        let extent = markers.extent_from(MarkerCorner::BottomLeft);
        if extent.is_nan() || extent <= 0.0 {
            return Err(CalibrationError::degenerate(
                CalibrationStage::Rotation,
                extent,
            ));
        }

        let mut pipeline = Self {
            pts,
            steps: Vec::with_capacity(5),
            extent,
            tol: params.degeneracy_tol,
        };
        pipeline.push(Affine2::translation(-origin.x, -origin.y));
        Ok(pipeline)
    }

    pub(crate) fn push(&mut self, step: Affine2) {
        step.apply_in_place(&mut self.pts);
        self.steps.push(step);
    }

    #[inline]
    pub(crate) fn corner(&self, role: MarkerCorner) -> Point2<f64> {
        self.pts[role.index()]
    }

    /// Reject lengths that vanish relative to the marker extent.
    pub(crate) fn nonzero(&self, stage: CalibrationStage, v: f64) -> Result<f64, CalibrationError> {
        if !v.is_finite() || v.abs() <= self.tol * self.extent {
            return Err(CalibrationError::degenerate(stage, v));
        }
        Ok(v)
    }

    pub(crate) fn tol(&self) -> f64 {
        self.tol
    }

    /// Step 3: shear x so the left edge becomes vertical.
    pub(crate) fn deskew_x(&mut self) -> Result<f64, CalibrationError> {
        let tl = self.corner(MarkerCorner::TopLeft);
        let ty = self.nonzero(CalibrationStage::XSkew, tl.y)?;
        let x_skew = tl.x / ty;
        self.push(Affine2::shear_x(-x_skew));
        Ok(x_skew)
    }

    /// Step 4: shear y so the bottom edge becomes horizontal.
    pub(crate) fn deskew_y(&mut self) -> Result<f64, CalibrationError> {
        let br = self.corner(MarkerCorner::BottomRight);
        let bx = self.nonzero(CalibrationStage::YSkew, br.x)?;
        let y_skew = br.y / bx;
        self.push(Affine2::shear_y(-y_skew));
        Ok(y_skew)
    }

    pub(crate) fn finish(&self) -> Affine2 {
        Affine2::compose(&self.steps)
    }
}

/// Fit the six-step affine calibration from four marker corners.
pub fn fit_affine(
    markers: &MarkerSet,
    params: &CalibrationParams,
) -> Result<AffineCalibration, CalibrationError> {
    let die = params.die;
    let mut pipe = Pipeline::recentered(markers, params)?;
    let origin = params
        .input_axes
        .to_working(markers.corner(MarkerCorner::BottomLeft));

    // Step 2: principal rotation.
    let diag = pipe.corner(MarkerCorner::TopRight);
    pipe.nonzero(CalibrationStage::Rotation, diag.coords.norm())?;
    let rotation = FRAC_PI_4 - diag.y.atan2(diag.x);
    pipe.push(Affine2::rotation(rotation));

    let x_skew = pipe.deskew_x()?;
    let y_skew = pipe.deskew_y()?;

    // Step 5: anisotropic stretch onto the die.
    let bx = pipe.nonzero(
        CalibrationStage::Scale,
        pipe.corner(MarkerCorner::BottomRight).x,
    )?;
    let ty = pipe.nonzero(CalibrationStage::Scale, pipe.corner(MarkerCorner::TopLeft).y)?;
    let scale = Vector2::new(die.width / bx, die.height / ty);
    pipe.push(Affine2::scale(scale.x, scale.y));

    let far = pipe.corner(MarkerCorner::TopRight);
    let residual = Vector2::new(far.x - die.width, far.y - die.height);

    let distortion = if params.distortion_correction {
        Some(distortion_coefficients(far, die, pipe.tol())?)
    } else {
        None
    };

    let calibration = AffineCalibration {
        input_axes: params.input_axes,
        die,
        affine: pipe.finish(),
        stages: CalibrationStages {
            origin,
            rotation,
            x_skew,
            y_skew,
            scale,
            distortion,
        },
        residual,
        tol: pipe.tol(),
    };

    debug!(
        "affine calibration: rotation={:.6} rad x_skew={:.6} y_skew={:.6} scale=({:.6}, {:.6}) residual=({:.4}, {:.4})",
        rotation, x_skew, y_skew, scale.x, scale.y, residual.x, residual.y
    );
    let rel = calibration.relative_residual();
    if rel > RESIDUAL_WARN_REL {
        warn!(
            "far marker corner is {:.1}% off the affine model; check corner order and axis convention",
            rel * 100.0
        );
    }

    Ok(calibration)
}

/// Build an [`AffineCalibration`] from precomputed parts (used by the
/// averaged-extent variant, which has no rotation or distortion step).
pub(crate) fn assemble(
    params: &CalibrationParams,
    pipe: &Pipeline,
    origin: Point2<f64>,
    x_skew: f64,
    y_skew: f64,
    scale: Vector2<f64>,
) -> AffineCalibration {
    let die = params.die;
    let far = pipe.corner(MarkerCorner::TopRight);
    AffineCalibration {
        input_axes: params.input_axes,
        die,
        affine: pipe.finish(),
        stages: CalibrationStages {
            origin,
            rotation: 0.0,
            x_skew,
            y_skew,
            scale,
            distortion: None,
        },
        residual: Vector2::new(far.x - die.width, far.y - die.height),
        tol: pipe.tol(),
    }
}

/// Coefficients `c` such that `far / (1 + c * far.x * far.y) = (width, height)`.
pub fn distortion_coefficients(
    far: Point2<f64>,
    die: DieDimensions,
    tol: f64,
) -> Result<Vector2<f64>, CalibrationError> {
    let xy = far.x * far.y;
    if !xy.is_finite() || xy.abs() <= tol * die.width * die.height {
        return Err(CalibrationError::degenerate(
            CalibrationStage::Distortion,
            xy,
        ));
    }
    Ok(Vector2::new(
        (far.x / die.width - 1.0) / xy,
        (far.y / die.height - 1.0) / xy,
    ))
}

/// Divide each component by `1 + c * x * y`.
pub fn correct_distortion(
    p: Point2<f64>,
    c: Vector2<f64>,
    tol: f64,
) -> Result<Point2<f64>, CalibrationError> {
    let k = p.x * p.y;
    let dx = 1.0 + c.x * k;
    let dy = 1.0 + c.y * k;
    for d in [dx, dy] {
        if !d.is_finite() || d.abs() <= tol {
            return Err(CalibrationError::degenerate(
                CalibrationStage::Distortion,
                d,
            ));
        }
    }
    Ok(Point2::new(p.x / dx, p.y / dy))
}
