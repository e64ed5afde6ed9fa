use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::types::{DieDimensions, InputAxes};

fn default_tol() -> f64 {
    1e-9
}

fn default_true() -> bool {
    true
}

/// Visualisation-only placement of the destination rectangle for the
/// perspective variant. Undone before results are returned.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveParams {
    #[serde(default)]
    pub view_offset: [f64; 2],
    #[serde(default = "default_view_scale")]
    pub view_scale: f64,
}

fn default_view_scale() -> f64 {
    1.0
}

impl Default for PerspectiveParams {
    fn default() -> Self {
        Self {
            view_offset: [0.0, 0.0],
            view_scale: default_view_scale(),
        }
    }
}

impl PerspectiveParams {
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let s = self.view_scale;
        if !s.is_finite() || s == 0.0 {
            return Err(CalibrationError::InvalidViewScale { scale: s });
        }
        let [x, y] = self.view_offset;
        if !x.is_finite() || !y.is_finite() {
            return Err(CalibrationError::InvalidViewOffset { x, y });
        }
        Ok(())
    }
}

/// How the measured quadrilateral is mapped onto the die rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationMethod {
    /// Re-center, rotate the diagonal to 45°, x/y deskew, stretch, then the
    /// optional far-corner distortion correction.
    #[default]
    Affine,
    /// Deskew without rotation and stretch by the mean of opposite edge extents.
    AveragedExtent,
    /// Exact 4-point homography onto the die rectangle.
    Perspective(PerspectiveParams),
}

impl CalibrationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            CalibrationMethod::Affine => "affine",
            CalibrationMethod::AveragedExtent => "averaged_extent",
            CalibrationMethod::Perspective(_) => "perspective",
        }
    }
}

/// Parameters for [`crate::MarkerCalibrator`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    #[serde(default)]
    pub die: DieDimensions,
    #[serde(default)]
    pub input_axes: InputAxes,
    #[serde(default)]
    pub method: CalibrationMethod,
    /// Apply the far-corner correction after the affine stretch
    /// ([`CalibrationMethod::Affine`] only).
    #[serde(default = "default_true")]
    pub distortion_correction: bool,
    /// Relative tolerance below which a denominator counts as zero.
    #[serde(default = "default_tol")]
    pub degeneracy_tol: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            die: DieDimensions::default(),
            input_axes: InputAxes::default(),
            method: CalibrationMethod::default(),
            distortion_correction: true,
            degeneracy_tol: default_tol(),
        }
    }
}

impl CalibrationParams {
    pub fn with_die(die: DieDimensions) -> Self {
        Self {
            die,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        self.die.validate()?;
        let tol = self.degeneracy_tol;
        if !tol.is_finite() || tol < 0.0 {
            return Err(CalibrationError::InvalidDegeneracyTolerance { tol });
        }
        if let CalibrationMethod::Perspective(p) = &self.method {
            p.validate()?;
        }
        Ok(())
    }
}
