use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::affine::{fit_affine, AffineCalibration};
use crate::averaged::fit_averaged;
use crate::error::CalibrationError;
use crate::feature::FeatureSegment;
use crate::params::{CalibrationMethod, CalibrationParams};
use crate::perspective::{fit_perspective, PerspectiveCalibration};
use crate::types::{ensure_finite, MarkerSet};

/// A fitted map from measured coordinates into the die frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationModel {
    Affine(AffineCalibration),
    Perspective(PerspectiveCalibration),
}

impl CalibrationModel {
    pub fn map(&self, p: Point2<f64>) -> Result<Point2<f64>, CalibrationError> {
        match self {
            CalibrationModel::Affine(cal) => cal.map(p),
            CalibrationModel::Perspective(cal) => cal.map(p),
        }
    }

    pub fn map_all(&self, pts: &[Point2<f64>]) -> Result<Vec<Point2<f64>>, CalibrationError> {
        ensure_finite(pts)?;
        pts.iter().map(|&p| self.map(p)).collect()
    }

    pub fn as_affine(&self) -> Option<&AffineCalibration> {
        match self {
            CalibrationModel::Affine(cal) => Some(cal),
            CalibrationModel::Perspective(_) => None,
        }
    }

    pub fn as_perspective(&self) -> Option<&PerspectiveCalibration> {
        match self {
            CalibrationModel::Perspective(cal) => Some(cal),
            CalibrationModel::Affine(_) => None,
        }
    }
}

/// Calibrated markers and features, plus the model that produced them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub markers: MarkerSet,
    pub features: Vec<Point2<f64>>,
    pub model: CalibrationModel,
}

impl CalibrationResult {
    /// Largest distance of a calibrated marker corner from its ideal die corner.
    pub fn max_marker_error(&self, params: &CalibrationParams) -> f64 {
        let ideal = MarkerSet::ideal(params.die);
        self.markers
            .corners
            .iter()
            .zip(ideal.corners.iter())
            .map(|(a, b)| (a - b).norm())
            .fold(0.0, f64::max)
    }

    /// Segment between two calibrated features, e.g. the two nanowire ends.
    pub fn feature_segment(&self, a: usize, b: usize) -> Option<FeatureSegment> {
        Some(FeatureSegment::new(
            *self.features.get(a)?,
            *self.features.get(b)?,
        ))
    }
}

/// Calibrates measured marker corners onto a die of known size.
#[derive(Clone, Debug, Default)]
pub struct MarkerCalibrator {
    params: CalibrationParams,
}

impl MarkerCalibrator {
    pub fn new(params: CalibrationParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    /// Fit the configured model from the four marker corners.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self, markers), fields(method = self.params.method.name())))]
    pub fn fit(&self, markers: &MarkerSet) -> Result<CalibrationModel, CalibrationError> {
        let params = &self.params;
        match &params.method {
            CalibrationMethod::Affine => fit_affine(markers, params).map(CalibrationModel::Affine),
            CalibrationMethod::AveragedExtent => {
                fit_averaged(markers, params).map(CalibrationModel::Affine)
            }
            CalibrationMethod::Perspective(view) => {
                fit_perspective(markers, params, view).map(CalibrationModel::Perspective)
            }
        }
    }

    /// Fit from the markers and carry markers and features into the die frame together.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, markers, features), fields(features = features.len())))]
    pub fn calibrate(
        &self,
        markers: &MarkerSet,
        features: &[Point2<f64>],
    ) -> Result<CalibrationResult, CalibrationError> {
        ensure_finite(features)?;
        let model = self.fit(markers)?;
        let corners = model.map_all(markers.as_slice())?;
        let markers = MarkerSet::from_slice(&corners)?;
        let features = model.map_all(features)?;
        Ok(CalibrationResult {
            markers,
            features,
            model,
        })
    }
}

/// One-shot calibration with the given parameters.
pub fn calibrate(
    markers: &MarkerSet,
    features: &[Point2<f64>],
    params: &CalibrationParams,
) -> Result<CalibrationResult, CalibrationError> {
    MarkerCalibrator::new(*params).calibrate(markers, features)
}
