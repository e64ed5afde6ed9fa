//! JSON configuration and report helpers for marker calibration.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::affine::CalibrationStages;
use crate::error::CalibrationError;
use crate::feature::FeatureSegment;
use crate::model::{CalibrationModel, CalibrationResult, MarkerCalibrator};
use crate::params::CalibrationParams;
use crate::types::{DieDimensions, MarkerSet};

#[derive(thiserror::Error, Debug)]
pub enum CalibIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A calibration job: measured corners (bl, br, tl, tr), features and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrateConfig {
    pub markers: Vec<[f64; 2]>,
    #[serde(default)]
    pub features: Vec<[f64; 2]>,
    #[serde(default)]
    pub params: CalibrationParams,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl CalibrateConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the output report path.
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("calibration_report.json"))
    }

    pub fn marker_set(&self) -> Result<MarkerSet, CalibrationError> {
        MarkerSet::from_slice(&to_points(&self.markers))
    }

    pub fn feature_points(&self) -> Vec<Point2<f64>> {
        to_points(&self.features)
    }

    /// Run the configured calibration.
    pub fn run(&self) -> Result<CalibrationResult, CalibrationError> {
        let markers = self.marker_set()?;
        MarkerCalibrator::new(self.params).calibrate(&markers, &self.feature_points())
    }
}

fn to_points(xy: &[[f64; 2]]) -> Vec<Point2<f64>> {
    xy.iter().map(|&[x, y]| Point2::new(x, y)).collect()
}

fn to_pairs(pts: &[Point2<f64>]) -> Vec<[f64; 2]> {
    pts.iter().map(|p| [p.x, p.y]).collect()
}

/// Serializable summary of a calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub method: String,
    pub die: DieDimensions,
    pub markers: Vec<[f64; 2]>,
    pub features: Vec<[f64; 2]>,
    pub max_marker_error: f64,
    #[serde(default)]
    pub stages: Option<CalibrationStages>,
    #[serde(default)]
    pub residual: Option<[f64; 2]>,
    #[serde(default)]
    pub homography: Option<[[f64; 3]; 3]>,
    /// Present when exactly two features were calibrated.
    #[serde(default)]
    pub feature_segment: Option<FeatureSegment>,
}

impl CalibrationReport {
    pub fn new(result: &CalibrationResult, params: &CalibrationParams) -> Self {
        let (stages, residual, homography) = match &result.model {
            CalibrationModel::Affine(cal) => (
                Some(cal.stages),
                Some([cal.residual.x, cal.residual.y]),
                None,
            ),
            CalibrationModel::Perspective(cal) => {
                (None, None, Some(cal.die_homography().to_array()))
            }
        };
        let feature_segment = if result.features.len() == 2 {
            result.feature_segment(0, 1)
        } else {
            None
        };
        Self {
            method: params.method.name().to_string(),
            die: params.die,
            markers: to_pairs(&result.markers.corners),
            features: to_pairs(&result.features),
            max_marker_error: result.max_marker_error(params),
            stages,
            residual,
            homography,
            feature_segment,
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CalibIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), CalibIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
