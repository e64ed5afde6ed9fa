//! Alignment-marker coordinate calibration.
//!
//! Four measured corners of a right-angle alignment cross (bottom-left,
//! bottom-right, top-left, top-right) define a map from measured space
//! (stage microns or image pixels) onto a die of known physical size.
//! Feature coordinates measured in the same space, such as the two ends of a
//! nanowire, are carried through the same map.
//!
//! Three models are available through [`CalibrationMethod`]:
//! - `Affine`: re-center, rotate, x/y deskew, anisotropic stretch, then a
//!   nonlinear far-corner distortion correction (see [`affine`]).
//! - `AveragedExtent`: deskew and stretch by mean edge extents, no rotation.
//! - `Perspective`: exact 4-point homography.
//!
//! ```
//! use nalgebra::Point2;
//! use nanomask_calib::{calibrate, CalibrationParams, MarkerSet};
//!
//! let markers = MarkerSet::new(
//!     Point2::new(0.0, 0.0),
//!     Point2::new(300.0, 0.0),
//!     Point2::new(0.0, 300.0),
//!     Point2::new(300.0, 300.0),
//! );
//! let result = calibrate(&markers, &[Point2::new(150.0, 150.0)], &CalibrationParams::default())?;
//! assert!((result.features[0] - Point2::new(150.0, 150.0)).norm() < 1e-9);
//! # Ok::<(), nanomask_calib::CalibrationError>(())
//! ```

pub mod affine;
mod averaged;
mod error;
mod feature;
mod io;
mod model;
mod params;
mod perspective;
mod types;

pub use affine::{fit_affine, AffineCalibration, CalibrationStages};
pub use averaged::fit_averaged;
pub use error::{CalibrationError, CalibrationStage};
pub use feature::FeatureSegment;
pub use io::{CalibIoError, CalibrateConfig, CalibrationReport};
pub use model::{calibrate, CalibrationModel, CalibrationResult, MarkerCalibrator};
pub use params::{CalibrationMethod, CalibrationParams, PerspectiveParams};
pub use perspective::{fit_perspective, PerspectiveCalibration};
pub use types::{points_from_flat, DieDimensions, InputAxes, MarkerCorner, MarkerSet};
