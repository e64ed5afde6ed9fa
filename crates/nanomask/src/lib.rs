//! High-level facade for the `nanomask-*` workspace.
//!
//! ## API map
//! - `nanomask::core`: affine transforms, 4-point homography.
//! - `nanomask::calib`: alignment-marker calibration into the die frame
//!   (affine deskew pipeline, averaged-extent variant, perspective variant),
//!   JSON configs and reports.
//! - `nanomask::glyph`: glyph outline decoding, cubic spline export, glyph
//!   cache, font loading (feature `font`) and text layout.
//! - [`init_logging`] / `init_tracing` (feature `tracing`): log output for
//!   binaries.
//!
//! ## Quickstart
//!
//! ```
//! use nanomask::{calibrate, CalibrationParams, MarkerSet, Point2};
//!
//! # fn main() -> Result<(), nanomask::calib::CalibrationError> {
//! // Stage readout of the four marker corners (bl, br, tl, tr).
//! let markers = MarkerSet::new(
//!     Point2::new(10.0, 5.0),
//!     Point2::new(310.0, 5.0),
//!     Point2::new(10.0, 305.0),
//!     Point2::new(310.0, 305.0),
//! );
//! let nanowire = [Point2::new(160.0, 155.0), Point2::new(170.0, 165.0)];
//! let result = calibrate(&markers, &nanowire, &CalibrationParams::default())?;
//! assert!((result.features[0].x - 150.0).abs() < 1e-9);
//! # Ok(())
//! # }
//! ```

pub use nanomask_calib as calib;
pub use nanomask_core as core;
pub use nanomask_glyph as glyph;

pub use nanomask_calib::{
    calibrate, CalibrationMethod, CalibrationParams, CalibrationResult, DieDimensions,
    InputAxes, MarkerCalibrator, MarkerSet,
};
pub use nanomask_core::Point2;
pub use nanomask_glyph::{decode_outline, layout_text, GlyphCache, GlyphOutline};

mod logging;

#[cfg(feature = "tracing")]
pub use logging::init_tracing;
pub use logging::init_logging;
