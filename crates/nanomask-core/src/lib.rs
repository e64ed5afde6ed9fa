//! Geometric primitives shared by the nanomask crates.
//!
//! Points and vectors are plain `nalgebra` values in `f64`. This crate holds
//! the affine transform algebra used by marker calibration and the 4-point
//! homography solver used by the perspective variant.

mod homography;
mod transform;

pub use homography::{are_collinear, homography_from_4pt, Homography};
pub use transform::{midpoint, rotation_matrix, Affine2, TransformError};

pub use nalgebra::{Point2, Vector2};
