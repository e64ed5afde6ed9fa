use std::fmt;

/// Which part of the calibration hit a zero or undefined denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CalibrationStage {
    /// Origin-to-opposite-corner diagonal has no length.
    Rotation,
    /// Top-left corner has no vertical extent after rotation.
    XSkew,
    /// Bottom-right corner has no horizontal extent after x-deskew.
    YSkew,
    /// Marker square collapsed along an axis before stretching.
    Scale,
    /// Far-corner correction ratio or per-point divisor is zero.
    Distortion,
    /// Three of the four source corners are collinear.
    PerspectiveCollinear,
    /// The projective frame of the source or destination corners is singular.
    PerspectiveSolve,
    /// A point was projected onto the line at infinity.
    Projection,
}

impl fmt::Display for CalibrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalibrationStage::Rotation => "rotation",
            CalibrationStage::XSkew => "x-deskew",
            CalibrationStage::YSkew => "y-deskew",
            CalibrationStage::Scale => "scale",
            CalibrationStage::Distortion => "distortion correction",
            CalibrationStage::PerspectiveCollinear => "perspective (collinear corners)",
            CalibrationStage::PerspectiveSolve => "perspective (singular system)",
            CalibrationStage::Projection => "projection",
        };
        f.write_str(name)
    }
}

/// Errors produced by marker calibration.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum CalibrationError {
    #[error("expected exactly 4 marker corners, got {got}")]
    MarkerArity { got: usize },

    #[error("coordinate list of length {len} is not made of (x, y) pairs")]
    UnpairedCoordinates { len: usize },

    #[error("die dimensions must be positive and finite (width={width}, height={height})")]
    InvalidDieDimensions { width: f64, height: f64 },

    #[error("view scale must be non-zero and finite (got {scale})")]
    InvalidViewScale { scale: f64 },

    #[error("view offset must be finite (got ({x}, {y}))")]
    InvalidViewOffset { x: f64, y: f64 },

    #[error("degeneracy tolerance must be finite and non-negative (got {tol})")]
    InvalidDegeneracyTolerance { tol: f64 },

    #[error("input coordinates must be finite")]
    NonFiniteInput,

    #[error("degenerate marker geometry at {stage} (value={value:e})")]
    Degenerate { stage: CalibrationStage, value: f64 },
}

impl CalibrationError {
    pub(crate) fn degenerate(stage: CalibrationStage, value: f64) -> Self {
        CalibrationError::Degenerate { stage, value }
    }

    /// True for zero/undefined-denominator failures as opposed to malformed input.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, CalibrationError::Degenerate { .. })
    }
}
