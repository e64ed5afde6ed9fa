/// Errors produced while reading or decoding glyph outlines.
#[derive(thiserror::Error, Debug)]
pub enum GlyphError {
    #[error("contour {contour} has {points} point(s); at least 2 are needed")]
    TooFewPoints { contour: usize, points: usize },

    #[error("cubic control point {index} in contour {contour} follows another control pair")]
    ConsecutiveCubic { contour: usize, index: usize },

    #[error("cubic control point {index} in contour {contour} has no partner control point")]
    IncompleteCubic { contour: usize, index: usize },

    #[error("point {index} in contour {contour} mixes quadratic and cubic control points")]
    MixedControlPoints { contour: usize, index: usize },

    #[error("outline has {points} points but {tags} tags")]
    TagCountMismatch { points: usize, tags: usize },

    #[error("contour end {end} must exceed {previous:?} and stay below {points}")]
    InvalidContourEnds {
        end: usize,
        previous: Option<usize>,
        points: usize,
    },

    #[error("{count} trailing point(s) belong to no contour")]
    TrailingPoints { count: usize },

    #[error("character {ch:?} has no glyph in font {font}")]
    MissingGlyph { font: String, ch: char },

    #[error("failed to parse font {font}: {reason}")]
    FontParse { font: String, reason: String },

    #[error("font {font} reports a non-positive {metric}")]
    InvalidFontMetrics { font: String, metric: &'static str },

    #[error("text height must be positive and finite (got {height})")]
    InvalidHeight { height: f64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GlyphError {
    /// True for malformed outline data as opposed to font lookup or I/O failures.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            GlyphError::TooFewPoints { .. }
                | GlyphError::ConsecutiveCubic { .. }
                | GlyphError::IncompleteCubic { .. }
                | GlyphError::MixedControlPoints { .. }
                | GlyphError::TagCountMismatch { .. }
                | GlyphError::InvalidContourEnds { .. }
                | GlyphError::TrailingPoints { .. }
        )
    }
}
