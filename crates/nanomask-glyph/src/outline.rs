//! Tagged glyph outlines as read from a font.
//!
//! An outline is a flat list of points, one tag byte per point, and the
//! index of the last point of every contour. Contours are implicitly closed.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::GlyphError;

/// Tag bit set on on-curve points.
pub const TAG_ON_CURVE: u8 = 0x01;
/// Tag bit set on third-order (cubic) control points; clear means quadratic.
pub const TAG_CUBIC: u8 = 0x02;

/// Role of a single outline point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    OnCurve,
    Quadratic,
    Cubic,
}

impl PointKind {
    /// Classify a tag byte. Bits other than the two roles are ignored.
    pub fn from_tag(tag: u8) -> Self {
        if tag & TAG_ON_CURVE != 0 {
            PointKind::OnCurve
        } else if tag & TAG_CUBIC != 0 {
            PointKind::Cubic
        } else {
            PointKind::Quadratic
        }
    }

    pub fn tag(self) -> u8 {
        match self {
            PointKind::OnCurve => TAG_ON_CURVE,
            PointKind::Quadratic => 0,
            PointKind::Cubic => TAG_CUBIC,
        }
    }

    #[inline]
    pub fn is_on_curve(self) -> bool {
        self == PointKind::OnCurve
    }
}

/// Raw outline of one glyph.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlyphOutline {
    pub points: Vec<Point2<f64>>,
    pub tags: Vec<u8>,
    /// Index of the last point of each contour, strictly increasing.
    pub contour_ends: Vec<usize>,
    /// Horizontal advance in the same units as the points.
    #[serde(default)]
    pub advance: f64,
}

impl GlyphOutline {
    pub fn new(
        points: Vec<Point2<f64>>,
        tags: Vec<u8>,
        contour_ends: Vec<usize>,
        advance: f64,
    ) -> Self {
        Self {
            points,
            tags,
            contour_ends,
            advance,
        }
    }

    /// Append a contour given as `(point, kind)` pairs.
    pub fn push_contour(&mut self, contour: &[(Point2<f64>, PointKind)]) -> &mut Self {
        if contour.is_empty() {
            return self;
        }
        for &(p, kind) in contour {
            self.points.push(p);
            self.tags.push(kind.tag());
        }
        self.contour_ends.push(self.points.len() - 1);
        self
    }

    /// Builder-style variant of [`push_contour`](Self::push_contour).
    pub fn with_contour(mut self, contour: &[(Point2<f64>, PointKind)]) -> Self {
        self.push_contour(contour);
        self
    }

    pub fn with_advance(mut self, advance: f64) -> Self {
        self.advance = advance;
        self
    }

    #[inline]
    pub fn contour_count(&self) -> usize {
        self.contour_ends.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check the structure the decoder relies on.
    pub fn validate(&self) -> Result<(), GlyphError> {
        if self.points.len() != self.tags.len() {
            return Err(GlyphError::TagCountMismatch {
                points: self.points.len(),
                tags: self.tags.len(),
            });
        }
        let mut previous: Option<usize> = None;
        for &end in &self.contour_ends {
            let increasing = previous.is_none_or(|prev| end > prev);
            if !increasing || end >= self.points.len() {
                return Err(GlyphError::InvalidContourEnds {
                    end,
                    previous,
                    points: self.points.len(),
                });
            }
            previous = Some(end);
        }
        let claimed = previous.map_or(0, |end| end + 1);
        if claimed != self.points.len() {
            return Err(GlyphError::TrailingPoints {
                count: self.points.len() - claimed,
            });
        }
        Ok(())
    }

    /// Contour views in order. Assumes a validated outline.
    pub fn contours(&self) -> impl Iterator<Item = GlyphContour<'_>> + '_ {
        let mut start = 0;
        self.contour_ends
            .iter()
            .enumerate()
            .map(move |(index, &end)| {
                let contour = GlyphContour {
                    index,
                    start,
                    points: &self.points[start..=end],
                    tags: &self.tags[start..=end],
                };
                start = end + 1;
                contour
            })
    }

    /// Copy with points and advance multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> GlyphOutline {
        GlyphOutline {
            points: self.points.iter().map(|p| p * factor).collect(),
            tags: self.tags.clone(),
            contour_ends: self.contour_ends.clone(),
            advance: self.advance * factor,
        }
    }
}

/// Borrowed view of one contour of a [`GlyphOutline`].
#[derive(Clone, Copy, Debug)]
pub struct GlyphContour<'a> {
    /// Contour number within the glyph.
    pub index: usize,
    /// Index of the first point within the whole outline.
    pub start: usize,
    pub points: &'a [Point2<f64>],
    pub tags: &'a [u8],
}

impl GlyphContour<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn kind(&self, i: usize) -> PointKind {
        PointKind::from_tag(self.tags[i])
    }
}
