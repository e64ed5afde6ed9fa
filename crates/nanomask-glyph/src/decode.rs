//! Outline decoding.
//!
//! Walks each tagged contour and emits line, quadratic and cubic segments.
//! Consecutive quadratic controls imply an on-curve point at their midpoint;
//! cubic controls always come in pairs between two on-curve points.

use log::debug;
use nalgebra::Point2;
use nanomask_core::{midpoint, Affine2};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::GlyphError;
use crate::outline::{GlyphContour, GlyphOutline, PointKind};
use crate::segment::CurveSegment;

/// One closed contour as a chain of segments.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContourPath {
    pub segments: Vec<CurveSegment>,
}

impl ContourPath {
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start(&self) -> Option<Point2<f64>> {
        self.segments.first().map(CurveSegment::start)
    }

    /// True when consecutive segments share endpoints and the last ends
    /// where the first starts.
    pub fn is_closed(&self, tol: f64) -> bool {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return false;
        };
        let chained = self
            .segments
            .windows(2)
            .all(|w| (w[0].end() - w[1].start()).norm() <= tol);
        chained && (last.end() - first.start()).norm() <= tol
    }

    pub fn transformed(&self, t: &Affine2) -> ContourPath {
        ContourPath {
            segments: self.segments.iter().map(|s| s.transformed(t)).collect(),
        }
    }
}

/// All contours of a glyph plus its advance width.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedGlyph {
    pub contours: Vec<ContourPath>,
    pub advance: f64,
}

impl DecodedGlyph {
    pub fn segment_count(&self) -> usize {
        self.contours.iter().map(ContourPath::len).sum()
    }

    pub fn transformed(&self, t: &Affine2) -> DecodedGlyph {
        DecodedGlyph {
            contours: self.contours.iter().map(|c| c.transformed(t)).collect(),
            advance: self.advance,
        }
    }
}

/// Decode every contour of `outline`.
#[cfg_attr(feature = "tracing", instrument(level = "trace", skip(outline), fields(points = outline.points.len())))]
pub fn decode_outline(outline: &GlyphOutline) -> Result<DecodedGlyph, GlyphError> {
    outline.validate()?;
    let contours = outline
        .contours()
        .map(|c| decode_contour(&c))
        .collect::<Result<Vec<_>, _>>()?;
    let glyph = DecodedGlyph {
        contours,
        advance: outline.advance,
    };
    debug!(
        "decoded {} point(s) into {} contour(s), {} segment(s)",
        outline.points.len(),
        glyph.contours.len(),
        glyph.segment_count()
    );
    Ok(glyph)
}

/// Contour walk with wraparound, starting at `offset`.
struct Walk<'a, 'c> {
    contour: &'c GlyphContour<'a>,
    offset: usize,
}

impl Walk<'_, '_> {
    #[inline]
    fn wrap(&self, i: usize) -> usize {
        (self.offset + i) % self.contour.len()
    }

    #[inline]
    fn point(&self, i: usize) -> Point2<f64> {
        self.contour.points[self.wrap(i)]
    }

    #[inline]
    fn kind(&self, i: usize) -> PointKind {
        self.contour.kind(self.wrap(i))
    }

    /// Index within the whole outline, for error reports.
    #[inline]
    fn outline_index(&self, i: usize) -> usize {
        self.contour.start + self.wrap(i)
    }

    fn mixed(&self, i: usize) -> GlyphError {
        GlyphError::MixedControlPoints {
            contour: self.contour.index,
            index: self.outline_index(i),
        }
    }

    /// End of the quadratic whose control sits at `i`: the next point when it
    /// is on-curve, otherwise the implied midpoint.
    fn quadratic_end(&self, i: usize) -> Result<Point2<f64>, GlyphError> {
        match self.kind(i + 1) {
            PointKind::OnCurve => Ok(self.point(i + 1)),
            PointKind::Quadratic => Ok(midpoint(self.point(i), self.point(i + 1))),
            PointKind::Cubic => Err(self.mixed(i + 1)),
        }
    }

    /// Start of the quadratic whose control sits at `i`.
    fn quadratic_start(&self, i: usize) -> Result<Point2<f64>, GlyphError> {
        let prev = i + self.contour.len() - 1;
        match self.kind(prev) {
            PointKind::OnCurve => Ok(self.point(prev)),
            PointKind::Quadratic => Ok(midpoint(self.point(prev), self.point(i))),
            PointKind::Cubic => Err(self.mixed(i)),
        }
    }
}

/// Decode one contour into a closed [`ContourPath`].
pub fn decode_contour(contour: &GlyphContour<'_>) -> Result<ContourPath, GlyphError> {
    let n = contour.len();
    if n < 2 {
        return Err(GlyphError::TooFewPoints {
            contour: contour.index,
            points: n,
        });
    }

    // A cubic control cannot open a segment; begin on the first on-curve point.
    let offset = if contour.kind(0) == PointKind::Cubic {
        (0..n)
            .find(|&i| contour.kind(i).is_on_curve())
            .ok_or(GlyphError::ConsecutiveCubic {
                contour: contour.index,
                index: contour.start,
            })?
    } else {
        0
    };
    let walk = Walk { contour, offset };
    // The first segment already ends on the last on-curve point in this case.
    let opens_on_quadratic = walk.kind(0) == PointKind::Quadratic;

    let mut segments = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        match walk.kind(i) {
            PointKind::OnCurve => {
                if i == n - 1 && opens_on_quadratic {
                    break;
                }
                let p0 = walk.point(i);
                match walk.kind(i + 1) {
                    PointKind::OnCurve => {
                        segments.push(CurveSegment::Line {
                            p0,
                            p1: walk.point(i + 1),
                        });
                        i += 1;
                    }
                    PointKind::Quadratic => {
                        let p2 = walk.quadratic_end(i + 1)?;
                        segments.push(CurveSegment::Quadratic {
                            p0,
                            p1: walk.point(i + 1),
                            p2,
                        });
                        i += 2;
                    }
                    PointKind::Cubic => {
                        match walk.kind(i + 2) {
                            PointKind::Cubic => {}
                            PointKind::Quadratic => return Err(walk.mixed(i + 2)),
                            PointKind::OnCurve => {
                                return Err(GlyphError::IncompleteCubic {
                                    contour: contour.index,
                                    index: walk.outline_index(i + 1),
                                })
                            }
                        }
                        match walk.kind(i + 3) {
                            PointKind::OnCurve => {}
                            PointKind::Quadratic => return Err(walk.mixed(i + 3)),
                            PointKind::Cubic => {
                                return Err(GlyphError::ConsecutiveCubic {
                                    contour: contour.index,
                                    index: walk.outline_index(i + 3),
                                })
                            }
                        }
                        segments.push(CurveSegment::Cubic {
                            p0,
                            p1: walk.point(i + 1),
                            p2: walk.point(i + 2),
                            p3: walk.point(i + 3),
                        });
                        i += 3;
                    }
                }
            }
            PointKind::Quadratic => {
                segments.push(CurveSegment::Quadratic {
                    p0: walk.quadratic_start(i)?,
                    p1: walk.point(i),
                    p2: walk.quadratic_end(i)?,
                });
                i += 1;
            }
            PointKind::Cubic => {
                return Err(GlyphError::ConsecutiveCubic {
                    contour: contour.index,
                    index: walk.outline_index(i),
                })
            }
        }
    }

    Ok(ContourPath { segments })
}
