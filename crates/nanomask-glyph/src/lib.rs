//! Glyph outline decoding for mask text.
//!
//! Font outlines arrive as tagged points: on-curve points, quadratic control
//! points and cubic control points. [`decode_outline`] turns them into closed
//! chains of [`CurveSegment`]s, inserting the on-curve points implied between
//! consecutive quadratic controls. Decoded glyphs can be exported as cubic
//! B-splines, memoised in a caller-owned [`GlyphCache`] and laid out on a
//! baseline with [`layout_text`].
//!
//! ```
//! use nalgebra::Point2;
//! use nanomask_glyph::{decode_outline, CurveSegment, GlyphOutline, PointKind};
//!
//! let outline = GlyphOutline::default().with_contour(&[
//!     (Point2::new(0.0, 0.0), PointKind::OnCurve),
//!     (Point2::new(1.0, 0.0), PointKind::OnCurve),
//!     (Point2::new(0.0, 1.0), PointKind::OnCurve),
//! ]);
//! let glyph = decode_outline(&outline)?;
//! assert_eq!(glyph.contours[0].len(), 3);
//! assert!(matches!(glyph.contours[0].segments[0], CurveSegment::Line { .. }));
//! # Ok::<(), nanomask_glyph::GlyphError>(())
//! ```

mod cache;
mod decode;
mod error;
#[cfg(feature = "font")]
mod font;
mod outline;
mod segment;
mod source;
mod spline;
mod text;

pub use cache::{CacheStats, EvictionPolicy, GlyphCache};
pub use decode::{decode_contour, decode_outline, ContourPath, DecodedGlyph};
pub use error::GlyphError;
#[cfg(feature = "font")]
pub use font::{FontFile, FontNormalization, FontParams};
pub use outline::{GlyphContour, GlyphOutline, PointKind, TAG_CUBIC, TAG_ON_CURVE};
pub use segment::{quadratic_to_cubic, CurveSegment};
pub use source::{InMemoryOutlines, OutlineSource};
pub use spline::CubicSpline;
pub use text::{layout_text, PlacedGlyph, TextRun, DEFAULT_TEXT_HEIGHT};
