use std::sync::Arc;

use nalgebra::Point2;
use nanomask_core::Affine2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::cache::GlyphCache;
use crate::decode::{ContourPath, DecodedGlyph};
use crate::error::GlyphError;
use crate::source::OutlineSource;

/// Character height used for mask labels when none is given.
pub const DEFAULT_TEXT_HEIGHT: f64 = 10.0;

/// A glyph placed on a text baseline.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    /// Baseline origin of the glyph.
    pub origin: Point2<f64>,
    /// Factor from normalised glyph units to output units.
    pub scale: f64,
    pub glyph: Arc<DecodedGlyph>,
}

impl PlacedGlyph {
    pub fn transform(&self) -> Affine2 {
        Affine2::scale(self.scale, self.scale)
            .then(&Affine2::translation(self.origin.x, self.origin.y))
    }

    /// Contours in output coordinates.
    pub fn contours(&self) -> Vec<ContourPath> {
        let t = self.transform();
        self.glyph.contours.iter().map(|c| c.transformed(&t)).collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextRun {
    pub glyphs: Vec<PlacedGlyph>,
    /// Total advance of the run.
    pub width: f64,
}

/// Lay `text` out on a single baseline starting at the origin.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(cache, source), fields(font = source.font_key())))]
pub fn layout_text<S>(
    cache: &mut GlyphCache,
    source: &S,
    text: &str,
    height: f64,
) -> Result<TextRun, GlyphError>
where
    S: OutlineSource + ?Sized,
{
    if !height.is_finite() || height <= 0.0 {
        return Err(GlyphError::InvalidHeight { height });
    }
    let mut run = TextRun::default();
    for ch in text.chars() {
        let glyph = cache.get_or_decode(source, ch)?;
        let advance = glyph.advance * height;
        run.glyphs.push(PlacedGlyph {
            ch,
            origin: Point2::new(run.width, 0.0),
            scale: height,
            glyph,
        });
        run.width += advance;
    }
    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{GlyphOutline, PointKind};
    use crate::source::InMemoryOutlines;
    use approx::assert_abs_diff_eq;

    fn font() -> InMemoryOutlines {
        let box_glyph = GlyphOutline::default()
            .with_contour(&[
                (Point2::new(0.1, 0.0), PointKind::OnCurve),
                (Point2::new(0.5, 0.0), PointKind::OnCurve),
                (Point2::new(0.5, 0.7), PointKind::OnCurve),
                (Point2::new(0.1, 0.7), PointKind::OnCurve),
            ])
            .with_advance(0.6);
        InMemoryOutlines::new("boxes")
            .with_glyph('I', box_glyph)
            .with_glyph(' ', GlyphOutline::default().with_advance(0.25))
    }

    #[test]
    fn cursor_advances_by_scaled_width() {
        let font = font();
        let mut cache = GlyphCache::default();
        let run = layout_text(&mut cache, &font, "I I", DEFAULT_TEXT_HEIGHT).expect("layout");

        assert_eq!(run.glyphs.len(), 3);
        assert_abs_diff_eq!(run.width, 14.5, epsilon = 1e-12);
        assert_abs_diff_eq!(run.glyphs[1].origin.x, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(run.glyphs[2].origin.x, 8.5, epsilon = 1e-12);
        assert!(run.glyphs[1].contours().is_empty());

        let last = run.glyphs[2].contours();
        assert_abs_diff_eq!(
            last[0].start().expect("segments"),
            Point2::new(9.5, 0.0),
            epsilon = 1e-12
        );
        // Both 'I's came from one decode.
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn rejects_bad_height_and_missing_glyphs() {
        let font = font();
        let mut cache = GlyphCache::default();
        assert!(matches!(
            layout_text(&mut cache, &font, "I", 0.0),
            Err(GlyphError::InvalidHeight { .. })
        ));
        assert!(matches!(
            layout_text(&mut cache, &font, "IX", 1.0),
            Err(GlyphError::MissingGlyph { ch: 'X', .. })
        ));
    }
}
