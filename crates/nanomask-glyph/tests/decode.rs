use approx::assert_abs_diff_eq;
use nalgebra::Point2;
use nanomask_glyph::{
    decode_outline, layout_text, CubicSpline, CurveSegment, GlyphCache, GlyphError, GlyphOutline,
    InMemoryOutlines, PointKind,
};

const ON: PointKind = PointKind::OnCurve;
const Q: PointKind = PointKind::Quadratic;
const C: PointKind = PointKind::Cubic;

/// An 'O'-like glyph: a quadratic outer ring and a cubic inner ring.
fn ring() -> GlyphOutline {
    GlyphOutline::default()
        .with_contour(&[
            (Point2::new(0.0, 0.35), Q),
            (Point2::new(0.0, 0.7), Q),
            (Point2::new(0.6, 0.7), Q),
            (Point2::new(0.6, 0.0), Q),
            (Point2::new(0.0, 0.0), Q),
        ])
        .with_contour(&[
            (Point2::new(0.15, 0.35), ON),
            (Point2::new(0.15, 0.55), C),
            (Point2::new(0.45, 0.55), C),
            (Point2::new(0.45, 0.35), ON),
            (Point2::new(0.45, 0.15), C),
            (Point2::new(0.15, 0.15), C),
        ])
        .with_advance(0.65)
}

#[test]
fn mixed_glyph_decodes_into_closed_contours() {
    let glyph = decode_outline(&ring()).expect("decode");
    assert_eq!(glyph.contours.len(), 2);
    assert_eq!(glyph.contours[0].len(), 5);
    assert_eq!(glyph.contours[1].len(), 2);
    for contour in &glyph.contours {
        assert!(contour.is_closed(1e-12));
    }
    assert!(glyph.contours[0]
        .segments
        .iter()
        .all(|s| matches!(s, CurveSegment::Quadratic { .. })));
    assert!(glyph.contours[1]
        .segments
        .iter()
        .all(|s| matches!(s, CurveSegment::Cubic { .. })));
}

#[test]
fn spline_export_follows_the_decoded_curve() {
    let glyph = decode_outline(&ring()).expect("decode");
    for contour in &glyph.contours {
        let spline = CubicSpline::from_contour(contour);
        assert_eq!(spline.control_points.len(), 3 * contour.len() + 1);
        assert_eq!(spline.knots.first(), Some(&0.0));
        assert_eq!(spline.knots.last(), Some(&1.0));
        for (piece, seg) in spline.bezier_segments().zip(&contour.segments) {
            assert_abs_diff_eq!(piece.eval(0.5), seg.eval(0.5), epsilon = 1e-12);
        }
    }
}

#[test]
fn bad_contours_are_reported_with_their_index() {
    let outline = ring().with_contour(&[(Point2::new(1.0, 1.0), ON)]);
    assert!(matches!(
        decode_outline(&outline),
        Err(GlyphError::TooFewPoints {
            contour: 2,
            points: 1
        })
    ));
}

#[test]
fn text_layout_reuses_cached_glyphs() {
    let font = InMemoryOutlines::new("ring").with_glyph('O', ring());
    let mut cache = GlyphCache::lru(8);
    let run = layout_text(&mut cache, &font, "OOO", 2.0).expect("layout");
    assert_abs_diff_eq!(run.width, 3.9, epsilon = 1e-12);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().hits, 2);
    assert_abs_diff_eq!(run.glyphs[2].origin.x, 2.6, epsilon = 1e-12);
}
