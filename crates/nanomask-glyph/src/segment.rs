use nalgebra::Point2;
use nanomask_core::Affine2;
use serde::{Deserialize, Serialize};

/// One piece of a decoded contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveSegment {
    Line {
        p0: Point2<f64>,
        p1: Point2<f64>,
    },
    Quadratic {
        p0: Point2<f64>,
        p1: Point2<f64>,
        p2: Point2<f64>,
    },
    Cubic {
        p0: Point2<f64>,
        p1: Point2<f64>,
        p2: Point2<f64>,
        p3: Point2<f64>,
    },
}

impl CurveSegment {
    pub fn start(&self) -> Point2<f64> {
        match *self {
            CurveSegment::Line { p0, .. }
            | CurveSegment::Quadratic { p0, .. }
            | CurveSegment::Cubic { p0, .. } => p0,
        }
    }

    pub fn end(&self) -> Point2<f64> {
        match *self {
            CurveSegment::Line { p1, .. } => p1,
            CurveSegment::Quadratic { p2, .. } => p2,
            CurveSegment::Cubic { p3, .. } => p3,
        }
    }

    /// Point at parameter `t` in `[0, 1]`.
    pub fn eval(&self, t: f64) -> Point2<f64> {
        let s = 1.0 - t;
        match *self {
            CurveSegment::Line { p0, p1 } => p0 + (p1 - p0) * t,
            CurveSegment::Quadratic { p0, p1, p2 } => Point2::from(
                p0.coords * (s * s) + p1.coords * (2.0 * s * t) + p2.coords * (t * t),
            ),
            CurveSegment::Cubic { p0, p1, p2, p3 } => Point2::from(
                p0.coords * (s * s * s)
                    + p1.coords * (3.0 * s * s * t)
                    + p2.coords * (3.0 * s * t * t)
                    + p3.coords * (t * t * t),
            ),
        }
    }

    /// Control points of the same curve as a cubic. Lines get their
    /// control points at the thirds; quadratics are degree-elevated.
    pub fn cubic_points(&self) -> [Point2<f64>; 4] {
        match *self {
            CurveSegment::Line { p0, p1 } => {
                [p0, p0 + (p1 - p0) / 3.0, p0 + (p1 - p0) * (2.0 / 3.0), p1]
            }
            CurveSegment::Quadratic { p0, p1, p2 } => {
                let [c1, c2, p3] = quadratic_to_cubic(p0, p1, p2);
                [p0, c1, c2, p3]
            }
            CurveSegment::Cubic { p0, p1, p2, p3 } => [p0, p1, p2, p3],
        }
    }

    pub fn to_cubic(&self) -> CurveSegment {
        let [p0, p1, p2, p3] = self.cubic_points();
        CurveSegment::Cubic { p0, p1, p2, p3 }
    }

    /// Map every control point through `t`.
    pub fn transformed(&self, t: &Affine2) -> CurveSegment {
        match *self {
            CurveSegment::Line { p0, p1 } => CurveSegment::Line {
                p0: t.apply(p0),
                p1: t.apply(p1),
            },
            CurveSegment::Quadratic { p0, p1, p2 } => CurveSegment::Quadratic {
                p0: t.apply(p0),
                p1: t.apply(p1),
                p2: t.apply(p2),
            },
            CurveSegment::Cubic { p0, p1, p2, p3 } => CurveSegment::Cubic {
                p0: t.apply(p0),
                p1: t.apply(p1),
                p2: t.apply(p2),
                p3: t.apply(p3),
            },
        }
    }
}

/// Degree elevation of a quadratic Bézier: returns the cubic's two control
/// points and end point. The curves are identical for every `t`.
pub fn quadratic_to_cubic(
    p0: Point2<f64>,
    p1: Point2<f64>,
    p2: Point2<f64>,
) -> [Point2<f64>; 3] {
    let c1 = p0 + (p1 - p0) * (2.0 / 3.0);
    let c2 = p2 + (p1 - p2) * (2.0 / 3.0);
    [c1, c2, p2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn quadratic_elevation_matches_at_midpoint() {
        let p0 = Point2::new(0.0, 0.0);
        let p1 = Point2::new(1.0, 2.0);
        let p2 = Point2::new(2.0, 0.0);
        let [c1, c2, end] = quadratic_to_cubic(p0, p1, p2);
        assert_abs_diff_eq!(c1, Point2::new(2.0 / 3.0, 4.0 / 3.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c2, Point2::new(4.0 / 3.0, 4.0 / 3.0), epsilon = 1e-12);
        assert_eq!(end, p2);

        let quad = CurveSegment::Quadratic { p0, p1, p2 };
        let cubic = quad.to_cubic();
        assert_abs_diff_eq!(quad.eval(0.5), Point2::new(1.0, 1.0), epsilon = 1e-12);
        for t in [0.0, 0.25, 0.5, 0.8, 1.0] {
            assert_abs_diff_eq!(cubic.eval(t), quad.eval(t), epsilon = 1e-12);
        }
    }

    #[test]
    fn elevation_is_exact_for_degenerate_quadratics() {
        let p = Point2::<f64>::new;
        let triples = [
            // general, asymmetric
            (p(-3.0, 1.0), p(0.5, 7.0), p(4.0, -2.0)),
            // control on the chord
            (p(0.0, 0.0), p(1.0, 1.0), p(2.0, 2.0)),
            // control beyond the end point
            (p(0.0, 0.0), p(3.0, 0.0), p(1.0, 0.0)),
            // control on the start point
            (p(1.0, 1.0), p(1.0, 1.0), p(4.0, 5.0)),
            // all three coincident
            (p(3.0, 3.0), p(3.0, 3.0), p(3.0, 3.0)),
        ];
        for (p0, p1, p2) in triples {
            let quad = CurveSegment::Quadratic { p0, p1, p2 };
            let cubic = quad.to_cubic();
            assert_eq!(cubic.start(), p0);
            assert_eq!(cubic.end(), p2);
            for t in [0.0, 0.1, 0.5, 0.9, 1.0] {
                assert_abs_diff_eq!(cubic.eval(t), quad.eval(t), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn line_as_cubic_uses_thirds() {
        let line = CurveSegment::Line {
            p0: Point2::new(0.0, 0.0),
            p1: Point2::new(3.0, 6.0),
        };
        let [p0, c1, c2, p3] = line.cubic_points();
        assert_eq!(p0, Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(c1, Point2::new(1.0, 2.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c2, Point2::new(2.0, 4.0), epsilon = 1e-12);
        assert_eq!(p3, Point2::new(3.0, 6.0));
        assert_abs_diff_eq!(line.to_cubic().eval(0.3), line.eval(0.3), epsilon = 1e-12);
    }

    #[test]
    fn endpoints_and_transform() {
        let seg = CurveSegment::Cubic {
            p0: Point2::new(0.0, 0.0),
            p1: Point2::new(0.0, 1.0),
            p2: Point2::new(1.0, 1.0),
            p3: Point2::new(1.0, 0.0),
        };
        assert_eq!(seg.start(), seg.eval(0.0));
        assert_eq!(seg.end(), seg.eval(1.0));

        let moved = seg.transformed(&Affine2::scale(2.0, 2.0).then(&Affine2::translation(5.0, 0.0)));
        assert_eq!(moved.start(), Point2::new(5.0, 0.0));
        assert_eq!(moved.end(), Point2::new(7.0, 0.0));
    }
}
