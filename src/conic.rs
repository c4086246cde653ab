//! Fitting a conic arc to three points and two tangent lines.
//!
//! The arc is a rational quadratic Bézier. Its end points are `p0` and `p2`,
//! its end tangents run through `t0` and `t2`, and it passes through the apex
//! `p1`. The middle control point sits where the tangent lines meet; the
//! weight follows from area coordinates of `p1` in the control triangle.

use kurbo::{BezPath, Point};
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde_::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::{self, signed_area};

/// Reasons a conic cannot be fit to the given points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConicError {
    /// The two tangent lines never meet, or one has no direction.
    #[error("tangent lines are parallel, no unique control point")]
    ParallelTangents,
    /// The apex lies where no real weight reaches it.
    #[error("input points do not admit a real weight")]
    NoRealWeight,
}

/// The derived control point and weight of a fitted conic.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_")
)]
pub struct ConicFit {
    /// The middle control point, already multiplied by `weight`.
    pub control: Point,
    /// Weight of the middle control point.
    ///
    /// A negative weight selects the arc on the far side of the control
    /// point.
    pub weight: f64,
}

/// A rational quadratic Bézier with a homogeneous middle point.
///
/// `p1` is stored pre-multiplied by `weight`, so
/// B(t) = ((1-t)² p0 + 2t(1-t) p1 + t² p2) / ((1-t)² + 2t(1-t) w + t²).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConicArc {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub weight: f64,
}

/// Intersection of the line through `p0`, `t0` with the line through
/// `p2`, `t2`.
pub fn tangent_intersection(
    p0: Point,
    t0: Point,
    p2: Point,
    t2: Point,
) -> Result<Point, ConicError> {
    let v0 = t0 - p0;
    let v2 = t2 - p2;
    let d = v0.cross(v2);
    if d == 0.0 || !d.is_finite() {
        return Err(ConicError::ParallelTangents);
    }
    let s = (p2 - p0).cross(v2) / d;
    let i = p0 + s * v0;
    if i.x.is_finite() && i.y.is_finite() {
        Ok(i)
    } else {
        Err(ConicError::ParallelTangents)
    }
}

/// Fit a conic through `p0`, `p1` and `p2`, tangent at the ends to the lines
/// towards `t0` and `t2`.
pub fn fit(
    p0: Point,
    p1: Point,
    p2: Point,
    t0: Point,
    t2: Point,
) -> Result<ConicFit, ConicError> {
    let i = tangent_intersection(p0, t0, p2, t2)?;

    // Area coordinates of p1 with respect to the triangle p0, i, p2.
    let b0 = signed_area(p1, i, p2);
    let b1 = signed_area(p0, p1, p2);
    let b2 = signed_area(p0, i, p1);
    let b02 = b0 * b2;
    if b02.is_nan() || b02 <= 0.0 {
        return Err(ConicError::NoRealWeight);
    }
    let mut weight = 0.5 * b1 / b02.sqrt();
    // b0 carries the triangle's orientation times the sign of the rational
    // denominator at the apex, which is exactly the sign the weight needs.
    if b0 < 0.0 {
        weight = -weight;
    }
    let control = (weight * i.to_vec2()).to_point();
    if !(weight.is_finite() && control.x.is_finite() && control.y.is_finite()) {
        return Err(ConicError::NoRealWeight);
    }
    Ok(ConicFit { control, weight })
}

impl ConicFit {
    /// The control point before weighting, where the tangents meet.
    ///
    /// Returns `None` for a zero weight, where the arc is the chord.
    pub fn tangent_point(&self) -> Option<Point> {
        if self.weight == 0.0 {
            None
        } else {
            Some((self.control.to_vec2() / self.weight).to_point())
        }
    }

    /// The arc from `p0` to `p2` described by this fit.
    pub fn arc(&self, p0: Point, p2: Point) -> ConicArc {
        ConicArc {
            p0,
            p1: self.control,
            p2,
            weight: self.weight,
        }
    }
}

impl ConicArc {
    /// Evaluate the arc at parameter `t`.
    ///
    /// Returns `None` where the denominator vanishes. That only happens for
    /// weights of -1 or less, when the arc passes through infinity.
    pub fn eval(&self, t: f64) -> Option<Point> {
        let mt = 1.0 - t;
        let a = mt * mt;
        let b = 2.0 * t * mt;
        let c = t * t;
        let denom = a + b * self.weight + c;
        if denom == 0.0 {
            return None;
        }
        let v = a * self.p0.to_vec2() + b * self.p1.to_vec2() + c * self.p2.to_vec2();
        let p = (v / denom).to_point();
        if p.x.is_finite() && p.y.is_finite() {
            Some(p)
        } else {
            None
        }
    }

    /// Approximate the arc by `n` line segments.
    ///
    /// A new subpath starts after any sample at infinity.
    pub fn flatten(&self, n: usize) -> BezPath {
        let mut path = BezPath::new();
        let mut pen_down = false;
        let step = 1.0 / (n.max(1) as f64);
        for i in 0..=n.max(1) {
            match self.eval(i as f64 * step) {
                Some(p) if pen_down => path.line_to(p),
                Some(p) => {
                    path.move_to(p);
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        path
    }
}

/// The five points governing a conic, with the last valid fit.
///
/// Points are ordered `p0`, `p1`, `p2`, `t0`, `t2`.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_")
)]
pub struct ConicSpec {
    pts: [Point; 5],
    #[cfg_attr(feature = "serde", serde(skip))]
    fit: Option<ConicFit>,
}

impl ConicSpec {
    pub fn new(p0: Point, p1: Point, p2: Point, t0: Point, t2: Point) -> ConicSpec {
        let mut spec = ConicSpec {
            pts: [p0, p1, p2, t0, t2],
            fit: None,
        };
        if let Err(e) = spec.refit() {
            warn!("initial conic points cannot be fit: {}", e);
        }
        spec
    }

    pub fn points(&self) -> &[Point; 5] {
        &self.pts
    }

    /// Move one of the governing points and refit.
    ///
    /// On a degenerate configuration the point still moves, but the previous
    /// fit is kept and the error is returned.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is not less than 5.
    pub fn set_point(&mut self, ix: usize, p: Point) -> Result<ConicFit, ConicError> {
        self.pts[ix] = p;
        self.refit()
    }

    /// Fit the current points, keeping the previous fit on failure.
    pub fn refit(&mut self) -> Result<ConicFit, ConicError> {
        let [p0, p1, p2, t0, t2] = self.pts;
        match fit(p0, p1, p2, t0, t2) {
            Ok(result) => {
                self.fit = Some(result);
                Ok(result)
            }
            Err(e) => {
                debug!("keeping previous conic fit: {}", e);
                Err(e)
            }
        }
    }

    /// The governing point nearest to `p`, within `max_dist`.
    pub fn hit_test(&self, p: Point, max_dist: f64) -> Option<usize> {
        util::nearest_within(&self.pts, p, max_dist)
    }

    /// The most recent successful fit.
    pub fn fit(&self) -> Option<ConicFit> {
        self.fit
    }

    /// The arc of the most recent successful fit, between the current end
    /// points.
    pub fn arc(&self) -> Option<ConicArc> {
        self.fit.map(|f| f.arc(self.pts[0], self.pts[2]))
    }
}

impl Default for ConicSpec {
    fn default() -> ConicSpec {
        ConicSpec::new(
            Point::new(-0.3, 0.0),
            Point::new(0.0, 0.3),
            Point::new(0.3, 0.0),
            Point::new(-0.4, 0.1),
            Point::new(0.4, 0.1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    /// Symmetric input: ends at (±a, 0), tangents meeting at (0, c), apex
    /// at (0, h).
    fn symmetric(a: f64, c: f64, h: f64) -> (Point, Point, Point, Point, Point) {
        let p0 = Point::new(-a, 0.0);
        let p2 = Point::new(a, 0.0);
        // Tangent points halfway along each side towards (0, c).
        let t0 = Point::new(-0.5 * a, 0.5 * c);
        let t2 = Point::new(0.5 * a, 0.5 * c);
        (p0, Point::new(0.0, h), p2, t0, t2)
    }

    #[test]
    fn tangent_lines_meet() {
        let i = tangent_intersection(
            Point::new(-0.3, 0.0),
            Point::new(-0.4, 0.1),
            Point::new(0.3, 0.0),
            Point::new(0.4, 0.1),
        )
        .unwrap();
        assert_abs_diff_eq!(i.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(i.y, -0.3, epsilon = 1e-12);
    }

    #[test]
    fn circular_arc_weight() {
        // Quarter-circle tangents at 45 degrees; apex at sqrt(2) - 1.
        let h = 2f64.sqrt() - 1.0;
        let (p0, p1, p2, t0, t2) = symmetric(1.0, 1.0, h);
        let result = fit(p0, p1, p2, t0, t2).unwrap();
        assert_abs_diff_eq!(result.weight, 0.5f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(result.control.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(result.control.y, 0.5f64.sqrt(), epsilon = 1e-12);
        let unweighted = result.tangent_point().unwrap();
        assert_abs_diff_eq!(unweighted.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn demo_configuration_bulges_away_from_control() {
        let spec = ConicSpec::default();
        let result = spec.fit().unwrap();
        assert_abs_diff_eq!(result.weight, -0.5, epsilon = 1e-12);
        let apex = spec.arc().unwrap().eval(0.5).unwrap();
        assert_abs_diff_eq!(apex.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(apex.y, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_control_on_axis() {
        let (p0, p1, p2, t0, t2) = symmetric(0.8, 0.6, 0.2);
        let result = fit(p0, p1, p2, t0, t2).unwrap();
        assert!(result.weight.is_finite());
        assert_abs_diff_eq!(result.control.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_tangents_rejected() {
        let p0 = Point::new(-1.0, 0.0);
        let p2 = Point::new(1.0, 0.0);
        let t0 = Point::new(-1.0, 1.0);
        let t2 = Point::new(1.0, 2.0);
        let err = fit(p0, Point::new(0.0, 0.5), p2, t0, t2).unwrap_err();
        assert_eq!(err, ConicError::ParallelTangents);
    }

    #[test]
    fn missing_tangent_direction_rejected() {
        let p0 = Point::new(-1.0, 0.0);
        let p2 = Point::new(1.0, 0.0);
        let err = fit(p0, Point::new(0.0, 0.5), p2, p0, Point::new(0.5, 1.0)).unwrap_err();
        assert_eq!(err, ConicError::ParallelTangents);
    }

    #[test]
    fn apex_outside_control_wedge_rejected() {
        // Apex off to the side, beyond the line from p2 to the tangent point.
        let (p0, _, p2, t0, t2) = symmetric(1.0, 1.0, 0.0);
        let err = fit(p0, Point::new(2.0, 0.5), p2, t0, t2).unwrap_err();
        assert_eq!(err, ConicError::NoRealWeight);
    }

    #[test]
    fn apex_on_chord_gives_zero_weight() {
        let (p0, p1, p2, t0, t2) = symmetric(1.0, 1.0, 0.0);
        let result = fit(p0, p1, p2, t0, t2).unwrap();
        assert_eq!(result.weight, 0.0);
        assert_eq!(result.tangent_point(), None);
        let mid = result.arc(p0, p2).eval(0.5).unwrap();
        assert_abs_diff_eq!(mid.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn apex_beyond_control_point() {
        // The arc passes through infinity, so the weight is below -1.
        let (p0, p1, p2, t0, t2) = symmetric(1.0, 1.0, 2.0);
        let result = fit(p0, p1, p2, t0, t2).unwrap();
        assert_abs_diff_eq!(result.weight, -2.0, epsilon = 1e-12);
        let apex = result.arc(p0, p2).eval(0.5).unwrap();
        assert_abs_diff_eq!(apex.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn spec_keeps_last_good_fit() {
        let mut spec = ConicSpec::new(
            Point::new(-1.0, 0.0),
            Point::new(0.0, 0.5),
            Point::new(1.0, 0.0),
            Point::new(-0.5, 0.5),
            Point::new(0.5, 0.5),
        );
        assert_eq!(spec.fit().unwrap().weight, 1.0);
        let good = spec.set_point(3, Point::new(-1.0, 1.0)).unwrap();
        // Both tangents now vertical.
        let err = spec.set_point(4, Point::new(1.0, 1.0)).unwrap_err();
        assert_eq!(err, ConicError::ParallelTangents);
        assert_eq!(spec.fit(), Some(good));
        assert_eq!(spec.points()[4], Point::new(1.0, 1.0));
        assert_eq!(spec.hit_test(Point::new(1.01, 1.0), 0.05), Some(4));
        assert!(spec.set_point(4, Point::new(0.5, 0.5)).is_ok());
    }

    #[test]
    fn spec_from_degenerate_points_has_no_fit() {
        let mut spec = ConicSpec::new(
            Point::new(-1.0, 0.0),
            Point::new(0.0, 0.5),
            Point::new(1.0, 0.0),
            Point::new(-1.0, 1.0),
            Point::new(1.0, 1.0),
        );
        assert_eq!(spec.fit(), None);
        assert_eq!(spec.arc(), None);
        assert!(spec.set_point(4, Point::new(0.5, 1.0)).is_ok());
        assert!(spec.fit().is_some());
    }

    #[test]
    fn flatten_emits_one_segment_per_step() {
        let arc = ConicSpec::default().arc().unwrap();
        let path = arc.flatten(16);
        assert_eq!(path.elements().len(), 17);
    }

    #[test]
    fn flatten_breaks_at_infinity() {
        let arc = ConicArc {
            p0: Point::new(-1.0, 0.0),
            p1: Point::new(0.0, 1.0),
            p2: Point::new(1.0, 0.0),
            weight: -1.0,
        };
        // Denominator 1 - 4t(1-t) vanishes at t = 0.5.
        assert_eq!(arc.eval(0.5), None);
        let path = arc.flatten(2);
        assert_eq!(path.elements().len(), 2);
    }

    proptest! {
        #[test]
        fn symmetric_fit_reproduces_apex(
            a in 0.1f64..2.0,
            c in prop_oneof![-2.0f64..-0.1, 0.1f64..2.0],
            frac in 0.05f64..0.95,
            flip in any::<bool>(),
        ) {
            // Apex between the chord and the control point, on either side.
            let h = c * frac;
            let a = if flip { -a } else { a };
            let (p0, p1, p2, t0, t2) = symmetric(a, c, h);
            let result = fit(p0, p1, p2, t0, t2).unwrap();
            prop_assert!(result.weight > 0.0);
            prop_assert!(result.control.x.abs() < 1e-9);
            let apex = result.arc(p0, p2).eval(0.5).unwrap();
            prop_assert!((apex - p1).hypot() < 1e-9);
        }

        #[test]
        fn apex_across_the_chord_reproduced(
            a in 0.1f64..2.0,
            c in prop_oneof![-2.0f64..-0.1, 0.1f64..2.0],
            frac in 0.05f64..3.0,
        ) {
            // Apex on the opposite side of the chord from the control point.
            let h = -c * frac;
            let (p0, p1, p2, t0, t2) = symmetric(a, c, h);
            let result = fit(p0, p1, p2, t0, t2).unwrap();
            prop_assert!(result.weight < 0.0 && result.weight > -1.0);
            let apex = result.arc(p0, p2).eval(0.5).unwrap();
            prop_assert!((apex - p1).hypot() < 1e-9);
        }

        #[test]
        fn apex_beyond_control_point_reproduced(
            a in 0.1f64..2.0,
            c in prop_oneof![-2.0f64..-0.1, 0.1f64..2.0],
            frac in 1.05f64..4.0,
        ) {
            let h = c * frac;
            let (p0, p1, p2, t0, t2) = symmetric(a, c, h);
            let result = fit(p0, p1, p2, t0, t2).unwrap();
            prop_assert!(result.weight < -1.0);
            let apex = result.arc(p0, p2).eval(0.5).unwrap();
            prop_assert!((apex - p1).hypot() < 1e-6);
        }

        #[test]
        fn fit_never_returns_non_finite(
            pts in prop::array::uniform10(-1.0f64..1.0),
        ) {
            let p = |i: usize| Point::new(pts[2 * i], pts[2 * i + 1]);
            if let Ok(result) = fit(p(0), p(1), p(2), p(3), p(4)) {
                prop_assert!(result.weight.is_finite());
                prop_assert!(result.control.x.is_finite() && result.control.y.is_finite());
            }
        }
    }
}
