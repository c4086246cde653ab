//! Crossings of a cubic Bézier with the x axis, or with an arbitrary line.
//!
//! The search bisects the curve with de Casteljau subdivision, discarding
//! halves whose control polygon cannot change sign. Because a cubic crosses
//! a line at most three times, the halves still waiting to be searched fit
//! in a fixed two-slot stack.

use std::cmp::Ordering;

use arrayvec::ArrayVec;
use kurbo::{CubicBez, Line, ParamCurve, Point};
use log::{debug, warn};
#[cfg(feature = "serde")]
use serde_::{Deserialize, Serialize};

use crate::util;

/// Width of a parameter interval below which it is taken to be a root.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Number of bisection steps after which the search gives up.
pub const DEFAULT_MAX_ITER: usize = 1000;

const STACK_DEPTH: usize = 2;

/// Parameters for the crossing search.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_")
)]
pub struct CrossingParams {
    /// Interval width at which bisection stops and reports a root.
    pub tolerance: f64,
    /// Upper bound on the number of bisection steps.
    pub max_iter: usize,
}

impl Default for CrossingParams {
    fn default() -> CrossingParams {
        CrossingParams {
            tolerance: DEFAULT_TOLERANCE,
            max_iter: DEFAULT_MAX_ITER,
        }
    }
}

impl CrossingParams {
    /// The tolerance, or the default if it is not a positive number.
    ///
    /// A zero, negative or NaN tolerance would never let an interval
    /// converge.
    fn checked_tolerance(&self) -> f64 {
        if self.tolerance.is_finite() && self.tolerance > 0.0 {
            self.tolerance
        } else {
            warn!(
                "invalid crossing tolerance {}, using {}",
                self.tolerance, DEFAULT_TOLERANCE
            );
            DEFAULT_TOLERANCE
        }
    }
}

/// A parameter interval together with the ordinates of its control polygon.
#[derive(Clone, Copy, Debug)]
struct Frame {
    low: f64,
    high: f64,
    ys: [f64; 4],
}

impl Frame {
    fn mid(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Bisect at the interval midpoint, returning the low and high halves.
    fn split(&self) -> (Frame, Frame) {
        let [y0, y1, y2, y3] = self.ys;
        let y01 = 0.5 * (y0 + y1);
        let y12 = 0.5 * (y1 + y2);
        let y23 = 0.5 * (y2 + y3);
        let y012 = 0.5 * (y01 + y12);
        let y123 = 0.5 * (y12 + y23);
        let m = 0.5 * (y012 + y123);
        let mid = self.mid();
        let lo = Frame {
            low: self.low,
            high: mid,
            ys: [y0, y01, y012, m],
        };
        let hi = Frame {
            low: mid,
            high: self.high,
            ys: [m, y123, y23, y3],
        };
        (lo, hi)
    }
}

/// Roots found so far.
///
/// Roots closer together than the tolerance are reported once.
struct Roots {
    ts: ArrayVec<[f64; 3]>,
    tolerance: f64,
}

impl Roots {
    fn new(tolerance: f64) -> Roots {
        Roots {
            ts: ArrayVec::new(),
            tolerance,
        }
    }

    fn push(&mut self, t: f64) {
        if self.ts.iter().any(|r| (r - t).abs() < self.tolerance) {
            return;
        }
        if self.ts.try_push(t).is_err() {
            warn!("more than three crossings, dropping t = {}", t);
        }
    }

    fn finish(mut self) -> ArrayVec<[f64; 3]> {
        self.ts
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        self.ts
    }
}

/// Whether a polygon with these ordinates stays on one side of zero.
///
/// The curve cannot cross zero more often than its control polygon does
/// (variation diminishing), so `true` proves there is no interior crossing.
/// Zero ordinates touch the axis without changing sign and are skipped.
fn no_sign_change(ys: &[f64; 4]) -> bool {
    let mut last = 0.0;
    for &y in ys {
        if y == 0.0 {
            continue;
        }
        if (last < 0.0 && y > 0.0) || (last > 0.0 && y < 0.0) {
            return false;
        }
        last = y;
    }
    true
}

/// Find the parameters in [0, 1] where the polynomial with these Bernstein
/// coefficients is zero.
fn bernstein_roots(ys: [f64; 4], params: &CrossingParams) -> ArrayVec<[f64; 3]> {
    let tolerance = params.checked_tolerance();
    let mut roots = Roots::new(tolerance);
    if !ys.iter().all(|y| y.is_finite()) {
        debug!("non-finite control ordinates {:?}", ys);
        return roots.finish();
    }
    if ys[0] == 0.0 {
        roots.push(0.0);
    }
    if ys[3] == 0.0 {
        roots.push(1.0);
    }
    if no_sign_change(&ys) {
        return roots.finish();
    }

    let mut stack = ArrayVec::<[Frame; STACK_DEPTH]>::new();
    let mut frame = Frame {
        low: 0.0,
        high: 1.0,
        ys,
    };
    for _ in 0..params.max_iter {
        if frame.high - frame.low < tolerance {
            roots.push(frame.mid());
            match stack.pop() {
                Some(next) => {
                    frame = next;
                    continue;
                }
                None => return roots.finish(),
            }
        }
        let (lo, hi) = frame.split();
        if lo.ys[3] == 0.0 {
            roots.push(lo.high);
        }
        frame = match (no_sign_change(&lo.ys), no_sign_change(&hi.ys)) {
            (false, true) => lo,
            (true, false) => hi,
            (true, true) => match stack.pop() {
                Some(next) => next,
                None => return roots.finish(),
            },
            (false, false) => {
                if let Err(err) = stack.try_push(lo) {
                    let lost = err.element();
                    warn!(
                        "crossing stack full, dropping [{}, {}]",
                        lost.low, lost.high
                    );
                }
                hi
            }
        };
    }
    warn!(
        "crossing search hit {} iterations at [{}, {}]",
        params.max_iter, frame.low, frame.high
    );
    roots.push(frame.mid());
    roots.finish()
}

/// Find the parameters where the curve crosses the x axis.
///
/// Returns up to three values in [0, 1], sorted ascending. A curve tangent
/// to the axis reports the point of tangency once.
pub fn find_roots(c: &CubicBez) -> ArrayVec<[f64; 3]> {
    find_roots_with(c, &CrossingParams::default())
}

/// Find axis crossings with explicit search parameters.
pub fn find_roots_with(c: &CubicBez, params: &CrossingParams) -> ArrayVec<[f64; 3]> {
    bernstein_roots([c.p0.y, c.p1.y, c.p2.y, c.p3.y], params)
}

/// Find the parameters where the curve crosses the infinite line through
/// `line.p0` and `line.p1`.
///
/// A line with coincident endpoints has no direction, and yields no
/// crossings.
pub fn line_crossings(c: &CubicBez, line: Line, params: &CrossingParams) -> ArrayVec<[f64; 3]> {
    let v = line.p1 - line.p0;
    if v.hypot2() == 0.0 {
        debug!("line through {:?} has zero length", line.p0);
        return ArrayVec::new();
    }
    let dist = |p: Point| v.cross(p - line.p0);
    bernstein_roots([dist(c.p0), dist(c.p1), dist(c.p2), dist(c.p3)], params)
}

/// Evaluate the curve at each parameter in [0, 1].
///
/// Parameters outside the unit interval are skipped.
pub fn crossing_points(c: &CubicBez, roots: &[f64]) -> ArrayVec<[Point; 3]> {
    roots
        .iter()
        .filter(|t| (0.0..=1.0).contains(*t))
        .take(3)
        .map(|&t| c.eval(t))
        .collect()
}

/// An editable cubic together with its axis crossings.
///
/// The crossings are recomputed whenever a control point moves.
#[derive(Clone, Debug)]
pub struct CrossingSpec {
    pts: [Point; 4],
    params: CrossingParams,
    roots: ArrayVec<[f64; 3]>,
}

impl CrossingSpec {
    pub fn new(curve: CubicBez) -> CrossingSpec {
        CrossingSpec::with_params(curve, CrossingParams::default())
    }

    pub fn with_params(curve: CubicBez, params: CrossingParams) -> CrossingSpec {
        let roots = find_roots_with(&curve, &params);
        CrossingSpec {
            pts: [curve.p0, curve.p1, curve.p2, curve.p3],
            params,
            roots,
        }
    }

    pub fn curve(&self) -> CubicBez {
        let [p0, p1, p2, p3] = self.pts;
        CubicBez::new(p0, p1, p2, p3)
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.pts
    }

    /// Move a control point and recompute the crossings.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is not less than 4.
    pub fn set_point(&mut self, ix: usize, p: Point) {
        self.pts[ix] = p;
        self.roots = find_roots_with(&self.curve(), &self.params);
    }

    /// The control point nearest to `p`, within `max_dist`.
    pub fn hit_test(&self, p: Point, max_dist: f64) -> Option<usize> {
        util::nearest_within(&self.pts, p, max_dist)
    }

    /// Parameters of the current crossings, ascending.
    pub fn roots(&self) -> &[f64] {
        &self.roots
    }

    /// Points on the curve at the current crossings.
    pub fn crossings(&self) -> ArrayVec<[Point; 3]> {
        crossing_points(&self.curve(), &self.roots)
    }
}

impl Default for CrossingSpec {
    fn default() -> CrossingSpec {
        CrossingSpec::new(CubicBez::new(
            (-0.5, 0.0),
            (-0.2, 0.4),
            (0.2, -0.4),
            (0.5, 0.0),
        ))
    }
}
