//! A closed loop of cubic segments with continuous tangents.
//!
//! Each knot is an on-curve anchor plus one handle. The handle is the
//! outgoing control point of the anchor; the incoming control point is the
//! handle reflected through the anchor, so neighboring segments always join
//! smoothly.

use kurbo::{BezPath, CubicBez, Point};
#[cfg(feature = "serde")]
use serde_::{Deserialize, Serialize};

use crate::crossing;
use crate::util;

/// An anchor on the curve with its outgoing handle.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_")
)]
pub struct Knot {
    pub anchor: Point,
    pub handle: Point,
}

/// One of the two editable points of a knot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnotPoint {
    Anchor(usize),
    Handle(usize),
}

/// A closed composite curve.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_")
)]
pub struct CompositeCurve {
    knots: Vec<Knot>,
}

impl Knot {
    pub fn new(anchor: impl Into<Point>, handle: impl Into<Point>) -> Knot {
        Knot {
            anchor: anchor.into(),
            handle: handle.into(),
        }
    }

    /// The incoming control point, the handle mirrored through the anchor.
    pub fn mirrored_handle(&self) -> Point {
        self.anchor + (self.anchor - self.handle)
    }
}

impl CompositeCurve {
    pub fn new(knots: Vec<Knot>) -> CompositeCurve {
        CompositeCurve { knots }
    }

    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    /// Mutable access to the knots, for editing in place.
    pub fn knots_mut(&mut self) -> &mut Vec<Knot> {
        &mut self.knots
    }

    /// Move an anchor, carrying its handle along.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is out of bounds.
    pub fn move_anchor(&mut self, ix: usize, p: Point) {
        let knot = &mut self.knots[ix];
        let offset = knot.handle - knot.anchor;
        knot.anchor = p;
        knot.handle = p + offset;
    }

    /// Move a handle, leaving its anchor in place.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is out of bounds.
    pub fn set_handle(&mut self, ix: usize, p: Point) {
        self.knots[ix].handle = p;
    }

    /// Move whichever point `which` names.
    pub fn set_point(&mut self, which: KnotPoint, p: Point) {
        match which {
            KnotPoint::Anchor(ix) => self.move_anchor(ix, p),
            KnotPoint::Handle(ix) => self.set_handle(ix, p),
        }
    }

    /// The anchor or handle nearest to `p`, within `max_dist`.
    pub fn hit_test(&self, p: Point, max_dist: f64) -> Option<KnotPoint> {
        let pts: Vec<Point> = self
            .knots
            .iter()
            .flat_map(|k| vec![k.anchor, k.handle])
            .collect();
        util::nearest_within(&pts, p, max_dist).map(|i| {
            if i % 2 == 0 {
                KnotPoint::Anchor(i / 2)
            } else {
                KnotPoint::Handle(i / 2)
            }
        })
    }

    /// The cubic segments, one per knot, the last wrapping to the first.
    pub fn segments(&self) -> impl Iterator<Item = CubicBez> + '_ {
        let n = self.knots.len();
        (0..n).map(move |i| {
            let k0 = &self.knots[i];
            let k1 = &self.knots[(i + 1) % n];
            CubicBez::new(k0.anchor, k0.handle, k1.mirrored_handle(), k1.anchor)
        })
    }

    /// Render to a closed Bézier path.
    pub fn render(&self) -> BezPath {
        let mut path = BezPath::new();
        if let Some(first) = self.knots.first() {
            path.move_to(first.anchor);
            for seg in self.segments() {
                path.curve_to(seg.p1, seg.p2, seg.p3);
            }
            path.close_path();
        }
        path
    }

    /// Crossings with the x axis, as (segment index, parameter) pairs.
    ///
    /// An anchor on the axis is reported once, at the start of the segment
    /// leaving it.
    pub fn axis_crossings(&self) -> Vec<(usize, f64)> {
        let mut result = Vec::new();
        for (i, seg) in self.segments().enumerate() {
            for t in crossing::find_roots(&seg) {
                if t < 1.0 {
                    result.push((i, t));
                }
            }
        }
        result
    }
}

impl Default for CompositeCurve {
    fn default() -> CompositeCurve {
        CompositeCurve::new(vec![
            Knot::new((-0.5, -0.5), (-0.5, -0.9)),
            Knot::new((0.0, 0.5), (-0.5, 0.5)),
            Knot::new((0.5, -0.5), (0.5, -0.9)),
        ])
    }
}
