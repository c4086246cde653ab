//! Numerical kernels for interactive Bézier curve editing.
//!
//! An editor that lets the user drag control points needs a few derived
//! quantities recomputed on every pointer move. This crate supplies them as
//! pure functions over `kurbo` types:
//!
//! - [`find_roots`] isolates the parameters where a cubic crosses the x axis
//!   (and [`line_crossings`] does the same for any line), by adaptive
//!   de Casteljau bisection with a bounded explicit stack.
//! - [`fit`] derives the middle control point and weight of a
//!   rational quadratic arc from its end points, end tangents, and apex.
//! - [`CompositeCurve`] joins cubics into a closed loop with continuous
//!   tangents.
//!
//! The `*Spec` types wrap each computation with the editable points that
//! drive it, for use from an event handler.

mod composite;
mod conic;
mod crossing;
mod util;

pub use composite::{CompositeCurve, Knot, KnotPoint};
pub use conic::{fit, tangent_intersection, ConicArc, ConicError, ConicFit, ConicSpec};
pub use crossing::{
    crossing_points, find_roots, find_roots_with, line_crossings, CrossingParams, CrossingSpec,
    DEFAULT_MAX_ITER, DEFAULT_TOLERANCE,
};
