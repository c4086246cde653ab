use kurbo::Point;

/// Twice the signed area of the triangle `a`, `b`, `c`.
///
/// Positive when the points wind counterclockwise (y up).
pub fn signed_area(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Index of the point nearest to `p`, if any lies within `max_dist`.
pub fn nearest_within(pts: &[Point], p: Point, max_dist: f64) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for (i, pt) in pts.iter().enumerate() {
        let dist = pt.distance(p);
        if dist < max_dist && best.map(|(d, _)| dist < d).unwrap_or(true) {
            best = Some((dist, i));
        }
    }
    best.map(|(_dist, i)| i)
}
