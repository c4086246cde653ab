//! Crossings of a random cubic with a horizontal line.
//!
//! This picks four random control points, finds where the curve crosses
//! the middle of the canvas, and outputs an SVG.

use rand::distributions::{Distribution, Uniform};

use kurbo::{BezPath, CubicBez, Line, Point};

use curvecore::{crossing_points, line_crossings, CrossingParams};

fn main() {
    env_logger::init();
    let mut rng = rand::thread_rng();
    let coord = Uniform::from(0.0..500.0);
    let mut pt = || Point::new(coord.sample(&mut rng), coord.sample(&mut rng));
    let c = CubicBez::new(pt(), pt(), pt(), pt());
    let axis = Line::new((0.0, 250.0), (500.0, 250.0));
    let roots = line_crossings(&c, axis, &CrossingParams::default());
    eprintln!("crossings at t = {:?}", roots.as_slice());

    let mut path = BezPath::new();
    path.move_to(c.p0);
    path.curve_to(c.p1, c.p2, c.p3);
    println!(
        r##"<!DOCTYPE html>
<html>
  <body>
    <svg height="500" width="500">
      <line x1="0" y1="250" x2="500" y2="250" stroke="#888" />
      <path d="{}" fill="none" stroke="#000" />"##,
        path.to_svg()
    );
    for p in &[c.p0, c.p1, c.p2, c.p3] {
        println!(
            r#"      <circle cx="{}" cy="{}" r="3" fill="blue" />"#,
            p.x, p.y
        );
    }
    for p in crossing_points(&c, &roots) {
        println!(
            r#"      <circle cx="{}" cy="{}" r="4" fill="red" />"#,
            p.x, p.y
        );
    }
    println!(
        r#"    </svg>
  </body>
</html>"#
    );
}
