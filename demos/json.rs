//! Fit a conic from points read as JSON, and output an SVG of the arc.
//!
//! The input is a `ConicSpec`, the five governing points in the order
//! p0, p1, p2, t0, t2:
//!
//! ```json
//! { "pts": [
//!     { "x": -150, "y": 0 }, { "x": 0, "y": 150 }, { "x": 150, "y": 0 },
//!     { "x": -200, "y": 50 }, { "x": 200, "y": 50 }
//! ] }
//! ```

use curvecore::ConicSpec;

fn main() {
    env_logger::init();
    let path = std::env::args().nth(1).expect("needs filename");
    let data = std::fs::read_to_string(path).unwrap();
    let mut spec: ConicSpec = serde_json::from_str(&data).unwrap();
    let fit = match spec.refit() {
        Ok(fit) => fit,
        Err(e) => {
            eprintln!("cannot fit conic: {}", e);
            std::process::exit(1);
        }
    };
    eprintln!("weight = {}, control = {:?}", fit.weight, fit.control);
    let arc = spec.arc().unwrap();
    println!(
        r##"<!DOCTYPE html>
<html>
  <body>
    <svg height="500" width="500" viewBox="-250 -250 500 500">
      <g transform="scale(1, -1)">
        <path d="{}" fill="none" stroke="#000" />"##,
        arc.flatten(64).to_svg()
    );
    for p in spec.points() {
        println!(
            r#"        <circle cx="{}" cy="{}" r="3" fill="blue" />"#,
            p.x, p.y
        );
    }
    println!(
        r#"      </g>
    </svg>
  </body>
</html>"#
    );
}
