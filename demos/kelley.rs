//! Kelley's cutting-plane method on a concave quadratic.
//!
//! The function `f(x) = 1 - (x1 - 1)^2 - (x2 + 2)^2` is maximized through a
//! piecewise-linear outer approximation: an epigraph variable `theta`,
//! initially only capped by a known upper bound on the optimum, gains one
//! tangent-plane constraint per iteration until the gap between the outer
//! bound and the best evaluated point closes.

use decomp::SimplexOracle;
use decomp::kelley::{self, CuttingPlaneParams, Objective};

struct ShiftedParaboloid;

impl Objective for ShiftedParaboloid {
    fn value(&self, x: &[f64]) -> f64 {
        1.0 - (x[0] - 1.0).powi(2) - (x[1] + 2.0).powi(2)
    }

    fn gradient(&self, x: &[f64]) -> Option<Vec<f64>> {
        Some(vec![-2.0 * (x[0] - 1.0), -2.0 * (x[1] + 2.0)])
    }
}

fn main() {
    let params = CuttingPlaneParams::new(vec![(-10.0, 10.0), (-10.0, 10.0)], 10.0)
        .iteration_limit(200);
    let mut oracle = SimplexOracle::new();

    let report = kelley::maximize(&ShiftedParaboloid, &params, &mut oracle)
        .expect("the paraboloid is differentiable everywhere");

    println!("{:?} after {} cuts", report.termination, report.iterations);
    println!(
        "f({:.4}, {:.4}) = {:.6}, outer bound {:.6}",
        report.x[0], report.x[1], report.objective_value, report.bound
    );
    for (k, (lower, upper)) in report.history.iter().enumerate() {
        println!("  iter {:2}: [{lower:10.4}, {upper:10.4}]", k + 1);
    }
}
