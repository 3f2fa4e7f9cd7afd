//! Kelley's cutting-plane method for concave maximization.
//!
//! The true objective is replaced by a piecewise-linear outer approximation:
//! an epigraph variable `theta`, capped by a caller-supplied valid bound, is
//! maximized subject to one supporting hyperplane per evaluated point. Each
//! iteration solves the master LP, evaluates the objective at the master's
//! candidate, and either stops (the bound gap closed) or appends the tangent
//! cut at that candidate. Cuts are never removed.
//!
//! ```
//! use decomp::SimplexOracle;
//! use decomp::kelley::{self, CuttingPlaneParams, Objective};
//!
//! struct Quadratic;
//!
//! impl Objective for Quadratic {
//!     fn value(&self, x: &[f64]) -> f64 {
//!         1.0 - (x[0] - 1.0).powi(2)
//!     }
//!     fn gradient(&self, x: &[f64]) -> Option<Vec<f64>> {
//!         Some(vec![-2.0 * (x[0] - 1.0)])
//!     }
//! }
//!
//! let params = CuttingPlaneParams::new(vec![(-10.0, 10.0)], 5.0);
//! let mut oracle = SimplexOracle::new();
//! let report = kelley::maximize(&Quadratic, &params, &mut oracle).unwrap();
//! assert!(report.termination.certified());
//! assert!((report.objective_value - 1.0).abs() < 1e-5);
//! ```

use std::time::{Duration, Instant};

use itertools::izip;
use log::{debug, info};

use crate::builder::var;
use crate::convergence::{Convergence, Termination};
use crate::error::Error;
use crate::master::Master;
use crate::oracle::Oracle;
use crate::problem::{ConsSense, LinearProgram, ObjSense, Var};

/// A differentiable objective for the cutting-plane loop.
///
/// The loop's cuts are valid outer bounds only when the function is concave
/// (convex for [`minimize`]); an unsound objective shows up as crossing
/// bounds, not as an error.
pub trait Objective {
    /// The objective value at `x`.
    fn value(&self, x: &[f64]) -> f64;

    /// The gradient at `x`, or `None` where the function is not
    /// differentiable (e.g. outside its domain).
    fn gradient(&self, x: &[f64]) -> Option<Vec<f64>>;
}

/// A supporting hyperplane `theta <= f(x_k) + grad f(x_k) . (x - x_k)`.
#[derive(Debug, Clone)]
pub struct Cut {
    /// The evaluation point `x_k`.
    pub point: Vec<f64>,
    /// `f(x_k)`.
    pub value: f64,
    /// The gradient of `f` at `x_k`.
    pub gradient: Vec<f64>,
}

impl Cut {
    /// The right-hand side of the cut written as a row,
    /// `theta - grad . x <= f(x_k) - grad . x_k`.
    pub fn rhs(&self) -> f64 {
        self.value - dot(&self.gradient, &self.point)
    }
}

/// Evaluates the objective and its gradient at `x`, returning the supporting
/// hyperplane at that point.
///
/// # Errors
///
/// [`Error::NonDifferentiable`] if the gradient is undefined at `x`.
pub fn linearize(objective: &dyn Objective, x: &[f64]) -> Result<Cut, Error> {
    let gradient = objective
        .gradient(x)
        .ok_or_else(|| Error::NonDifferentiable(x.to_vec()))?;
    Ok(Cut {
        point: x.to_vec(),
        value: objective.value(x),
        gradient,
    })
}

/// Parameters for the cutting-plane loop.
#[derive(Debug, Clone)]
pub struct CuttingPlaneParams {
    /// Box bounds per dimension; entries may be infinite, though a finite box
    /// keeps early masters from wandering.
    pub bounds: Vec<(f64, f64)>,
    /// A valid finite bound on the true optimum. Required: without it the
    /// first master is unbounded.
    pub objective_bound: f64,
    /// Terminate once `upper - lower` drops below this.
    pub tolerance: f64,
    /// Maximum number of cuts to generate.
    pub iteration_limit: usize,
    /// Optional wall-clock budget, checked between iterations.
    pub time_limit: Option<Duration>,
}

impl CuttingPlaneParams {
    /// Parameters over the given box with the given objective bound and
    /// default tolerances.
    pub fn new(bounds: Vec<(f64, f64)>, objective_bound: f64) -> Self {
        CuttingPlaneParams {
            bounds,
            objective_bound,
            tolerance: 1e-6,
            iteration_limit: 1_000,
            time_limit: None,
        }
    }

    /// Sets the bound-gap tolerance.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration limit.
    pub fn iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = limit;
        self
    }

    /// Sets the wall-clock budget.
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

/// The outcome of a cutting-plane run.
#[derive(Debug, Clone)]
pub struct CuttingPlaneReport {
    /// Why the loop stopped; optimality is certified only for
    /// [`Termination::Converged`].
    pub termination: Termination,
    /// The best evaluated point.
    pub x: Vec<f64>,
    /// The objective at the best evaluated point.
    pub objective_value: f64,
    /// The outer-approximation bound at termination.
    pub bound: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// `(lower, upper)` after each iteration.
    pub history: Vec<(f64, f64)>,
}

/// Maximizes a concave objective with Kelley's cutting-plane method.
///
/// `params.objective_bound` must be a valid upper bound on the maximum, or
/// the first master solve fails with [`Error::UnboundedMaster`] (if infinite)
/// or the loop converges to a wrong value (if finite but invalid).
pub fn maximize(
    objective: &dyn Objective,
    params: &CuttingPlaneParams,
    oracle: &mut dyn Oracle,
) -> Result<CuttingPlaneReport, Error> {
    let mut prob = LinearProgram::maximize();
    let xs: Vec<Var> = params
        .bounds
        .iter()
        .enumerate()
        .map(|(i, &(lb, ub))| prob.add(var().continuous(lb, ub).name(&format!("x{i}"))))
        .collect();
    let theta = prob.add(
        var()
            .continuous(f64::NEG_INFINITY, params.objective_bound)
            .obj(1.0)
            .name("theta"),
    );
    let mut master = Master::new(prob);

    let mut convergence =
        Convergence::new(ObjSense::Maximize, params.tolerance, params.iteration_limit);
    if let Some(limit) = params.time_limit {
        convergence = convergence.with_deadline(Instant::now() + limit);
    }

    let mut best: Option<(Vec<f64>, f64)> = None;
    let mut history = Vec::new();
    let termination = loop {
        let (candidate, outer) = {
            let sol = master.solve(oracle)?;
            let candidate: Vec<f64> = xs.iter().map(|&x| sol.val(x)).collect();
            (candidate, sol.obj_val())
        };
        convergence.record_dual_bound(outer);

        let cut = linearize(objective, &candidate)?;
        convergence.record_primal_bound(cut.value);
        if best.as_ref().is_none_or(|&(_, value)| cut.value > value) {
            best = Some((candidate, cut.value));
        }
        history.push((convergence.lower(), convergence.upper()));
        debug!(
            "cut {}: bound {:.6}, incumbent {:.6}, gap {:.3e}",
            convergence.iteration(),
            convergence.upper(),
            convergence.lower(),
            convergence.gap()
        );

        if let Some(termination) = convergence.check() {
            break termination;
        }
        let mut row: Vec<(Var, f64)> = vec![(theta, 1.0)];
        row.extend(izip!(&xs, &cut.gradient).map(|(&x, &g)| (x, -g)));
        master.add_cut(&row, ConsSense::Le, cut.rhs());
        convergence.advance();
    };

    let (x, objective_value) =
        best.expect("at least one candidate is evaluated before termination");
    info!(
        "cutting planes finished: {termination:?} after {} cuts, value {objective_value:.6}, bound {:.6}",
        convergence.iteration(),
        convergence.upper()
    );
    Ok(CuttingPlaneReport {
        termination,
        x,
        objective_value,
        bound: convergence.upper(),
        iterations: convergence.iteration(),
        history,
    })
}

/// Minimizes a convex objective by maximizing its negation.
///
/// `params.objective_bound` must be a valid finite *lower* bound on the
/// minimum; the report's values are mapped back to the minimization sense.
pub fn minimize(
    objective: &dyn Objective,
    params: &CuttingPlaneParams,
    oracle: &mut dyn Oracle,
) -> Result<CuttingPlaneReport, Error> {
    struct Negated<'a>(&'a dyn Objective);

    impl Objective for Negated<'_> {
        fn value(&self, x: &[f64]) -> f64 {
            -self.0.value(x)
        }
        fn gradient(&self, x: &[f64]) -> Option<Vec<f64>> {
            self.0
                .gradient(x)
                .map(|g| g.into_iter().map(|v| -v).collect())
        }
    }

    let mut negated_params = params.clone();
    negated_params.objective_bound = -params.objective_bound;
    let mut report = maximize(&Negated(objective), &negated_params, oracle)?;
    report.objective_value = -report.objective_value;
    report.bound = -report.bound;
    for (lower, upper) in &mut report.history {
        (*lower, *upper) = (-*upper, -*lower);
    }
    Ok(report)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    izip!(a, b).map(|(x, y)| x * y).sum()
}
