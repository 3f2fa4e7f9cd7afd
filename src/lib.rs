//! Decomposition loops, column generation and Kelley-style cutting planes,
//! over a pluggable LP/MIP oracle.
//!
//! Both loops share one skeleton: alternate between solving a restricted
//! [`Master`] problem and a subordinate pricing/separation step, using dual
//! prices (or gradients) from the master's LP relaxation to generate exactly
//! one new column (or cut) per iteration, until the bound gap tracked by
//! [`Convergence`] closes. The LP/MIP solver behind [`Master`] and the
//! pricing subproblems is an external collaborator reached through the
//! [`Oracle`] trait; [`SimplexOracle`] is the bundled reference
//! implementation.
//!
//! # Example
//!
//! Solving a small cutting stock instance end to end:
//!
//! ```
//! use decomp::SimplexOracle;
//! use decomp::colgen::{self, ColGenParams, CuttingStock};
//!
//! let instance = CuttingStock::new(100.0, &[45.0, 36.0, 31.0, 14.0], &[6, 4, 5, 3]);
//! let mut oracle = SimplexOracle::new();
//! let report = colgen::solve(&instance, &ColGenParams::default(), &mut oracle).unwrap();
//!
//! assert!(report.termination.certified());
//! assert!(f64::from(report.rolls) >= report.lp_objective - 1e-6);
//! ```

pub mod builder;
pub mod colgen;
pub mod convergence;
pub mod error;
pub mod kelley;
pub mod master;
pub mod oracle;
pub mod pricer;
pub mod problem;
pub mod simplex;
pub mod solution;
pub mod status;

mod branching;

pub use crate::builder::{CanBeAddedToProblem, ConsBuilder, VarBuilder, cons, var};
pub use crate::colgen::{ColGenParams, CuttingStock, CuttingStockReport, Pattern, Piece};
pub use crate::convergence::{Convergence, Termination};
pub use crate::error::Error;
pub use crate::kelley::{Cut, CuttingPlaneParams, CuttingPlaneReport, Objective};
pub use crate::master::{Column, Master};
pub use crate::oracle::{Oracle, OracleError};
pub use crate::pricer::{KnapsackPricer, Pricer, PricerResult, PricerResultState};
pub use crate::problem::{Cons, ConsSense, LinearProgram, ObjSense, Var, VarType};
pub use crate::simplex::SimplexOracle;
pub use crate::solution::{Solution, SolveResult};
pub use crate::status::Status;

/// Commonly used traits and builder functions.
pub mod prelude {
    pub use crate::builder::{CanBeAddedToProblem, cons, var};
    pub use crate::kelley::Objective;
    pub use crate::oracle::Oracle;
    pub use crate::pricer::Pricer;
}
