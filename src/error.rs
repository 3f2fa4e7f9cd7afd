use thiserror::Error;

use crate::oracle::OracleError;
use crate::status::Status;

/// Errors surfaced by the decomposition loops.
///
/// All of these are fatal to the run and are never retried internally: the
/// subproblems are deterministic given their inputs, so retrying an unchanged
/// solve would fail the same way. Hitting an iteration limit is *not* an
/// error; it is reported as
/// [`Termination::IterationLimit`](crate::Termination::IterationLimit) so the
/// caller can decide whether to accept the uncertified answer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The master problem has no feasible point. A correctly seeded master is
    /// always feasible, so this indicates a modeling bug (e.g. a demand that
    /// no column can cover).
    #[error("master problem is infeasible")]
    InfeasibleMaster,
    /// The master relaxation is unbounded, usually because no valid finite
    /// bound on the true optimum was supplied.
    #[error("master problem is unbounded; a finite bound on the optimum is required")]
    UnboundedMaster,
    /// The oracle stopped before proving optimality of the master.
    #[error("master solve stopped with status {0:?}")]
    MasterStopped(Status),
    /// The oracle did not return an optimal solution for the pricing
    /// subproblem.
    #[error("pricing subproblem terminated with status {0:?}")]
    PricingFailure(Status),
    /// The objective gradient is undefined at the proposed evaluation point.
    #[error("objective is not differentiable at {0:?}")]
    NonDifferentiable(Vec<f64>),
    /// A low-level failure inside the oracle.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}
