use thiserror::Error;

use crate::problem::LinearProgram;
use crate::solution::SolveResult;

/// Low-level failures an oracle may report, as opposed to the well-defined
/// `Infeasible`/`Unbounded`/`TimeLimit` outcomes of [`SolveResult`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The simplex pivot limit was exceeded, likely due to degeneracy or a
    /// badly scaled problem.
    #[error("simplex pivot limit of {0} exceeded")]
    PivotLimit(usize),
    /// A dual vector was required but the solve did not produce one.
    #[error("no dual values available; the solved problem was not a pure LP")]
    MissingDuals,
}

/// The LP/MIP solve capability the decomposition loops delegate to.
///
/// Implementations receive the full problem on every call and must not rely
/// on hidden state carried between calls: the loops re-solve mutated masters
/// from scratch and treat every solve as deterministic. Dual values are
/// expected only when the solved problem is a pure LP.
pub trait Oracle {
    /// Solves the given problem.
    fn solve(&mut self, prob: &LinearProgram) -> Result<SolveResult, OracleError>;

    /// Solves the LP relaxation of the given problem.
    ///
    /// The default implementation drops every integrality flag and calls
    /// [`Oracle::solve`].
    fn solve_relaxation(&mut self, prob: &LinearProgram) -> Result<SolveResult, OracleError> {
        self.solve(&prob.relax())
    }
}
