//! The restricted master problem.

use crate::error::Error;
use crate::oracle::Oracle;
use crate::problem::{Cons, ConsSense, LinearProgram, Var, VarType};
use crate::solution::{Solution, SolveResult};
use crate::status::Status;

/// A generated column: the cost of activating it plus one coefficient per
/// master row, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Objective cost of activating the column.
    pub obj: f64,
    /// Coefficients on the master's rows, one entry per row.
    pub coefs: Vec<f64>,
}

/// The restricted master problem: the outer approximation of the true
/// problem built from the columns and cuts generated so far.
///
/// The master is append-only (exactly one column or cut per iteration, never
/// removed) and it owns its column set. Appending invalidates the cached
/// solution, and with it any dual values read from it, forcing a re-solve.
#[derive(Debug, Clone)]
pub struct Master {
    prob: LinearProgram,
    columns: Vec<(Var, Column)>,
    solution: Option<Solution>,
}

impl Master {
    /// Wraps a seeded master problem.
    ///
    /// The seed must be feasible and bounded: drivers seed one trivial column
    /// per demand row, or a single epigraph variable capped by a valid finite
    /// bound on the true optimum. An unbounded or infeasible seed surfaces on
    /// the first [`Master::solve`].
    pub fn new(prob: LinearProgram) -> Self {
        Master {
            prob,
            columns: Vec::new(),
            solution: None,
        }
    }

    /// The underlying problem.
    pub fn problem(&self) -> &LinearProgram {
        &self.prob
    }

    /// The columns appended so far, with the variables they became.
    pub fn columns(&self) -> &[(Var, Column)] {
        &self.columns
    }

    /// The cached solution from the last solve, if no column or cut has been
    /// appended since.
    pub fn solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }

    /// Solves the LP relaxation of the master through the oracle and caches
    /// the solution.
    ///
    /// # Errors
    ///
    /// [`Error::InfeasibleMaster`] if the oracle proves the master
    /// infeasible, [`Error::UnboundedMaster`] if it proves it unbounded, and
    /// [`Error::MasterStopped`] if the oracle gave up before optimality.
    pub fn solve(&mut self, oracle: &mut dyn Oracle) -> Result<&Solution, Error> {
        match oracle.solve_relaxation(&self.prob)? {
            SolveResult::Optimal(sol) => Ok(self.solution.insert(sol)),
            SolveResult::Infeasible => Err(Error::InfeasibleMaster),
            SolveResult::Unbounded => Err(Error::UnboundedMaster),
            SolveResult::TimeLimit => Err(Error::MasterStopped(Status::TimeLimit)),
        }
    }

    /// Re-solves the master with every variable forced integral, for the
    /// integer finish over the generated columns. Dual values are not
    /// available from this solve.
    pub fn solve_integer(&self, oracle: &mut dyn Oracle) -> Result<Solution, Error> {
        let mut integral = self.prob.clone();
        for j in 0..integral.n_vars() {
            integral.set_var_type(Var(j), VarType::Integer);
        }
        match oracle.solve(&integral)? {
            SolveResult::Optimal(sol) => Ok(sol),
            SolveResult::Infeasible => Err(Error::InfeasibleMaster),
            SolveResult::Unbounded => Err(Error::UnboundedMaster),
            SolveResult::TimeLimit => Err(Error::MasterStopped(Status::TimeLimit)),
        }
    }

    /// Appends a column as a new nonnegative decision variable with the given
    /// cost and row coefficients, and invalidates the cached solution.
    pub fn add_column(&mut self, column: Column) -> Var {
        debug_assert_eq!(column.coefs.len(), self.prob.n_conss());
        self.solution = None;
        let name = format!("col{}", self.columns.len());
        let var = self
            .prob
            .add_var(0.0, f64::INFINITY, column.obj, &name, VarType::Continuous);
        for (i, &coef) in column.coefs.iter().enumerate() {
            if coef != 0.0 {
                self.prob.add_cons_coef(Cons(i), var, coef);
            }
        }
        self.columns.push((var, column));
        var
    }

    /// Appends a cut as a new linear inequality over the existing variables,
    /// and invalidates the cached solution.
    pub fn add_cut(&mut self, coefs: &[(Var, f64)], sense: ConsSense, rhs: f64) -> Cons {
        self.solution = None;
        let name = format!("cut{}", self.prob.n_conss());
        self.prob.add_cons(coefs, sense, rhs, &name)
    }
}
