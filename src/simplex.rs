//! The reference LP oracle: a dense two-phase primal simplex.

use log::trace;

use crate::branching;
use crate::oracle::{Oracle, OracleError};
use crate::problem::{ConsSense, LinearProgram, ObjSense};
use crate::solution::{Solution, SolveResult};

const EPS: f64 = 1e-9;

/// The reference LP/MIP oracle.
///
/// Pure LPs are solved with a dense two-phase primal simplex under Bland's
/// rule; problems with integer variables go through depth-first branch and
/// bound on top of it. Free variables are split into nonnegative parts,
/// finite lower bounds are shifted out, and finite upper bounds become rows,
/// so arbitrary bound combinations are accepted. Dual values are read off the
/// final reduced-cost row and reported in the sign convention of the problem
/// as stated (sensitivity of the objective to the right-hand side).
///
/// Intended for the moderately sized master and pricing problems the
/// decomposition loops produce, not as a general-purpose solver.
#[derive(Debug, Clone)]
pub struct SimplexOracle {
    pub(crate) pivot_limit: usize,
    pub(crate) node_limit: usize,
}

impl Default for SimplexOracle {
    fn default() -> Self {
        SimplexOracle {
            pivot_limit: 50_000,
            node_limit: 100_000,
        }
    }
}

impl SimplexOracle {
    /// Creates an oracle with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of simplex pivots per LP solve.
    pub fn pivot_limit(mut self, limit: usize) -> Self {
        self.pivot_limit = limit;
        self
    }

    /// Caps the number of branch-and-bound nodes per MIP solve. Exceeding it
    /// is reported as [`SolveResult::TimeLimit`].
    pub fn node_limit(mut self, limit: usize) -> Self {
        self.node_limit = limit;
        self
    }
}

impl Oracle for SimplexOracle {
    fn solve(&mut self, prob: &LinearProgram) -> Result<SolveResult, OracleError> {
        if prob.is_pure_lp() {
            solve_lp(self, prob)
        } else {
            branching::branch_and_bound(self, prob)
        }
    }
}

/// Which original variable a structural simplex column stands for.
#[derive(Debug, Clone, Copy)]
enum Col {
    /// `x_j` shifted by its finite lower bound.
    Shifted(usize),
    /// Positive part of a free variable.
    Pos(usize),
    /// Negative part of a free variable.
    Neg(usize),
}

/// A constraint row in canonical form: dense coefficients over the structural
/// columns, nonnegative right-hand side after an optional sign flip.
struct Row {
    coefs: Vec<f64>,
    sense: ConsSense,
    rhs: f64,
    /// Index of the original constraint, `None` for generated bound rows.
    orig: Option<usize>,
    /// `-1.0` if the row was negated to make the right-hand side nonnegative.
    sign: f64,
}

enum Pivot {
    Optimal,
    Unbounded,
}

/// Solves a problem as a pure LP, ignoring integrality flags.
pub(crate) fn solve_lp(
    oracle: &SimplexOracle,
    prob: &LinearProgram,
) -> Result<SolveResult, OracleError> {
    let nv = prob.n_vars();
    let sense_mul = match prob.sense() {
        ObjSense::Minimize => 1.0,
        ObjSense::Maximize => -1.0,
    };

    // Structural columns: shift finite lower bounds out, split free variables.
    let mut cols: Vec<Col> = Vec::with_capacity(nv);
    let mut var_cols: Vec<(usize, Option<usize>)> = Vec::with_capacity(nv);
    let mut lb_shift = vec![0.0; nv];
    for (j, v) in prob.vars.iter().enumerate() {
        if v.lb.is_finite() {
            if v.ub < v.lb {
                return Ok(SolveResult::Infeasible);
            }
            lb_shift[j] = v.lb;
            var_cols.push((cols.len(), None));
            cols.push(Col::Shifted(j));
        } else {
            var_cols.push((cols.len(), Some(cols.len() + 1)));
            cols.push(Col::Pos(j));
            cols.push(Col::Neg(j));
        }
    }
    let n_struct = cols.len();

    // Canonical rows: the stated constraints, then finite upper bounds.
    let mut rows: Vec<Row> = Vec::with_capacity(prob.n_conss());
    for (i, c) in prob.conss.iter().enumerate() {
        let mut coefs = vec![0.0; n_struct];
        let mut rhs = c.rhs;
        for &(j, a) in &c.coefs {
            let (main, neg) = var_cols[j];
            coefs[main] += a;
            match neg {
                Some(ncol) => coefs[ncol] -= a,
                None => rhs -= a * lb_shift[j],
            }
        }
        rows.push(Row {
            coefs,
            sense: c.sense,
            rhs,
            orig: Some(i),
            sign: 1.0,
        });
    }
    for (j, v) in prob.vars.iter().enumerate() {
        if v.ub.is_finite() {
            let (main, neg) = var_cols[j];
            let mut coefs = vec![0.0; n_struct];
            coefs[main] = 1.0;
            if let Some(ncol) = neg {
                coefs[ncol] = -1.0;
            }
            rows.push(Row {
                coefs,
                sense: ConsSense::Le,
                rhs: v.ub - lb_shift[j],
                orig: None,
                sign: 1.0,
            });
        }
    }
    for row in &mut rows {
        if row.rhs < 0.0 {
            row.rhs = -row.rhs;
            for a in &mut row.coefs {
                *a = -*a;
            }
            row.sense = match row.sense {
                ConsSense::Le => ConsSense::Ge,
                ConsSense::Ge => ConsSense::Le,
                ConsSense::Eq => ConsSense::Eq,
            };
            row.sign = -1.0;
        }
    }

    // Augment with slack/surplus and artificial columns; the initial basis is
    // the slack of every Le row and the artificial of every Ge/Eq row.
    let m = rows.len();
    let n_slack = rows
        .iter()
        .filter(|r| matches!(r.sense, ConsSense::Le | ConsSense::Ge))
        .count();
    let n_art = rows
        .iter()
        .filter(|r| matches!(r.sense, ConsSense::Ge | ConsSense::Eq))
        .count();
    let art_start = n_struct + n_slack;
    let ncols = art_start + n_art;

    let mut t = vec![vec![0.0; ncols + 1]; m];
    let mut basis = vec![0usize; m];
    let mut id_col = vec![0usize; m];
    let mut next_slack = n_struct;
    let mut next_art = art_start;
    for (i, row) in rows.iter().enumerate() {
        t[i][..n_struct].copy_from_slice(&row.coefs);
        t[i][ncols] = row.rhs;
        match row.sense {
            ConsSense::Le => {
                t[i][next_slack] = 1.0;
                basis[i] = next_slack;
                id_col[i] = next_slack;
                next_slack += 1;
            }
            ConsSense::Ge => {
                t[i][next_slack] = -1.0;
                next_slack += 1;
                t[i][next_art] = 1.0;
                basis[i] = next_art;
                id_col[i] = next_art;
                next_art += 1;
            }
            ConsSense::Eq => {
                t[i][next_art] = 1.0;
                basis[i] = next_art;
                id_col[i] = next_art;
                next_art += 1;
            }
        }
    }

    let mut cost = vec![0.0; ncols];
    for (jc, col) in cols.iter().enumerate() {
        cost[jc] = match *col {
            Col::Shifted(j) | Col::Pos(j) => sense_mul * prob.vars[j].obj,
            Col::Neg(j) => -sense_mul * prob.vars[j].obj,
        };
    }

    let mut pivots = 0usize;

    // Phase one: minimize the sum of artificials to find a feasible basis.
    if n_art > 0 {
        let mut phase_one = vec![0.0; ncols];
        for c in phase_one.iter_mut().skip(art_start) {
            *c = 1.0;
        }
        let mut r = reduced_costs(&t, &basis, &phase_one);
        match pivot_until_optimal(
            &mut t,
            &mut basis,
            &mut r,
            ncols,
            &mut pivots,
            oracle.pivot_limit,
        )? {
            Pivot::Optimal => {}
            Pivot::Unbounded => unreachable!("phase one objective is bounded below by zero"),
        }
        let infeasibility: f64 = basis
            .iter()
            .enumerate()
            .filter(|&(_, &b)| b >= art_start)
            .map(|(i, _)| t[i][ncols])
            .sum();
        if infeasibility > 1e-7 {
            return Ok(SolveResult::Infeasible);
        }
        // Drive leftover artificials out of the basis; a row with no eligible
        // pivot element is redundant and stays at zero for good.
        for i in 0..m {
            if basis[i] >= art_start {
                if let Some(q) = (0..art_start).find(|&j| t[i][j].abs() > EPS) {
                    pivot(&mut t, &mut r, &mut basis, i, q);
                }
            }
        }
    }

    // Phase two with the real costs; artificials may never re-enter.
    let mut r = reduced_costs(&t, &basis, &cost);
    match pivot_until_optimal(
        &mut t,
        &mut basis,
        &mut r,
        art_start,
        &mut pivots,
        oracle.pivot_limit,
    )? {
        Pivot::Optimal => {}
        Pivot::Unbounded => return Ok(SolveResult::Unbounded),
    }
    trace!("simplex finished after {pivots} pivots");

    // Primal values in the original variable space.
    let mut col_val = vec![0.0; ncols];
    for (i, &b) in basis.iter().enumerate() {
        col_val[b] = t[i][ncols].max(0.0);
    }
    let mut values = vec![0.0; nv];
    for (j, &(main, neg)) in var_cols.iter().enumerate() {
        values[j] = col_val[main] - neg.map_or(0.0, |ncol| col_val[ncol]) + lb_shift[j];
    }
    let obj_val = values
        .iter()
        .zip(&prob.vars)
        .map(|(x, v)| x * v.obj)
        .sum();

    // Duals from the reduced-cost row under the initial-identity columns,
    // mapped back through the row flips and the objective sense.
    let mut duals = vec![0.0; prob.n_conss()];
    for (i, row) in rows.iter().enumerate() {
        if let Some(k) = row.orig {
            duals[k] = -r[id_col[i]] * row.sign * sense_mul;
        }
    }

    Ok(SolveResult::Optimal(Solution::new(
        values,
        obj_val,
        Some(duals),
    )))
}

/// Reduced costs `c_j - c_B^T B^-1 A_j` for the current basis; relies on the
/// basic columns being identity columns of the tableau.
fn reduced_costs(t: &[Vec<f64>], basis: &[usize], cost: &[f64]) -> Vec<f64> {
    let ncols = cost.len();
    let mut r = cost.to_vec();
    for (i, &b) in basis.iter().enumerate() {
        let cb = cost[b];
        if cb != 0.0 {
            for j in 0..ncols {
                r[j] -= cb * t[i][j];
            }
        }
    }
    r
}

/// Pivots under Bland's rule until optimality or unboundedness. Columns at or
/// beyond `ban_from` may never enter the basis.
fn pivot_until_optimal(
    t: &mut [Vec<f64>],
    basis: &mut [usize],
    r: &mut [f64],
    ban_from: usize,
    pivots: &mut usize,
    pivot_limit: usize,
) -> Result<Pivot, OracleError> {
    let m = t.len();
    let ncols = r.len();
    loop {
        let Some(q) = (0..ban_from).find(|&j| r[j] < -EPS) else {
            return Ok(Pivot::Optimal);
        };
        let mut leave: Option<usize> = None;
        let mut best = f64::INFINITY;
        for i in 0..m {
            let a = t[i][q];
            if a > EPS {
                let ratio = t[i][ncols] / a;
                let replace = match leave {
                    None => true,
                    Some(l) => {
                        ratio < best - 1e-12 || (ratio < best + 1e-12 && basis[i] < basis[l])
                    }
                };
                if replace {
                    best = ratio;
                    leave = Some(i);
                }
            }
        }
        let Some(p) = leave else {
            return Ok(Pivot::Unbounded);
        };
        *pivots += 1;
        if *pivots > pivot_limit {
            return Err(OracleError::PivotLimit(pivot_limit));
        }
        pivot(t, r, basis, p, q);
    }
}

fn pivot(t: &mut [Vec<f64>], r: &mut [f64], basis: &mut [usize], p: usize, q: usize) {
    let ncols = r.len();
    let piv = t[p][q];
    for v in &mut t[p] {
        *v /= piv;
    }
    let prow = t[p].clone();
    for (i, row) in t.iter_mut().enumerate() {
        if i != p {
            let factor = row[q];
            if factor != 0.0 {
                for (v, pv) in row.iter_mut().zip(&prow) {
                    *v -= factor * pv;
                }
            }
        }
    }
    let factor = r[q];
    if factor != 0.0 {
        for (v, pv) in r.iter_mut().zip(&prow[..ncols]) {
            *v -= factor * pv;
        }
    }
    basis[p] = q;
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::builder::{cons, var};
    use crate::problem::Cons;

    fn solve(prob: &LinearProgram) -> SolveResult {
        let mut oracle = SimplexOracle::new();
        oracle.solve(prob).unwrap()
    }

    #[test]
    fn min_with_cover_constraint() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().obj(2.0));
        let y = prob.add(var().obj(3.0));
        prob.add(cons().coef(x, 1.0).coef(y, 1.0).ge(10.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.val(x), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.dual(Cons(0)).unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn max_with_two_rows() {
        let mut prob = LinearProgram::maximize();
        let x = prob.add(var().obj(3.0));
        let y = prob.add(var().obj(2.0));
        prob.add(cons().coef(x, 1.0).coef(y, 1.0).le(4.0));
        prob.add(cons().coef(x, 1.0).coef(y, 3.0).le(6.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.val(x), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.val(y), 0.0, epsilon = 1e-9);
        // only the first row is binding
        assert_abs_diff_eq!(sol.dual(Cons(0)).unwrap(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.dual(Cons(1)).unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn equality_row() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().obj(1.0));
        let y = prob.add(var().obj(1.0));
        prob.add(cons().coef(x, 1.0).coef(y, 1.0).eq(3.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.dual(Cons(0)).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn free_variable_with_negative_rhs() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().continuous(f64::NEG_INFINITY, f64::INFINITY).obj(1.0));
        prob.add(cons().coef(x, 1.0).ge(-5.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), -5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.val(x), -5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(sol.dual(Cons(0)).unwrap(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn upper_bound_only() {
        let mut prob = LinearProgram::maximize();
        let x = prob.add(var().continuous(0.0, 2.5).obj(1.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.val(x), 2.5, epsilon = 1e-9);
        // no stated constraints, so no duals to look at
        assert_eq!(sol.duals().unwrap().len(), 0);
    }

    #[test]
    fn shifted_lower_bound() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().continuous(-10.0, 10.0).obj(1.0));
        prob.add(cons().coef(x, 1.0).ge(-3.0));

        let sol = solve(&prob).optimal().unwrap();
        assert_abs_diff_eq!(sol.val(x), -3.0, epsilon = 1e-9);
    }

    #[test]
    fn infeasible_rows() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().obj(1.0));
        prob.add(cons().coef(x, 1.0).le(1.0));
        prob.add(cons().coef(x, 1.0).ge(2.0));

        assert!(matches!(solve(&prob), SolveResult::Infeasible));
    }

    #[test]
    fn conflicting_bounds_are_infeasible() {
        let mut prob = LinearProgram::minimize();
        prob.add(var().continuous(3.0, 2.0).obj(1.0));

        assert!(matches!(solve(&prob), SolveResult::Infeasible));
    }

    #[test]
    fn unbounded_maximization() {
        let mut prob = LinearProgram::maximize();
        prob.add(var().obj(1.0));

        assert!(matches!(solve(&prob), SolveResult::Unbounded));
    }

    #[test]
    fn pivot_limit_is_surfaced() {
        let mut prob = LinearProgram::maximize();
        let x = prob.add(var().obj(3.0));
        let y = prob.add(var().obj(2.0));
        prob.add(cons().coef(x, 1.0).coef(y, 1.0).le(4.0));
        prob.add(cons().coef(x, 1.0).coef(y, 3.0).le(6.0));

        let mut oracle = SimplexOracle::new().pivot_limit(0);
        assert!(matches!(
            oracle.solve(&prob),
            Err(OracleError::PivotLimit(0))
        ));
    }

    #[test]
    fn degenerate_diet_style_lp() {
        // min 0.6x + 0.35y s.t. 5x + 7y >= 8, 4x + 2y >= 15, x,y >= 0
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().obj(0.6));
        let y = prob.add(var().obj(0.35));
        prob.add(cons().coef(x, 5.0).coef(y, 7.0).ge(8.0));
        prob.add(cons().coef(x, 4.0).coef(y, 2.0).ge(15.0));

        let sol = solve(&prob).optimal().unwrap();
        // second row binds at y = 0 or x = 0; the optimum mixes
        assert!(sol.obj_val() > 0.0);
        let covered = 4.0 * sol.val(x) + 2.0 * sol.val(y);
        assert!(covered >= 15.0 - 1e-7);
    }
}
