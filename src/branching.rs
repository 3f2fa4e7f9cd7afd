//! Depth-first branch and bound over the simplex oracle.

use log::trace;

use crate::oracle::OracleError;
use crate::problem::{LinearProgram, ObjSense, VarType};
use crate::simplex::{self, SimplexOracle};
use crate::solution::{Solution, SolveResult};

const INT_TOL: f64 = 1e-6;

/// Solves a problem with integer variables by branching on the most
/// fractional one, pruning nodes against the incumbent's objective.
///
/// An unbounded root relaxation is reported as `Unbounded` (the integer
/// problem is then unbounded or infeasible, neither of which the loops can
/// recover from). Exceeding the node limit is reported as `TimeLimit`.
pub(crate) fn branch_and_bound(
    oracle: &SimplexOracle,
    prob: &LinearProgram,
) -> Result<SolveResult, OracleError> {
    let minimize = prob.sense() == ObjSense::Minimize;
    let improves = |obj: f64, best: f64| {
        if minimize {
            obj < best - 1e-9
        } else {
            obj > best + 1e-9
        }
    };

    let mut stack = vec![prob.clone()];
    let mut incumbent: Option<Solution> = None;
    let mut nodes = 0usize;

    while let Some(node) = stack.pop() {
        nodes += 1;
        if nodes > oracle.node_limit {
            return Ok(SolveResult::TimeLimit);
        }
        let at_root = nodes == 1;
        let sol = match simplex::solve_lp(oracle, &node)? {
            SolveResult::Optimal(sol) => sol,
            SolveResult::Infeasible => {
                if at_root {
                    return Ok(SolveResult::Infeasible);
                }
                continue;
            }
            SolveResult::Unbounded => return Ok(SolveResult::Unbounded),
            SolveResult::TimeLimit => return Ok(SolveResult::TimeLimit),
        };
        if let Some(best) = &incumbent {
            if !improves(sol.obj_val(), best.obj_val()) {
                continue;
            }
        }
        match most_fractional(&node, sol.values()) {
            None => {
                trace!("node {nodes}: integral incumbent with obj {}", sol.obj_val());
                incumbent = Some(round_integers(&node, &sol));
            }
            Some((j, value)) => {
                let mut down = node.clone();
                down.vars[j].ub = down.vars[j].ub.min(value.floor());
                let mut up = node;
                up.vars[j].lb = up.vars[j].lb.max(value.floor() + 1.0);
                stack.push(down);
                stack.push(up);
            }
        }
    }

    Ok(match incumbent {
        Some(sol) => SolveResult::Optimal(sol),
        None => SolveResult::Infeasible,
    })
}

/// The integer variable whose relaxation value is furthest from an integer.
fn most_fractional(prob: &LinearProgram, values: &[f64]) -> Option<(usize, f64)> {
    let mut pick: Option<(usize, f64, f64)> = None;
    for (j, v) in prob.vars.iter().enumerate() {
        if v.var_type == VarType::Integer {
            let x = values[j];
            let dist = (x - x.round()).abs();
            if dist > INT_TOL && pick.is_none_or(|(_, _, d)| dist > d) {
                pick = Some((j, x, dist));
            }
        }
    }
    pick.map(|(j, x, _)| (j, x))
}

/// Snaps near-integral values to integers and recomputes the objective;
/// dual values do not survive into integer solutions.
fn round_integers(prob: &LinearProgram, sol: &Solution) -> Solution {
    let mut values = sol.values().to_vec();
    for (j, v) in prob.vars.iter().enumerate() {
        if v.var_type == VarType::Integer {
            values[j] = values[j].round();
        }
    }
    let obj_val = values
        .iter()
        .zip(&prob.vars)
        .map(|(x, v)| x * v.obj)
        .sum();
    Solution::new(values, obj_val, None)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::builder::{cons, var};
    use crate::oracle::Oracle;

    #[test]
    fn knapsack_optimum() {
        // classic 0/1 knapsack: values 60/100/120, weights 10/20/30, capacity 50
        let mut prob = LinearProgram::maximize();
        let a = prob.add(var().integer(0, 1).obj(60.0));
        let b = prob.add(var().integer(0, 1).obj(100.0));
        let c = prob.add(var().integer(0, 1).obj(120.0));
        prob.add(cons().coef(a, 10.0).coef(b, 20.0).coef(c, 30.0).le(50.0));

        let mut oracle = SimplexOracle::new();
        let sol = oracle.solve(&prob).unwrap().optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), 220.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.val(b), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(sol.val(c), 1.0, epsilon = 1e-6);
        assert!(sol.duals().is_none());
    }

    #[test]
    fn fractional_window_is_infeasible() {
        let mut prob = LinearProgram::minimize();
        prob.add_var(0.2, 0.8, 1.0, "x", VarType::Integer);

        let mut oracle = SimplexOracle::new();
        assert!(matches!(
            oracle.solve(&prob).unwrap(),
            SolveResult::Infeasible
        ));
    }

    #[test]
    fn integral_root_needs_no_branching() {
        let mut prob = LinearProgram::minimize();
        let x = prob.add(var().integer(0, 10).obj(1.0));
        prob.add(cons().coef(x, 1.0).ge(3.0));

        let mut oracle = SimplexOracle::new();
        let sol = oracle.solve(&prob).unwrap().optimal().unwrap();
        assert_abs_diff_eq!(sol.obj_val(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn node_limit_is_a_time_limit() {
        let mut prob = LinearProgram::maximize();
        let a = prob.add(var().integer(0, 1).obj(60.0));
        let b = prob.add(var().integer(0, 1).obj(100.0));
        prob.add(cons().coef(a, 10.0).coef(b, 20.0).le(25.0));

        let mut oracle = SimplexOracle::new().node_limit(0);
        assert!(matches!(
            oracle.solve(&prob).unwrap(),
            SolveResult::TimeLimit
        ));
    }

    #[test]
    fn bounded_knapsack_with_copies() {
        // max 3a + 5b s.t. 2a + 4b <= 10, a <= 3, b <= 2, integer
        let mut prob = LinearProgram::maximize();
        let a = prob.add(var().integer(0, 3).obj(3.0));
        let b = prob.add(var().integer(0, 2).obj(5.0));
        prob.add(cons().coef(a, 2.0).coef(b, 4.0).le(10.0));

        let mut oracle = SimplexOracle::new();
        let sol = oracle.solve(&prob).unwrap().optimal().unwrap();
        // a=3, b=1 uses all 10 units for value 14
        assert_abs_diff_eq!(sol.obj_val(), 14.0, epsilon = 1e-6);
    }
}
