//! Column pricing for the column-generation loop.

use itertools::izip;
use log::debug;

use crate::builder::{cons, var};
use crate::colgen::CuttingStock;
use crate::error::Error;
use crate::master::Column;
use crate::oracle::Oracle;
use crate::problem::{LinearProgram, Var};
use crate::solution::SolveResult;

/// A pricer generates improving columns for the restricted master, given the
/// dual prices of the master's rows.
pub trait Pricer {
    /// Produces columns with favorable reduced cost, or reports that none
    /// exist (which proves the current master LP solution optimal).
    ///
    /// `duals` holds one price per master row, in row order.
    fn price(&mut self, oracle: &mut dyn Oracle, duals: &[f64]) -> Result<PricerResult, Error>;
}

/// An enum representing the possible states of a `PricerResult`.
#[derive(Debug, Clone, PartialEq)]
pub enum PricerResultState {
    /// The pricer found new columns with favorable reduced cost.
    FoundColumns(Vec<Column>),
    /// No improving column exists; the current master LP solution is optimal.
    NoColumns,
}

/// The result of a pricing round.
#[derive(Debug, Clone, PartialEq)]
pub struct PricerResult {
    /// The state of the pricing round.
    pub state: PricerResultState,
    /// A valid dual bound on the full problem's LP optimum, if the pricer can
    /// derive one from the duals it was given.
    pub lower_bound: Option<f64>,
}

/// Prices cutting patterns by solving the bounded knapsack
/// `max Σ π_i y_i  s.t.  Σ w_i y_i <= W,  0 <= y_i <= ⌊W/w_i⌋ integer`
/// through the oracle.
///
/// A pattern is only worth adding if it prices out strictly above the cost of
/// activating one more column. That activation cost (one roll) and the
/// numeric tolerance guarding against marginal columns are independent knobs:
/// the first is a property of the model, the second of the arithmetic.
#[derive(Debug, Clone)]
pub struct KnapsackPricer {
    instance: CuttingStock,
    column_cost: f64,
    rc_tolerance: f64,
}

impl KnapsackPricer {
    /// Creates a pricer for the given instance with a column cost of 1 and a
    /// reduced-cost tolerance of `1e-8`.
    pub fn new(instance: &CuttingStock) -> Self {
        KnapsackPricer {
            instance: instance.clone(),
            column_cost: 1.0,
            rc_tolerance: 1e-8,
        }
    }

    /// Sets the cost of activating one more column.
    pub fn column_cost(mut self, cost: f64) -> Self {
        self.column_cost = cost;
        self
    }

    /// Sets the tolerance by which a pattern's value must exceed the column
    /// cost before it counts as improving.
    pub fn rc_tolerance(mut self, tolerance: f64) -> Self {
        self.rc_tolerance = tolerance;
        self
    }
}

impl Pricer for KnapsackPricer {
    fn price(&mut self, oracle: &mut dyn Oracle, duals: &[f64]) -> Result<PricerResult, Error> {
        let mut knapsack = LinearProgram::maximize();
        let ys: Vec<Var> = izip!(&self.instance.pieces, duals)
            .enumerate()
            .map(|(i, (piece, &price))| {
                let copies = (self.instance.roll_width / piece.width).floor() as isize;
                knapsack.add(var().integer(0, copies).obj(price).name(&format!("y{i}")))
            })
            .collect();
        knapsack.add(
            cons()
                .expr(izip!(&ys, &self.instance.pieces).map(|(&y, piece)| (y, piece.width)))
                .le(self.instance.roll_width)
                .name("width"),
        );

        let sol = match oracle.solve(&knapsack)? {
            SolveResult::Optimal(sol) => sol,
            other => return Err(Error::PricingFailure(other.status())),
        };
        let value = sol.obj_val();
        // Objective of the master's dual under the given prices; equals the
        // restricted master's optimum when the prices are its optimal duals.
        let dual_obj: f64 = izip!(duals, &self.instance.pieces)
            .map(|(price, piece)| price * f64::from(piece.demand))
            .sum();

        if value <= self.column_cost + self.rc_tolerance {
            debug!("pricing: no improving pattern (best value {value:.9})");
            return Ok(PricerResult {
                state: PricerResultState::NoColumns,
                lower_bound: Some(dual_obj),
            });
        }

        let coefs: Vec<f64> = ys.iter().map(|&y| sol.val(y).round()).collect();
        debug!("pricing: pattern {coefs:?} prices out at {value:.6}");
        Ok(PricerResult {
            state: PricerResultState::FoundColumns(vec![Column {
                obj: self.column_cost,
                coefs,
            }]),
            // Farley's bound: the prices scaled by cost/value are feasible
            // for every pattern, so the scaled dual objective bounds the LP.
            lower_bound: Some(dual_obj * self.column_cost / value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simplex::SimplexOracle;

    fn price(instance: &CuttingStock, duals: &[f64]) -> PricerResult {
        let mut oracle = SimplexOracle::new();
        let mut pricer = KnapsackPricer::new(instance);
        pricer.price(&mut oracle, duals).unwrap()
    }

    /// All feasible patterns of the instance, by bounded enumeration.
    fn all_patterns(instance: &CuttingStock) -> Vec<Vec<u32>> {
        fn extend(
            instance: &CuttingStock,
            prefix: &mut Vec<u32>,
            used: f64,
            out: &mut Vec<Vec<u32>>,
        ) {
            let i = prefix.len();
            if i == instance.pieces.len() {
                out.push(prefix.clone());
                return;
            }
            let width = instance.pieces[i].width;
            let max_copies = ((instance.roll_width - used) / width).floor() as u32;
            for copies in 0..=max_copies {
                prefix.push(copies);
                extend(instance, prefix, used + f64::from(copies) * width, out);
                prefix.pop();
            }
        }
        let mut out = Vec::new();
        extend(instance, &mut Vec::new(), 0.0, &mut out);
        out
    }

    #[test]
    fn worthless_items_price_no_pattern() {
        let instance = CuttingStock::new(100.0, &[75.0, 53.8, 50.0, 35.2], &[5, 3, 4, 6]);
        let result = price(&instance, &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(result.state, PricerResultState::NoColumns);
    }

    #[test]
    fn attractive_duals_produce_a_fitting_pattern() {
        let instance = CuttingStock::new(100.0, &[30.0, 40.0], &[4, 4]);
        let result = price(&instance, &[0.6, 0.6]);
        let PricerResultState::FoundColumns(columns) = result.state else {
            panic!("expected an improving pattern");
        };
        let column = &columns[0];
        let width: f64 = izip!(&column.coefs, &instance.pieces)
            .map(|(count, piece)| count * piece.width)
            .sum();
        assert!(width <= instance.roll_width + 1e-6);
        let value: f64 = izip!(&column.coefs, [0.6, 0.6]).map(|(c, d)| c * d).sum();
        assert!(value > 1.0 + 1e-8);
    }

    #[test]
    fn no_columns_means_no_pattern_prices_out() {
        let instance = CuttingStock::new(10.0, &[3.0, 4.0, 5.0], &[2, 2, 2]);
        let duals = [0.2, 0.225, 0.275];
        let result = price(&instance, &duals);
        assert_eq!(result.state, PricerResultState::NoColumns);

        // constructive check: enumerate every feasible pattern
        for pattern in all_patterns(&instance) {
            let value: f64 = izip!(&pattern, &duals).map(|(&c, d)| f64::from(c) * d).sum();
            assert!(value <= 1.0 + 1e-8, "pattern {pattern:?} prices out");
        }
    }

    #[test]
    fn found_column_matches_the_enumerated_best() {
        let instance = CuttingStock::new(10.0, &[3.0, 4.0, 5.0], &[2, 2, 2]);
        let duals = [0.4, 0.45, 0.55];
        let best: f64 = all_patterns(&instance)
            .iter()
            .map(|p| izip!(p, &duals).map(|(&c, d)| f64::from(c) * d).sum())
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(best > 1.0);

        let result = price(&instance, &duals);
        let PricerResultState::FoundColumns(columns) = result.state else {
            panic!("expected an improving pattern");
        };
        let value: f64 = izip!(&columns[0].coefs, &duals).map(|(c, d)| c * d).sum();
        assert!((value - best).abs() < 1e-6);
    }

    #[test]
    fn farley_bound_stays_below_the_master_objective() {
        let instance = CuttingStock::new(10.0, &[3.0, 4.0, 5.0], &[2, 2, 2]);
        let duals = [0.4, 0.45, 0.55];
        let result = price(&instance, &duals);
        let dual_obj: f64 = izip!(&duals, &instance.pieces)
            .map(|(d, piece)| d * f64::from(piece.demand))
            .sum();
        let bound = result.lower_bound.unwrap();
        assert!(bound <= dual_obj + 1e-9);
    }

    #[test]
    fn oversized_piece_gets_zero_copies() {
        let instance = CuttingStock::new(100.0, &[120.0, 40.0], &[1, 2]);
        let result = price(&instance, &[5.0, 0.6]);
        // the 120-wide piece cannot appear in any pattern, whatever its price
        let PricerResultState::FoundColumns(columns) = result.state else {
            panic!("the 40-wide piece alone prices out");
        };
        assert_eq!(columns[0].coefs[0], 0.0);
        assert_eq!(columns[0].coefs[1], 2.0);
    }
}
