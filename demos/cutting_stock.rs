//! Consider the cutting stock problem: given large paper rolls of width `W`
//! and demand `b_i` for pieces of width `w_i` (`i` in 1..m), how many large
//! rolls are needed to fill the order?
//!
//! The column-generation formulation works over cutting patterns `z_t`
//! (how many copies of each piece one roll yields, subject to
//! `sum_i w_i z_{i,t} <= W`):
//!
//! ```text
//!   min sum_t lambda_t
//!     s.t. sum_t lambda_t z_{i,t} >= b_i    [pi_i]
//!          lambda_t >= 0
//! ```
//!
//! Only a tiny subset of patterns is ever materialized: starting from the
//! trivial one-piece patterns, each round solves the restricted master LP and
//! asks the bounded-knapsack pricing problem
//! `max sum_i pi_i y_i  s.t.  sum_i w_i y_i <= W` for a pattern worth more
//! than one roll. When none exists, the master LP is optimal and the
//! generated patterns are re-solved with integrality.

use decomp::SimplexOracle;
use decomp::colgen::{self, ColGenParams, CuttingStock};

fn main() {
    let instance = CuttingStock::new(
        100.0,
        &[75.0, 53.8, 50.0, 45.3, 35.2, 20.1],
        &[4, 3, 5, 3, 6, 4],
    );
    let mut oracle = SimplexOracle::new();

    let report = colgen::solve(&instance, &ColGenParams::default(), &mut oracle)
        .expect("the seeded master is feasible");

    println!(
        "{:?} after {} pricing rounds, master LP {:.4}",
        report.termination, report.iterations, report.lp_objective
    );
    println!("{} rolls:", report.rolls);
    for (pattern, uses) in &report.selection {
        let cuts: Vec<String> = pattern
            .counts()
            .iter()
            .zip(&instance.pieces)
            .filter(|(count, _)| **count > 0)
            .map(|(count, piece)| format!("{count} x {}", piece.width))
            .collect();
        println!("  {uses} roll(s) cut as [{}]", cuts.join(", "));
    }
}
