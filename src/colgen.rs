//! Column generation for the cutting stock problem.
//!
//! Rolls of a fixed width must be cut into demanded pieces using as few rolls
//! as possible. The restricted master problem selects among the cutting
//! patterns generated so far; its dual prices per demand row drive a bounded
//! knapsack pricing subproblem that proposes the next pattern, until no
//! pattern prices out above the cost of one more roll. The generated columns
//! are then re-solved with integrality for the final roll counts.

use std::time::{Duration, Instant};

use itertools::izip;
use log::{debug, info};

use crate::builder::{cons, var};
use crate::convergence::{Convergence, Termination};
use crate::error::Error;
use crate::master::{Column, Master};
use crate::oracle::{Oracle, OracleError};
use crate::pricer::{KnapsackPricer, Pricer, PricerResultState};
use crate::problem::{LinearProgram, ObjSense, Var};

/// One ordered piece: a width and how many such pieces are demanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Piece {
    /// The width of the piece; must be positive.
    pub width: f64,
    /// How many such pieces the order requires.
    pub demand: u32,
}

/// A cutting stock instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingStock {
    /// The width of every large roll.
    pub roll_width: f64,
    /// The demanded pieces.
    pub pieces: Vec<Piece>,
}

impl CuttingStock {
    /// Builds an instance from parallel width and demand slices.
    pub fn new(roll_width: f64, widths: &[f64], demands: &[u32]) -> Self {
        let pieces = izip!(widths, demands)
            .map(|(&width, &demand)| Piece { width, demand })
            .collect();
        CuttingStock { roll_width, pieces }
    }

    /// Total number of demanded pieces. Cutting every piece from its own
    /// roll shows this is a trivial upper bound on the roll count.
    pub fn total_demand(&self) -> u32 {
        self.pieces.iter().map(|piece| piece.demand).sum()
    }
}

/// One feasible way to cut a roll: how many copies of each piece it yields.
///
/// Patterns are immutable once created; the loop only ever appends new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    counts: Vec<u32>,
}

impl Pattern {
    /// Copies of piece `i` in this pattern.
    pub fn count(&self, i: usize) -> u32 {
        self.counts[i]
    }

    /// Counts per piece, in instance order.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Total width the pattern consumes.
    pub fn width(&self, instance: &CuttingStock) -> f64 {
        izip!(&self.counts, &instance.pieces)
            .map(|(&count, piece)| f64::from(count) * piece.width)
            .sum()
    }

    /// Whether the pattern fits on one roll.
    pub fn fits(&self, instance: &CuttingStock) -> bool {
        self.width(instance) <= instance.roll_width + 1e-6
    }

    fn from_column(column: &Column) -> Self {
        Pattern {
            counts: column.coefs.iter().map(|&c| c.round().max(0.0) as u32).collect(),
        }
    }
}

/// Parameters for the column-generation loop.
#[derive(Debug, Clone)]
pub struct ColGenParams {
    /// Terminate once the master LP bound gap drops below this.
    pub tolerance: f64,
    /// Cost of activating one more roll.
    pub column_cost: f64,
    /// Tolerance on the pricing value before a column counts as improving.
    pub rc_tolerance: f64,
    /// Maximum number of pricing rounds.
    pub iteration_limit: usize,
    /// Optional wall-clock budget, checked between iterations.
    pub time_limit: Option<Duration>,
}

impl Default for ColGenParams {
    fn default() -> Self {
        ColGenParams {
            tolerance: 1e-6,
            column_cost: 1.0,
            rc_tolerance: 1e-8,
            iteration_limit: 1_000,
            time_limit: None,
        }
    }
}

impl ColGenParams {
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

/// The outcome of a column-generation run.
#[derive(Debug, Clone)]
pub struct CuttingStockReport {
    /// Why the pricing loop stopped; only [`Termination::Converged`]
    /// certifies the master LP bound.
    pub termination: Termination,
    /// Objective of the final master LP relaxation.
    pub lp_objective: f64,
    /// Dual (lower) bound on the LP optimum at termination.
    pub lower_bound: f64,
    /// Number of rolls in the integer solution.
    pub rolls: u32,
    /// The selected patterns and how many rolls are cut with each.
    pub selection: Vec<(Pattern, u32)>,
    /// Pricing rounds performed.
    pub iterations: usize,
    /// `(lower, upper)` after each master solve.
    pub history: Vec<(f64, f64)>,
}

/// Solves a cutting stock instance by column generation.
///
/// The master is seeded with one trivial pattern per piece (as many copies as
/// fit on a roll), so it is feasible whenever every piece fits; a piece wider
/// than the roll surfaces as [`Error::InfeasibleMaster`]. After the pricing
/// loop, the generated columns are re-solved with integrality. The resulting
/// roll count is a valid covering of the demand and an upper bound on the
/// true optimum; it is not certified globally optimal, since no branching is
/// performed on the patterns themselves.
pub fn solve(
    instance: &CuttingStock,
    params: &ColGenParams,
    oracle: &mut dyn Oracle,
) -> Result<CuttingStockReport, Error> {
    let mut patterns = seed_patterns(instance);
    let mut prob = LinearProgram::minimize();
    let lambdas: Vec<Var> = (0..patterns.len())
        .map(|j| {
            prob.add(
                var()
                    .obj(params.column_cost)
                    .name(&format!("pattern{j}")),
            )
        })
        .collect();
    for (i, (piece, pattern)) in izip!(&instance.pieces, &patterns).enumerate() {
        prob.add(
            cons()
                .coef(lambdas[i], f64::from(pattern.count(i)))
                .ge(f64::from(piece.demand))
                .name(&format!("demand_for_item_{i}")),
        );
    }
    let mut master = Master::new(prob);
    let mut pricer = KnapsackPricer::new(instance)
        .column_cost(params.column_cost)
        .rc_tolerance(params.rc_tolerance);

    let mut convergence = Convergence::new(ObjSense::Minimize, params.tolerance, params.iteration_limit);
    if let Some(limit) = params.time_limit {
        convergence = convergence.with_deadline(Instant::now() + limit);
    }
    let mut history = Vec::new();

    let termination = loop {
        let (lp_obj, duals) = {
            let sol = master.solve(oracle)?;
            let duals = sol.duals().ok_or(OracleError::MissingDuals)?.to_vec();
            (sol.obj_val(), duals)
        };
        convergence.record_primal_bound(lp_obj);

        let result = pricer.price(oracle, &duals)?;
        if let Some(bound) = result.lower_bound {
            convergence.record_dual_bound(bound);
        }
        history.push((convergence.lower(), convergence.upper()));
        debug!(
            "round {}: master {:.6}, bounds [{:.6}, {:.6}]",
            convergence.iteration(),
            lp_obj,
            convergence.lower(),
            convergence.upper()
        );

        match result.state {
            PricerResultState::NoColumns => break Termination::Converged,
            PricerResultState::FoundColumns(columns) => {
                if let Some(termination) = convergence.check() {
                    break termination;
                }
                for column in columns {
                    patterns.push(Pattern::from_column(&column));
                    master.add_column(column);
                }
                convergence.advance();
            }
        }
    };

    let int_sol = master.solve_integer(oracle)?;
    let mut selection = Vec::new();
    let mut rolls = 0u32;
    for (pattern, value) in izip!(&patterns, int_sol.values()) {
        let uses = value.round() as u32;
        if uses > 0 {
            selection.push((pattern.clone(), uses));
            rolls += uses;
        }
    }
    info!(
        "column generation finished: {termination:?} after {} rounds, {} patterns, lp {:.6}, {rolls} rolls",
        convergence.iteration(),
        patterns.len(),
        convergence.upper()
    );

    Ok(CuttingStockReport {
        termination,
        lp_objective: convergence.upper(),
        lower_bound: convergence.lower(),
        rolls,
        selection,
        iterations: convergence.iteration(),
        history,
    })
}

/// The trivial seed: for each piece, the pattern that cuts as many copies of
/// it as fit on one roll and nothing else.
fn seed_patterns(instance: &CuttingStock) -> Vec<Pattern> {
    let n = instance.pieces.len();
    instance
        .pieces
        .iter()
        .enumerate()
        .map(|(i, piece)| {
            let mut counts = vec![0u32; n];
            counts[i] = (instance.roll_width / piece.width).floor() as u32;
            Pattern { counts }
        })
        .collect()
}
