//! In-memory exact solver for small assignment models.
//!
//! Depth-first branch and bound over the variables in model order. Each row
//! tracks the activity of its assigned variables plus the interval the
//! unassigned ones can still contribute, so a branch is cut as soon as some
//! row can no longer be satisfied or the objective lower bound meets the
//! incumbent. Exploration order is fixed, which makes the returned optimum
//! deterministic for a given model.

use std::time::{Duration, Instant};

use crate::error::{DispatchError, Result};
use crate::milp::{ConstraintSense, MilpModel, FEASIBILITY_TOLERANCE};
use crate::solver::{MilpSolution, MilpSolver};

/// Objective improvement needed to replace the incumbent.
const IMPROVEMENT_EPS: f64 = 1e-9;
/// Values tried between clock reads; the first one always reads it.
const CLOCK_CHECK_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
pub struct ExhaustiveSolver {
    time_limit: Duration,
}

impl Default for ExhaustiveSolver {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ExhaustiveSolver {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }
}

impl MilpSolver for ExhaustiveSolver {
    fn name(&self) -> &str {
        "memory"
    }

    fn solve(&self, model: &MilpModel) -> Result<MilpSolution> {
        let mut session = SearchSession::new(model, self.time_limit);
        session.run()
    }
}

fn contribution(coef: f64, lower: i64, upper: i64) -> (f64, f64) {
    let a = coef * lower as f64;
    let b = coef * upper as f64;
    (a.min(b), a.max(b))
}

struct SearchSession<'m> {
    model: &'m MilpModel,
    bounds: Vec<(i64, i64)>,
    /// Rows touched by each variable, with the coefficient
    rows_by_var: Vec<Vec<(usize, f64)>>,
    activity: Vec<f64>,
    remaining_min: Vec<f64>,
    remaining_max: Vec<f64>,
    /// Smallest objective the variables `k..` can still add
    objective_floor: Vec<f64>,
    values: Vec<f64>,
    partial_objective: f64,
    incumbent: Option<(f64, Vec<f64>)>,
    nodes: u64,
    deadline: Instant,
    limit: Duration,
}

impl<'m> SearchSession<'m> {
    fn new(model: &'m MilpModel, limit: Duration) -> Self {
        let n = model.variables.len();
        let bounds: Vec<(i64, i64)> = model.variables.iter().map(|v| v.kind.bounds()).collect();

        let mut rows_by_var = vec![Vec::new(); n];
        let mut remaining_min = vec![0.0; model.constraints.len()];
        let mut remaining_max = vec![0.0; model.constraints.len()];
        for (row, constraint) in model.constraints.iter().enumerate() {
            for term in &constraint.terms {
                rows_by_var[term.var].push((row, term.coef));
                let (lower, upper) = bounds[term.var];
                let (lo, hi) = contribution(term.coef, lower, upper);
                remaining_min[row] += lo;
                remaining_max[row] += hi;
            }
        }

        let mut objective_floor = vec![0.0; n + 1];
        for k in (0..n).rev() {
            let (lower, upper) = bounds[k];
            let (lo, _) = contribution(model.variables[k].objective, lower, upper);
            objective_floor[k] = objective_floor[k + 1] + lo;
        }

        Self {
            model,
            bounds,
            rows_by_var,
            activity: vec![0.0; model.constraints.len()],
            remaining_min,
            remaining_max,
            objective_floor,
            values: vec![0.0; n],
            partial_objective: 0.0,
            incumbent: None,
            nodes: 0,
            deadline: Instant::now() + limit,
            limit,
        }
    }

    fn run(&mut self) -> Result<MilpSolution> {
        if self.bounds.iter().any(|(lower, upper)| lower > upper) {
            return Err(DispatchError::SolverInfeasible {
                status: "empty variable domain".to_string(),
            });
        }
        if !(0..self.model.constraints.len()).all(|row| self.row_feasible(row)) {
            return Err(DispatchError::SolverInfeasible {
                status: "root relaxation infeasible".to_string(),
            });
        }

        self.descend(0)?;
        tracing::debug!(nodes = self.nodes, "exhaustive search finished");

        match self.incumbent.take() {
            Some((objective, values)) => Ok(MilpSolution { objective, values }),
            None => Err(DispatchError::SolverInfeasible {
                status: "no integer-feasible assignment".to_string(),
            }),
        }
    }

    fn best_objective(&self) -> f64 {
        self.incumbent
            .as_ref()
            .map_or(f64::INFINITY, |(objective, _)| *objective)
    }

    fn row_feasible(&self, row: usize) -> bool {
        let constraint = &self.model.constraints[row];
        let low = self.activity[row] + self.remaining_min[row];
        let high = self.activity[row] + self.remaining_max[row];
        match constraint.sense {
            ConstraintSense::LessEqual => low <= constraint.rhs + FEASIBILITY_TOLERANCE,
            ConstraintSense::GreaterEqual => high >= constraint.rhs - FEASIBILITY_TOLERANCE,
            ConstraintSense::Equal => {
                low <= constraint.rhs + FEASIBILITY_TOLERANCE
                    && high >= constraint.rhs - FEASIBILITY_TOLERANCE
            }
        }
    }

    /// Count one explored value; the clock is read every
    /// `CLOCK_CHECK_INTERVAL` steps, starting with the first.
    fn tick(&mut self) -> Result<()> {
        self.nodes += 1;
        if self.nodes % CLOCK_CHECK_INTERVAL == 1 && Instant::now() >= self.deadline {
            return Err(DispatchError::SolverTimeout { limit: self.limit });
        }
        Ok(())
    }

    /// Values of a variable that keep each of its rows satisfiable, given the
    /// assigned activity and the interval of the still unassigned variables.
    /// The variable's own contribution must already be out of the remainders.
    fn value_range(&self, rows: &[(usize, f64)], lower: i64, upper: i64) -> Option<(i64, i64)> {
        let mut lo = lower as f64;
        let mut hi = upper as f64;
        for &(row, coef) in rows {
            if coef == 0.0 {
                continue;
            }
            let constraint = &self.model.constraints[row];
            let rest_min = self.activity[row] + self.remaining_min[row];
            let rest_max = self.activity[row] + self.remaining_max[row];
            if constraint.sense != ConstraintSense::GreaterEqual {
                // coef * v <= limit
                let limit = (constraint.rhs + FEASIBILITY_TOLERANCE - rest_min) / coef;
                if coef > 0.0 {
                    hi = hi.min(limit.floor());
                } else {
                    lo = lo.max(limit.ceil());
                }
            }
            if constraint.sense != ConstraintSense::LessEqual {
                // coef * v >= limit
                let limit = (constraint.rhs - FEASIBILITY_TOLERANCE - rest_max) / coef;
                if coef > 0.0 {
                    lo = lo.max(limit.ceil());
                } else {
                    hi = hi.min(limit.floor());
                }
            }
        }
        (lo <= hi).then(|| (lo as i64, hi as i64))
    }

    fn descend(&mut self, depth: usize) -> Result<()> {
        if depth == self.values.len() {
            if self.partial_objective < self.best_objective() - IMPROVEMENT_EPS {
                self.incumbent = Some((self.partial_objective, self.values.clone()));
            }
            return Ok(());
        }

        let (lower, upper) = self.bounds[depth];
        let objective = self.model.variables[depth].objective;
        let rows = std::mem::take(&mut self.rows_by_var[depth]);

        for &(row, coef) in &rows {
            let (lo, hi) = contribution(coef, lower, upper);
            self.remaining_min[row] -= lo;
            self.remaining_max[row] -= hi;
        }

        let mut outcome = Ok(());
        if let Some((first, last)) = self.value_range(&rows, lower, upper) {
            // Cheapest value first, so the objective never decreases along
            // the loop and the first value past the incumbent ends it.
            let ascending = objective >= 0.0;
            for step in 0..=(last - first) {
                if let Err(err) = self.tick() {
                    outcome = Err(err);
                    break;
                }
                let value = (if ascending { first + step } else { last - step }) as f64;
                let bound =
                    self.partial_objective + objective * value + self.objective_floor[depth + 1];
                if bound >= self.best_objective() - IMPROVEMENT_EPS {
                    break;
                }

                for &(row, coef) in &rows {
                    self.activity[row] += coef * value;
                }
                self.partial_objective += objective * value;

                if rows.iter().all(|&(row, _)| self.row_feasible(row)) {
                    self.values[depth] = value;
                    outcome = self.descend(depth + 1);
                }

                for &(row, coef) in &rows {
                    self.activity[row] -= coef * value;
                }
                self.partial_objective -= objective * value;

                if outcome.is_err() {
                    break;
                }
            }
        }

        for &(row, coef) in &rows {
            let (lo, hi) = contribution(coef, lower, upper);
            self.remaining_min[row] += lo;
            self.remaining_max[row] += hi;
        }
        self.rows_by_var[depth] = rows;
        outcome
    }
}
