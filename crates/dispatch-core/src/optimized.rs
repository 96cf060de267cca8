//! Optimized dispatch: formulate, hand to a solver, decode.

use crate::error::Result;
use crate::formulation::AssignmentFormulation;
use crate::models::DispatchResult;
use crate::params::DispatchParams;
use crate::scenario::Scenario;
use crate::solver::MilpSolver;

pub struct OptimizedDispatcher<S> {
    params: DispatchParams,
    solver: S,
}

impl<S: MilpSolver> OptimizedDispatcher<S> {
    pub fn new(params: DispatchParams, solver: S) -> Self {
        Self { params, solver }
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Solve the assignment model for `scenario`.
    ///
    /// Solver failures are returned as-is; there is no fallback to the
    /// heuristic.
    pub fn dispatch(&self, scenario: &Scenario) -> Result<DispatchResult> {
        let formulation = AssignmentFormulation::build(scenario, &self.params)?;
        let solution = match self.solver.solve(formulation.model()) {
            Ok(solution) => solution,
            Err(err) => {
                tracing::warn!(
                    solver = self.solver.name(),
                    error = %err,
                    "optimized dispatch failed"
                );
                return Err(err);
            }
        };
        let result = formulation.decode(&solution)?;

        tracing::info!(
            solver = self.solver.name(),
            assignments = result.assignments.len(),
            unaddressed = result.unaddressed.len(),
            objective = solution.objective,
            "optimized dispatch complete"
        );
        Ok(result)
    }
}
