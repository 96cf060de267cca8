//! Solver capability boundary.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::milp::MilpModel;

/// Tolerance between a solver's reported objective and the recomputed one.
const OBJECTIVE_TOLERANCE: f64 = 1e-4;

/// Optimal variable assignment returned by a solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilpSolution {
    pub objective: f64,
    /// One value per model variable, in model order
    pub values: Vec<f64>,
}

impl MilpSolution {
    /// Check the response shape against the model it claims to solve.
    pub fn validate_against(&self, model: &MilpModel) -> Result<()> {
        model
            .check_solution(&self.values)
            .map_err(DispatchError::MalformedSolution)?;
        let recomputed = model.objective_value(&self.values);
        let scale = recomputed.abs().max(1.0);
        if (recomputed - self.objective).abs() > OBJECTIVE_TOLERANCE * scale {
            return Err(DispatchError::MalformedSolution(format!(
                "reported objective {} does not match recomputed {}",
                self.objective, recomputed
            )));
        }
        Ok(())
    }
}

/// Anything that can solve a [`MilpModel`] to optimality.
///
/// Implementations block until they have an answer or their time budget runs
/// out.
pub trait MilpSolver {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> Result<MilpSolution>;
}

impl<S: MilpSolver + ?Sized> MilpSolver for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &MilpModel) -> Result<MilpSolution> {
        (**self).solve(model)
    }
}

impl<S: MilpSolver + ?Sized> MilpSolver for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &MilpModel) -> Result<MilpSolution> {
        (**self).solve(model)
    }
}
