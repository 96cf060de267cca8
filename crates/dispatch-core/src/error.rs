//! Error taxonomy shared by both dispatch strategies.

use std::time::Duration;
use thiserror::Error;

/// Everything that can abort a dispatch run.
///
/// Data-validation kinds abort the whole run. Solver-boundary kinds abort only
/// the optimized path; see [`DispatchError::is_solver_error`].
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("invalid spec for model {model}: {reason}")]
    InvalidSpec { model: String, reason: String },

    #[error("invalid fire {fire_id}: {reason}")]
    InvalidFire { fire_id: String, reason: String },

    #[error("unit {unit_id} references unknown base {base_id}")]
    UnknownBase { unit_id: String, base_id: String },

    #[error("no spec registered for model {model}")]
    UnknownModel { model: String },

    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("invalid dispatch parameter {name}: {reason}")]
    InvalidParams { name: &'static str, reason: String },

    #[error("solver unavailable at {path}: {reason}")]
    SolverUnavailable { path: String, reason: String },

    #[error("solver exceeded its time budget of {limit:?}")]
    SolverTimeout { limit: Duration },

    #[error("solver reported the model infeasible ({status})")]
    SolverInfeasible { status: String },

    #[error("solver failed: {0}")]
    SolverFailed(String),

    #[error("malformed solver response: {0}")]
    MalformedSolution(String),
}

impl DispatchError {
    /// True for failures at the solver boundary, which leave the basic
    /// dispatch result usable.
    pub fn is_solver_error(&self) -> bool {
        matches!(
            self,
            DispatchError::SolverUnavailable { .. }
                | DispatchError::SolverTimeout { .. }
                | DispatchError::SolverInfeasible { .. }
                | DispatchError::SolverFailed(_)
                | DispatchError::MalformedSolution(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_errors_are_classified() {
        let timeout = DispatchError::SolverTimeout {
            limit: Duration::from_secs(5),
        };
        assert!(timeout.is_solver_error());

        let coord = DispatchError::InvalidCoordinate {
            lat: 91.0,
            lon: 0.0,
        };
        assert!(!coord.is_solver_error());
        assert_eq!(coord.to_string(), "invalid coordinate (91, 0)");
    }
}
