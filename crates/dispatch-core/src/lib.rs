//! Dispatch Core - wildfire helicopter assignment engine
//!
//! Provides the geodesic cost model, the fleet availability ledger, the
//! greedy proximity dispatcher and the MILP formulation consumed by an
//! external solver.

pub mod basic;
pub mod cost;
pub mod error;
pub mod exhaustive;
pub mod fleet;
pub mod formulation;
pub mod milp;
pub mod models;
pub mod optimized;
pub mod params;
pub mod scenario;
pub mod solver;
pub mod spatial;

pub use basic::BasicDispatcher;
pub use cost::{CostModel, TravelCost};
pub use error::{DispatchError, Result};
pub use exhaustive::ExhaustiveSolver;
pub use fleet::{FleetRegistry, PoolStatus};
pub use formulation::AssignmentFormulation;
pub use milp::{Constraint, ConstraintSense, MilpModel, Term, Variable, VariableKind};
pub use models::{
    Assignment, Base, DispatchResult, FireIncident, GeoPoint, HelicopterUnit, ModelSpec, Strategy,
};
pub use optimized::OptimizedDispatcher;
pub use params::DispatchParams;
pub use scenario::Scenario;
pub use solver::{MilpSolution, MilpSolver};
pub use spatial::haversine_km;
