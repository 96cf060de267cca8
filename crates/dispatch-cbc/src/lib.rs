//! Dispatch CBC - external MILP solver adapter
//!
//! Writes the assignment model as an LP file, runs the CBC executable with a
//! time budget, and reads its solution file back into a `MilpSolution`.

pub mod config;
pub mod lp;
pub mod process;
pub mod solution;

pub use config::CbcConfig;
pub use process::CbcSolver;
pub use solution::{parse_solution, CbcOutcome, CbcStatus};
