//! Heli Dispatch - command line front end
//!
//! Loads a scenario and configuration, runs the basic and optimized
//! strategies side by side and renders the comparison.

pub mod config;
pub mod report;
pub mod run;
pub mod scenario;

pub use config::{AppConfig, DemandOptions, SimulationConfig};
pub use report::RunReport;
pub use run::{run_strategies, SolverChoice, StrategyChoice};
pub use scenario::{load_scenario, ScenarioFile};
