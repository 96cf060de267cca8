//! Runs the selected strategies concurrently, each with its own fleet.

use anyhow::{Context, Result};
use clap::ValueEnum;
use dispatch_cbc::CbcSolver;
use dispatch_core::{
    BasicDispatcher, ExhaustiveSolver, MilpSolver, OptimizedDispatcher, Scenario, Strategy,
};
use std::sync::Arc;
use tokio::task;

use crate::config::AppConfig;
use crate::report::RunReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SolverChoice {
    /// External CBC executable
    Cbc,
    /// In-process branch and bound
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    Basic,
    Optimized,
    Both,
}

impl StrategyChoice {
    pub fn includes(self, strategy: Strategy) -> bool {
        matches!(
            (self, strategy),
            (StrategyChoice::Both, _)
                | (StrategyChoice::Basic, Strategy::Basic)
                | (StrategyChoice::Optimized, Strategy::Optimized)
        )
    }
}

fn build_solver(choice: SolverChoice, config: &AppConfig) -> Box<dyn MilpSolver + Send> {
    match choice {
        SolverChoice::Cbc => Box::new(CbcSolver::new(config.solver.clone())),
        SolverChoice::Memory => Box::new(ExhaustiveSolver::new(config.solver.timeout())),
    }
}

/// Run the chosen strategies on `scenario`.
///
/// Data errors abort the run. A solver failure only drops the optimized
/// result and is carried in the report.
pub async fn run_strategies(
    scenario: Arc<Scenario>,
    config: &AppConfig,
    solver: SolverChoice,
    strategy: StrategyChoice,
) -> Result<RunReport> {
    let params = config.optimization.clone();

    let basic_task = strategy.includes(Strategy::Basic).then(|| {
        let scenario = scenario.clone();
        let params = params.clone();
        task::spawn_blocking(move || BasicDispatcher::new(params).dispatch(&scenario))
    });

    let optimized_task = strategy.includes(Strategy::Optimized).then(|| {
        let scenario = scenario.clone();
        let params = params.clone();
        let solver = build_solver(solver, config);
        task::spawn_blocking(move || OptimizedDispatcher::new(params, solver).dispatch(&scenario))
    });

    let mut report = RunReport {
        big_penalty: params.big_penalty,
        basic: None,
        optimized: None,
        optimized_error: None,
    };

    if let Some(handle) = basic_task {
        let result = handle.await.context("basic dispatch task failed")?;
        report.basic = Some(result.context("basic dispatch failed")?);
    }

    if let Some(handle) = optimized_task {
        match handle.await.context("optimized dispatch task failed")? {
            Ok(result) => report.optimized = Some(result),
            Err(err) if err.is_solver_error() => {
                tracing::error!(
                    error = %err,
                    "Optimized dispatch unavailable; keeping basic result"
                );
                report.optimized_error = Some(err.to_string());
            }
            Err(err) => return Err(err).context("optimized dispatch failed"),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{Base, FireIncident, ModelSpec};

    fn scenario() -> Arc<Scenario> {
        Arc::new(Scenario {
            fires: vec![
                FireIncident::new("F1", 37.10, 127.15, 1),
                FireIncident::new("F2", 37.10, 127.60, 1),
            ],
            bases: vec![
                Base::new("B1", 37.0, 127.0).with_units("S76", 1),
                Base::new("B2", 37.1, 127.3).with_units("S76", 1),
            ],
            units: Vec::new(),
            models: vec![ModelSpec::new("S76", 200.0, 160.0)],
        })
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.optimization.fuel_rate = 2.5;
        config.optimization.big_penalty = 5_000.0;
        config.optimization.golden_time_minutes = 15.0;
        config.optimization.max_helicopter_range_km = 110.0;
        config.solver.timeout_secs = 10;
        config
    }

    #[tokio::test]
    async fn both_strategies_with_memory_solver() {
        let config = config();
        let report = run_strategies(scenario(), &config, SolverChoice::Memory, StrategyChoice::Both)
            .await
            .unwrap();
        let basic = report.objective(Strategy::Basic).unwrap();
        let optimized = report.objective(Strategy::Optimized).unwrap();
        assert!(optimized <= basic + 1e-6);
        assert!(report.optimized_error.is_none());
    }

    #[tokio::test]
    async fn missing_solver_keeps_basic_result() {
        let mut config = config();
        config.solver.executable_path = "/nonexistent/heli-cbc".to_string();
        let report = run_strategies(scenario(), &config, SolverChoice::Cbc, StrategyChoice::Both)
            .await
            .unwrap();
        assert!(report.basic.is_some());
        assert!(report.optimized.is_none());
        assert!(report
            .optimized_error
            .as_deref()
            .unwrap()
            .contains("/nonexistent/heli-cbc"));
    }

    #[tokio::test]
    async fn invalid_scenario_aborts_the_run() {
        let mut broken = (*scenario()).clone();
        broken.fires[0].lat = 123.0;
        let broken = Arc::new(broken);
        let err = run_strategies(broken, &config(), SolverChoice::Memory, StrategyChoice::Both)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid coordinate"));
    }

    #[tokio::test]
    async fn single_strategy_runs_alone() {
        let report = run_strategies(
            scenario(),
            &config(),
            SolverChoice::Memory,
            StrategyChoice::Optimized,
        )
        .await
        .unwrap();
        assert!(report.basic.is_none());
        assert!(report.optimized.is_some());
    }
}
