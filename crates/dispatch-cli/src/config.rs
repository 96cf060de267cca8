//! Application configuration from a JSON file plus environment overrides.

use anyhow::{bail, Context, Result};
use dispatch_cbc::CbcConfig;
use dispatch_core::DispatchParams;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const ENV_SOLVER_PATH: &str = "HELI_SOLVER_PATH";
pub const ENV_SOLVER_TIMEOUT: &str = "HELI_SOLVER_TIMEOUT_SECS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub optimization: DispatchParams,
    pub solver: CbcConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distribution for fires whose demand is not given in the scenario
    pub fire_helicopter_needs: DemandOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandOptions {
    pub options: Vec<u32>,
    pub weights: Vec<f64>,
}

impl Default for DemandOptions {
    fn default() -> Self {
        Self {
            options: vec![1, 2, 3],
            weights: vec![0.5, 0.3, 0.2],
        }
    }
}

impl DemandOptions {
    pub fn validate(&self) -> Result<()> {
        if self.options.is_empty() {
            bail!("fire_helicopter_needs.options is empty");
        }
        if self.options.len() != self.weights.len() {
            bail!(
                "fire_helicopter_needs has {} options but {} weights",
                self.options.len(),
                self.weights.len()
            );
        }
        if self.options.contains(&0) {
            bail!("fire_helicopter_needs.options must all be at least 1");
        }
        if self
            .weights
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0)
            || self.weights.iter().sum::<f64>() <= 0.0
        {
            bail!("fire_helicopter_needs.weights must be non-negative with a positive sum");
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load from `path` when given, otherwise start from defaults, then apply
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// The solver path is taken as-is; a bad path only shows up when the
    /// solver is first launched.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(path) = lookup(ENV_SOLVER_PATH).filter(|p| !p.trim().is_empty()) {
            self.solver.executable_path = path;
        }
        if let Some(secs) = lookup(ENV_SOLVER_TIMEOUT) {
            self.solver.timeout_secs = secs.trim().parse().with_context(|| {
                format!("{ENV_SOLVER_TIMEOUT} must be whole seconds, got {secs:?}")
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.optimization
            .validate()
            .context("invalid optimization settings")?;
        self.simulation
            .fire_helicopter_needs
            .validate()
            .context("invalid simulation settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"optimization": {{"big_penalty": 500, "golden_time_minutes": 30}},
                "solver": {{"timeout_secs": 5}}}}"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.optimization.big_penalty, 500.0);
        assert_eq!(config.optimization.golden_time_minutes, 30.0);
        assert_eq!(config.optimization.round_trip_factor, 2.0);
        assert_eq!(config.solver.timeout_secs, 5);
        assert_eq!(config.solver.executable_path, "cbc");
        assert_eq!(config.simulation, SimulationConfig::default());
    }

    #[test]
    fn env_overrides_solver_settings() {
        let env: HashMap<&str, &str> = [
            (ENV_SOLVER_PATH, "/opt/coin/bin/cbc"),
            (ENV_SOLVER_TIMEOUT, "15"),
        ]
        .into();
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.solver.executable_path, "/opt/coin/bin/cbc");
        assert_eq!(config.solver.timeout_secs, 15);
    }

    #[test]
    fn bad_timeout_override_is_an_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_SOLVER_TIMEOUT).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SOLVER_TIMEOUT));
    }

    #[test]
    fn missing_solver_is_not_checked_at_load() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| (key == ENV_SOLVER_PATH).then(|| "/does/not/exist".to_string()))
            .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn demand_options_are_validated() {
        let mismatched = DemandOptions {
            options: vec![1, 2],
            weights: vec![1.0],
        };
        assert!(mismatched.validate().is_err());

        let zero_weight = DemandOptions {
            options: vec![1],
            weights: vec![0.0],
        };
        assert!(zero_weight.validate().is_err());

        let zero_option = DemandOptions {
            options: vec![0, 1],
            weights: vec![1.0, 1.0],
        };
        assert!(zero_option.validate().is_err());

        assert!(DemandOptions::default().validate().is_ok());
    }

    #[test]
    fn negative_penalty_is_rejected() {
        let mut config = AppConfig::default();
        config.optimization.big_penalty = -1.0;
        assert!(config.validate().is_err());
    }
}
