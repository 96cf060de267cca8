//! Dispatch parameters passed explicitly into each dispatcher.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// Immutable tuning knobs shared by both strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    /// Cost per kilometer flown
    pub fuel_rate: f64,
    /// Cost per helicopter slot left unfilled
    pub big_penalty: f64,
    /// Longest acceptable one-way travel time
    pub golden_time_minutes: f64,
    /// Scenario horizon; informational to the engine
    pub scenario_time_window_minutes: f64,
    /// Hard cap on round-trip distance, on top of each model's own range
    pub max_helicopter_range_km: f64,
    /// Seed for upstream scenario generation
    pub random_seed: u64,
    /// Multiplier turning one-way distance into distance flown
    pub round_trip_factor: f64,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            fuel_rate: 1.0,
            big_penalty: 10_000.0,
            golden_time_minutes: 50.0,
            scenario_time_window_minutes: 60.0,
            max_helicopter_range_km: 600.0,
            random_seed: 42,
            round_trip_factor: 2.0,
        }
    }
}

impl DispatchParams {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("fuel_rate", self.fuel_rate)?;
        check_non_negative("big_penalty", self.big_penalty)?;
        check_non_negative("golden_time_minutes", self.golden_time_minutes)?;
        check_non_negative(
            "scenario_time_window_minutes",
            self.scenario_time_window_minutes,
        )?;
        check_non_negative("max_helicopter_range_km", self.max_helicopter_range_km)?;
        if !self.round_trip_factor.is_finite() || self.round_trip_factor < 1.0 {
            return Err(DispatchError::InvalidParams {
                name: "round_trip_factor",
                reason: format!("must be at least 1, got {}", self.round_trip_factor),
            });
        }
        Ok(())
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DispatchError::InvalidParams {
            name,
            reason: format!("must be a non-negative number, got {}", value),
        })
    }
}
