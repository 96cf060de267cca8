//! Core data models for the dispatch engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{DispatchError, Result};
use crate::spatial::validate_coordinate;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An active wildfire needing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireIncident {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    /// Number of helicopters the fire requires
    pub demand: u32,
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl FireIncident {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64, demand: u32) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            demand,
            discovered_at: None,
        }
    }

    pub fn discovered(mut self, at: DateTime<Utc>) -> Self {
        self.discovered_at = Some(at);
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DispatchError::InvalidFire {
                fire_id: self.id.clone(),
                reason: "fire id is blank".to_string(),
            });
        }
        if self.demand == 0 {
            return Err(DispatchError::InvalidFire {
                fire_id: self.id.clone(),
                reason: "demand must be at least one helicopter".to_string(),
            });
        }
        validate_coordinate(self.location())
    }
}

/// One physical helicopter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelicopterUnit {
    pub id: String,
    pub base_id: String,
    pub model: String,
    /// Units out of service at scenario start are never reserved
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl HelicopterUnit {
    pub fn new(
        id: impl Into<String>,
        base_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_id: base_id.into(),
            model: model.into(),
            available: true,
        }
    }
}

/// A helicopter station.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    /// Unit count per model name
    #[serde(default)]
    pub units: BTreeMap<String, u32>,
}

impl Base {
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            lat,
            lon,
            units: BTreeMap::new(),
        }
    }

    pub fn with_units(mut self, model: impl Into<String>, count: u32) -> Self {
        self.units.insert(model.into(), count);
        self
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Synthesize concrete units from the per-model counts.
    ///
    /// Ids follow `<base>-<model>-<n>` with `n` starting at 1.
    pub fn expand_units(&self) -> Vec<HelicopterUnit> {
        self.units
            .iter()
            .flat_map(|(model, count)| {
                (1..=*count).map(move |n| {
                    HelicopterUnit::new(format!("{}-{}-{}", self.id, model, n), &self.id, model)
                })
            })
            .collect()
    }
}

/// Performance profile shared by every unit of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub model: String,
    pub cruise_speed_kmh: f64,
    /// Consumption multiplier applied to the configured fuel rate
    #[serde(default = "default_fuel_burn")]
    pub fuel_burn: f64,
    pub max_range_km: f64,
    #[serde(default)]
    pub water_capacity_l: f64,
}

fn default_fuel_burn() -> f64 {
    1.0
}

impl ModelSpec {
    pub fn new(model: impl Into<String>, cruise_speed_kmh: f64, max_range_km: f64) -> Self {
        Self {
            model: model.into(),
            cruise_speed_kmh,
            fuel_burn: default_fuel_burn(),
            max_range_km,
            water_capacity_l: 0.0,
        }
    }

    pub fn with_fuel_burn(mut self, fuel_burn: f64) -> Self {
        self.fuel_burn = fuel_burn;
        self
    }

    pub fn with_water_capacity(mut self, litres: f64) -> Self {
        self.water_capacity_l = litres;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| DispatchError::InvalidSpec {
            model: self.model.clone(),
            reason: reason.to_string(),
        };
        if !self.cruise_speed_kmh.is_finite() || self.cruise_speed_kmh <= 0.0 {
            return Err(invalid("cruise speed must be positive"));
        }
        if !self.fuel_burn.is_finite() || self.fuel_burn < 0.0 {
            return Err(invalid("fuel burn must be non-negative"));
        }
        if !self.max_range_km.is_finite() || self.max_range_km < 0.0 {
            return Err(invalid("max range must be non-negative"));
        }
        if !self.water_capacity_l.is_finite() || self.water_capacity_l < 0.0 {
            return Err(invalid("water capacity must be non-negative"));
        }
        Ok(())
    }
}

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Greedy proximity heuristic
    Basic,
    /// Exact MILP assignment
    Optimized,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Basic => write!(f, "basic"),
            Strategy::Optimized => write!(f, "optimized"),
        }
    }
}

/// One fire-helicopter pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub fire_id: String,
    pub helicopter_id: String,
    pub model: String,
    pub base_id: String,
    /// One-way great-circle distance
    pub distance_km: f64,
    pub travel_time_min: f64,
    /// Round-trip fuel cost
    pub fuel_cost: f64,
    /// Suppressant the helicopter carries per sortie
    #[serde(default)]
    pub water_capacity_l: f64,
}

/// Full outcome of one dispatch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub strategy: Strategy,
    pub assignments: Vec<Assignment>,
    /// Fires left short of their demand, with the unmet count
    pub unaddressed: BTreeMap<String, u32>,
}

impl DispatchResult {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            assignments: Vec::new(),
            unaddressed: BTreeMap::new(),
        }
    }

    pub fn total_fuel_cost(&self) -> f64 {
        self.assignments.iter().map(|a| a.fuel_cost).sum()
    }

    /// Helicopters missing across all unaddressed fires.
    pub fn total_unmet(&self) -> u32 {
        self.unaddressed.values().sum()
    }

    /// Fuel cost plus the penalty for every unmet helicopter slot.
    pub fn objective(&self, big_penalty: f64) -> f64 {
        self.total_fuel_cost() + big_penalty * f64::from(self.total_unmet())
    }

    pub fn assigned_count(&self, fire_id: &str) -> usize {
        self.assignments
            .iter()
            .filter(|a| a.fire_id == fire_id)
            .count()
    }

    pub fn is_unaddressed(&self, fire_id: &str) -> bool {
        self.unaddressed.contains_key(fire_id)
    }

    pub fn unaddressed_ids(&self) -> impl Iterator<Item = &str> {
        self.unaddressed.keys().map(String::as_str)
    }

    pub fn assignments_for<'a>(
        &'a self,
        fire_id: &'a str,
    ) -> impl Iterator<Item = &'a Assignment> {
        self.assignments.iter().filter(move |a| a.fire_id == fire_id)
    }

    /// Suppressant capacity sent to a fire in one sortie of every assigned
    /// helicopter.
    pub fn water_delivered(&self, fire_id: &str) -> f64 {
        self.assignments_for(fire_id).map(|a| a.water_capacity_l).sum()
    }
}
