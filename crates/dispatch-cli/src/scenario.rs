//! Scenario file loading and upstream demand generation.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use dispatch_core::{Base, FireIncident, HelicopterUnit, ModelSpec, Scenario};
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::{AppConfig, DemandOptions};

/// Scenario as written on disk; fire demand may be left to the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub fires: Vec<FireRecord>,
    pub bases: Vec<Base>,
    #[serde(default)]
    pub units: Vec<HelicopterUnit>,
    pub models: Vec<ModelSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FireRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub demand: Option<u32>,
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl ScenarioFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Fill in missing demands from `needs`, drawing in file order from an
    /// RNG seeded with `seed`.
    pub fn resolve(self, needs: &DemandOptions, seed: u64) -> Result<Scenario> {
        let mut rng = StdRng::seed_from_u64(seed);
        let sampler = if self.fires.iter().any(|f| f.demand.is_none()) {
            needs.validate()?;
            let weights = WeightedIndex::new(&needs.weights)
                .context("invalid fire_helicopter_needs weights")?;
            Some(weights)
        } else {
            None
        };
        let mut fires = Vec::with_capacity(self.fires.len());

        for record in self.fires {
            let demand = match (record.demand, &sampler) {
                (Some(demand), _) => demand,
                (None, Some(dist)) => needs.options[rng.sample(dist)],
                (None, None) => bail!("fire {} has no demand", record.id),
            };
            let mut fire = FireIncident::new(record.id, record.lat, record.lon, demand);
            fire.discovered_at = record.discovered_at;
            fires.push(fire);
        }

        Ok(Scenario {
            fires,
            bases: self.bases,
            units: self.units,
            models: self.models,
        })
    }
}

/// Read, resolve and validate a scenario file.
pub fn load_scenario(path: &Path, config: &AppConfig) -> Result<Scenario> {
    let scenario = ScenarioFile::from_path(path)?.resolve(
        &config.simulation.fire_helicopter_needs,
        config.optimization.random_seed,
    )?;
    scenario
        .validate()
        .with_context(|| format!("invalid scenario {}", path.display()))?;
    check_time_window(&scenario, config.optimization.scenario_time_window_minutes);
    Ok(scenario)
}

/// Minutes between the earliest and latest discovery time, if any fire has one.
pub fn discovery_span_minutes(scenario: &Scenario) -> Option<f64> {
    let times = scenario.fires.iter().filter_map(|f| f.discovered_at);
    let first = times.clone().min()?;
    let last = times.max()?;
    Some((last - first).num_seconds() as f64 / 60.0)
}

/// Warn when the fires were discovered over a longer span than the window.
/// Returns true when the scenario fits.
pub fn check_time_window(scenario: &Scenario, window_minutes: f64) -> bool {
    match discovery_span_minutes(scenario) {
        Some(span) if span > window_minutes => {
            tracing::warn!(
                span_minutes = span,
                window_minutes,
                "Fire discovery times span more than the scenario window"
            );
            false
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn file(demands: &[Option<u32>]) -> ScenarioFile {
        ScenarioFile {
            fires: demands
                .iter()
                .enumerate()
                .map(|(i, demand)| FireRecord {
                    id: format!("F{i}"),
                    lat: 37.0,
                    lon: 127.0 + i as f64 * 0.1,
                    demand: *demand,
                    discovered_at: None,
                })
                .collect(),
            bases: vec![Base::new("B1", 37.0, 127.0).with_units("KA32", 2)],
            units: Vec::new(),
            models: vec![ModelSpec::new("KA32", 240.0, 500.0)],
        }
    }

    #[test]
    fn explicit_demand_is_kept() {
        let scenario = file(&[Some(3), Some(1)])
            .resolve(&DemandOptions::default(), 42)
            .unwrap();
        let demands: Vec<u32> = scenario.fires.iter().map(|f| f.demand).collect();
        assert_eq!(demands, vec![3, 1]);
    }

    #[test]
    fn generated_demand_is_seeded() {
        let needs = DemandOptions {
            options: vec![1, 2, 4],
            weights: vec![1.0, 1.0, 1.0],
        };
        let draw = |seed: u64| -> Vec<u32> {
            file(&[None; 12])
                .resolve(&needs, seed)
                .unwrap()
                .fires
                .iter()
                .map(|f| f.demand)
                .collect()
        };
        let first = draw(7);
        assert_eq!(first, draw(7));
        assert!(first.iter().all(|d| needs.options.contains(d)));
    }

    #[test]
    fn zero_weight_option_is_never_drawn() {
        let needs = DemandOptions {
            options: vec![1, 5],
            weights: vec![0.0, 1.0],
        };
        let scenario = file(&[None; 8]).resolve(&needs, 1).unwrap();
        assert!(scenario.fires.iter().all(|f| f.demand == 5));
    }

    #[test]
    fn bad_options_only_matter_when_drawing() {
        let needs = DemandOptions {
            options: Vec::new(),
            weights: Vec::new(),
        };
        assert!(file(&[Some(1)]).resolve(&needs, 0).is_ok());
        assert!(file(&[None]).resolve(&needs, 0).is_err());
    }

    #[test]
    fn parses_file_with_missing_demand() {
        let json = r#"{
            "fires": [{"id": "F1", "lat": 37.2, "lon": 127.1,
                       "discovered_at": "2024-04-01T10:00:00Z"}],
            "bases": [{"id": "B1", "lat": 37.0, "lon": 127.0, "units": {"KA32": 1}}],
            "models": [{"model": "KA32", "cruise_speed_kmh": 240, "max_range_km": 500}]
        }"#;
        let parsed: ScenarioFile = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.fires[0].demand, None);
        assert!(parsed.fires[0].discovered_at.is_some());
        assert!(parsed.units.is_empty());
    }

    #[test]
    fn window_check_uses_discovery_span() {
        let mut scenario = file(&[Some(1), Some(1)]).resolve(&DemandOptions::default(), 0).unwrap();
        assert_eq!(discovery_span_minutes(&scenario), None);
        assert!(check_time_window(&scenario, 60.0));

        let start = Utc.with_ymd_and_hms(2024, 4, 1, 10, 0, 0).unwrap();
        scenario.fires[0].discovered_at = Some(start);
        scenario.fires[1].discovered_at = Some(start + chrono::Duration::minutes(90));
        assert_eq!(discovery_span_minutes(&scenario), Some(90.0));
        assert!(!check_time_window(&scenario, 60.0));
        assert!(check_time_window(&scenario, 120.0));
    }
}
