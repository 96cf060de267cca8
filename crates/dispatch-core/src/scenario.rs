//! Validated view over one dispatch scenario's inputs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::{DispatchError, Result};
use crate::models::{Base, FireIncident, HelicopterUnit, ModelSpec};
use crate::spatial::validate_coordinate;

/// Fires, bases, units and model specs for one run.
///
/// When `units` is empty the fleet is expanded from each base's per-model
/// counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub fires: Vec<FireIncident>,
    pub bases: Vec<Base>,
    #[serde(default)]
    pub units: Vec<HelicopterUnit>,
    pub models: Vec<ModelSpec>,
}

impl Scenario {
    /// Check every input record; the first problem aborts the run.
    pub fn validate(&self) -> Result<()> {
        let mut fire_ids = HashSet::new();
        for fire in &self.fires {
            fire.validate()?;
            if !fire_ids.insert(fire.id.as_str()) {
                return Err(duplicate("fire", &fire.id));
            }
        }

        let mut model_names = HashSet::new();
        for spec in &self.models {
            spec.validate()?;
            if !model_names.insert(spec.model.as_str()) {
                return Err(duplicate("model", &spec.model));
            }
        }

        let mut base_ids = HashSet::new();
        for base in &self.bases {
            validate_coordinate(base.location())?;
            if !base_ids.insert(base.id.as_str()) {
                return Err(duplicate("base", &base.id));
            }
        }

        let mut unit_ids = HashSet::new();
        for unit in self.fleet_units() {
            if !base_ids.contains(unit.base_id.as_str()) {
                return Err(DispatchError::UnknownBase {
                    unit_id: unit.id.clone(),
                    base_id: unit.base_id.clone(),
                });
            }
            if !model_names.contains(unit.model.as_str()) {
                return Err(DispatchError::UnknownModel {
                    model: unit.model.clone(),
                });
            }
            if !unit_ids.insert(unit.id.clone()) {
                return Err(duplicate("unit", &unit.id));
            }
        }
        Ok(())
    }

    /// Explicit units, or units synthesized from base counts.
    pub fn fleet_units(&self) -> Vec<HelicopterUnit> {
        if self.units.is_empty() {
            self.bases.iter().flat_map(Base::expand_units).collect()
        } else {
            self.units.clone()
        }
    }

    /// Fires in dispatch order: ascending id, then discovery time.
    pub fn ordered_fires(&self) -> Vec<&FireIncident> {
        let mut fires: Vec<&FireIncident> = self.fires.iter().collect();
        fires.sort_by(|a, b| {
            a.id.cmp(&b.id)
                .then_with(|| a.discovered_at.cmp(&b.discovered_at))
        });
        fires
    }

    pub fn base_index(&self) -> BTreeMap<&str, &Base> {
        self.bases.iter().map(|b| (b.id.as_str(), b)).collect()
    }

    pub fn spec_index(&self) -> BTreeMap<&str, &ModelSpec> {
        self.models.iter().map(|m| (m.model.as_str(), m)).collect()
    }
}

fn duplicate(kind: &'static str, id: &str) -> DispatchError {
    DispatchError::DuplicateId {
        kind,
        id: id.to_string(),
    }
}
