//! Greedy proximity dispatch.
//!
//! Fires are served one at a time in id order; each takes the closest
//! feasible helicopters still available. Earlier fires can starve later ones,
//! and that ordering dependence is part of the contract.

use crate::cost::{CostModel, TravelCost};
use crate::error::{DispatchError, Result};
use crate::fleet::FleetRegistry;
use crate::models::{Assignment, DispatchResult, FireIncident, Strategy};
use crate::params::DispatchParams;
use crate::scenario::Scenario;

/// A (base, model) pool that can reach a fire in time.
#[derive(Debug, Clone)]
struct Candidate {
    base_id: String,
    model: String,
    cost: TravelCost,
    water_capacity_l: f64,
}

pub struct BasicDispatcher {
    params: DispatchParams,
}

impl BasicDispatcher {
    pub fn new(params: DispatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Run the heuristic against a fresh registry built from the scenario.
    pub fn dispatch(&self, scenario: &Scenario) -> Result<DispatchResult> {
        let units = scenario.fleet_units();
        let mut fleet = FleetRegistry::from_units(&units);
        self.dispatch_with(scenario, &mut fleet)
    }

    /// Run the heuristic against a caller-owned registry.
    ///
    /// The registry keeps its reservations afterwards so callers can inspect
    /// or release them for what-if runs.
    pub fn dispatch_with(
        &self,
        scenario: &Scenario,
        fleet: &mut FleetRegistry,
    ) -> Result<DispatchResult> {
        scenario.validate()?;
        self.params.validate()?;
        let cost_model = CostModel::new(&self.params);
        let mut result = DispatchResult::new(Strategy::Basic);

        for fire in scenario.ordered_fires() {
            let mut candidates = self.candidates(scenario, fleet, &cost_model, fire)?;
            let mut remaining = fire.demand;

            while remaining > 0 {
                let Some(index) = pick_closest(&candidates, fleet) else {
                    break;
                };
                let candidate = &candidates[index];
                let Some(unit) = fleet.reserve(&candidate.base_id, &candidate.model) else {
                    candidates.swap_remove(index);
                    continue;
                };
                result.assignments.push(Assignment {
                    fire_id: fire.id.clone(),
                    helicopter_id: unit.id,
                    model: unit.model,
                    base_id: unit.base_id,
                    distance_km: candidate.cost.distance_km,
                    travel_time_min: candidate.cost.travel_time_min,
                    fuel_cost: candidate.cost.fuel_cost,
                    water_capacity_l: candidate.water_capacity_l,
                });
                remaining -= 1;
            }

            if remaining > 0 {
                tracing::warn!(
                    fire = %fire.id,
                    demand = fire.demand,
                    unmet = remaining,
                    "fire left unaddressed by basic dispatch"
                );
                result.unaddressed.insert(fire.id.clone(), remaining);
            }
        }

        tracing::info!(
            assignments = result.assignments.len(),
            unaddressed = result.unaddressed.len(),
            fuel_cost = result.total_fuel_cost(),
            "basic dispatch complete"
        );
        Ok(result)
    }

    fn candidates(
        &self,
        scenario: &Scenario,
        fleet: &FleetRegistry,
        cost_model: &CostModel,
        fire: &FireIncident,
    ) -> Result<Vec<Candidate>> {
        let bases = scenario.base_index();
        let specs = scenario.spec_index();
        let mut candidates = Vec::new();

        for pool in fleet.pools().filter(|p| p.available > 0) {
            let base = bases
                .get(pool.base_id)
                .ok_or_else(|| DispatchError::UnknownBase {
                    unit_id: fleet.peek(pool.base_id, pool.model).unwrap_or_default().to_string(),
                    base_id: pool.base_id.to_string(),
                })?;
            let spec = specs
                .get(pool.model)
                .ok_or_else(|| DispatchError::UnknownModel {
                    model: pool.model.to_string(),
                })?;
            if let Some(cost) = cost_model.feasible_cost(base.location(), fire.location(), spec)? {
                candidates.push(Candidate {
                    base_id: pool.base_id.to_string(),
                    model: pool.model.to_string(),
                    cost,
                    water_capacity_l: spec.water_capacity_l,
                });
            }
        }
        Ok(candidates)
    }
}

/// Candidate with the shortest travel time; ties go to the lowest base id,
/// then the lowest unit id.
fn pick_closest(candidates: &[Candidate], fleet: &FleetRegistry) -> Option<usize> {
    candidates
        .iter()
        .enumerate()
        .filter_map(|(index, c)| fleet.peek(&c.base_id, &c.model).map(|unit| (index, c, unit)))
        .min_by(|(_, a, unit_a), (_, b, unit_b)| {
            a.cost
                .travel_time_min
                .total_cmp(&b.cost.travel_time_min)
                .then_with(|| a.base_id.cmp(&b.base_id))
                .then_with(|| unit_a.cmp(unit_b))
        })
        .map(|(index, _, _)| index)
}
