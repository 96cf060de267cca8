//! Builds the optimized-dispatch MILP and maps solutions back to assignments.
//!
//! Variables:
//! - `x_f_h` binary, one per fire/unit pair passing the range and golden-time
//!   filter (infeasible pairs get no variable at all)
//! - `u_f` integer in `[0, demand]`, the unmet helicopter count of fire `f`
//!
//! Objective: `sum(fuel_cost * x) + big_penalty * sum(u)`.
//!
//! Rows: each unit used at most once, each fire served at most its demand,
//! and `u_f + sum_h x_f_h = demand_f`.

use crate::cost::{CostModel, TravelCost};
use crate::error::{DispatchError, Result};
use crate::milp::{ConstraintSense, MilpModel, Term, VariableKind};
use crate::models::{Assignment, DispatchResult, HelicopterUnit, Strategy};
use crate::params::DispatchParams;
use crate::scenario::Scenario;
use crate::solver::MilpSolution;

#[derive(Debug, Clone)]
struct PairVar {
    var: usize,
    fire: usize,
    unit: usize,
    cost: TravelCost,
    water_capacity_l: f64,
}

#[derive(Debug, Clone)]
struct FireRow {
    id: String,
    demand: u32,
    unmet_var: usize,
}

/// A formulated model plus what is needed to decode its solution.
#[derive(Debug, Clone)]
pub struct AssignmentFormulation {
    model: MilpModel,
    fires: Vec<FireRow>,
    units: Vec<HelicopterUnit>,
    pairs: Vec<PairVar>,
}

impl AssignmentFormulation {
    pub fn build(scenario: &Scenario, params: &DispatchParams) -> Result<Self> {
        scenario.validate()?;
        params.validate()?;

        let cost_model = CostModel::new(params);
        let bases = scenario.base_index();
        let specs = scenario.spec_index();

        let fires = scenario.ordered_fires();
        let mut units: Vec<HelicopterUnit> = scenario
            .fleet_units()
            .into_iter()
            .filter(|u| u.available)
            .collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));

        let mut model = MilpModel::default();
        let mut pairs = Vec::new();
        for (f, fire) in fires.iter().enumerate() {
            for (h, unit) in units.iter().enumerate() {
                let base = bases.get(unit.base_id.as_str()).ok_or_else(|| {
                    DispatchError::UnknownBase {
                        unit_id: unit.id.clone(),
                        base_id: unit.base_id.clone(),
                    }
                })?;
                let spec = specs.get(unit.model.as_str()).ok_or_else(|| {
                    DispatchError::UnknownModel {
                        model: unit.model.clone(),
                    }
                })?;
                let Some(cost) =
                    cost_model.feasible_cost(base.location(), fire.location(), spec)?
                else {
                    continue;
                };
                let var =
                    model.add_variable(format!("x_{f}_{h}"), VariableKind::Binary, cost.fuel_cost);
                pairs.push(PairVar {
                    var,
                    fire: f,
                    unit: h,
                    cost,
                    water_capacity_l: spec.water_capacity_l,
                });
            }
        }

        let fire_rows: Vec<FireRow> = fires
            .iter()
            .enumerate()
            .map(|(f, fire)| FireRow {
                id: fire.id.clone(),
                demand: fire.demand,
                unmet_var: model.add_variable(
                    format!("u_{f}"),
                    VariableKind::Integer {
                        lower: 0,
                        upper: i64::from(fire.demand),
                    },
                    params.big_penalty,
                ),
            })
            .collect();

        for h in 0..units.len() {
            let terms = pair_terms(&pairs, |p| p.unit == h);
            model.add_constraint(format!("unit_{h}"), terms, ConstraintSense::LessEqual, 1.0);
        }
        for (f, row) in fire_rows.iter().enumerate() {
            let demand = f64::from(row.demand);
            let served = pair_terms(&pairs, |p| p.fire == f);
            model.add_constraint(
                format!("demand_{f}"),
                served.clone(),
                ConstraintSense::LessEqual,
                demand,
            );

            let mut link = served;
            link.push(Term {
                var: row.unmet_var,
                coef: 1.0,
            });
            model.add_constraint(format!("unmet_{f}"), link, ConstraintSense::Equal, demand);
        }

        tracing::debug!(
            variables = model.variables.len(),
            constraints = model.constraints.len(),
            pairs = pairs.len(),
            "formulated assignment model"
        );

        Ok(Self {
            model,
            fires: fire_rows,
            units,
            pairs,
        })
    }

    pub fn model(&self) -> &MilpModel {
        &self.model
    }

    /// Number of fire/unit pairs that survived the feasibility filter.
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Validate a solver response and turn it into a dispatch result.
    pub fn decode(&self, solution: &MilpSolution) -> Result<DispatchResult> {
        solution.validate_against(&self.model)?;

        let mut result = DispatchResult::new(Strategy::Optimized);
        let mut served = vec![0u32; self.fires.len()];
        for pair in &self.pairs {
            if solution.values[pair.var] < 0.5 {
                continue;
            }
            let unit = &self.units[pair.unit];
            served[pair.fire] += 1;
            result.assignments.push(Assignment {
                fire_id: self.fires[pair.fire].id.clone(),
                helicopter_id: unit.id.clone(),
                model: unit.model.clone(),
                base_id: unit.base_id.clone(),
                distance_km: pair.cost.distance_km,
                travel_time_min: pair.cost.travel_time_min,
                fuel_cost: pair.cost.fuel_cost,
                water_capacity_l: pair.water_capacity_l,
            });
        }

        for (row, &count) in self.fires.iter().zip(&served) {
            if count < row.demand {
                result.unaddressed.insert(row.id.clone(), row.demand - count);
            }
        }
        Ok(result)
    }
}

fn pair_terms(pairs: &[PairVar], keep: impl Fn(&PairVar) -> bool) -> Vec<Term> {
    pairs
        .iter()
        .filter(|&p| keep(p))
        .map(|p| Term {
            var: p.var,
            coef: 1.0,
        })
        .collect()
}
