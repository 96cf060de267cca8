//! Geodesic cost model shared by both dispatch strategies.
//!
//! Turns a base location, a fire location and a model spec into distance,
//! travel time and round-trip fuel cost, and decides whether the pairing is
//! feasible at all.

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::models::{GeoPoint, ModelSpec};
use crate::params::DispatchParams;
use crate::spatial::distance_km;

/// Cost of sending one helicopter from a base to a fire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelCost {
    /// One-way great-circle distance
    pub distance_km: f64,
    /// One-way flight time at cruise speed
    pub travel_time_min: f64,
    /// Fuel for the full round trip
    pub fuel_cost: f64,
}

/// Pure cost and feasibility rules derived from [`DispatchParams`].
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    fuel_rate: f64,
    round_trip_factor: f64,
    max_range_km: f64,
    golden_time_minutes: f64,
}

impl CostModel {
    pub fn new(params: &DispatchParams) -> Self {
        Self {
            fuel_rate: params.fuel_rate,
            round_trip_factor: params.round_trip_factor,
            max_range_km: params.max_helicopter_range_km,
            golden_time_minutes: params.golden_time_minutes,
        }
    }

    /// Distance, travel time and fuel cost from `base` to `fire`.
    pub fn cost(&self, base: GeoPoint, fire: GeoPoint, spec: &ModelSpec) -> Result<TravelCost> {
        if !spec.cruise_speed_kmh.is_finite() || spec.cruise_speed_kmh <= 0.0 {
            return Err(DispatchError::InvalidSpec {
                model: spec.model.clone(),
                reason: format!("cruise speed {} km/h", spec.cruise_speed_kmh),
            });
        }
        let distance_km = distance_km(base, fire)?;
        Ok(TravelCost {
            distance_km,
            travel_time_min: distance_km / spec.cruise_speed_kmh * 60.0,
            fuel_cost: distance_km * self.round_trip_factor * self.fuel_rate * spec.fuel_burn,
        })
    }

    pub fn round_trip_km(&self, cost: &TravelCost) -> f64 {
        cost.distance_km * self.round_trip_factor
    }

    /// Range and golden-time check for an already computed cost.
    pub fn is_feasible(&self, cost: &TravelCost, spec: &ModelSpec) -> bool {
        let round_trip = self.round_trip_km(cost);
        round_trip <= spec.max_range_km
            && round_trip <= self.max_range_km
            && cost.travel_time_min <= self.golden_time_minutes
    }

    /// Cost of the pairing, or `None` when it breaks range or golden time.
    pub fn feasible_cost(
        &self,
        base: GeoPoint,
        fire: GeoPoint,
        spec: &ModelSpec,
    ) -> Result<Option<TravelCost>> {
        let cost = self.cost(base, fire, spec)?;
        Ok(self.is_feasible(&cost, spec).then_some(cost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> CostModel {
        CostModel::new(&DispatchParams {
            fuel_rate: 3.0,
            golden_time_minutes: 30.0,
            max_helicopter_range_km: 500.0,
            ..DispatchParams::default()
        })
    }

    #[test]
    fn cost_accounts_for_round_trip() {
        let spec = ModelSpec::new("KA32", 240.0, 800.0).with_fuel_burn(2.0);
        let cost = model()
            .cost(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), &spec)
            .unwrap();

        assert!((cost.distance_km - 111.195).abs() < 0.1);
        assert!((cost.travel_time_min - cost.distance_km / 4.0).abs() < 1e-9);
        assert!((cost.fuel_cost - cost.distance_km * 2.0 * 3.0 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_speed_is_invalid_spec() {
        let spec = ModelSpec::new("BROKEN", 0.0, 800.0);
        let err = model().cost(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), &spec);
        assert!(matches!(err, Err(DispatchError::InvalidSpec { .. })));
    }

    #[test]
    fn bad_coordinate_surfaces_before_speed_math() {
        let spec = ModelSpec::new("KA32", 240.0, 800.0);
        let err = model().cost(GeoPoint::new(0.0, 200.0), GeoPoint::new(1.0, 0.0), &spec);
        assert!(matches!(err, Err(DispatchError::InvalidCoordinate { .. })));
    }

    #[test]
    fn golden_time_cuts_off_slow_pairings() {
        // 111 km at 200 km/h is ~33 minutes, past the 30 minute cutoff
        let spec = ModelSpec::new("SLOW", 200.0, 800.0);
        let pair = model()
            .feasible_cost(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), &spec)
            .unwrap();
        assert!(pair.is_none());
    }

    #[test]
    fn model_range_applies_to_round_trip() {
        // 111 km one way needs 222 km of range
        let spec = ModelSpec::new("SHORT", 600.0, 200.0);
        let pair = model()
            .feasible_cost(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), &spec)
            .unwrap();
        assert!(pair.is_none());

        let spec = ModelSpec::new("LONG", 600.0, 230.0);
        let pair = model()
            .feasible_cost(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), &spec)
            .unwrap();
        assert!(pair.is_some());
    }
}
