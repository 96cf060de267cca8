//! Fleet registry: per-(base, model) availability ledger.
//!
//! Each dispatch run owns its own registry. Reservation hands out the lowest
//! available unit id of a pool; a unit is never handed out twice until it is
//! released.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::models::{DispatchResult, HelicopterUnit};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct PoolKey {
    base_id: String,
    model: String,
}

impl PoolKey {
    fn new(base_id: &str, model: &str) -> Self {
        Self {
            base_id: base_id.to_string(),
            model: model.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Pool {
    available: BTreeSet<String>,
    reserved: BTreeSet<String>,
}

/// Availability pool summary for one (base, model) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus<'a> {
    pub base_id: &'a str,
    pub model: &'a str,
    pub available: usize,
    pub reserved: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FleetRegistry {
    pools: BTreeMap<PoolKey, Pool>,
    homes: HashMap<String, PoolKey>,
}

impl FleetRegistry {
    /// Build a registry from the units flagged available.
    pub fn from_units<'a>(units: impl IntoIterator<Item = &'a HelicopterUnit>) -> Self {
        let mut registry = Self::default();
        for unit in units.into_iter().filter(|u| u.available) {
            let key = PoolKey::new(&unit.base_id, &unit.model);
            registry
                .pools
                .entry(key.clone())
                .or_default()
                .available
                .insert(unit.id.clone());
            registry.homes.insert(unit.id.clone(), key);
        }
        registry
    }

    /// Take the lowest-id available unit of a pool, or `None` when exhausted.
    pub fn reserve(&mut self, base_id: &str, model: &str) -> Option<HelicopterUnit> {
        let key = PoolKey::new(base_id, model);
        let pool = self.pools.get_mut(&key)?;
        let unit_id = pool.available.pop_first()?;
        pool.reserved.insert(unit_id.clone());
        tracing::debug!(unit = %unit_id, base = base_id, model, "reserved helicopter");
        Some(HelicopterUnit {
            id: unit_id,
            base_id: key.base_id,
            model: key.model,
            available: false,
        })
    }

    /// Id of the unit [`reserve`](Self::reserve) would hand out next.
    pub fn peek(&self, base_id: &str, model: &str) -> Option<&str> {
        self.pools
            .get(&PoolKey::new(base_id, model))
            .and_then(|pool| pool.available.first())
            .map(String::as_str)
    }

    /// Return a reserved unit to its pool. False if it was not reserved.
    pub fn release(&mut self, unit_id: &str) -> bool {
        let Some(key) = self.homes.get(unit_id) else {
            return false;
        };
        let Some(pool) = self.pools.get_mut(key) else {
            return false;
        };
        if pool.reserved.remove(unit_id) {
            pool.available.insert(unit_id.to_string());
            true
        } else {
            false
        }
    }

    /// Release every helicopter a previous run assigned.
    pub fn release_result(&mut self, result: &DispatchResult) -> usize {
        result
            .assignments
            .iter()
            .filter(|a| self.release(&a.helicopter_id))
            .count()
    }

    /// Make every unit available again.
    pub fn reset(&mut self) {
        for pool in self.pools.values_mut() {
            let reserved = std::mem::take(&mut pool.reserved);
            pool.available.extend(reserved);
        }
    }

    pub fn is_reserved(&self, unit_id: &str) -> bool {
        self.homes
            .get(unit_id)
            .and_then(|key| self.pools.get(key))
            .is_some_and(|pool| pool.reserved.contains(unit_id))
    }

    pub fn available(&self, base_id: &str, model: &str) -> usize {
        self.pools
            .get(&PoolKey::new(base_id, model))
            .map_or(0, |pool| pool.available.len())
    }

    /// Pools in (base id, model) order.
    pub fn pools(&self) -> impl Iterator<Item = PoolStatus<'_>> {
        self.pools.iter().map(|(key, pool)| PoolStatus {
            base_id: &key.base_id,
            model: &key.model,
            available: pool.available.len(),
            reserved: pool.reserved.len(),
        })
    }

    pub fn total_available(&self) -> usize {
        self.pools.values().map(|p| p.available.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> FleetRegistry {
        let units = vec![
            HelicopterUnit::new("H2", "B1", "KA32"),
            HelicopterUnit::new("H1", "B1", "KA32"),
            HelicopterUnit::new("H3", "B2", "S76"),
            HelicopterUnit {
                available: false,
                ..HelicopterUnit::new("H4", "B2", "S76")
            },
        ];
        FleetRegistry::from_units(&units)
    }

    #[test]
    fn reserve_hands_out_lowest_id_first() {
        let mut fleet = registry();
        assert_eq!(fleet.peek("B1", "KA32"), Some("H1"));
        let unit = fleet.reserve("B1", "KA32").unwrap();
        assert_eq!(unit.id, "H1");
        assert_eq!(unit.base_id, "B1");
        assert!(fleet.is_reserved("H1"));
        assert_eq!(fleet.reserve("B1", "KA32").unwrap().id, "H2");
        assert!(fleet.reserve("B1", "KA32").is_none());
    }

    #[test]
    fn unavailable_units_never_enter_the_pool() {
        let mut fleet = registry();
        assert_eq!(fleet.available("B2", "S76"), 1);
        assert_eq!(fleet.reserve("B2", "S76").unwrap().id, "H3");
        assert!(fleet.reserve("B2", "S76").is_none());
    }

    #[test]
    fn unknown_pool_reserves_nothing() {
        let mut fleet = registry();
        assert!(fleet.reserve("B9", "KA32").is_none());
        assert!(fleet.peek("B1", "S76").is_none());
    }

    #[test]
    fn release_returns_unit_and_preserves_totals() {
        let mut fleet = registry();
        let unit = fleet.reserve("B1", "KA32").unwrap();
        let totals: Vec<usize> = fleet.pools().map(|p| p.available + p.reserved).collect();

        assert!(fleet.release(&unit.id));
        assert!(!fleet.release(&unit.id));
        assert!(!fleet.release("H999"));

        let after: Vec<usize> = fleet.pools().map(|p| p.available + p.reserved).collect();
        assert_eq!(totals, after);
        assert_eq!(fleet.available("B1", "KA32"), 2);
    }

    #[test]
    fn lookups_are_exact_per_base_and_model() {
        let units = vec![
            HelicopterUnit::new("A1", "B1", "KA32"),
            HelicopterUnit::new("A2", "B10", "KA32"),
            HelicopterUnit::new("A3", "B1", "KA32X"),
        ];
        let mut fleet = FleetRegistry::from_units(&units);
        assert_eq!(fleet.peek("B10", "KA32"), Some("A2"));
        assert_eq!(fleet.peek("B1", "KA32X"), Some("A3"));
        assert_eq!(fleet.available("B1", "KA32"), 1);

        fleet.reserve("B1", "KA32");
        assert_eq!(fleet.available("B1", "KA32"), 0);
        assert_eq!(fleet.peek("B1", "KA32"), None);
        assert_eq!(fleet.available("B10", "KA32"), 1);
        assert_eq!(fleet.available("B2", "S76"), 0);
    }

    #[test]
    fn reset_restores_everything() {
        let mut fleet = registry();
        fleet.reserve("B1", "KA32");
        fleet.reserve("B2", "S76");
        assert_eq!(fleet.total_available(), 1);
        fleet.reset();
        assert_eq!(fleet.total_available(), 3);
    }
}
