//! Side-by-side rendering of the two dispatch results.

use dispatch_core::{DispatchResult, Scenario, Strategy};
use serde::Serialize;
use std::fmt::Write;

/// Everything one invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub big_penalty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic: Option<DispatchResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized: Option<DispatchResult>,
    /// Solver failure that cost us the optimized result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_error: Option<String>,
}

impl RunReport {
    pub fn objective(&self, strategy: Strategy) -> Option<f64> {
        let result = match strategy {
            Strategy::Basic => self.basic.as_ref(),
            Strategy::Optimized => self.optimized.as_ref(),
        };
        result.map(|r| r.objective(self.big_penalty))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn render_text(&self, scenario: &Scenario) -> String {
        let mut out = String::new();
        if let Some(basic) = &self.basic {
            render_result(&mut out, basic, scenario, self.big_penalty);
        }
        match (&self.optimized, &self.optimized_error) {
            (Some(optimized), _) => render_result(&mut out, optimized, scenario, self.big_penalty),
            (None, Some(error)) => {
                let _ = writeln!(out, "=== Optimized dispatch ===");
                let _ = writeln!(out, "No result: {error}");
                out.push('\n');
            }
            (None, None) => {}
        }
        if let (Some(basic), Some(optimized)) = (
            self.objective(Strategy::Basic),
            self.objective(Strategy::Optimized),
        ) {
            let _ = writeln!(
                out,
                "Objective: basic {:.2}, optimized {:.2}, improvement {:.2}",
                basic,
                optimized,
                basic - optimized
            );
        }
        out
    }
}

pub fn unreachable_label(short: u32) -> String {
    format!("Unreachable (short {short})")
}

fn render_result(out: &mut String, result: &DispatchResult, scenario: &Scenario, big_penalty: f64) {
    let title = match result.strategy {
        Strategy::Basic => "Basic dispatch",
        Strategy::Optimized => "Optimized dispatch",
    };
    let _ = writeln!(out, "=== {title} ===");
    let _ = writeln!(
        out,
        "{:<10} {:<16} {:<8} {:<8} {:>13} {:>12} {:>10} {:>9}",
        "Fire",
        "Helicopter",
        "Model",
        "Base",
        "Distance (km)",
        "Travel (min)",
        "Fuel cost",
        "Water (l)"
    );
    for fire in scenario.ordered_fires() {
        for a in result.assignments_for(&fire.id) {
            let _ = writeln!(
                out,
                "{:<10} {:<16} {:<8} {:<8} {:>13.1} {:>12.1} {:>10.2} {:>9.0}",
                a.fire_id,
                a.helicopter_id,
                a.model,
                a.base_id,
                a.distance_km,
                a.travel_time_min,
                a.fuel_cost,
                a.water_capacity_l
            );
        }
        if let Some(&short) = result.unaddressed.get(&fire.id) {
            let _ = writeln!(out, "{:<10} {}", fire.id, unreachable_label(short));
        }
    }
    let _ = writeln!(
        out,
        "Fuel cost {:.2} | unmet {} | objective {:.2}",
        result.total_fuel_cost(),
        result.total_unmet(),
        result.objective(big_penalty)
    );
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::{Assignment, FireIncident};

    fn scenario() -> Scenario {
        Scenario {
            fires: vec![
                FireIncident::new("F2", 37.1, 127.1, 2),
                FireIncident::new("F1", 37.0, 127.0, 1),
            ],
            ..Scenario::default()
        }
    }

    fn basic() -> DispatchResult {
        let mut result = DispatchResult::new(Strategy::Basic);
        result.assignments.push(Assignment {
            fire_id: "F2".into(),
            helicopter_id: "B1-KA32-1".into(),
            model: "KA32".into(),
            base_id: "B1".into(),
            distance_km: 10.0,
            travel_time_min: 2.5,
            fuel_cost: 20.0,
            water_capacity_l: 3_000.0,
        });
        result.unaddressed.insert("F1".into(), 1);
        result.unaddressed.insert("F2".into(), 1);
        result
    }

    #[test]
    fn text_lists_fires_in_id_order() {
        let report = RunReport {
            big_penalty: 100.0,
            basic: Some(basic()),
            optimized: None,
            optimized_error: None,
        };
        let text = report.render_text(&scenario());
        let f1 = text.find("F1         Unreachable (short 1)").unwrap();
        let f2 = text.find("B1-KA32-1").unwrap();
        assert!(f1 < f2);
        assert!(text.contains("F2         Unreachable (short 1)"));
        assert!(text.contains("objective 220.00"));
        assert!(text.contains("Water (l)"));
        let row = text.lines().find(|l| l.contains("B1-KA32-1")).unwrap();
        assert!(row.trim_end().ends_with("3000"), "{row}");
    }

    #[test]
    fn solver_failure_is_reported_next_to_basic() {
        let report = RunReport {
            big_penalty: 100.0,
            basic: Some(basic()),
            optimized: None,
            optimized_error: Some("solver unavailable at cbc: not found".into()),
        };
        let text = report.render_text(&scenario());
        assert!(text.contains("=== Basic dispatch ==="));
        assert!(text.contains("No result: solver unavailable at cbc"));
        assert!(!text.contains("improvement"));
    }

    #[test]
    fn comparison_line_when_both_present() {
        let mut optimized = basic();
        optimized.strategy = Strategy::Optimized;
        optimized.unaddressed.remove("F2");
        let report = RunReport {
            big_penalty: 100.0,
            basic: Some(basic()),
            optimized: Some(optimized),
            optimized_error: None,
        };
        assert_eq!(report.objective(Strategy::Optimized), Some(120.0));
        let text = report.render_text(&scenario());
        assert!(text.contains("Objective: basic 220.00, optimized 120.00, improvement 100.00"));
    }

    #[test]
    fn json_omits_missing_sections() {
        let report = RunReport {
            big_penalty: 100.0,
            basic: Some(basic()),
            optimized: None,
            optimized_error: None,
        };
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["basic"]["strategy"], "basic");
        assert_eq!(value["basic"]["unaddressed"]["F1"], 1);
        assert_eq!(value["basic"]["assignments"][0]["water_capacity_l"], 3000.0);
        assert!(value.get("optimized").is_none());
        assert!(value.get("optimized_error").is_none());
    }
}
