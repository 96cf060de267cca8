//! Statically typed MILP request handed across the solver boundary.
//!
//! The model is always a minimization over binary and bounded integer
//! variables with linear constraints.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking integrality and constraint satisfaction.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariableKind {
    Binary,
    Integer { lower: i64, upper: i64 },
}

impl VariableKind {
    pub fn bounds(&self) -> (i64, i64) {
        match *self {
            VariableKind::Binary => (0, 1),
            VariableKind::Integer { lower, upper } => (lower, upper),
        }
    }
}

/// Decision variable descriptor with its objective coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub kind: VariableKind,
    pub objective: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSense {
    LessEqual,
    GreaterEqual,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub var: usize,
    pub coef: f64,
}

/// One row of the constraint matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<Term>,
    pub sense: ConstraintSense,
    pub rhs: f64,
}

impl Constraint {
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|t| t.coef * values[t.var]).sum()
    }

    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let lhs = self.activity(values);
        match self.sense {
            ConstraintSense::LessEqual => lhs <= self.rhs + FEASIBILITY_TOLERANCE,
            ConstraintSense::GreaterEqual => lhs >= self.rhs - FEASIBILITY_TOLERANCE,
            ConstraintSense::Equal => (lhs - self.rhs).abs() <= FEASIBILITY_TOLERANCE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilpModel {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
}

impl MilpModel {
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        kind: VariableKind,
        objective: f64,
    ) -> usize {
        self.variables.push(Variable {
            name: name.into(),
            kind,
            objective,
        });
        self.variables.len() - 1
    }

    /// Add a row; rows without terms are dropped.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<Term>,
        sense: ConstraintSense,
        rhs: f64,
    ) {
        if terms.is_empty() {
            return;
        }
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            sense,
            rhs,
        });
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, value)| var.objective * value)
            .sum()
    }

    /// Check a candidate solution against bounds, integrality and every row.
    pub fn check_solution(&self, values: &[f64]) -> Result<(), String> {
        if values.len() != self.variables.len() {
            return Err(format!(
                "expected {} variable values, got {}",
                self.variables.len(),
                values.len()
            ));
        }
        for (var, &value) in self.variables.iter().zip(values) {
            if !value.is_finite() || (value - value.round()).abs() > FEASIBILITY_TOLERANCE {
                return Err(format!("variable {} has non-integral value {}", var.name, value));
            }
            let (lower, upper) = var.kind.bounds();
            if value < lower as f64 - FEASIBILITY_TOLERANCE
                || value > upper as f64 + FEASIBILITY_TOLERANCE
            {
                return Err(format!(
                    "variable {} = {} outside [{}, {}]",
                    var.name, value, lower, upper
                ));
            }
        }
        match self.constraints.iter().find(|c| !c.is_satisfied(values)) {
            Some(row) => Err(format!(
                "constraint {} violated (activity {})",
                row.name,
                row.activity(values)
            )),
            None => Ok(()),
        }
    }
}
