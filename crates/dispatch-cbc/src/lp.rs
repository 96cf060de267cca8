//! CPLEX LP file writer.
//!
//! Columns are written as `v<index>` and rows as `c<index>` so arbitrary
//! model names never reach the file.

use dispatch_core::milp::{ConstraintSense, MilpModel, Term, VariableKind};
use std::fmt::Write;

/// Terms per output line.
const TERMS_PER_LINE: usize = 8;

pub fn column_name(index: usize) -> String {
    format!("v{index}")
}

/// Inverse of [`column_name`].
pub fn column_index(name: &str) -> Option<usize> {
    name.strip_prefix('v')?.parse().ok()
}

pub fn write_lp(model: &MilpModel) -> String {
    let mut out = String::new();
    out.push_str("\\ helicopter dispatch assignment model\n");
    out.push_str("Minimize\n obj:");
    let objective: Vec<Term> = model
        .variables
        .iter()
        .enumerate()
        .map(|(var, v)| Term {
            var,
            coef: v.objective,
        })
        .collect();
    write_terms(&mut out, &objective);
    out.push('\n');

    out.push_str("Subject To\n");
    for (row, constraint) in model.constraints.iter().enumerate() {
        let _ = write!(out, " c{row}:");
        write_terms(&mut out, &constraint.terms);
        let sense = match constraint.sense {
            ConstraintSense::LessEqual => "<=",
            ConstraintSense::GreaterEqual => ">=",
            ConstraintSense::Equal => "=",
        };
        let _ = writeln!(out, " {} {}", sense, constraint.rhs);
    }

    let mut binaries = Vec::new();
    let mut generals = Vec::new();
    out.push_str("Bounds\n");
    for (index, var) in model.variables.iter().enumerate() {
        match var.kind {
            VariableKind::Binary => binaries.push(column_name(index)),
            VariableKind::Integer { lower, upper } => {
                let _ = writeln!(out, " {} <= {} <= {}", lower, column_name(index), upper);
                generals.push(column_name(index));
            }
        }
    }
    write_section(&mut out, "Binaries", &binaries);
    write_section(&mut out, "Generals", &generals);
    out.push_str("End\n");
    out
}

fn write_terms(out: &mut String, terms: &[Term]) {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 && i % TERMS_PER_LINE == 0 {
            out.push_str("\n   ");
        }
        let sign = if term.coef < 0.0 { '-' } else { '+' };
        let _ = write!(out, " {} {} {}", sign, term.coef.abs(), column_name(term.var));
    }
}

fn write_section(out: &mut String, header: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    out.push_str(header);
    out.push('\n');
    for chunk in names.chunks(TERMS_PER_LINE) {
        let _ = writeln!(out, " {}", chunk.join(" "));
    }
}
