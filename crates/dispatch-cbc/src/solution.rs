//! CBC solution file reader.
//!
//! The first line carries the status and objective, e.g.
//! `Optimal - objective value 1234.5`. Each further line is
//! `<index> <column> <value> <reduced cost>`, optionally prefixed by `**`
//! when CBC flags the entry. Columns left out of the file are zero.

use crate::lp::column_index;

#[derive(Debug, Clone, PartialEq)]
pub enum CbcStatus {
    Optimal,
    Infeasible,
    TimedOut,
    Other(String),
}

impl CbcStatus {
    fn from_header(header: &str) -> Self {
        let lower = header.to_ascii_lowercase();
        if lower.starts_with("optimal") {
            CbcStatus::Optimal
        } else if lower.starts_with("infeasible") || lower.contains("integer infeasible") {
            CbcStatus::Infeasible
        } else if lower.starts_with("stopped on time") {
            CbcStatus::TimedOut
        } else {
            let status = header.split(" - ").next().unwrap_or(header).trim();
            CbcStatus::Other(status.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CbcOutcome {
    pub status: CbcStatus,
    pub objective: Option<f64>,
    /// One value per model column
    pub values: Vec<f64>,
}

/// Parse a CBC solution file for a model with `num_vars` columns.
pub fn parse_solution(text: &str, num_vars: usize) -> Result<CbcOutcome, String> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines
        .next()
        .ok_or_else(|| "solution file is empty".to_string())?
        .trim();
    let status = CbcStatus::from_header(header);
    let objective = header
        .rsplit_once("objective value")
        .and_then(|(_, value)| value.trim().parse::<f64>().ok());

    let mut values = vec![0.0; num_vars];
    for line in lines {
        let mut fields = line.split_whitespace().peekable();
        if fields.peek() == Some(&"**") {
            fields.next();
        }
        let (Some(_row), Some(name), Some(value)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(format!("unreadable solution line: {}", line.trim()));
        };
        let index = column_index(name)
            .filter(|&index| index < num_vars)
            .ok_or_else(|| format!("unknown column {name} in solution"))?;
        values[index] = value
            .parse()
            .map_err(|_| format!("column {name} has non-numeric value {value}"))?;
    }

    Ok(CbcOutcome {
        status,
        objective,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_optimal_solution() {
        let text = "Optimal - objective value 5012.5\n\
                    \x20     0 v0                     1                     12.5\n\
                    \x20     2 v2                     1                     5000\n";
        let outcome = parse_solution(text, 3).unwrap();
        assert_eq!(outcome.status, CbcStatus::Optimal);
        assert_eq!(outcome.objective, Some(5012.5));
        assert_eq!(outcome.values, vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn flagged_lines_are_read() {
        let text = "Stopped on time - objective value 20.00000000\n\
                    ** 1 v1 1 0\n";
        let outcome = parse_solution(text, 2).unwrap();
        assert_eq!(outcome.status, CbcStatus::TimedOut);
        assert_eq!(outcome.values, vec![0.0, 1.0]);
    }

    #[test]
    fn infeasible_header() {
        let outcome = parse_solution("Infeasible - objective value 0.00000000\n", 4).unwrap();
        assert_eq!(outcome.status, CbcStatus::Infeasible);
        assert_eq!(outcome.values, vec![0.0; 4]);
    }

    #[test]
    fn unknown_status_is_kept() {
        let outcome = parse_solution("Stopped on iterations - objective value 3\n", 0).unwrap();
        assert_eq!(outcome.status, CbcStatus::Other("Stopped on iterations".into()));
        assert_eq!(outcome.objective, Some(3.0));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_solution("", 1).is_err());
        assert!(parse_solution("Optimal - objective value 1\n0 v7 1 0\n", 2).is_err());
        assert!(parse_solution("Optimal - objective value 1\n0 v0 one 0\n", 1).is_err());
        assert!(parse_solution("Optimal - objective value 1\n0 v0\n", 1).is_err());
    }
}
