//! CBC subprocess driver.

use std::fs::{self, File};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use dispatch_core::error::{DispatchError, Result};
use dispatch_core::milp::MilpModel;
use dispatch_core::solver::{MilpSolution, MilpSolver};
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::CbcConfig;
use crate::lp::write_lp;
use crate::solution::{parse_solution, CbcStatus};

const MODEL_FILE: &str = "model.lp";
const SOLUTION_FILE: &str = "solution.txt";
const LOG_FILE: &str = "cbc.log";
const LOG_TAIL_LINES: usize = 20;

/// Solves models by running the CBC executable on an LP file.
#[derive(Debug, Clone, Default)]
pub struct CbcSolver {
    config: CbcConfig,
}

impl CbcSolver {
    pub fn new(config: CbcConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CbcConfig {
        &self.config
    }

    fn unavailable(&self, reason: impl ToString) -> DispatchError {
        DispatchError::SolverUnavailable {
            path: self.config.executable_path.clone(),
            reason: reason.to_string(),
        }
    }

    /// Blocking wrapper: drives the child on a private current-thread runtime.
    fn run(&self, workdir: &Path) -> Result<ExitStatus> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| DispatchError::SolverFailed(format!("cannot start runtime: {err}")))?;
        runtime.block_on(self.execute(workdir))
    }

    async fn execute(&self, workdir: &Path) -> Result<ExitStatus> {
        let log = File::create(workdir.join(LOG_FILE))
            .map_err(|err| DispatchError::SolverFailed(format!("cannot create log file: {err}")))?;
        let log_err = log
            .try_clone()
            .map_err(|err| DispatchError::SolverFailed(format!("cannot create log file: {err}")))?;

        let mut command = Command::new(&self.config.executable_path);
        command
            .args(&self.config.launcher_args)
            .arg(MODEL_FILE)
            .arg("-sec")
            .arg(self.config.timeout_secs.to_string())
            .arg("-solve")
            .arg("-solution")
            .arg(SOLUTION_FILE)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|err| self.unavailable(err))?;

        match timeout(self.config.hard_deadline(), child.wait()).await {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(err)) => Err(DispatchError::SolverFailed(format!(
                "lost track of solver process: {err}"
            ))),
            Err(_) => {
                tracing::warn!(
                    pid = child.id(),
                    limit_secs = self.config.timeout_secs,
                    "CBC overran its time budget; killing"
                );
                if let Err(err) = child.kill().await {
                    tracing::warn!(error = %err, "Failed to kill CBC");
                }
                Err(DispatchError::SolverTimeout {
                    limit: self.config.timeout(),
                })
            }
        }
    }

    fn dump(&self, workdir: &Path) {
        let Some(dir) = &self.config.dump_dir else {
            return;
        };
        if let Err(err) = fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %err, "Cannot create solver dump dir");
            return;
        }
        for name in [MODEL_FILE, SOLUTION_FILE, LOG_FILE] {
            let source = workdir.join(name);
            if source.exists() {
                if let Err(err) = fs::copy(&source, dir.join(name)) {
                    tracing::warn!(file = name, error = %err, "Failed to keep solver file");
                }
            }
        }
    }
}

impl MilpSolver for CbcSolver {
    fn name(&self) -> &str {
        "cbc"
    }

    fn solve(&self, model: &MilpModel) -> Result<MilpSolution> {
        if model.variables.is_empty() {
            return Ok(MilpSolution {
                objective: 0.0,
                values: Vec::new(),
            });
        }

        let workdir = tempfile::Builder::new()
            .prefix("heli-dispatch-")
            .tempdir()
            .map_err(|err| DispatchError::SolverFailed(format!("cannot create work dir: {err}")))?;
        fs::write(workdir.path().join(MODEL_FILE), write_lp(model))
            .map_err(|err| DispatchError::SolverFailed(format!("cannot write model: {err}")))?;

        tracing::debug!(
            executable = %self.config.executable_path,
            variables = model.variables.len(),
            constraints = model.constraints.len(),
            "Launching CBC"
        );
        let started = Instant::now();
        let status = self.run(workdir.path());
        self.dump(workdir.path());
        let status = status?;

        if !status.success() {
            return Err(DispatchError::SolverFailed(format!(
                "solver exited with {status}: {}",
                log_tail(&workdir.path().join(LOG_FILE))
            )));
        }

        let text = fs::read_to_string(workdir.path().join(SOLUTION_FILE)).map_err(|err| {
            DispatchError::SolverFailed(format!(
                "no solution file ({err}): {}",
                log_tail(&workdir.path().join(LOG_FILE))
            ))
        })?;
        let outcome = parse_solution(&text, model.variables.len())
            .map_err(DispatchError::MalformedSolution)?;

        tracing::debug!(
            status = ?outcome.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "CBC finished"
        );

        match outcome.status {
            CbcStatus::Optimal => {
                let objective = outcome
                    .objective
                    .unwrap_or_else(|| model.objective_value(&outcome.values));
                Ok(MilpSolution {
                    objective,
                    values: outcome.values,
                })
            }
            CbcStatus::Infeasible => Err(DispatchError::SolverInfeasible {
                status: "infeasible".to_string(),
            }),
            CbcStatus::TimedOut => Err(DispatchError::SolverTimeout {
                limit: self.config.timeout(),
            }),
            CbcStatus::Other(status) => Err(DispatchError::SolverFailed(format!(
                "unexpected solver status: {status}"
            ))),
        }
    }
}

fn log_tail(path: &Path) -> String {
    let Ok(log) = fs::read_to_string(path) else {
        return "no solver output".to_string();
    };
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.len().saturating_sub(LOG_TAIL_LINES);
    let tail = lines[start..].join("\n");
    if tail.trim().is_empty() {
        "no solver output".to_string()
    } else {
        tail
    }
}
