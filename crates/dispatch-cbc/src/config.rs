//! CBC launch settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CbcConfig {
    /// Executable to launch; resolved through PATH when not absolute
    pub executable_path: String,
    /// Arguments placed before the model path, e.g. a wrapper script
    pub launcher_args: Vec<String>,
    /// Time budget handed to CBC
    pub timeout_secs: u64,
    /// Extra wait past the budget before the process is killed
    pub kill_grace_ms: u64,
    /// Copy the LP and solution files here after each solve
    pub dump_dir: Option<PathBuf>,
}

impl Default for CbcConfig {
    fn default() -> Self {
        Self {
            executable_path: "cbc".to_string(),
            launcher_args: Vec::new(),
            timeout_secs: 60,
            kill_grace_ms: 2_000,
            dump_dir: None,
        }
    }
}

impl CbcConfig {
    pub fn with_executable(mut self, path: impl Into<String>) -> Self {
        self.executable_path = path.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Wall-clock point past which the process gets killed.
    pub fn hard_deadline(&self) -> Duration {
        self.timeout() + Duration::from_millis(self.kill_grace_ms)
    }
}
