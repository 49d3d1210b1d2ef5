use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::ScriptConfig;
use crate::error::TriggerError;
use crate::parser::{parse_output, tail_chars, FileStatus};
use crate::runner::{run_script, RawProcessResult, ScriptInvocation};

/// Summary of one script run as returned to HTTP clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerOutcome {
    pub success: bool,
    pub files: Vec<FileStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    pub exit_code: i32,
    pub timestamp: String,
    /// Tail of stdout, for diagnostics only.
    pub stdout: String,
    /// Tail of stderr, for diagnostics only.
    pub stderr: String,
}

impl TriggerOutcome {
    pub fn from_raw(raw: &RawProcessResult, cfg: &ScriptConfig) -> Self {
        let parsed = parse_output(&raw.stdout);
        Self {
            success: raw.exit_code == 0 && parsed.errors.is_empty(),
            files: parsed.files,
            errors: parsed.errors,
            exit_code: raw.exit_code,
            timestamp: Local::now().to_rfc3339(),
            stdout: tail_chars(&raw.stdout, cfg.stdout_tail_chars).to_string(),
            stderr: tail_chars(&raw.stderr, cfg.stderr_tail_chars).to_string(),
        }
    }
}

/// Runs the configured download script. Stateless between calls, so a single
/// instance is shared by every request and concurrent triggers run side by side.
#[derive(Debug, Clone)]
pub struct TriggerExecutor {
    script: ScriptConfig,
}

impl TriggerExecutor {
    pub fn new(script: ScriptConfig) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &ScriptConfig {
        &self.script
    }

    pub async fn execute(&self, force: bool) -> Result<TriggerOutcome, TriggerError> {
        let invocation = ScriptInvocation::from_config(&self.script, force);
        tracing::info!(script = %self.script.path, force, "running download script");

        let raw = run_script(
            &invocation,
            Duration::from_secs(self.script.timeout_secs),
            Duration::from_millis(self.script.kill_grace_ms),
        )
        .await
        .inspect_err(|e| tracing::error!(error = %e, "download script failed to run"))?;

        if raw.timed_out {
            tracing::warn!(
                timeout_secs = self.script.timeout_secs,
                stderr_tail = %tail_chars(&raw.stderr, self.script.stderr_tail_chars),
                "download script timed out and was killed"
            );
            return Err(TriggerError::Timeout {
                secs: self.script.timeout_secs,
            });
        }

        let outcome = TriggerOutcome::from_raw(&raw, &self.script);
        tracing::info!(
            exit_code = outcome.exit_code,
            success = outcome.success,
            files = outcome.files.len(),
            errors = outcome.errors.len(),
            duration_ms = raw.duration_ms,
            "download script finished"
        );
        Ok(outcome)
    }
}
