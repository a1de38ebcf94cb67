//! Admin AI tool service.
//!
//! Shells out to an external interpreter script for admin chat and SQL
//! assistance. The process boundary sits behind [`CommandRunner`] so the
//! service never parses subprocess plumbing inline and tests can stub it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use devflow_common::{AdminToolConfig, AppError, AppResult};
use tokio::process::Command;

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Process exit code.
    pub status: i32,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

/// External command runner.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a program to completion with a timeout.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> AppResult<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner;

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> AppResult<CommandOutput> {
        let output = tokio::time::timeout(timeout, Command::new(program).args(args).output())
            .await
            .map_err(|_| AppError::Subprocess(format!("{program} timed out")))?
            .map_err(|e| AppError::Subprocess(format!("Failed to spawn {program}: {e}")))?;

        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Shared command runner handle.
pub type DynCommandRunner = Arc<dyn CommandRunner>;

/// Admin AI tool service.
#[derive(Clone)]
pub struct AdminToolService {
    runner: DynCommandRunner,
    config: AdminToolConfig,
}

impl AdminToolService {
    /// Create a new admin tool service.
    #[must_use]
    pub fn new(runner: DynCommandRunner, config: AdminToolConfig) -> Self {
        Self { runner, config }
    }

    /// Chat with the admin assistant script.
    pub async fn chat(&self, prompt: &str) -> AppResult<serde_json::Value> {
        self.invoke(&[
            "--mode".to_string(),
            "chat".to_string(),
            "--prompt".to_string(),
            prompt.to_string(),
        ])
        .await
    }

    /// Ask the assistant script to run SQL on the admin's behalf.
    ///
    /// The password (request-supplied, falling back to configuration) is
    /// forwarded to the script, which performs its own check.
    pub async fn run_sql(
        &self,
        prompt: &str,
        password: Option<&str>,
    ) -> AppResult<serde_json::Value> {
        let mut args = vec![
            "--mode".to_string(),
            "sql".to_string(),
            "--prompt".to_string(),
            prompt.to_string(),
        ];

        if let Some(password) = password.or(self.config.sql_password.as_deref()) {
            args.push("--password".to_string());
            args.push(password.to_string());
        }

        self.invoke(&args).await
    }

    /// Run the interpreter script and parse its stdout as JSON.
    async fn invoke(&self, args: &[String]) -> AppResult<serde_json::Value> {
        let mut full_args = vec![self.config.script_path.clone()];
        full_args.extend_from_slice(args);

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = self
            .runner
            .run(&self.config.interpreter, &full_args, timeout)
            .await?;

        if output.status != 0 {
            tracing::warn!(
                status = output.status,
                stderr = %output.stderr,
                "Admin tool exited non-zero"
            );
            return Err(AppError::Subprocess(format!(
                "Tool exited with status {}: {}",
                output.status,
                output.stderr.trim()
            )));
        }

        serde_json::from_str(&output.stdout)
            .map_err(|e| AppError::Subprocess(format!("Unparsable tool output: {e}")))
    }
}
