use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::core::traits::{CommandRunner, ToolInvocation};
use crate::error::{AppError, Result};

/// Runs tools as child processes with their output streamed to the step log
#[derive(Debug, Default, Clone)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<Option<i32>> {
        debug!(
            "🚀 Spawning {} {}",
            invocation.program,
            redacted_args(&invocation.args).join(" ")
        );

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let status = cmd.status().await.map_err(|e| AppError::ToolUnavailable {
            program: invocation.program.clone(),
            message: e.to_string(),
        })?;

        Ok(status.code())
    }
}

/// Passthrough values come from the environment and may be secrets.
fn redacted_args(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, _)) if key.starts_with("env.") => format!("{}=***", key),
            _ => arg.clone(),
        })
        .collect()
}
