use crate::domain::model::{CommandOutput, OutputMode, ToolCommand};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns real processes with tokio.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput> {
        tracing::debug!(command = %command.command_line(), "spawning");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).stdin(Stdio::inherit());

        let spawn_error = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => SyncError::MissingDependencies {
                missing: vec![command.program.clone()],
            },
            _ => SyncError::tool_failed(&command.program, None, format!("could not start: {}", e)),
        };

        match command.output {
            OutputMode::Capture => {
                let out = cmd
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .output()
                    .await
                    .map_err(spawn_error)?;

                Ok(CommandOutput {
                    exit_code: out.status.code(),
                    stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
                    success: out.status.success(),
                    executed: true,
                })
            }
            OutputMode::Inherit => {
                let status = cmd
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(spawn_error)?;

                Ok(CommandOutput {
                    exit_code: status.code(),
                    stdout: String::new(),
                    stderr: String::new(),
                    success: status.success(),
                    executed: true,
                })
            }
        }
    }
}
