use crate::domain::model::{CommandOutput, ToolCommand};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use crate::utils::logger;

/// Routes every external command through one place so dry-run can hold back
/// anything that would change the library or the device.
pub struct ToolExecutor<R: CommandRunner> {
    runner: R,
    dry_run: bool,
}

impl<R: CommandRunner> ToolExecutor<R> {
    pub fn new(runner: R, dry_run: bool) -> Self {
        Self { runner, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn execute(&self, command: &ToolCommand) -> Result<CommandOutput> {
        if self.dry_run && command.is_mutating() {
            tracing::info!(command = %command.command_line(), "dry run, not executing");
            logger::detail(&format!("[dry-run] would run: {}", command.command_line()));
            return Ok(CommandOutput::skipped());
        }

        tracing::debug!(command = %command.command_line(), "running");
        self.runner.run(command).await
    }

    /// Like [`execute`](Self::execute) but turns a non-zero exit into `ToolFailed`.
    pub async fn execute_checked(&self, command: &ToolCommand) -> Result<CommandOutput> {
        let output = self.execute(command).await?;

        if !output.success {
            let stderr = output.stderr.trim();
            tracing::error!(
                tool = %command.program,
                exit_code = ?output.exit_code,
                stderr,
                "external tool failed"
            );
            return Err(SyncError::tool_failed(
                &command.program,
                output.exit_code,
                if stderr.is_empty() {
                    format!("`{}` did not succeed", command.command_line())
                } else {
                    stderr.to_string()
                },
            ));
        }

        Ok(output)
    }
}
