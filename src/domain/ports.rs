use crate::domain::model::{CommandOutput, ToolCommand};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Runs one external command to completion.
///
/// A non-zero exit is reported through [`CommandOutput::success`], not as an
/// error; errors are reserved for commands that could not be started.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput>;
}
