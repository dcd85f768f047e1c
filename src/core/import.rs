use crate::core::executor::ToolExecutor;
use crate::core::scan::count_music_files;
use crate::domain::model::ToolCommand;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use std::path::Path;

/// `beet [-c cfg] import --quiet [--pretend] <source>`
pub fn import_command(beets_config: Option<&Path>, source_dir: &Path, pretend: bool) -> ToolCommand {
    let mut command = ToolCommand::new("beet");
    if let Some(config) = beets_config {
        command = command.arg("-c").path_arg(config);
    }
    command = command.arg("import");
    if pretend {
        command = command.arg("--pretend");
    }
    command = command.arg("--quiet").path_arg(source_dir).inherit_output();

    // --pretend only lists what would change
    if pretend {
        command
    } else {
        command.mutating()
    }
}

/// Organize the source directory in place. Returns the number of music files found.
///
/// An empty source directory is an error and nothing is spawned.
pub async fn run_import<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    source_dir: &Path,
    beets_config: Option<&Path>,
) -> Result<usize> {
    let found = count_music_files(source_dir);
    tracing::info!(found, source = %source_dir.display(), "counted music files");

    if found == 0 {
        return Err(SyncError::MissingInput {
            path: source_dir.to_path_buf(),
            message: "nothing to import".to_string(),
        });
    }

    let command = import_command(beets_config, source_dir, executor.is_dry_run());
    crate::utils::logger::detail(&format!("Running: {}", command.command_line()));
    executor.execute_checked(&command).await?;

    Ok(found)
}
