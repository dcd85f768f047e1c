use crate::core::diskutil::{self, raw_device_node};
use crate::core::executor::ToolExecutor;
use crate::domain::model::ToolCommand;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use crate::utils::logger;
use std::path::Path;

/// `[sudo] fatsort -o a <raw node>`, sorting directory entries by name.
pub fn fatsort_command(device_node: &str, use_sudo: bool) -> ToolCommand {
    let raw = raw_device_node(device_node);
    let command = if use_sudo {
        ToolCommand::new("sudo").arg("fatsort")
    } else {
        ToolCommand::new("fatsort")
    };

    // sudo may prompt for a password
    command.args(["-o", "a"]).arg(raw).mutating().inherit_output()
}

pub async fn run_fatsort<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    device_node: &str,
    use_sudo: bool,
) -> Result<()> {
    let command = fatsort_command(device_node, use_sudo);
    let output = executor.execute(&command).await?;

    if !output.success {
        return Err(SyncError::tool_failed(
            "fatsort",
            output.exit_code,
            format!("`{}` did not succeed", command.command_line()),
        ));
    }

    Ok(())
}

/// Unmount, sort, remount.
///
/// When the sort fails the volume is remounted best-effort and the sort
/// error is returned.
pub async fn sort_mounted_volume<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    mountpoint: &Path,
    device_node: &str,
    use_sudo: bool,
) -> Result<()> {
    logger::step("Unmounting volume");
    diskutil::unmount(executor, mountpoint).await?;
    logger::success("Volume unmounted");

    logger::step("Running fatsort to optimize playback order");
    if use_sudo {
        logger::detail("This may take a moment and requires sudo access...");
    }
    if let Err(sort_error) = run_fatsort(executor, device_node, use_sudo).await {
        logger::failure(&format!("Fatsort failed: {}", sort_error));
        if let Err(mount_error) = diskutil::mount(executor, device_node).await {
            tracing::warn!("remount after failed sort also failed: {}", mount_error);
            logger::detail("You may need to manually remount or reconnect the device.");
        }
        return Err(sort_error);
    }
    logger::success("Fatsort completed");

    logger::step("Remounting volume");
    diskutil::mount(executor, device_node).await?;
    logger::success(&format!("Volume remounted at {}", mountpoint.display()));

    Ok(())
}
