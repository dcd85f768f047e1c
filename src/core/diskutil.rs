//! Queries and mount operations through macOS `diskutil`.

use crate::core::executor::ToolExecutor;
use crate::domain::model::ToolCommand;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use std::collections::BTreeMap;
use std::path::Path;

pub type DiskInfo = BTreeMap<String, String>;

/// Parse `diskutil info` output: `Key:   value` per line, split on the first colon.
pub fn parse_info(output: &str) -> DiskInfo {
    output
        .lines()
        .filter_map(|line| line.trim().split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// `/dev/disk4s1` → `/dev/rdisk4s1`; raw nodes pass through unchanged.
pub fn raw_device_node(device_node: &str) -> String {
    if device_node.starts_with("/dev/rdisk") {
        return device_node.to_string();
    }
    match device_node.strip_prefix("/dev/disk") {
        Some(rest) => format!("/dev/rdisk{}", rest),
        None => device_node.to_string(),
    }
}

pub async fn info<R: CommandRunner>(executor: &ToolExecutor<R>, mountpoint: &Path) -> Result<DiskInfo> {
    let command = ToolCommand::new("diskutil").arg("info").path_arg(mountpoint);
    let output = executor.execute(&command).await?;

    if !output.success {
        return Err(SyncError::DeviceInfoError {
            message: format!(
                "diskutil info {} failed: {}",
                mountpoint.display(),
                output.stderr.trim()
            ),
        });
    }

    let info = parse_info(&output.stdout);
    if info.is_empty() {
        return Err(SyncError::DeviceInfoError {
            message: format!("Could not get info for mountpoint: {}", mountpoint.display()),
        });
    }

    Ok(info)
}

pub async fn device_node<R: CommandRunner>(executor: &ToolExecutor<R>, mountpoint: &Path) -> Result<String> {
    let info = info(executor, mountpoint).await?;
    info.get("Device Node")
        .filter(|node| !node.is_empty())
        .cloned()
        .ok_or_else(|| SyncError::DeviceInfoError {
            message: format!("Could not determine device node for {}", mountpoint.display()),
        })
}

pub async fn is_mounted<R: CommandRunner>(executor: &ToolExecutor<R>, mountpoint: &Path) -> bool {
    if !mountpoint.exists() {
        return false;
    }

    match info(executor, mountpoint).await {
        Ok(info) => info.get("Mounted").map(String::as_str) == Some("Yes"),
        Err(e) => {
            tracing::debug!("treating {} as unmounted: {}", mountpoint.display(), e);
            false
        }
    }
}

pub fn unmount_command(mountpoint: &Path) -> ToolCommand {
    ToolCommand::new("diskutil")
        .arg("unmount")
        .path_arg(mountpoint)
        .mutating()
}

pub fn mount_command(device_node: &str) -> ToolCommand {
    ToolCommand::new("diskutil").args(["mount", device_node]).mutating()
}

pub async fn unmount<R: CommandRunner>(executor: &ToolExecutor<R>, mountpoint: &Path) -> Result<()> {
    let output = executor.execute(&unmount_command(mountpoint)).await?;

    if !output.executed {
        return Ok(());
    }

    let combined = format!("{}{}", output.stdout, output.stderr).to_lowercase();
    if combined.contains("busy") {
        return Err(SyncError::DeviceBusy {
            mountpoint: mountpoint.to_path_buf(),
        });
    }
    if !output.success || !output.stdout.to_lowercase().contains("unmounted") {
        return Err(SyncError::tool_failed(
            "diskutil",
            output.exit_code,
            format!("Unmount may have failed: {}", output.stdout.trim()),
        ));
    }

    Ok(())
}

pub async fn mount<R: CommandRunner>(executor: &ToolExecutor<R>, device_node: &str) -> Result<()> {
    let output = executor.execute(&mount_command(device_node)).await?;

    if !output.executed {
        return Ok(());
    }

    if !output.success || !output.stdout.to_lowercase().contains("mounted") {
        return Err(SyncError::tool_failed(
            "diskutil",
            output.exit_code,
            format!("Mount may have failed: {}", output.stdout.trim()),
        ));
    }

    Ok(())
}
