use crate::core::diskutil;
use crate::core::executor::ToolExecutor;
use crate::domain::model::ToolCommand;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use crate::utils::logger;
use std::fs;
use std::path::{Path, PathBuf};

/// Volume bookkeeping that must survive a device clear.
pub const PROTECTED_ENTRIES: &[&str] = &[
    ".Spotlight-V100",
    ".Trashes",
    ".fseventsd",
    "System Volume Information",
];

pub const RSYNC_EXCLUDES: &[&str] = &[".DS_Store", "._*", ".Spotlight-V100", ".Trashes", ".fseventsd"];

pub async fn ensure_mounted<R: CommandRunner>(executor: &ToolExecutor<R>, mountpoint: &Path) -> Result<()> {
    if diskutil::is_mounted(executor, mountpoint).await {
        Ok(())
    } else {
        Err(SyncError::DeviceNotFound {
            mountpoint: mountpoint.to_path_buf(),
        })
    }
}

/// Entries at the top of the volume that a clear would remove.
pub fn clearable_entries(mountpoint: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(mountpoint)? {
        let entry = entry?;
        let name = entry.file_name();
        if PROTECTED_ENTRIES.iter().any(|p| name == *p) {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Remove everything on the device except volume bookkeeping.
/// Returns the number of top-level entries removed (or that would be, in dry-run).
pub fn clear(mountpoint: &Path, dry_run: bool) -> Result<usize> {
    let entries = clearable_entries(mountpoint)?;

    for path in &entries {
        if dry_run {
            logger::detail(&format!("[dry-run] would remove: {}", path.display()));
            continue;
        }

        tracing::debug!("removing {}", path.display());
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }

    Ok(entries.len())
}

fn rsync_command(from: &Path, to: &Path) -> ToolCommand {
    // FAT stores timestamps with two-second resolution
    let mut command = ToolCommand::new("rsync").args(["-rt", "--modify-window=2"]);
    for pattern in RSYNC_EXCLUDES {
        command = command.arg(format!("--exclude={}", pattern));
    }

    // trailing slashes copy directory contents, not the directory itself
    command
        .arg(format!("{}/", from.display()))
        .arg(format!("{}/", to.display()))
        .mutating()
        .inherit_output()
}

pub async fn copy_to_device<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    encoded_dir: &Path,
    mountpoint: &Path,
) -> Result<()> {
    executor
        .execute_checked(&rsync_command(encoded_dir, mountpoint))
        .await?;
    Ok(())
}

pub async fn pull_from_device<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    mountpoint: &Path,
    source_dir: &Path,
) -> Result<()> {
    executor
        .execute_checked(&rsync_command(mountpoint, source_dir))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::executor::testing::FakeRunner;
    use tempfile::TempDir;

    fn populated_volume() -> TempDir {
        let volume = TempDir::new().unwrap();
        fs::create_dir_all(volume.path().join("Old Album")).unwrap();
        fs::write(volume.path().join("Old Album/01 - Old.mp3"), b"x").unwrap();
        fs::write(volume.path().join("loose.mp3"), b"x").unwrap();
        fs::create_dir_all(volume.path().join(".Trashes")).unwrap();
        fs::create_dir_all(volume.path().join(".fseventsd")).unwrap();
        volume
    }

    #[test]
    fn test_clear_keeps_volume_bookkeeping() {
        let volume = populated_volume();

        let removed = clear(volume.path(), false).unwrap();

        assert_eq!(removed, 2);
        assert!(!volume.path().join("Old Album").exists());
        assert!(!volume.path().join("loose.mp3").exists());
        assert!(volume.path().join(".Trashes").exists());
        assert!(volume.path().join(".fseventsd").exists());
    }

    #[test]
    fn test_clear_dry_run_removes_nothing() {
        let volume = populated_volume();

        let removed = clear(volume.path(), true).unwrap();

        assert_eq!(removed, 2);
        assert!(volume.path().join("Old Album/01 - Old.mp3").exists());
        assert!(volume.path().join("loose.mp3").exists());
    }

    #[test]
    fn test_rsync_copies_contents_and_skips_os_files() {
        let cmd = rsync_command(Path::new("/tmp/encoded"), Path::new("/Volumes/XTRAINERZ"));

        assert_eq!(cmd.program, "rsync");
        assert!(cmd.is_mutating());
        assert!(cmd.args.contains(&"--exclude=.DS_Store".to_string()));
        assert!(cmd.args.contains(&"--exclude=._*".to_string()));
        let n = cmd.args.len();
        assert_eq!(cmd.args[n - 2], "/tmp/encoded/");
        assert_eq!(cmd.args[n - 1], "/Volumes/XTRAINERZ/");
    }

    #[tokio::test]
    async fn test_copy_is_not_spawned_in_dry_run() {
        let executor = ToolExecutor::new(FakeRunner::succeeding(), true);
        copy_to_device(&executor, Path::new("/tmp/encoded"), Path::new("/Volumes/X"))
            .await
            .unwrap();
        assert!(executor.runner().programs().is_empty());
    }
}
