use crate::utils::error::{Result, SyncError};
use crate::utils::logger;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    pub command: &'static str,
    pub name: &'static str,
    pub install: &'static str,
}

pub const BEET: Dependency = Dependency {
    command: "beet",
    name: "beets",
    install: "brew install beets",
};
pub const FFMPEG: Dependency = Dependency {
    command: "ffmpeg",
    name: "ffmpeg",
    install: "brew install ffmpeg",
};
pub const FFPROBE: Dependency = Dependency {
    command: "ffprobe",
    name: "ffprobe (part of ffmpeg)",
    install: "brew install ffmpeg",
};
pub const FATSORT: Dependency = Dependency {
    command: "fatsort",
    name: "fatsort",
    install: "brew install fatsort",
};
pub const DISKUTIL: Dependency = Dependency {
    command: "diskutil",
    name: "diskutil",
    install: "Built-in to macOS",
};
pub const RSYNC: Dependency = Dependency {
    command: "rsync",
    name: "rsync",
    install: "brew install rsync",
};

pub const SYNC_DEPENDENCIES: &[Dependency] = &[BEET, FFMPEG, FFPROBE, FATSORT, DISKUTIL, RSYNC];
pub const ENCODE_DEPENDENCIES: &[Dependency] = &[BEET, FFMPEG, FFPROBE];
pub const DEVICE_DEPENDENCIES: &[Dependency] = &[RSYNC, DISKUTIL, FATSORT];

#[derive(Debug, Default)]
pub struct DependencyReport {
    pub found: Vec<(Dependency, PathBuf)>,
    pub missing: Vec<Dependency>,
}

impl DependencyReport {
    pub fn missing_commands(&self) -> Vec<String> {
        self.missing.iter().map(|d| d.command.to_string()).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Looks executables up on a search path (`PATH` unless told otherwise).
#[derive(Debug, Clone)]
pub struct DependencyChecker {
    search_path: Option<OsString>,
}

impl Default for DependencyChecker {
    fn default() -> Self {
        Self::from_env()
    }
}

impl DependencyChecker {
    pub fn from_env() -> Self {
        Self {
            search_path: env::var_os("PATH"),
        }
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }

    pub fn locate(&self, command: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        env::split_paths(search_path)
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate))
    }

    /// Checks the tools in table order.
    pub fn check(&self, dependencies: &[Dependency]) -> DependencyReport {
        let mut report = DependencyReport::default();
        for dep in dependencies {
            match self.locate(dep.command) {
                Some(path) => report.found.push((*dep, path)),
                None => report.missing.push(*dep),
            }
        }
        report
    }

    /// Fails with the exact list of missing commands.
    pub fn verify(&self, dependencies: &[Dependency], verbose: bool) -> Result<DependencyReport> {
        let report = self.check(dependencies);

        if verbose {
            for (dep, path) in &report.found {
                logger::detail(&format!("✓ {} ({})", dep.name, path.display()));
            }
            for dep in &report.missing {
                logger::detail(&format!("✗ {}", dep.name));
            }
        }

        for (dep, path) in &report.found {
            tracing::debug!(command = dep.command, path = %path.display(), "dependency found");
        }

        if !report.is_complete() {
            print_missing_dependencies(&report.missing);
            return Err(SyncError::MissingDependencies {
                missing: report.missing_commands(),
            });
        }

        Ok(report)
    }
}

fn print_missing_dependencies(missing: &[Dependency]) {
    eprintln!("\n❌ Missing required dependencies:\n");
    for dep in missing {
        eprintln!("  • {}", dep.name);
        eprintln!("    Install: {}", dep.install);
    }
    eprintln!();
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn install_fake_tool(dir: &Path, name: &str) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_sync_requires_every_tool() {
        let commands: Vec<&str> = SYNC_DEPENDENCIES.iter().map(|d| d.command).collect();
        for required in ["beet", "ffmpeg", "ffprobe", "fatsort", "diskutil", "rsync"] {
            assert!(commands.contains(&required), "{} should be checked", required);
        }
    }

    #[test]
    fn test_reports_exactly_the_missing_tools() {
        let bin = TempDir::new().unwrap();
        for tool in ["ffmpeg", "ffprobe", "diskutil", "rsync"] {
            install_fake_tool(bin.path(), tool);
        }

        let checker = DependencyChecker::with_search_path(bin.path().as_os_str());
        let report = checker.check(SYNC_DEPENDENCIES);

        assert_eq!(report.missing_commands(), vec!["beet", "fatsort"]);
        assert_eq!(report.found.len(), 4);

        let err = checker.verify(SYNC_DEPENDENCIES, false).unwrap_err();
        match err {
            SyncError::MissingDependencies { missing } => assert_eq!(missing, vec!["beet", "fatsort"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_searches_every_path_entry() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        install_fake_tool(second.path(), "fatsort");

        let joined = env::join_paths([first.path(), second.path()]).unwrap();
        let checker = DependencyChecker::with_search_path(joined);

        assert_eq!(checker.locate("fatsort"), Some(second.path().join("fatsort")));
        assert_eq!(checker.locate("beet"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_does_not_count() {
        let bin = TempDir::new().unwrap();
        std::fs::write(bin.path().join("beet"), "not a program").unwrap();

        let checker = DependencyChecker::with_search_path(bin.path().as_os_str());
        assert!(checker.locate("beet").is_none());
    }

    #[test]
    fn test_empty_search_path_finds_nothing() {
        let checker = DependencyChecker {
            search_path: None,
        };
        let report = checker.check(DEVICE_DEPENDENCIES);
        assert_eq!(report.missing_commands(), vec!["rsync", "diskutil", "fatsort"]);
    }
}
