use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Missing required dependencies: {}", missing.join(", "))]
    MissingDependencies { missing: Vec<String> },

    #[error("No music files found in {}: {message}", path.display())]
    MissingInput { path: PathBuf, message: String },

    #[error("{} and {} would both be written to {}", first.display(), second.display(), destination.display())]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        destination: PathBuf,
    },

    #[error("{tool} failed{}: {message}", exit_code.map(|c| format!(" with exit code {}", c)).unwrap_or_default())]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Mountpoint not found or not mounted: {}", mountpoint.display())]
    DeviceNotFound { mountpoint: PathBuf },

    #[error("Device query failed: {message}")]
    DeviceInfoError { message: String },

    #[error("Cannot unmount {} - resource is busy", mountpoint.display())]
    DeviceBusy { mountpoint: PathBuf },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Config already exists: {}", path.display())]
    ConfigExistsError { path: PathBuf },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Dependency,
    Input,
    ExternalTool,
    Device,
    Configuration,
    System,
}

/// Every severity maps to a non-zero exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SyncError {
    pub fn tool_failed(
        tool: impl Into<String>,
        exit_code: Option<i32>,
        message: impl Into<String>,
    ) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::MissingDependencies { .. } => ErrorCategory::Dependency,
            SyncError::MissingInput { .. } | SyncError::DuplicateOutput { .. } => ErrorCategory::Input,
            SyncError::ToolFailed { .. } => ErrorCategory::ExternalTool,
            SyncError::DeviceNotFound { .. }
            | SyncError::DeviceInfoError { .. }
            | SyncError::DeviceBusy { .. } => ErrorCategory::Device,
            SyncError::ConfigError { .. }
            | SyncError::ConfigExistsError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SyncError::IoError(_) | SyncError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Device => ErrorSeverity::Medium,
            ErrorCategory::Dependency
            | ErrorCategory::ExternalTool
            | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SyncError::MissingDependencies { .. } => {
                "Install the missing tools, e.g. `brew install beets ffmpeg fatsort rsync`".to_string()
            }
            SyncError::MissingInput { .. } => {
                "Copy some music into the source directory (or use --from-device) and try again"
                    .to_string()
            }
            SyncError::DuplicateOutput { second, .. } => {
                format!("Rename or remove {} so every track has a unique name", second.display())
            }
            SyncError::ToolFailed { tool, .. } => {
                format!("Re-run with --verbose and check the {} output above", tool)
            }
            SyncError::DeviceNotFound { .. } => {
                "Connect your Shokz XTRAINERZ device and try again".to_string()
            }
            SyncError::DeviceInfoError { .. } => {
                "Check the volume with `diskutil info <mountpoint>`".to_string()
            }
            SyncError::DeviceBusy { .. } => {
                "Close any Finder windows or apps accessing the volume and try again".to_string()
            }
            SyncError::ConfigExistsError { .. } => {
                "Use --force to overwrite, or edit the file manually".to_string()
            }
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => {
                "Run `shokz-sync show-config` to inspect the effective settings".to_string()
            }
            SyncError::IoError(_) => {
                "Check file permissions and free space on the staging volume".to_string()
            }
            SyncError::SerializationError(_) => {
                "The probe output could not be read; check the ffprobe installation".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::MissingDependencies { missing } => {
                format!("Missing required tools: {}", missing.join(", "))
            }
            SyncError::DeviceNotFound { mountpoint } => {
                format!("Device is not mounted at {}", mountpoint.display())
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependencies_lists_every_name() {
        let err = SyncError::MissingDependencies {
            missing: vec!["beet".to_string(), "fatsort".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required dependencies: beet, fatsort");
        assert_eq!(err.category(), ErrorCategory::Dependency);
    }

    #[test]
    fn test_tool_failed_message_includes_exit_code() {
        let err = SyncError::tool_failed("fatsort", Some(2), "device busy");
        assert_eq!(err.to_string(), "fatsort failed with exit code 2: device busy");

        let err = SyncError::tool_failed("ffmpeg", None, "killed by signal");
        assert_eq!(err.to_string(), "ffmpeg failed: killed by signal");
    }

    #[test]
    fn test_every_severity_exits_non_zero() {
        let errors = vec![
            SyncError::MissingDependencies { missing: vec![] },
            SyncError::MissingInput {
                path: PathBuf::from("/tmp"),
                message: "empty".to_string(),
            },
            SyncError::tool_failed("beet", Some(1), ""),
            SyncError::DeviceNotFound {
                mountpoint: PathBuf::from("/Volumes/XTRAINERZ"),
            },
            SyncError::config("bad"),
            SyncError::IoError(std::io::Error::other("disk full")),
        ];

        for err in errors {
            assert_ne!(err.severity().exit_code(), 0, "{} must exit non-zero", err);
        }
    }
}
