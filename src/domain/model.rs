use crate::utils::error::{Result, SyncError};
use crate::utils::validation::validate_range;
use chrono::{DateTime, Local};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MIN_BITRATE_KBPS: u32 = 32;
pub const MAX_BITRATE_KBPS: u32 = 320;

/// Audio bitrate in kbps, written the way ffmpeg expects it (`96k`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bitrate(u32);

impl Bitrate {
    pub fn from_kbps(kbps: u32) -> Result<Self> {
        validate_range("bitrate", kbps, MIN_BITRATE_KBPS, MAX_BITRATE_KBPS)?;
        Ok(Self(kbps))
    }

    pub fn kbps(self) -> u32 {
        self.0
    }
}

impl Default for Bitrate {
    fn default() -> Self {
        Self(96)
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}k", self.0)
    }
}

impl FromStr for Bitrate {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| Regex::new(r"^\s*(\d{1,6})\s*[kK]?\s*$").expect("valid regex"));

        let kbps = re
            .captures(s)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .ok_or_else(|| SyncError::InvalidConfigValueError {
                field: "bitrate".to_string(),
                value: s.to_string(),
                reason: "Expected a bitrate such as 96k or 128".to_string(),
            })?;

        Self::from_kbps(kbps)
    }
}

impl TryFrom<String> for Bitrate {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Bitrate> for String {
    fn from(value: Bitrate) -> Self {
        value.to_string()
    }
}

/// Whether a command changes anything outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ReadOnly,
    Mutating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Capture,
    /// Child shares the terminal (needed for sudo prompts and long-running tools).
    Inherit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub effect: Effect,
    pub output: OutputMode,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            effect: Effect::ReadOnly,
            output: OutputMode::Capture,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn mutating(mut self) -> Self {
        self.effect = Effect::Mutating;
        self
    }

    pub fn inherit_output(mut self) -> Self {
        self.output = OutputMode::Inherit;
        self
    }

    pub fn is_mutating(&self) -> bool {
        self.effect == Effect::Mutating
    }

    /// Command line as it would be typed into a POSIX shell.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:,+@%".contains(c));

    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// False when the command was suppressed by dry-run.
    pub executed: bool,
}

impl CommandOutput {
    pub fn skipped() -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            executed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscodeSummary {
    pub transcoded: usize,
    pub copied: usize,
    pub up_to_date: usize,
}

impl TranscodeSummary {
    pub fn total(&self) -> usize {
        self.transcoded + self.copied + self.up_to_date
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub files_found: usize,
    pub transcode: Option<TranscodeSummary>,
    pub device_cleared: bool,
    pub copied_to_device: bool,
    pub device_node: Option<String>,
    pub sorted: bool,
    pub files_on_device: Option<usize>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Local::now(),
            dry_run,
            files_found: 0,
            transcode: None,
            device_cleared: false,
            copied_to_device: false,
            device_node: None,
            sorted: false,
            files_on_device: None,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        Local::now() - self.started_at
    }
}
