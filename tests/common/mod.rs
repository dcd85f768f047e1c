#![allow(dead_code)]

use async_trait::async_trait;
use shokz_sync::core::dependencies::DependencyChecker;
use shokz_sync::domain::model::{CommandOutput, ToolCommand};
use shokz_sync::domain::ports::CommandRunner;
use shokz_sync::{Result, Settings};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

type Responder = Box<dyn Fn(&ToolCommand) -> CommandOutput + Send + Sync>;

/// Answers like a healthy macOS box with the player plugged in, without spawning anything.
pub struct RecordingRunner {
    pub calls: Mutex<Vec<ToolCommand>>,
    responder: Responder,
}

impl RecordingRunner {
    pub fn healthy() -> Self {
        Self::with(healthy_response)
    }

    pub fn with(responder: impl Fn(&ToolCommand) -> CommandOutput + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// `program subcommand`, e.g. `diskutil unmount`
    pub fn invocations(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| match c.program.as_str() {
                "diskutil" => format!("diskutil {}", c.args.first().cloned().unwrap_or_default()),
                other => other.to_string(),
            })
            .collect()
    }

    pub fn ran(&self, program: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c.program == program)
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ToolCommand) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(command.clone());
        Ok((self.responder)(command))
    }
}

pub const DISKUTIL_INFO: &str = "\
   Device Identifier:         disk4s1
   Device Node:               /dev/disk4s1
   Whole:                     No
   Volume Name:               XTRAINERZ
   Mounted:                   Yes
   Mount Point:               /Volumes/XTRAINERZ
   File System Personality:   MS-DOS FAT32
";

pub const MP3_128_PROBE: &str = r#"{"streams":[{"codec_name":"mp3","bit_rate":"128000"}]}"#;
pub const FLAC_PROBE: &str = r#"{"streams":[{"codec_name":"flac"}],"format":{"bit_rate":"900000"}}"#;

pub fn healthy_response(command: &ToolCommand) -> CommandOutput {
    let first = command.args.first().map(String::as_str);
    let last = command.args.last().map(String::as_str).unwrap_or_default();
    match (command.program.as_str(), first) {
        ("diskutil", Some("info")) => ok(DISKUTIL_INFO),
        ("diskutil", Some("unmount")) => ok("Volume XTRAINERZ on disk4s1 unmounted"),
        ("diskutil", Some("mount")) => ok("Volume XTRAINERZ on /dev/disk4s1 mounted"),
        ("ffprobe", _) if last.ends_with(".flac") => ok(FLAC_PROBE),
        ("ffprobe", _) => ok(MP3_128_PROBE),
        _ => ok(""),
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
        success: true,
        executed: true,
    }
}

pub fn failed(code: i32) -> CommandOutput {
    CommandOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: String::new(),
        success: false,
        executed: true,
    }
}

/// Temp dirs for staging, config and a fake mounted volume.
pub struct Workspace {
    pub root: TempDir,
    pub bin: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            root: TempDir::new().unwrap(),
            bin: TempDir::new().unwrap(),
        };
        std::fs::create_dir_all(workspace.source()).unwrap();
        std::fs::create_dir_all(workspace.mountpoint()).unwrap();
        workspace
    }

    pub fn source(&self) -> PathBuf {
        self.root.path().join("source")
    }

    pub fn encoded(&self) -> PathBuf {
        self.root.path().join("encoded")
    }

    pub fn mountpoint(&self) -> PathBuf {
        self.root.path().join("XTRAINERZ")
    }

    pub fn settings(&self) -> Settings {
        let conf = self.root.path().join("conf");
        Settings {
            mountpoint: self.mountpoint(),
            source_dir: self.source(),
            encoded_dir: self.encoded(),
            beets_config: conf.join("beets.yaml"),
            beets_library: conf.join("library.db"),
            use_sudo: false,
            ..Settings::default()
        }
    }

    pub fn add_track(&self, relative: &str) {
        write_file(&self.source().join(relative));
    }

    /// A search path holding only the named tools.
    pub fn checker_with(&self, tools: &[&str]) -> DependencyChecker {
        for tool in tools {
            install_fake_tool(self.bin.path(), tool);
        }
        DependencyChecker::with_search_path(self.bin.path().as_os_str())
    }

    pub fn checker_with_all_tools(&self) -> DependencyChecker {
        self.checker_with(&["beet", "ffmpeg", "ffprobe", "fatsort", "diskutil", "rsync"])
    }
}

pub fn write_file(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"audio").unwrap();
}

fn install_fake_tool(dir: &Path, name: &str) {
    let path = dir.join(name);
    std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
}
