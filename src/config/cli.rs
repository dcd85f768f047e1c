use crate::config::Settings;
use crate::domain::model::Bitrate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  shokz-sync                          # Sync with default settings
  shokz-sync sync --dry-run           # Preview changes without modifying files
  shokz-sync sync --bitrate 128k      # Use 128 kbps AAC encoding
  shokz-sync sync --mountpoint /Volumes/MY_DEVICE
  shokz-sync encode                   # Import and transcode, leave the device alone
  shokz-sync device-sync --clear-device
  shokz-sync init-config              # Create default configuration
  shokz-sync show-config              # Display effective configuration";

#[derive(Debug, Clone, Parser)]
#[command(name = "shokz-sync", version)]
#[command(about = "Organize and compress music for a Shokz XTRAINERZ using beets + ffmpeg + fatsort")]
#[command(after_help = EXAMPLES)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the shokz-sync TOML config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sync and organize music (default command)
    Sync(SyncArgs),
    /// Create default shokz-sync and beets configuration
    InitConfig(InitConfigArgs),
    /// Display the effective configuration
    ShowConfig,
    /// Import and transcode into the encoded staging directory only
    Encode(EncodeArgs),
    /// Copy the encoded staging directory to the device and sort it
    DeviceSync(DeviceSyncArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct SyncArgs {
    #[command(flatten)]
    pub encode: EncodeArgs,

    #[command(flatten)]
    pub device: DeviceArgs,

    /// Pull the current device contents into the source directory first
    #[arg(long)]
    pub from_device: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct EncodeArgs {
    /// Target AAC bitrate for transcoding (default: 96k)
    #[arg(long)]
    pub bitrate: Option<Bitrate>,

    /// Source staging directory holding raw input files
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Encoded staging directory
    #[arg(long)]
    pub encoded: Option<PathBuf>,

    /// Skip transcoding, only reorganize
    #[arg(long)]
    pub no_convert: bool,

    /// Preview changes without modifying files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DeviceArgs {
    /// Mount point of the Shokz device (default: /Volumes/XTRAINERZ)
    #[arg(long)]
    pub mountpoint: Option<PathBuf>,

    /// Remove existing device contents before copying
    #[arg(long)]
    pub clear_device: bool,

    /// Skip the FAT directory sort
    #[arg(long)]
    pub no_sort: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DeviceSyncArgs {
    #[command(flatten)]
    pub device: DeviceArgs,

    /// Encoded staging directory to copy from
    #[arg(long)]
    pub encoded: Option<PathBuf>,

    /// Preview changes without modifying files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct InitConfigArgs {
    /// Mount point for config (default: /Volumes/XTRAINERZ)
    #[arg(long)]
    pub mountpoint: Option<PathBuf>,

    /// Target bitrate (default: 96k)
    #[arg(long)]
    pub bitrate: Option<Bitrate>,

    /// Files above this bitrate (kbps) are transcoded
    #[arg(long)]
    pub max_bitrate: Option<u32>,

    /// Overwrite existing config
    #[arg(long)]
    pub force: bool,
}

impl CliConfig {
    /// A bare invocation means `sync` with default flags.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Sync(SyncArgs::default()))
    }
}

impl EncodeArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(bitrate) = self.bitrate {
            settings.bitrate = bitrate;
        }
        if let Some(source) = &self.source {
            settings.source_dir = source.clone();
        }
        if let Some(encoded) = &self.encoded {
            settings.encoded_dir = encoded.clone();
        }
        if self.no_convert {
            settings.convert = false;
        }
        settings.dry_run |= self.dry_run;
    }
}

impl DeviceArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mountpoint) = &self.mountpoint {
            settings.mountpoint = mountpoint.clone();
        }
        if self.clear_device {
            settings.clear_device = true;
        }
        if self.no_sort {
            settings.sort_device = false;
        }
    }
}

impl SyncArgs {
    pub fn apply(&self, settings: &mut Settings) {
        self.encode.apply(settings);
        self.device.apply(settings);
        settings.from_device |= self.from_device;
    }
}

impl DeviceSyncArgs {
    pub fn apply(&self, settings: &mut Settings) {
        self.device.apply(settings);
        if let Some(encoded) = &self.encoded {
            settings.encoded_dir = encoded.clone();
        }
        settings.dry_run |= self.dry_run;
    }
}

impl InitConfigArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mountpoint) = &self.mountpoint {
            settings.mountpoint = mountpoint.clone();
        }
        if let Some(bitrate) = self.bitrate {
            settings.bitrate = bitrate;
        }
        if let Some(max_bitrate) = self.max_bitrate {
            settings.max_bitrate = max_bitrate;
        }
    }
}
