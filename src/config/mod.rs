pub mod beets;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::config::beets::BeetsConfig;
use crate::config::toml_config::{BeetsPaths, DeviceConfig, EncodeConfig, StagingConfig, TomlConfig};
use crate::domain::model::{Bitrate, MAX_BITRATE_KBPS, MIN_BITRATE_KBPS};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_distinct_paths, validate_path, validate_range, Validate};
use std::path::{Path, PathBuf};

pub const DEFAULT_MOUNTPOINT: &str = "/Volumes/XTRAINERZ";
pub const DEFAULT_MAX_BITRATE: u32 = 160;
const APP_DIR: &str = "shokz-sync";

/// `~/.config/shokz-sync`
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".config").join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// `~/Music/shokz-sync`
fn default_staging_root() -> PathBuf {
    dirs::audio_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Music")))
        .map(|music| music.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

/// Effective settings after layering CLI flags over the TOML file over defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mountpoint: PathBuf,
    pub bitrate: Bitrate,
    pub max_bitrate: u32,
    pub convert: bool,
    pub source_dir: PathBuf,
    pub encoded_dir: PathBuf,
    pub beets_config: PathBuf,
    pub beets_library: PathBuf,
    pub clear_device: bool,
    pub sort_device: bool,
    pub use_sudo: bool,
    pub from_device: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let config_dir = default_config_dir();
        let staging = default_staging_root();
        Self {
            mountpoint: PathBuf::from(DEFAULT_MOUNTPOINT),
            bitrate: Bitrate::default(),
            max_bitrate: DEFAULT_MAX_BITRATE,
            convert: true,
            source_dir: staging.join("source"),
            encoded_dir: staging.join("encoded"),
            beets_config: config_dir.join("beets.yaml"),
            beets_library: config_dir.join("library.db"),
            clear_device: false,
            sort_device: true,
            use_sudo: true,
            from_device: false,
            dry_run: false,
            verbose: false,
        }
    }
}

impl Settings {
    pub fn from_file_config(file: &TomlConfig) -> Self {
        let defaults = Self::default();
        Self {
            mountpoint: file.device.mountpoint.clone().unwrap_or(defaults.mountpoint),
            bitrate: file.encode.bitrate.unwrap_or(defaults.bitrate),
            max_bitrate: file.encode.max_bitrate.unwrap_or(defaults.max_bitrate),
            convert: file.encode.convert.unwrap_or(defaults.convert),
            source_dir: file.staging.source_dir.clone().unwrap_or(defaults.source_dir),
            encoded_dir: file.staging.encoded_dir.clone().unwrap_or(defaults.encoded_dir),
            beets_config: file.beets.config_path.clone().unwrap_or(defaults.beets_config),
            beets_library: file.beets.library_path.clone().unwrap_or(defaults.beets_library),
            clear_device: file.device.clear_before_copy.unwrap_or(defaults.clear_device),
            sort_device: file.device.sort.unwrap_or(defaults.sort_device),
            use_sudo: file.device.use_sudo.unwrap_or(defaults.use_sudo),
            ..defaults
        }
    }

    /// Load the TOML file if one is given or present at the default location.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file = match explicit_path {
            Some(path) => TomlConfig::from_file(path)?,
            None => {
                let path = default_config_path();
                if path.exists() {
                    TomlConfig::from_file(&path)?
                } else {
                    TomlConfig::default()
                }
            }
        };
        file.validate()?;
        Ok(Self::from_file_config(&file))
    }

    /// Like [`load`](Self::load), but a file that does not exist yet yields defaults.
    /// `init-config` uses this so it can create the file it is pointed at.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if !path.exists() => {
                tracing::debug!("{} does not exist yet, using defaults", path.display());
                Ok(Self::default())
            }
            other => Self::load(other),
        }
    }

    pub fn beets(&self) -> BeetsConfig {
        let log_dir = self
            .beets_library
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_dir);
        BeetsConfig {
            directory: self.source_dir.clone(),
            library: self.beets_library.clone(),
            import_log: log_dir.join("import.log"),
            bitrate: self.bitrate,
            max_bitrate: self.max_bitrate,
        }
    }

    pub fn to_file_config(&self) -> TomlConfig {
        TomlConfig {
            device: DeviceConfig {
                mountpoint: Some(self.mountpoint.clone()),
                clear_before_copy: Some(self.clear_device),
                sort: Some(self.sort_device),
                use_sudo: Some(self.use_sudo),
            },
            encode: EncodeConfig {
                bitrate: Some(self.bitrate),
                max_bitrate: Some(self.max_bitrate),
                convert: Some(self.convert),
            },
            staging: StagingConfig {
                source_dir: Some(self.source_dir.clone()),
                encoded_dir: Some(self.encoded_dir.clone()),
            },
            beets: BeetsPaths {
                config_path: Some(self.beets_config.clone()),
                library_path: Some(self.beets_library.clone()),
            },
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_path("mountpoint", &self.mountpoint)?;
        validate_path("source_dir", &self.source_dir)?;
        validate_path("encoded_dir", &self.encoded_dir)?;
        validate_range("max_bitrate", self.max_bitrate, MIN_BITRATE_KBPS, MAX_BITRATE_KBPS)?;
        validate_distinct_paths("source_dir", &self.source_dir, "encoded_dir", &self.encoded_dir)?;
        validate_distinct_paths("encoded_dir", &self.encoded_dir, "mountpoint", &self.mountpoint)?;
        Ok(())
    }
}

/// Write the app TOML and the beets YAML. Existing files are kept unless `force`.
pub fn init_config(settings: &Settings, config_path: &Path, force: bool) -> Result<Vec<PathBuf>> {
    if !force {
        for existing in [config_path, settings.beets_config.as_path()] {
            if existing.exists() {
                return Err(SyncError::ConfigExistsError {
                    path: existing.to_path_buf(),
                });
            }
        }
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, settings.to_file_config().to_toml_string()?)?;
    let beets_path = settings.beets().create(&settings.beets_config)?;

    Ok(vec![config_path.to_path_buf(), beets_path])
}

/// Effective settings followed by the rendered beets config.
pub fn show_config(settings: &Settings) -> Result<String> {
    Ok(format!(
        "# shokz-sync settings\n{}\n# beets config ({})\n{}",
        settings.to_file_config().to_toml_string()?,
        settings.beets_config.display(),
        settings.beets().render()
    ))
}
