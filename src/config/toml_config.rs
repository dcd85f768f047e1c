use crate::domain::model::{Bitrate, MAX_BITRATE_KBPS, MIN_BITRATE_KBPS};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub encode: EncodeConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub beets: BeetsPaths,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    pub mountpoint: Option<PathBuf>,
    pub clear_before_copy: Option<bool>,
    pub sort: Option<bool>,
    pub use_sudo: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncodeConfig {
    pub bitrate: Option<Bitrate>,
    pub max_bitrate: Option<u32>,
    pub convert: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagingConfig {
    pub source_dir: Option<PathBuf>,
    pub encoded_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BeetsPaths {
    pub config_path: Option<PathBuf>,
    pub library_path: Option<PathBuf>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            SyncError::config(format!(
                "cannot read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})，未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SyncError::config(format!("TOML serialization error: {}", e)))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(mountpoint) = &self.device.mountpoint {
            validate_path("device.mountpoint", mountpoint)?;
        }
        if let Some(max_bitrate) = self.encode.max_bitrate {
            validate_range("encode.max_bitrate", max_bitrate, MIN_BITRATE_KBPS, MAX_BITRATE_KBPS)?;
        }
        if let Some(source) = &self.staging.source_dir {
            validate_path("staging.source_dir", source)?;
        }
        if let Some(encoded) = &self.staging.encoded_dir {
            validate_path("staging.encoded_dir", encoded)?;
        }
        if let Some(config_path) = &self.beets.config_path {
            validate_path("beets.config_path", config_path)?;
        }
        if let Some(library_path) = &self.beets.library_path {
            validate_path("beets.library_path", library_path)?;
        }
        Ok(())
    }
}
