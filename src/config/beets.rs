//! beets 設定檔 (YAML) 的產生與檢查

use crate::domain::model::Bitrate;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const REQUIRED_KEYS: &[&str] = &["directory", "library", "import", "paths", "plugins"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeetsConfig {
    pub directory: PathBuf,
    pub library: PathBuf,
    pub import_log: PathBuf,
    pub bitrate: Bitrate,
    pub max_bitrate: u32,
}

impl BeetsConfig {
    /// 以範本產生 YAML
    pub fn render(&self) -> String {
        format!(
            r#"# Generated by shokz-sync. Edit freely; `shokz-sync init-config --force` regenerates it.
directory: {directory}
library: {library}

import:
  move: yes
  write: yes
  copy: no
  resume: no
  incremental: yes
  quiet_fallback: asis
  log: {log}

paths:
  default: $albumartist - $album/$track - $title
  singleton: Non-Album/$artist - $title
  comp: Compilations - $album/$track - $title

plugins: convert scrub

scrub:
  auto: yes

convert:
  auto: no
  format: aac
  max_bitrate: {max_bitrate}
  formats:
    aac:
      command: ffmpeg -i $source -y -vn -map_metadata 0 -c:a aac -b:a {bitrate} $dest
      extension: m4a
"#,
            directory = yaml_quote(&self.directory),
            library = yaml_quote(&self.library),
            log = yaml_quote(&self.import_log),
            max_bitrate = self.max_bitrate,
            bitrate = self.bitrate,
        )
    }

    /// 寫入設定檔 (自動建立上層目錄)
    pub fn create(&self, path: &Path) -> Result<PathBuf> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        tracing::info!("wrote beets config to {}", path.display());
        Ok(path.to_path_buf())
    }
}

fn yaml_quote(path: &Path) -> String {
    format!("'{}'", path.to_string_lossy().replace('\'', "''"))
}

/// Top-level keys declared in a YAML document.
pub fn top_level_keys(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.starts_with(char::is_whitespace) && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, _)| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}

/// A config is usable when it exists and declares every key the importer relies on.
pub fn verify(path: &Path) -> bool {
    let Ok(content) = fs::read_to_string(path) else {
        return false;
    };

    let keys = top_level_keys(&content);
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|required| !keys.iter().any(|k| k == required))
        .collect();

    if !missing.is_empty() {
        tracing::warn!("beets config {} lacks keys: {}", path.display(), missing.join(", "));
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> BeetsConfig {
        BeetsConfig {
            directory: PathBuf::from("/Users/me/Music/shokz-sync/source"),
            library: PathBuf::from("/Users/me/.config/shokz-sync/library.db"),
            import_log: PathBuf::from("/Users/me/.config/shokz-sync/import.log"),
            bitrate: "128k".parse().unwrap(),
            max_bitrate: 256,
        }
    }

    #[test]
    fn test_config_lifecycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("beets.yaml");

        assert!(!verify(&path));

        let created = sample().create(&path).unwrap();
        assert_eq!(created, path);
        assert!(verify(&path));

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("directory: '/Users/me/Music/shokz-sync/source'"));
        assert!(content.contains("max_bitrate: 256"));
        assert!(content.contains("-b:a 128k"));
    }

    #[test]
    fn test_template_contains_required_structure() {
        let rendered = sample().render();
        let keys = top_level_keys(&rendered);

        for key in REQUIRED_KEYS {
            assert!(keys.iter().any(|k| k == key), "missing key {}", key);
        }
        assert!(rendered.contains("  default: $albumartist - $album/$track - $title"));
        assert!(rendered.contains("  comp: "));
        assert!(rendered.contains("plugins: convert scrub"));
    }

    #[test]
    fn test_verify_rejects_incomplete_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "directory: /music\nlibrary: /music/lib.db\n").unwrap();

        assert!(!verify(&path));
    }

    #[test]
    fn test_paths_with_quotes_stay_valid_yaml_scalars() {
        let mut config = sample();
        config.directory = PathBuf::from("/Users/o'brien/Music");

        assert!(config.render().contains("directory: '/Users/o''brien/Music'"));
    }
}
