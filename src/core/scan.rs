use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const MUSIC_EXTENSIONS: &[&str] = &["mp3", "m4a", "flac", "ogg", "aac"];

pub fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MUSIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively collect music files under `dir`, sorted by path.
///
/// A missing directory or an unreadable subtree contributes nothing.
pub fn music_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_music_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

pub fn count_music_files(dir: &Path) -> usize {
    music_files(dir).len()
}
