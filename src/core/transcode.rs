use crate::core::executor::ToolExecutor;
use crate::core::scan::music_files;
use crate::domain::model::{Bitrate, ToolCommand, TranscodeSummary};
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use crate::utils::logger;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const TARGET_EXTENSION: &str = "m4a";

#[derive(Debug, Clone, Copy)]
pub struct TranscodeOptions {
    pub bitrate: Bitrate,
    /// kbps; anything above is re-encoded
    pub max_bitrate: u32,
    pub convert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Probe {
    pub codec: Option<String>,
    pub bitrate_kbps: Option<u32>,
}

impl Probe {
    pub fn is_lossless(&self) -> bool {
        match self.codec.as_deref() {
            Some(codec) => {
                matches!(codec, "flac" | "alac" | "wavpack" | "ape" | "tta") || codec.starts_with("pcm_")
            }
            None => false,
        }
    }

    pub fn needs_transcode(&self, max_bitrate_kbps: u32) -> bool {
        self.is_lossless() || self.bitrate_kbps.is_some_and(|kbps| kbps > max_bitrate_kbps)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeEntry>,
    format: Option<FfprobeEntry>,
}

#[derive(Debug, Deserialize)]
struct FfprobeEntry {
    codec_name: Option<String>,
    bit_rate: Option<String>,
}

/// Stream bitrate wins; containers like FLAC only report it on the format.
pub fn parse_probe(json: &str) -> Result<Probe> {
    let output: FfprobeOutput = serde_json::from_str(json)?;
    let stream = output.streams.into_iter().next();

    let bps = |entry: &FfprobeEntry| entry.bit_rate.as_deref().and_then(|b| b.parse::<u64>().ok());
    let bitrate = stream
        .as_ref()
        .and_then(bps)
        .or_else(|| output.format.as_ref().and_then(bps));

    Ok(Probe {
        codec: stream.and_then(|s| s.codec_name),
        bitrate_kbps: bitrate.map(|b| u32::try_from(b / 1000).unwrap_or(u32::MAX)),
    })
}

pub fn probe_command(file: &Path) -> ToolCommand {
    ToolCommand::new("ffprobe")
        .args(["-v", "error", "-select_streams", "a:0"])
        .args(["-show_entries", "stream=codec_name,bit_rate:format=bit_rate"])
        .args(["-of", "json"])
        .path_arg(file)
}

pub fn ffmpeg_command(input: &Path, output: &Path, bitrate: Bitrate) -> ToolCommand {
    ToolCommand::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .path_arg(input)
        .args(["-vn", "-map_metadata", "0", "-c:a", "aac", "-b:a"])
        .arg(bitrate.to_string())
        .path_arg(output)
        .mutating()
}

/// Where `file` lands in the encoded tree.
pub fn destination(source_root: &Path, encoded_root: &Path, file: &Path, transcode: bool) -> PathBuf {
    let relative = file.strip_prefix(source_root).unwrap_or(file);
    let dest = encoded_root.join(relative);
    if transcode {
        dest.with_extension(TARGET_EXTENSION)
    } else {
        dest
    }
}

/// Destination exists and is at least as new as the source.
pub fn is_up_to_date(source: &Path, dest: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(source), modified(dest)) {
        (Some(src), Some(dst)) => dst >= src,
        _ => false,
    }
}

async fn probe<R: CommandRunner>(executor: &ToolExecutor<R>, file: &Path) -> Result<Probe> {
    let output = executor.execute_checked(&probe_command(file)).await?;
    parse_probe(&output.stdout)
}

/// Mirror the source tree into the encoded tree, re-encoding what is too big for the player.
pub async fn transcode_library<R: CommandRunner>(
    executor: &ToolExecutor<R>,
    source_dir: &Path,
    encoded_dir: &Path,
    options: TranscodeOptions,
) -> Result<TranscodeSummary> {
    let dry_run = executor.is_dry_run();
    let mut summary = TranscodeSummary::default();
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for file in music_files(source_dir) {
        let transcode = options.convert && probe(executor, &file).await?.needs_transcode(options.max_bitrate);
        let dest = destination(source_dir, encoded_dir, &file, transcode);

        if let Some(first) = claimed.insert(dest.clone(), file.clone()) {
            return Err(SyncError::DuplicateOutput {
                first,
                second: file,
                destination: dest,
            });
        }

        if is_up_to_date(&file, &dest) {
            tracing::debug!("up to date: {}", dest.display());
            summary.up_to_date += 1;
            continue;
        }

        if !dry_run {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        if transcode {
            tracing::info!("transcoding {} -> {}", file.display(), dest.display());
            if let Err(e) = executor
                .execute_checked(&ffmpeg_command(&file, &dest, options.bitrate))
                .await
            {
                if dest.exists() {
                    let _ = fs::remove_file(&dest);
                }
                return Err(e);
            }
            summary.transcoded += 1;
        } else if dry_run {
            logger::detail(&format!("[dry-run] would copy: {}", file.display()));
            summary.copied += 1;
        } else {
            tracing::debug!("copying {} -> {}", file.display(), dest.display());
            fs::copy(&file, &dest).map_err(|e| {
                SyncError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("copying {}: {}", file.display(), e),
                ))
            })?;
            summary.copied += 1;
        }
    }

    Ok(summary)
}
