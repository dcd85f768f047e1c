use crate::config::{beets, Settings};
use crate::core::dependencies::{
    Dependency, DependencyChecker, DEVICE_DEPENDENCIES, ENCODE_DEPENDENCIES, SYNC_DEPENDENCIES,
};
use crate::core::executor::ToolExecutor;
use crate::core::transcode::{transcode_library, TranscodeOptions};
use crate::core::{device, diskutil, fatsort, import, scan};
use crate::domain::model::SyncReport;
use crate::domain::ports::CommandRunner;
use crate::utils::error::{Result, SyncError};
use crate::utils::logger;
use std::path::Path;
use tempfile::TempDir;

/// Sequences the external tools for each workflow. One tool runs at a time.
pub struct SyncEngine<R: CommandRunner> {
    settings: Settings,
    executor: ToolExecutor<R>,
    checker: DependencyChecker,
}

impl<R: CommandRunner> SyncEngine<R> {
    pub fn new(settings: Settings, runner: R) -> Self {
        let executor = ToolExecutor::new(runner, settings.dry_run);
        Self {
            settings,
            executor,
            checker: DependencyChecker::from_env(),
        }
    }

    pub fn with_dependency_checker(mut self, checker: DependencyChecker) -> Self {
        self.checker = checker;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn executor(&self) -> &ToolExecutor<R> {
        &self.executor
    }

    /// Import, transcode, copy to the device and sort it.
    pub async fn sync(&self) -> Result<SyncReport> {
        let mut report = SyncReport::new(self.settings.dry_run);
        self.announce("Shokz XTRAINERZ Music Sync");

        self.check_dependencies(SYNC_DEPENDENCIES)?;
        self.prepare_staging()?;

        if self.settings.from_device {
            self.pull_from_device().await?;
        }

        self.import_and_transcode(&mut report).await?;
        self.push_to_device(&mut report).await?;

        print_summary(&report, &self.settings);
        Ok(report)
    }

    /// Import and transcode into the encoded directory. The device is never touched.
    pub async fn encode(&self) -> Result<SyncReport> {
        let mut report = SyncReport::new(self.settings.dry_run);
        self.announce("Shokz Sync: encode");

        self.check_dependencies(ENCODE_DEPENDENCIES)?;
        self.prepare_staging()?;
        self.import_and_transcode(&mut report).await?;

        print_summary(&report, &self.settings);
        Ok(report)
    }

    /// Copy the existing encoded directory to the device and sort it.
    pub async fn device_sync(&self) -> Result<SyncReport> {
        let mut report = SyncReport::new(self.settings.dry_run);
        self.announce("Shokz Sync: device sync");

        self.check_dependencies(DEVICE_DEPENDENCIES)?;

        report.files_found = scan::count_music_files(&self.settings.encoded_dir);
        if report.files_found == 0 {
            return Err(SyncError::MissingInput {
                path: self.settings.encoded_dir.clone(),
                message: "nothing encoded to copy".to_string(),
            });
        }

        self.push_to_device(&mut report).await?;

        print_summary(&report, &self.settings);
        Ok(report)
    }

    fn announce(&self, title: &str) {
        println!("\n{}", "=".repeat(60));
        println!("{}", title);
        println!("{}", "=".repeat(60));
        if self.settings.dry_run {
            println!("[dry-run] no files or devices will be modified");
        }
        tracing::info!(dry_run = self.settings.dry_run, "{}", title);
    }

    fn check_dependencies(&self, required: &[Dependency]) -> Result<()> {
        logger::step("Checking dependencies");
        self.checker.verify(required, self.settings.verbose)?;
        logger::success("All dependencies found");
        Ok(())
    }

    fn prepare_staging(&self) -> Result<()> {
        let settings = &self.settings;

        for dir in [&settings.source_dir, &settings.encoded_dir] {
            if dir.exists() {
                continue;
            }
            if settings.dry_run {
                logger::detail(&format!("[dry-run] would create: {}", dir.display()));
            } else {
                std::fs::create_dir_all(dir)?;
                tracing::debug!("created {}", dir.display());
            }
        }

        if beets::verify(&settings.beets_config) {
            tracing::debug!("using beets config {}", settings.beets_config.display());
        } else if settings.dry_run {
            logger::detail(&format!(
                "[dry-run] would write beets config: {}",
                settings.beets_config.display()
            ));
        } else {
            let path = settings.beets().create(&settings.beets_config)?;
            logger::success(&format!("Created beets config: {}", path.display()));
        }

        Ok(())
    }

    async fn pull_from_device(&self) -> Result<()> {
        let settings = &self.settings;
        device::ensure_mounted(&self.executor, &settings.mountpoint).await?;

        logger::step(&format!(
            "Pulling music from {} into {}",
            settings.mountpoint.display(),
            settings.source_dir.display()
        ));
        device::pull_from_device(&self.executor, &settings.mountpoint, &settings.source_dir).await?;
        logger::success("Device contents copied to source directory");
        Ok(())
    }

    async fn import_and_transcode(&self, report: &mut SyncReport) -> Result<()> {
        let settings = &self.settings;

        // the pull was only previewed, so the files are still on the device
        if settings.dry_run && settings.from_device {
            report.files_found = scan::count_music_files(&settings.mountpoint);
            if report.files_found == 0 {
                return Err(SyncError::MissingInput {
                    path: settings.mountpoint.clone(),
                    message: "no music on the device to pull".to_string(),
                });
            }
            logger::detail(&format!(
                "[dry-run] would import and encode {} files pulled from the device",
                report.files_found
            ));
            return Ok(());
        }

        logger::step(&format!("Importing music with beets from {}", settings.source_dir.display()));
        let preview = self.preview_beets_config()?;
        let beets_config = match &preview {
            Some(dir) => Some(dir.path().join("beets.yaml")),
            None => Some(settings.beets_config.clone()).filter(|p| p.exists()),
        };
        report.files_found =
            import::run_import(&self.executor, &settings.source_dir, beets_config.as_deref()).await?;
        drop(preview);
        logger::success(&format!("Beets processed {} files", report.files_found));

        logger::step(&format!("Encoding into {}", settings.encoded_dir.display()));
        let options = TranscodeOptions {
            bitrate: settings.bitrate,
            max_bitrate: settings.max_bitrate,
            convert: settings.convert,
        };
        let summary = transcode_library(&self.executor, &settings.source_dir, &settings.encoded_dir, options).await?;
        logger::success(&format!(
            "{} transcoded, {} copied, {} up to date",
            summary.transcoded, summary.copied, summary.up_to_date
        ));
        report.transcode = Some(summary);

        Ok(())
    }

    /// Temp beets config for a dry run before the real one exists.
    /// Library and log live in the temp dir too.
    fn preview_beets_config(&self) -> Result<Option<TempDir>> {
        let settings = &self.settings;
        if !settings.dry_run || beets::verify(&settings.beets_config) {
            return Ok(None);
        }

        let dir = TempDir::new()?;
        let mut config = settings.beets();
        config.library = dir.path().join("library.db");
        config.import_log = dir.path().join("import.log");
        config.create(&dir.path().join("beets.yaml"))?;
        tracing::debug!("previewing with beets config in {}", dir.path().display());
        Ok(Some(dir))
    }

    async fn push_to_device(&self, report: &mut SyncReport) -> Result<()> {
        let settings = &self.settings;
        let mountpoint = settings.mountpoint.as_path();

        logger::step(&format!("Checking device at {}", mountpoint.display()));
        device::ensure_mounted(&self.executor, mountpoint).await?;
        logger::success("Device found");

        // pulled tracks come back reorganized, so the old layout has to go
        if settings.clear_device || settings.from_device {
            logger::step("Clearing device");
            let removed = device::clear(mountpoint, settings.dry_run)?;
            report.device_cleared = !settings.dry_run;
            logger::success(&format!("{} entries removed from the device", removed));
        }

        logger::step(&format!("Copying {} to device", settings.encoded_dir.display()));
        device::copy_to_device(&self.executor, &settings.encoded_dir, mountpoint).await?;
        report.copied_to_device = !settings.dry_run;
        if !settings.dry_run {
            logger::success("Copy completed");
        }

        if settings.sort_device {
            self.sort_device(mountpoint, report).await?;
        } else {
            logger::detail("Skipping FAT sort");
        }

        report.files_on_device = Some(scan::count_music_files(mountpoint));
        Ok(())
    }

    async fn sort_device(&self, mountpoint: &Path, report: &mut SyncReport) -> Result<()> {
        logger::step("Getting device information");
        let node = diskutil::device_node(&self.executor, mountpoint).await?;
        logger::detail(&format!("Device node: {}", node));
        logger::detail(&format!("Raw device: {}", diskutil::raw_device_node(&node)));
        report.device_node = Some(node.clone());

        if self.settings.dry_run {
            logger::step("FAT sort (dry-run)");
            for command in [
                diskutil::unmount_command(mountpoint),
                fatsort::fatsort_command(&node, self.settings.use_sudo),
                diskutil::mount_command(&node),
            ] {
                logger::detail(&format!("[dry-run] would run: {}", command.command_line()));
            }
            return Ok(());
        }

        fatsort::sort_mounted_volume(&self.executor, mountpoint, &node, self.settings.use_sudo).await?;
        report.sorted = true;
        Ok(())
    }
}

fn print_summary(report: &SyncReport, settings: &Settings) {
    println!("\n{}", "=".repeat(60));
    if report.dry_run {
        println!("✓ Dry run complete, nothing was changed");
    } else {
        println!("✓ Sync complete!");
    }
    println!("{}", "=".repeat(60));

    logger::detail(&format!("Music files found: {}", report.files_found));
    if let Some(summary) = &report.transcode {
        logger::detail(&format!(
            "Encoded: {} transcoded, {} copied, {} up to date",
            summary.transcoded, summary.copied, summary.up_to_date
        ));
    }
    if report.device_cleared {
        logger::detail("Device was cleared before copying");
    }
    if let Some(node) = &report.device_node {
        logger::detail(&format!("Device node: {}", node));
    }
    if report.sorted {
        logger::detail("Files are sorted for proper playback order");
    }
    if let Some(count) = report.files_on_device {
        logger::detail(&format!("Music files on {}: {}", settings.mountpoint.display(), count));
    }
    logger::detail(&format!(
        "Finished in {:.1}s",
        report.elapsed().num_milliseconds() as f64 / 1000.0
    ));

    tracing::info!(
        files_found = report.files_found,
        sorted = report.sorted,
        dry_run = report.dry_run,
        "workflow finished"
    );
}
