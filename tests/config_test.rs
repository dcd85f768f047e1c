use clap::Parser;
use shokz_sync::config::cli::Command;
use shokz_sync::config::{beets, init_config, show_config};
use shokz_sync::utils::validation::Validate;
use shokz_sync::{CliConfig, Settings, SyncError};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_cli_flags_override_file_values() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        "[device]\nmountpoint = \"/Volumes/SWIM\"\nclear_before_copy = true\n\n[encode]\nbitrate = \"64k\"\n",
    )?;

    let cli = CliConfig::try_parse_from([
        "shokz-sync",
        "sync",
        "--config",
        config_path.to_str().unwrap(),
        "--bitrate",
        "128k",
    ])?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    match cli.command() {
        Command::Sync(args) => args.apply(&mut settings),
        other => panic!("expected sync, got {:?}", other),
    }

    // flag beats file, file beats default
    assert_eq!(settings.bitrate.to_string(), "128k");
    assert_eq!(settings.mountpoint, PathBuf::from("/Volumes/SWIM"));
    assert!(settings.clear_device);
    assert!(settings.sort_device);
    settings.validate()?;
    Ok(())
}

#[test]
fn test_init_config_writes_loadable_files() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("shokz-sync").join("config.toml");
    let settings = Settings {
        beets_config: dir.path().join("shokz-sync").join("beets.yaml"),
        beets_library: dir.path().join("shokz-sync").join("library.db"),
        source_dir: dir.path().join("source"),
        encoded_dir: dir.path().join("encoded"),
        max_bitrate: 192,
        ..Settings::default()
    };

    init_config(&settings, &config_path, false)?;

    assert!(beets::verify(&settings.beets_config));
    let yaml = std::fs::read_to_string(&settings.beets_config)?;
    assert!(yaml.contains("max_bitrate: 192"));

    let reloaded = Settings::load(Some(&config_path))?;
    assert_eq!(reloaded.max_bitrate, 192);
    assert_eq!(reloaded.source_dir, settings.source_dir);

    let err = init_config(&settings, &config_path, false).unwrap_err();
    assert!(matches!(err, SyncError::ConfigExistsError { .. }));
    assert_ne!(err.severity().exit_code(), 0);
    Ok(())
}

#[test]
fn test_show_config_renders_beets_paths() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let settings = Settings {
        source_dir: dir.path().join("source"),
        ..Settings::default()
    };

    let output = show_config(&settings)?;
    assert!(output.contains("[encode]"));
    assert!(output.contains("bitrate = \"96k\""));
    assert!(output.contains(&format!("directory: '{}'", settings.source_dir.display())));
    Ok(())
}

#[test]
fn test_unknown_key_in_file_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("config.toml");
    std::fs::write(&config_path, "[device]\nmount = \"/Volumes/X\"\n")?;

    let err = Settings::load(Some(&config_path)).unwrap_err();
    assert!(matches!(err, SyncError::ConfigValidationError { .. }));
    Ok(())
}

#[test]
fn test_init_config_creates_file_at_new_explicit_path() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("custom").join("config.toml");

    let cli = CliConfig::try_parse_from([
        "shokz-sync",
        "init-config",
        "--config",
        config_path.to_str().unwrap(),
        "--max-bitrate",
        "128",
    ])?;
    assert!(Settings::load(cli.config.as_deref()).is_err());

    let mut settings = Settings::load_or_default(cli.config.as_deref())?;
    settings.beets_config = dir.path().join("custom").join("beets.yaml");
    let force = match cli.command() {
        Command::InitConfig(args) => {
            args.apply(&mut settings);
            args.force
        }
        other => panic!("expected init-config, got {:?}", other),
    };

    init_config(&settings, &config_path, force)?;

    assert!(config_path.exists());
    assert_eq!(Settings::load(Some(&config_path))?.max_bitrate, 128);
    Ok(())
}
