use clap::Parser;
use shokz_sync::config::cli::Command;
use shokz_sync::config::{self, default_config_path};
use shokz_sync::utils::{logger, validation::Validate};
use shokz_sync::{CliConfig, Result, Settings, SyncEngine, SyncError, SystemRunner};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting shokz-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(cli).await {
        report_failure(&e);
        std::process::exit(e.severity().exit_code());
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let command = cli.command();
    let mut settings = match command {
        Command::InitConfig(_) => Settings::load_or_default(cli.config.as_deref())?,
        _ => Settings::load(cli.config.as_deref())?,
    };
    settings.verbose = cli.verbose;

    match &command {
        Command::Sync(args) => args.apply(&mut settings),
        Command::Encode(args) => args.apply(&mut settings),
        Command::DeviceSync(args) => args.apply(&mut settings),
        Command::InitConfig(args) => args.apply(&mut settings),
        Command::ShowConfig => {}
    }

    // 驗證配置
    settings.validate()?;

    match command {
        Command::InitConfig(args) => {
            let config_path = cli.config.unwrap_or_else(default_config_path);
            for path in config::init_config(&settings, &config_path, args.force)? {
                logger::success(&format!("Created {}", path.display()));
            }
        }
        Command::ShowConfig => {
            print!("{}", config::show_config(&settings)?);
        }
        Command::Sync(_) => {
            SyncEngine::new(settings, SystemRunner::new()).sync().await?;
        }
        Command::Encode(_) => {
            SyncEngine::new(settings, SystemRunner::new()).encode().await?;
        }
        Command::DeviceSync(_) => {
            SyncEngine::new(settings, SystemRunner::new()).device_sync().await?;
        }
    }

    Ok(())
}

fn report_failure(e: &SyncError) {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ shokz-sync failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    // 輸出用戶友好的錯誤信息
    eprintln!("\n❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}
