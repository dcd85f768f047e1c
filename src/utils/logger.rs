use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_cli_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("shokz_sync=debug,warn"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shokz_sync=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

// 終端輸出 (步驟標題)，與 tracing 日誌分開

pub fn step(message: &str) {
    println!("\n▶ {}", message);
}

pub fn success(message: &str) {
    println!("✓ {}", message);
}

pub fn failure(message: &str) {
    eprintln!("✗ {}", message);
}

pub fn detail(message: &str) {
    println!("  {}", message);
}
