pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::process::SystemRunner;
pub use config::Settings;
pub use crate::core::{engine::SyncEngine, executor::ToolExecutor};
pub use utils::error::{Result, SyncError};
