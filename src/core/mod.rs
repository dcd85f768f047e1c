pub mod dependencies;
pub mod device;
pub mod diskutil;
pub mod engine;
pub mod executor;
pub mod fatsort;
pub mod import;
pub mod scan;
pub mod transcode;

pub use crate::domain::model::{CommandOutput, SyncReport, ToolCommand, TranscodeSummary};
pub use crate::domain::ports::CommandRunner;
pub use crate::utils::error::Result;
pub use engine::SyncEngine;
pub use executor::ToolExecutor;
