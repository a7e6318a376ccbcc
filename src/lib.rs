pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod parser;
pub mod plugin;
pub mod retry;
pub mod scanner;
pub mod store;
pub mod update;
pub mod updated;
pub mod webhook;

pub use config::Config;
pub use error::PluginError;
pub use model::{EngineFindings, Report, ScanResult, VersionInfo};
pub use scanner::{CommandRunner, FSecure, SystemRunner};
