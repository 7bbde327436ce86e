pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{AtlasClient, GcpSecretManager, LocalStorage, MongoStore};
pub use app::{run_command, CommandOutcome};
pub use config::{Command, Settings};
pub use core::engine::ReportEngine;
pub use core::rotation::CredentialRotator;
pub use utils::error::{ReporterError, Result};
