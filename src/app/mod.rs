// Application layer: report drivers and command dispatch.

pub mod dispatch;
pub mod reports;

pub use dispatch::{run_command, CommandOutcome};
