//! CLI entry point for the gutindex tool.

use std::process::ExitCode;

use anyhow::Result;

mod app;
mod app_config;
mod cli;
mod commands;

/// Process outcome mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    Success,
    /// Some requested items succeeded and some failed.
    Partial,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Partial => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let exit = app::runtime::run_gutindex().await?;
    Ok(exit.into())
}
