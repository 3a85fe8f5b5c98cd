//! Campus CMMS terminal client.

#![forbid(unsafe_code)]

mod cli;
mod commands;
mod console_config;
mod prompt;
mod render;

use std::process::ExitCode;

use clap::Parser;
use cmms_core::AppResult;
use tracing::error;

use crate::cli::Cli;
use crate::commands::Console;
use crate::console_config::{ConsoleConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(app_error) => {
            error!(error = %app_error, "command failed");
            eprintln!("{}", app_error.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<ExitCode> {
    let config = ConsoleConfig::load()?;
    let console = Console::connect(&config).await?;
    console.run(cli.command).await
}
