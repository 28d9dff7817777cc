mod app;
mod cli;
mod cmd;
mod config;
mod dash;
mod event;
mod model;
mod output;
mod providers;
mod report;
mod ui;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Commands::Dash);

    init_tracing(matches!(command, Commands::Dash))?;

    let ctx = cli::Context::load(&cli)?;
    cli::run(&ctx, command).await
}

/// The dashboard owns the terminal, so its logs go to a file.
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());

    if to_file {
        let dir = config::data_dir();
        fs::create_dir_all(&dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("shiftboard.log"))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}
