mod api;
mod auth;
mod blob;
mod cli;
mod codegen;
mod config;
mod filter;
mod logging;
mod model;
mod service;
mod share;
mod store;
mod suggest;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;
use tracing::error;

use crate::cli::Cli;
use crate::logging::{LogOptions, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(&LogOptions {
        level: cli.log_level.clone(),
        file: cli.log_file.clone(),
        json: cli.log_json,
    })?;

    if let Err(e) = cli::run(cli).await {
        error!(error = %e, "command failed");
        return Err(e);
    }
    Ok(())
}
