mod cli;
mod commands;
mod error;
mod filename;
mod job;
mod mcp;
mod pdf;
mod selection;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // stdout carries JSON results and the MCP channel, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.tools.job_config();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server(config).await?;
        }
        Commands::Pages { path } => {
            commands::pages::run(&path)?;
        }
        Commands::Extract {
            path,
            selections,
            workdir,
            total_pages,
        } => {
            let spec = commands::read_selections(&selections)?;
            let ok = commands::extract::run(&path, &spec, &workdir, total_pages, &config)?;
            if !ok {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Plan {
            path,
            selections,
            workdir,
            total_pages,
        } => {
            let spec = commands::read_selections(&selections)?;
            commands::plan::run(&path, &spec, &workdir, total_pages, &config)?;
        }
        Commands::Clean { workdir, source } => {
            commands::clean::run(&workdir, source.as_deref())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
