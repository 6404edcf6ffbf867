//! Work Plan MCP Server - Main Entry Point
//!
//! This is the main entry point for the work plan MCP server application.
//! The actual implementation is in the `workplan_mcp` library.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use mcp_attr::server::serve_stdio;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use workplan_mcp::{Config, WorkPlanServerHandler};

/// Work Plan MCP Server - goals, objectives and outputs via Model Context Protocol
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the work plan data file
    file: PathBuf,

    /// Path to the configuration file (actor, groups, policy)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Commit every change to the git repository holding the data file
    #[arg(long)]
    history: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Check if no arguments were provided (except the program name)
    if std::env::args().len() == 1 {
        let mut cmd = Args::command();
        cmd.print_help().ok();
        println!();
        std::process::exit(2);
    }

    let args = Args::parse();

    // stdout carries MCP frames
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let handler = WorkPlanServerHandler::new(&args.file, config, args.history)?;
    serve_stdio(handler).await?;
    Ok(())
}
