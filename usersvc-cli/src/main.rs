//! usersvc CLI - runs the users CRUD HTTP service
//!
//! - `serve`: bootstrap the users table and serve the HTTP API
//! - `config`: inspect the configuration file

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

use config::UsersvcConfig;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "usersvc",
    author,
    version,
    about = "HTTP service for creating, reading, updating and deleting user records"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file [default: ~/.usersvc/config.toml]
    #[arg(long, global = true, value_name = "PATH", env = "USERSVC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::ServeArgs),
    /// Inspect configuration (path, show)
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads env-backed flags
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let file_config = UsersvcConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, &file_config).await?,
        Commands::Config(args) => config::run_config(args, &file_config, cli.config.as_deref())?,
    }
    Ok(())
}
