//! HTTP server command
//!
//! Resolves settings (flag/env > config file > defaults), prepares the
//! store and runs the server until shutdown.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use usersvc_server::db::{bootstrap, create_pool_with_options, initial_user};
use usersvc_server::{run_server, AppState, MemoryUserRepo, PgUserRepo, ServerConfig, UserRepository};

use crate::config::UsersvcConfig;

/// Arguments for the serve command
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind to [default: 127.0.0.1:8080]
    #[arg(long, short = 'b', env = "USERSVC_BIND")]
    pub bind: Option<SocketAddr>,

    /// PostgreSQL connection string (overrides config file)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Only accept CORS requests from localhost origins
    #[arg(long)]
    pub cors_localhost: bool,

    /// Don't insert the initial user into an empty table
    #[arg(long)]
    pub no_seed: bool,

    /// Keep users in process memory instead of PostgreSQL (ignores the database URL)
    #[arg(long)]
    pub in_memory: bool,
}

/// Effective serve settings after merging flags and config
#[derive(Debug, Clone, PartialEq)]
struct ServeSettings {
    bind: SocketAddr,
    cors_permissive: bool,
    database_url: Option<String>,
    max_connections: u32,
    seed: bool,
    in_memory: bool,
}

impl ServeSettings {
    fn resolve(args: ServeArgs, config: &UsersvcConfig) -> Self {
        Self {
            bind: args.bind.unwrap_or(config.server.bind),
            cors_permissive: config.server.cors_permissive && !args.cors_localhost,
            database_url: args.database_url.or_else(|| config.database.url.clone()),
            max_connections: args
                .max_connections
                .unwrap_or(config.database.max_connections),
            seed: config.database.seed_initial_user && !args.no_seed,
            in_memory: args.in_memory,
        }
    }
}

async fn memory_state(seed: bool) -> Result<AppState> {
    let repo = MemoryUserRepo::new();
    if seed {
        repo.seed_if_empty(initial_user())
            .await
            .context("Failed to seed in-memory store")?;
    }
    tracing::warn!("Using in-memory store - users are lost on shutdown");
    Ok(AppState::new(repo))
}

async fn postgres_state(settings: &ServeSettings) -> Result<AppState> {
    let database_url = settings.database_url.as_deref().context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or [database] url in the config file",
    )?;

    let pool = create_pool_with_options(database_url, settings.max_connections)
        .await
        .context("Failed to create database pool")?;

    bootstrap(&pool, settings.seed)
        .await
        .context("Error creating table")?;

    Ok(AppState::new(PgUserRepo::new(pool)))
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: &UsersvcConfig) -> Result<()> {
    let settings = ServeSettings::resolve(args, config);
    tracing::debug!(
        bind = %settings.bind,
        in_memory = settings.in_memory,
        seed = settings.seed,
        "serve settings"
    );

    let state = if settings.in_memory {
        memory_state(settings.seed).await?
    } else {
        postgres_state(&settings).await?
    };

    let server_config = ServerConfig {
        bind_addr: settings.bind,
        cors_permissive: settings.cors_permissive,
    };

    // Blocks until shutdown
    run_server(state, server_config)
        .await
        .context("Server error")?;

    Ok(())
}
