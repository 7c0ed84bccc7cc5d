use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tallerctl_core::{AppEnv, AuthService, Db, DbConfig, PgQueryExecutor};
use tallerctl_server::{run_server, AppState, ServerConfig};

/// Server command-line arguments
#[derive(Parser, Debug)]
#[command(name = "tallerctl-server", version, about)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3040")]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Allow any CORS origin (development only)
    #[arg(long)]
    cors_permissive: bool,
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing().ok();

    let args = Args::parse();
    let env = AppEnv::from_env();
    info!(?env, "starting tallerctl-server");

    let db_config = DbConfig::from_env()?;
    let db = Db::connect(&db_config).await?;

    let auth = AuthService::new(Arc::new(PgQueryExecutor::new(db.clone())));
    let state = AppState::new(auth, db.clone());

    let bind_addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .map_err(|_| anyhow!("invalid bind address {}:{}", args.bind, args.port))?;

    run_server(
        state,
        ServerConfig {
            bind_addr,
            cors_permissive: args.cors_permissive,
        },
    )
    .await?;

    // Drain the pool explicitly instead of leaving it to process exit
    db.close().await;
    Ok(())
}
