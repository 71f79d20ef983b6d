//! Rota Server Entry Point

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rota::api::{create_rest_router, ApiState, RestApiConfig};
use rota::auth::SessionRegistry;
use rota::schedule::LectureManager;
use rota::store::{MemoryLectureStore, MemoryUserStore};
use rota::users::{CreateUser, Role, UserManager};
use rota::Config;

/// Rota: Course-Schedule Service
#[derive(Parser, Debug)]
#[command(name = "rota")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default behavior)
    Serve {
        /// HTTP port. If not specified, uses the config file value.
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable JSON logging format
        #[arg(long)]
        json_logs: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (port, json_logs) = match args.command {
        Some(Command::Serve { port, json_logs }) => (port, json_logs),
        None => (None, false),
    };

    init_logging(json_logs);

    let config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    let port = port.unwrap_or(config.server.port);

    let users = UserManager::new(Arc::new(MemoryUserStore::new()));
    bootstrap_admin(&users, &config).await?;

    let lectures = LectureManager::new(Arc::new(MemoryLectureStore::new()));
    let sessions = Arc::new(SessionRegistry::new(
        config.auth.session_ttl_secs,
        config.auth.enabled,
    ));

    let state = Arc::new(ApiState::new(
        lectures,
        users,
        sessions,
        config.time_window(),
        config.schedule.units_per_hour,
    ));

    let rest_config = RestApiConfig {
        enable_cors: config.server.enable_cors,
        cors_origins: config.server.cors_origins.clone(),
    };
    let router = create_rest_router(state, &rest_config);

    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Rota listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Initialize the tracing subscriber.
fn init_logging(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Create the configured admin account when the user store is empty.
async fn bootstrap_admin(
    users: &UserManager<MemoryUserStore>,
    config: &Config,
) -> anyhow::Result<()> {
    if !users.is_empty().await? {
        return Ok(());
    }

    match &config.auth.bootstrap {
        Some(bootstrap) => {
            let admin = users
                .create(CreateUser {
                    username: bootstrap.username.clone(),
                    email: bootstrap.email.clone(),
                    name: None,
                    password: bootstrap.password.clone(),
                    role: Role::Admin,
                })
                .await?;
            tracing::info!("Bootstrapped admin account: {}", admin.username);
        }
        None if config.auth.enabled => {
            tracing::warn!(
                "Auth is enabled but no accounts exist and auth.bootstrap is unset; \
                 no one will be able to log in"
            );
        }
        None => {}
    }

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install Ctrl+C handler");
    }
}
