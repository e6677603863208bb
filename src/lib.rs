pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use clap::Parser;
use tokio::signal;

use cli::{Cli, Commands};
pub use config::Config;
use services::SignupInput;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    config.validate()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }

        Commands::CreateUser {
            name,
            phone,
            email,
            password,
            role,
        } => {
            let input = SignupInput {
                name,
                email,
                password,
                phone,
                role: Some(role),
            };
            cli::cmd_create_user(config, input).await
        }

        Commands::Users => cli::cmd_list_users(&config).await,
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!(
        "GofarTrack v{} starting ({} mode)...",
        env!("CARGO_PKG_VERSION"),
        config.general.environment
    );

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config).await?;
    let app = api::router(api_state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web Server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
