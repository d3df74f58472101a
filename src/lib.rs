pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use cli::{
    Cli, Commands, MigrateCommands, ReviewCommands, TitleCommands, UserCommands, cmd_migrate_down,
    cmd_migrate_status, cmd_migrate_up, cmd_review_show, cmd_title_list, cmd_title_show,
    cmd_user_add, cmd_user_list,
};
pub use config::Config;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,

        Commands::Init => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("config.toml already exists, leaving it untouched.");
            }
            Ok(())
        }

        Commands::Migrate { command } => match command {
            MigrateCommands::Up => cmd_migrate_up(&config).await,
            MigrateCommands::Down { steps } => cmd_migrate_down(&config, steps).await,
            MigrateCommands::Status => cmd_migrate_status(&config).await,
        },

        Commands::User { command } => match command {
            UserCommands::Add { username } => cmd_user_add(&config, &username).await,
            UserCommands::List => cmd_user_list(&config).await,
        },

        Commands::Title { command } => match command {
            TitleCommands::List { category, genre } => {
                cmd_title_list(&config, category, genre).await
            }
            TitleCommands::Show { id } => cmd_title_show(&config, id).await,
        },

        Commands::Review { command } => match command {
            ReviewCommands::Show { id } => cmd_review_show(&config, id).await,
        },
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    info!("yamdb v{} starting...", env!("CARGO_PKG_VERSION"));

    if !config.server.enabled {
        warn!("Server is disabled in config; nothing to do");
        return Ok(());
    }

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        info!("Prometheus metrics recorder initialized");
        Some(handle)
    } else {
        None
    };

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(api_state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Web server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}
