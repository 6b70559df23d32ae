pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod entities;
pub mod services;
pub mod state;

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use config::Config;

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    init_tracing(&config)?;

    match cli.command {
        None => run_server(config, prometheus_handle, None).await,

        Some(cli::Commands::Serve { port }) => run_server(config, prometheus_handle, port).await,

        Some(cli::Commands::Init) => {
            if Config::create_default_if_missing()? {
                println!("✓ Config file created. Edit config.toml and run again.");
            } else {
                println!("Config file already exists.");
            }
            Ok(())
        }

        Some(cli::Commands::CreateAdmin {
            email,
            username,
            password,
        }) => create_admin(config, &email, &username, &password).await,
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    if config.observability.loki_enabled {
        let url = url::Url::parse(&config.observability.loki_url).context("Invalid Loki URL")?;

        let (layer, task) = tracing_loki::builder()
            .label("app", "ladle")?
            .extra_field("env", "production")?
            .build_url(url)?;

        tokio::spawn(task);

        registry.with(layer).init();
        info!(
            "Loki logging initialized at {}",
            config.observability.loki_url
        );
    } else {
        registry.init();
    }

    Ok(())
}

async fn run_server(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
    port_override: Option<u16>,
) -> anyhow::Result<()> {
    info!("Ladle v{} starting...", env!("CARGO_PKG_VERSION"));

    let port = port_override.unwrap_or(config.server.port);

    let state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(state).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server running at http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }
}

async fn create_admin(
    config: Config,
    email: &str,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    api::validation::validate_email(email)?;
    api::validation::validate_username(username)?;
    api::validation::validate_password(password)?;

    let shared = state::SharedState::new(config.clone()).await?;

    if shared.store.email_exists(email).await? {
        println!("A user with email {email} already exists.");
        return Ok(());
    }
    if shared.store.username_exists(username).await? {
        println!("A user with username {username} already exists.");
        return Ok(());
    }

    let user = shared
        .store
        .create_user(
            db::NewUser {
                email: email.to_string(),
                username: username.to_string(),
                first_name: username.to_string(),
                last_name: String::new(),
                password: password.to_string(),
                is_staff: true,
            },
            Some(&config.security),
        )
        .await?;

    println!("✓ Created staff user {} (ID: {})", user.username, user.id);
    Ok(())
}
