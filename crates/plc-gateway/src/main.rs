use anyhow::Result;
use clap::Parser;
use infrastructure::ServerSettings;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plc_gateway::{api, setup_app_state};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and <RUN_MODE>.toml
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Directory for the tag list cache files
    #[arg(long)]
    cache_directory: Option<String>,

    /// Device configuration file (plc_list / batch_list)
    #[arg(long)]
    device_config: Option<String>,

    /// Tag list cache time-to-live in minutes
    #[arg(long)]
    cache_ttl_minutes: Option<u64>,

    /// JSON array of accepted API tokens
    #[arg(long)]
    auth_token_file: Option<String>,

    /// API host
    #[arg(long)]
    host: Option<String>,

    /// API port
    #[arg(long)]
    port: Option<u16>,
}

impl Args {
    fn apply(self, settings: &mut ServerSettings) {
        if let Some(dir) = self.cache_directory {
            settings.cache_directory = dir;
        }
        if let Some(path) = self.device_config {
            settings.device_config_path = path;
        }
        if let Some(ttl) = self.cache_ttl_minutes {
            settings.cache_ttl_minutes = ttl;
        }
        if let Some(path) = self.auth_token_file {
            settings.auth_token_file_path = Some(path);
        }
        if let Some(host) = self.host {
            settings.host = host;
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,plc_gateway=debug,application=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    info!("PLC Gateway starting...");

    let mut settings = ServerSettings::load(&args.config_dir)?;
    args.apply(&mut settings);
    settings.validate()?;

    let state = setup_app_state(&settings).await?;

    let app = api::create_router(state);
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("PLC Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
