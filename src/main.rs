use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use picam_stream::config::AppConfig;
use picam_stream::state::AppState;
use picam_stream::stream::FpsTracker;
use picam_stream::video::V4lCamera;
use picam_stream::web;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// picam-stream command line arguments
#[derive(Parser, Debug)]
#[command(name = "picam-stream")]
#[command(version, about = "A lightweight MJPEG camera streaming server", long_about = None)]
struct CliArgs {
    /// Listen address (overrides config file)
    #[arg(short = 'a', long, value_name = "ADDRESS")]
    address: Option<String>,

    /// HTTP port (overrides config file)
    #[arg(short = 'p', long, value_name = "PORT")]
    port: Option<u16>,

    /// Video device path (overrides config file)
    #[arg(short = 'd', long, value_name = "DEVICE")]
    device: Option<PathBuf>,

    /// Configuration file path (TOML)
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    init_logging(args.log_level, args.verbose);

    tracing::info!("Starting picam-stream v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (defaults when no file is given)
    let mut config = match args.config {
        Some(ref path) => {
            AppConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    // Apply CLI overrides
    if let Some(address) = args.address {
        config.web.bind_address = address;
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if let Some(device) = args.device {
        config.camera.device = device;
    }

    config.validate().context("invalid configuration")?;

    // Bring up the camera; a device fault here aborts startup
    let camera = tokio::task::spawn_blocking({
        let camera_config = config.camera.clone();
        move || V4lCamera::open(&camera_config)
    })
    .await?
    .context("camera initialization failed")?;

    let tracker = Arc::new(FpsTracker::new());
    let state = AppState::new(Arc::new(camera), tracker, config.clone());

    let app = web::create_router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!("Starting HTTP server on http://{}", listener.local_addr()?);

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
        tracing::info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Initialize logging with tracing
fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "picam_stream=error,tower_http=error",
        LogLevel::Warn => "picam_stream=warn,tower_http=warn",
        LogLevel::Info => "picam_stream=info,tower_http=info",
        LogLevel::Debug => "picam_stream=debug,tower_http=debug",
        LogLevel::Trace => "picam_stream=trace,tower_http=debug",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}
