//! Binary entrypoint: flags, logging, and the serve loop.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turnstile::config::{self, ServerConfig};
use turnstile::http::{healthcheck, HttpServer};
use turnstile::lifecycle::ShutdownOutcome;
use turnstile::observability::metrics;

#[derive(Parser)]
#[command(name = "turnstile", version, about = "Admission-controlled HTTP front-end")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<String>,

    /// Environment name (development|staging|production)
    #[arg(long)]
    environment: Option<String>,

    /// Maximum sustained requests per second per client
    #[arg(long)]
    limiter_rps: Option<f64>,

    /// Maximum instantaneous burst per client
    #[arg(long)]
    limiter_burst: Option<u32>,

    /// Enable or disable admission control
    #[arg(long)]
    limiter_enabled: Option<bool>,
}

impl Cli {
    /// File config (or defaults) with flag overrides applied on top,
    /// re-validated as a whole.
    fn load_config(&self) -> Result<ServerConfig, config::ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(bind) = &self.bind {
            cfg.listener.bind_address = bind.clone();
        }
        if let Some(environment) = &self.environment {
            cfg.listener.environment = environment.clone();
        }
        if let Some(rps) = self.limiter_rps {
            cfg.limiter.requests_per_second = rps;
        }
        if let Some(burst) = self.limiter_burst {
            cfg.limiter.burst = burst;
        }
        if let Some(enabled) = self.limiter_enabled {
            cfg.limiter.enabled = enabled;
        }

        config::validation::validate_config(&cfg).map_err(config::ConfigError::Validation)?;
        Ok(cfg)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnstile=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = %config.listener.environment,
        limiter_enabled = config.limiter.enabled,
        limiter_rps = config.limiter.requests_per_second,
        limiter_burst = config.limiter.burst,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = match TcpListener::bind(&config.listener.bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                error = %e,
                address = %config.listener.bind_address,
                "Failed to bind listener"
            );
            return ExitCode::FAILURE;
        }
    };

    let app = healthcheck::router(&config.listener.environment);
    let server = HttpServer::new(config, app);

    match server.run(listener).await {
        Ok(ShutdownOutcome::Clean) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Ok(ShutdownOutcome::Forced { pending }) => {
            tracing::error!(pending, "Shutdown forced with work outstanding");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
