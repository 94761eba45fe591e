//! Venue booking service, CLI server
//!
//! Headless REST API for slot availability, bookings and payment
//! reconciliation, suitable for a systemd unit or a container.
//!
//! ```sh
//! # Run with default config (~/.config/venue-booking/config.toml)
//! venue-booking
//!
//! # Custom config path
//! venue-booking --config /etc/venue-booking/config.toml
//!
//! # Override the API port
//! venue-booking --api-port 8080
//!
//! # Validate config without starting
//! venue-booking --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use venue_booking::config::AppConfig;
use venue_booking::server::{init_tracing, ServerHandle, ServerOptions};

/// Venue booking service: slots, reservations and payment reconciliation.
#[derive(Parser, Debug)]
#[command(
    name = "venue-booking",
    version,
    about = "Booking and payment reconciliation server for sports venues",
    long_about = "REST API server for venue slot availability, reservations and \
                  payment reconciliation.\n\n\
                  Default config: ~/.config/venue-booking/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "VENUE_BOOKING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Do not seed the venue catalog from the configuration.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(venue_booking::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) if cli.check => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.api_port {
        config.server.api_port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}:{}", config.server.api_host, config.server.api_port);
        println!("   Database    : {}", config.database.connection_url());
        println!("   Payments    : {}", config.payment.base_url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    // ── Start server ───────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        seed_venues: !cli.no_seed,
    })
    .await?;

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
