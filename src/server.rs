//! Reusable server runtime.
//!
//! [`ServerHandle`] owns the whole lifecycle: database and migrations, venue
//! seeding, the REST API, the pending-booking expiry task, metrics and
//! graceful shutdown. The CLI binary is a thin wrapper around it.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::booking::{start_pending_expiry_task, BookingSubmissionService};
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::{init_database, HttpPaymentGateway};
use crate::interfaces::http::router::ApiSettings;
use crate::interfaces::{create_api_router, ApiState};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
    /// Insert the configured venues when the catalog is empty (default: true).
    pub seed_venues: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
            seed_venues: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running booking server.
///
/// ```rust,no_run
/// use venue_booking::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub repos: Arc<dyn RepositoryProvider>,
    pub config: AppConfig,
    /// Port the REST API is bound to (resolved when configured as 0).
    pub api_port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    expiry_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the server.
    ///
    /// 1. Install the Prometheus recorder
    /// 2. Connect to the database and run migrations
    /// 3. Seed venues into an empty catalog
    /// 4. Start the pending-booking expiry task
    /// 5. Start the REST API (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting venue booking service...");

        let prometheus = prometheus_handle();
        info!("📊 Prometheus metrics recorder ready");

        // ── Database ───────────────────────────────────────────
        let db_config = app_cfg.database.to_database_config();
        let db = init_database(&db_config).await?;

        if opts.auto_migrate {
            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("Migrations completed");
        }

        let sea_repos = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        if opts.seed_venues {
            seed_venues(&sea_repos, &app_cfg).await;
        }
        let repos: Arc<dyn RepositoryProvider> = sea_repos;

        // ── Domain services ────────────────────────────────────
        let grid = Arc::new(app_cfg.booking.slot_grid()?);
        info!(
            slots = grid.start_times().len(),
            slot_minutes = app_cfg.booking.slot_minutes,
            "Slot grid configured"
        );

        if app_cfg.payment.server_key.is_empty() {
            warn!("⚠️  payment.server_key is empty; provider calls and notifications will be rejected");
        }
        let gateway = Arc::new(HttpPaymentGateway::new(&app_cfg.payment.gateway_config())?);

        let jwt_config = JwtConfig::new(
            app_cfg.security.jwt_secret.clone(),
            app_cfg.security.jwt_issuer.clone(),
        );

        let state = ApiState::new(
            repos.clone(),
            grid.clone(),
            gateway,
            ApiSettings {
                jwt: jwt_config,
                server_key: app_cfg.payment.server_key.clone(),
                payment_retry: app_cfg.payment.retry_config(),
                payment_timeout: app_cfg.payment.request_timeout(),
                poller: app_cfg.poller.poller_config(),
            },
        );

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let expiry_task = start_pending_expiry_task(
            BookingSubmissionService::new(repos.clone(), grid),
            chrono::Duration::minutes(app_cfg.booking.pending_ttl_minutes),
            Duration::from_secs(app_cfg.booking.expiry_check_interval_secs),
            shutdown_signal.clone(),
        );

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(state, prometheus);

        let api_addr = format!("{}:{}", app_cfg.server.api_host, app_cfg.server.api_port);
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let api_port = listener.local_addr()?.port();
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("🚀 Venue booking service started.");

        Ok(Self {
            repos,
            config: app_cfg,
            api_port,
            db,
            shutdown,
            api_task,
            expiry_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to fully stop after shutdown has been triggered.
    pub async fn wait(self) {
        let Self {
            db,
            shutdown,
            api_task,
            expiry_task,
            ..
        } = self;

        let finished = shutdown
            .shutdown_with_cleanup(|| async move {
                match api_task.await {
                    Ok(()) => info!("REST API server stopped"),
                    Err(e) => error!("REST API server task panicked: {}", e),
                }
                if let Err(e) = expiry_task.await {
                    error!("Expiry task panicked: {}", e);
                }
            })
            .await;
        if !finished {
            warn!("Some tasks did not stop in time");
        }

        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("✅ Database connection closed");
        }

        info!("👋 Venue booking service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The process-wide Prometheus handle.
///
/// The global recorder can only be installed once per process, so a restart
/// within the same process reuses it. If another recorder is already
/// installed, metrics are rendered from a detached recorder instead.
fn prometheus_handle() -> PrometheusHandle {
    static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

    if let Some(handle) = PROM_HANDLE.get() {
        return handle.clone();
    }
    let handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("📊 Prometheus metrics recorder installed");
            handle
        }
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            PrometheusBuilder::new().build_recorder().handle()
        }
    };
    PROM_HANDLE.get_or_init(|| handle).clone()
}

/// Insert the configured venues if the catalog has none.
async fn seed_venues(repos: &SeaOrmRepositoryProvider, app_cfg: &AppConfig) {
    let store = repos.venue_store();
    let existing = match store.count().await {
        Ok(n) => n,
        Err(e) => {
            error!("Failed to count venues: {}", e);
            return;
        }
    };
    if existing > 0 || app_cfg.venues.is_empty() {
        return;
    }

    info!(count = app_cfg.venues.len(), "Seeding venue catalog...");
    for seed in &app_cfg.venues {
        match store.create(seed.to_new_venue()).await {
            Ok(venue) => info!(venue_id = %venue.id, name = %venue.name, "Venue created"),
            Err(e) => error!(name = %seed.name, "Failed to create venue: {}", e),
        }
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialised: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseSection;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config.database = DatabaseSection {
            url: Some("sqlite::memory:".into()),
            max_connections: 1,
            ..DatabaseSection::default()
        };
        config
    }

    #[tokio::test]
    async fn starts_seeds_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: test_config(),
            ..ServerOptions::default()
        })
        .await
        .unwrap();

        assert!(handle.api_port > 0);
        assert!(handle.is_running());
        let venues = handle.repos.venues().list_venues().await.unwrap();
        assert_eq!(venues.len(), AppConfig::default().venues.len());

        tokio::time::timeout(Duration::from_secs(10), handle.shutdown())
            .await
            .expect("shutdown timed out");
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let mut config = test_config();
        config.booking.slot_minutes = 0;
        let result = ServerHandle::start(ServerOptions {
            config,
            ..ServerOptions::default()
        })
        .await;
        assert!(result.is_err());
    }
}
