//! Reusable billing server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the server lifecycle:
//! pricing tables, the REST API, metrics, table reloads on SIGHUP and
//! graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};

use crate::application::BillingService;
use crate::config::AppConfig;
use crate::infrastructure::tables::TableStore;
use crate::interfaces::http::create_api_router;
use crate::support::errors::AppError;
use crate::support::shutdown::{ShutdownCoordinator, ShutdownSignal};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder once per process and hand out its
/// handle. A second server started in the same process reuses it.
fn prometheus_handle() -> PrometheusHandle {
    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("📊 Prometheus metrics recorder installed");
                handle
            }
            Err(e) => {
                // Another recorder owns the process; /metrics will render empty.
                warn!("Prometheus recorder not installed: {}", e);
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Handle to a running billing server.
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is actually bound to.
    pub local_addr: SocketAddr,
    /// Pricing service shared with the HTTP layer.
    pub billing: Arc<BillingService>,

    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the billing server.
    ///
    /// Loads the pricing tables (built-in ones when `pricing.tables_path` is
    /// unset), binds the API listener and spawns the server task. A port of
    /// `0` binds an ephemeral port; see [`ServerHandle::local_addr`].
    pub async fn start(config: AppConfig) -> Result<Self, AppError> {
        info!("Starting HMS billing service...");

        let prometheus = prometheus_handle();

        let store = Arc::new(TableStore::open(config.pricing.tables_path.as_deref())?);

        let billing = Arc::new(BillingService::new(store));
        let shutdown = ShutdownCoordinator::new(config.server.shutdown_timeout);
        let api_router = create_api_router(billing.clone(), prometheus);

        let listener = tokio::net::TcpListener::bind(config.server.address()).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown.signal();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("🛑 REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config,
            local_addr,
            billing,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners: SIGTERM and SIGINT trigger shutdown,
    /// SIGHUP reloads the pricing tables.
    pub fn install_signal_handler(&self) {
        let billing = self.billing.clone();
        self.shutdown.start_signal_listener(move || {
            // Outcome is logged and counted by the service.
            let _ = billing.reload_tables();
        });
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for shutdown, then for in-flight requests to drain within the
    /// configured timeout.
    pub async fn wait(self) {
        let Self {
            shutdown, api_task, ..
        } = self;

        let drained = shutdown
            .drain(async move {
                if let Err(e) = api_task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;

        if drained {
            info!("👋 HMS billing service shutdown complete");
        } else {
            warn!("HMS billing service stopped with requests still in flight");
        }
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("🛑 Shutting down HMS billing service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}
