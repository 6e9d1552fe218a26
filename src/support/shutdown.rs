//! Process signal handling
//!
//! SIGTERM/SIGINT trigger graceful shutdown; SIGHUP asks for a pricing
//! tables reload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Shutdown signal that can be cloned and shared across tasks
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("🛑 Shutdown signal triggered");
            let _ = self.sender.send(());
        }
    }

    /// Resolves once shutdown has been triggered, including before the call.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for OS signals until shutdown. `on_reload` runs on every SIGHUP.
pub async fn listen_for_signals<F>(shutdown: ShutdownSignal, on_reload: F)
where
    F: Fn() + Send + 'static,
{
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let handlers = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
            signal(SignalKind::hangup()),
        );
        let (mut sigterm, mut sigint, mut sighup) = match handlers {
            (Ok(term), Ok(int), Ok(hup)) => (term, int, hup),
            _ => {
                error!("Failed to install signal handlers; falling back to Ctrl+C only");
                ctrl_c_then_trigger(shutdown).await;
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("📡 Received SIGTERM signal");
                    break;
                }
                _ = sigint.recv() => {
                    info!("📡 Received SIGINT signal (Ctrl+C)");
                    break;
                }
                _ = sighup.recv() => {
                    info!("📡 Received SIGHUP signal, reloading pricing tables");
                    on_reload();
                }
                _ = shutdown.wait() => return,
            }
        }

        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        let _ = on_reload;
        ctrl_c_then_trigger(shutdown).await;
    }
}

async fn ctrl_c_then_trigger(shutdown: ShutdownSignal) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("📡 Received Ctrl+C signal");
            shutdown.trigger();
        }
        Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
    }
}

/// Graceful shutdown coordinator
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout_secs: u64,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout_secs,
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn start_signal_listener<F>(&self, on_reload: F)
    where
        F: Fn() + Send + 'static,
    {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_signals(signal, on_reload).await;
        });
    }

    /// Wait for shutdown, then give `task` up to the configured timeout to
    /// finish. Returns whether it finished in time.
    pub async fn drain<F>(&self, task: F) -> bool
    where
        F: std::future::Future<Output = ()>,
    {
        self.signal.wait().await;
        info!(
            "⏳ Starting graceful shutdown (timeout: {}s)...",
            self.timeout_secs
        );

        match tokio::time::timeout(Duration::from_secs(self.timeout_secs), task).await {
            Ok(()) => {
                info!("✅ Graceful shutdown completed");
                true
            }
            Err(_) => {
                warn!("⚠️ Graceful shutdown timed out after {}s", self.timeout_secs);
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}
