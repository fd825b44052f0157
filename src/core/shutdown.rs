//! Shutdown coordination
//!
//! The coordinator owns the shutdown flag and a broadcast channel. Workers
//! hold a [`ShutdownListener`], which is the cancellation token raced against
//! in-flight issue submissions.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Coordinates graceful shutdown across the scheduler and its workers
pub struct ShutdownCoordinator {
    shutdown_tx: broadcast::Sender<()>,
    shutdown_requested: Arc<AtomicBool>,
}

/// Cancellation token handed to workers
pub struct ShutdownListener {
    shutdown_rx: broadcast::Receiver<()>,
    shutdown_requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (shutdown_tx, _) = broadcast::channel(8);
        Self {
            shutdown_tx,
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a listener that observes this coordinator
    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            shutdown_rx: self.shutdown_tx.subscribe(),
            shutdown_requested: self.shutdown_requested.clone(),
        }
    }

    pub fn trigger_shutdown(&self) {
        request(&self.shutdown_tx, &self.shutdown_requested);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Route SIGINT, SIGTERM, SIGHUP and SIGQUIT into this coordinator.
    ///
    /// A second signal forces an immediate exit with status 130.
    pub fn install_signal_handlers(&self) {
        setup_signal_handlers(self.shutdown_tx.clone(), self.shutdown_requested.clone());
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownListener {
    pub fn is_cancelled(&self) -> bool {
        self.shutdown_requested.load(Ordering::Acquire)
    }

    /// Resolve once shutdown has been requested
    pub async fn cancelled(&mut self) {
        if self.is_cancelled() {
            return;
        }
        match self.shutdown_rx.recv().await {
            Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
            // A dropped coordinator can no longer request shutdown.
            Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
        }
    }
}

impl Clone for ShutdownListener {
    fn clone(&self) -> Self {
        Self {
            shutdown_rx: self.shutdown_rx.resubscribe(),
            shutdown_requested: self.shutdown_requested.clone(),
        }
    }
}

fn request(shutdown_tx: &broadcast::Sender<()>, shutdown_requested: &AtomicBool) {
    shutdown_requested.store(true, Ordering::Release);
    let _ = shutdown_tx.send(());
}

fn setup_signal_handlers(shutdown_tx: broadcast::Sender<()>, shutdown_requested: Arc<AtomicBool>) {
    let signal_count = Arc::new(AtomicUsize::new(0));

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }

        let signals = [
            SignalKind::interrupt(),
            SignalKind::terminate(),
            SignalKind::hangup(),
            SignalKind::quit(),
        ];

        for kind in signals {
            let tx = shutdown_tx.clone();
            let requested = shutdown_requested.clone();
            let sig_ctr = signal_count.clone();

            tokio::spawn(async move {
                let Ok(mut sig) = signal(kind) else {
                    log::debug!("Could not install handler for {:?}", kind);
                    return;
                };
                while sig.recv().await.is_some() {
                    let prev = sig_ctr.fetch_add(1, Ordering::AcqRel);
                    if prev >= 1 {
                        log::warn!("Second shutdown signal received; exiting");
                        std::process::exit(130);
                    }
                    log::info!("Shutdown signal received; finishing current cycle");
                    request(&tx, &requested);
                }
            });
        }
    }

    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if signal_count.fetch_add(1, Ordering::AcqRel) >= 1 {
                    std::process::exit(130);
                }
                request(&shutdown_tx, &shutdown_requested);
            }
        });
    }
}
