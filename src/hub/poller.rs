//! Background polling of statistics and link health
//!
//! One periodic task per hub. Each tick it folds every live processor's
//! counters into the statistics cache, broadcasting the ones that moved, and
//! rebroadcasts links whose observed state changed. The task is supervised:
//! if a tick panics (typically a misbehaving subscriber), the panic is logged
//! and a fresh polling task takes over.

use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::ManagementHub;
use crate::listener::{LinkEvent, ManagementEvent};

impl ManagementHub {
    /// Start the background poller and hand out the running hub
    ///
    /// Must be called from within a Tokio runtime.
    pub fn init(self) -> HubHandle {
        let hub = Arc::new(self);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = spawn_supervised_poller(Arc::clone(&hub), shutdown_rx);

        tracing::info!(
            poll_interval_ms = hub.config.poll_interval.as_millis() as u64,
            bridge = hub.bridge.is_some(),
            "Management hub started"
        );

        HubHandle {
            hub,
            shutdown_tx,
            poller,
        }
    }

    /// Run one statistics poll
    ///
    /// Returns the number of processors whose statistics were broadcast.
    pub async fn poll_statistics(&self) -> usize {
        let mut updated = 0;
        for processor in self.processors.list().await {
            let Some(snapshot) = self
                .stats
                .refresh(processor.key(), processor.statistics())
                .await
            else {
                continue;
            };
            updated += 1;
            self.listeners
                .notify_management(ManagementEvent::StatisticsUpdated(snapshot))
                .await;
        }
        updated
    }

    /// Run one link health poll
    ///
    /// Returns the number of links whose change was broadcast.
    pub async fn poll_links(&self) -> usize {
        let changed = self.links.poll_changes().await;
        let count = changed.len();
        for info in changed {
            self.listeners.notify_links(LinkEvent::Changed(info)).await;
        }
        count
    }
}

/// Running hub: the shared context plus its background poller
///
/// Dropping the handle without [`shutdown`](HubHandle::shutdown) closes the
/// shutdown channel, which also stops the poller and releases its hub
/// reference. Management subscribers are only cleared by `shutdown`.
pub struct HubHandle {
    hub: Arc<ManagementHub>,
    shutdown_tx: watch::Sender<bool>,
    poller: JoinHandle<()>,
}

impl HubHandle {
    /// Shared hub, for injection into collaborators
    pub fn hub(&self) -> &Arc<ManagementHub> {
        &self.hub
    }

    /// Stop the poller and drop every management subscriber
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.poller.await {
            tracing::warn!(error = %e, "Poller ended abnormally during shutdown");
        }
        self.hub.listeners.management().clear().await;
        tracing::info!("Management hub stopped");
    }
}

impl Deref for HubHandle {
    type Target = ManagementHub;

    fn deref(&self) -> &Self::Target {
        &self.hub
    }
}

fn spawn_supervised_poller(
    hub: Arc<ManagementHub>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let mut worker = tokio::spawn(poll_loop(Arc::clone(&hub)));

            tokio::select! {
                // Err means the handle was dropped
                _ = shutdown.changed() => {
                    worker.abort();
                    return;
                }
                result = &mut worker => match result {
                    Ok(()) => tracing::warn!("Poller exited unexpectedly, restarting"),
                    Err(e) if e.is_panic() => {
                        tracing::error!(error = %e, "Poller panicked, restarting")
                    }
                    Err(_) => return,
                },
            }
        }
    })
}

async fn poll_loop(hub: Arc<ManagementHub>) {
    let mut ticker = tokio::time::interval(hub.config.poll_interval);
    // The first tick completes immediately; skip it so polling starts one
    // interval after startup.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        hub.poll_statistics().await;
        hub.poll_links().await;
    }
}
