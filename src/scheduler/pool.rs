//! Bounded worker pool
//!
//! A fixed number of long-lived workers pull sources from one shared bounded
//! queue. Each worker finishes a source before taking the next, so the
//! number of sources in flight never exceeds the pool size.

use super::pipeline::{SourceOutcome, SourceProcessor};
use crate::core::shutdown::ShutdownListener;
use crate::registry::Source;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

struct WorkUnit {
    source: Arc<Source>,
    reply: mpsc::UnboundedSender<SourceOutcome>,
}

pub struct WorkerPool {
    queue_tx: mpsc::Sender<WorkUnit>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers (at least one) on the current runtime
    pub fn start(
        size: usize,
        processor: Arc<dyn SourceProcessor>,
        shutdown: ShutdownListener,
    ) -> Self {
        let size = size.max(1);
        let (queue_tx, queue_rx) = mpsc::channel::<WorkUnit>(size);
        let queue_rx = Arc::new(Mutex::new(queue_rx));

        let workers = (0..size)
            .map(|worker_id| {
                let queue_rx = queue_rx.clone();
                let processor = processor.clone();
                let mut shutdown = shutdown.clone();

                tokio::spawn(async move {
                    log::trace!("worker {} started", worker_id);
                    loop {
                        let unit = { queue_rx.lock().await.recv().await };
                        let Some(unit) = unit else {
                            break;
                        };
                        let outcome = processor.process(unit.source, &mut shutdown).await;
                        let _ = unit.reply.send(outcome);
                    }
                    log::trace!("worker {} stopped", worker_id);
                })
            })
            .collect();

        Self { queue_tx, workers }
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue every source and wait until all of them have been processed.
    ///
    /// Outcomes arrive in completion order. If a worker dies mid-source, that
    /// source is missing from the result rather than blocking the cycle.
    pub async fn dispatch(&self, sources: &[Arc<Source>]) -> Vec<SourceOutcome> {
        let (reply_tx, mut reply_rx) = mpsc::unbounded_channel();

        for source in sources {
            let unit = WorkUnit {
                source: source.clone(),
                reply: reply_tx.clone(),
            };
            if self.queue_tx.send(unit).await.is_err() {
                log::error!("work queue closed; {} not dispatched", source.name());
            }
        }
        drop(reply_tx);

        let mut outcomes = Vec::with_capacity(sources.len());
        while let Some(outcome) = reply_rx.recv().await {
            outcomes.push(outcome);
        }

        if outcomes.len() < sources.len() {
            log::error!(
                "{} of {} sources did not report back this cycle",
                sources.len() - outcomes.len(),
                sources.len()
            );
        }
        outcomes
    }

    /// Close the queue and wait for every worker to exit
    pub async fn shutdown(self) {
        drop(self.queue_tx);
        for result in join_all(self.workers).await {
            if let Err(e) = result {
                log::warn!("worker ended abnormally: {}", e);
            }
        }
    }
}
