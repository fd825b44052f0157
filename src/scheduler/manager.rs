//! Scheduler: fixed-interval ticks driving the worker pool

use super::pipeline::SourceProcessor;
use super::pool::WorkerPool;
use super::summary::CycleSummary;
use crate::core::shutdown::ShutdownCoordinator;
use crate::registry::SourceRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub max_workers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Dispatching,
    Stopping,
}

/// Owns the registry and the worker pool for the life of the process.
///
/// A cycle is dispatched only after the previous one has drained, so each
/// source is held by at most one worker at a time. Anchor records rely on
/// this instead of locking.
pub struct Scheduler {
    registry: SourceRegistry,
    pool: WorkerPool,
    interval: Duration,
    cycle: u64,
    state: SchedulerState,
}

impl Scheduler {
    /// Start the worker pool, sized `min(sources, max_workers)`
    pub fn new(
        registry: SourceRegistry,
        processor: Arc<dyn SourceProcessor>,
        config: SchedulerConfig,
        shutdown: &ShutdownCoordinator,
    ) -> Self {
        let pool_size = registry.len().min(config.max_workers).max(1);
        let pool = WorkerPool::start(pool_size, processor, shutdown.listener());
        log::info!(
            "{} sources registered, {} workers, interval {}s",
            registry.len(),
            pool_size,
            config.interval.as_secs()
        );

        Self {
            registry,
            pool,
            interval: config.interval,
            cycle: 0,
            state: SchedulerState::Idle,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn pool_size(&self) -> usize {
        self.pool.size()
    }

    /// Dispatch every source once and wait for the cycle to drain
    pub async fn run_cycle(&mut self) -> CycleSummary {
        self.cycle += 1;
        self.state = SchedulerState::Dispatching;
        let started = Instant::now();

        let outcomes = self.pool.dispatch(self.registry.all()).await;
        let summary = CycleSummary::from_outcomes(self.cycle, &outcomes, started.elapsed());
        summary.log();

        self.state = SchedulerState::Running;
        summary
    }

    /// Tick until shutdown is requested, then drain the pool.
    ///
    /// The first cycle starts one interval after this call. A cycle that
    /// overruns the interval delays the next tick instead of bursting.
    pub async fn run(mut self, shutdown: &ShutdownCoordinator) {
        let mut listener = shutdown.listener();
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.state = SchedulerState::Running;
        log::info!("osprey is ready");

        loop {
            tokio::select! {
                biased;
                _ = listener.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        self.stop().await;
    }

    /// Run a single cycle immediately, then drain the pool
    pub async fn run_once(mut self) -> CycleSummary {
        self.state = SchedulerState::Running;
        let summary = self.run_cycle().await;
        self.stop().await;
        summary
    }

    async fn stop(mut self) {
        self.state = SchedulerState::Stopping;
        log::info!("stopping after {} cycles", self.cycle);
        self.pool.shutdown().await;
    }
}
