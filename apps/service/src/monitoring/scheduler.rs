//! Periodic driver for the probe and log-rotation cycles.
//!
//! Both cycles run once immediately at startup, then on their timers. A
//! probe pass fans out one task per check, bounded by a semaphore; the
//! timer keeps firing on schedule, but a tick is skipped while the
//! previous pass is still in flight so the same check is never updated by
//! two passes concurrently. No error aborts a cycle: failures stay local
//! to the check or log being processed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::Semaphore;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::alerts::{AlertDispatcher, AlertGateway};
use crate::error::StoreError;
use crate::store::RecordStore;
use crate::store::logs::LogStore;

use super::probe::ProbeExecutor;
use super::processor::OutcomeProcessor;
use super::types::now_millis;
use super::validate::normalize_check;

const CHECKS_COLLECTION: &str = "checks";

/// Cycle timing and concurrency limits.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub probe_interval: Duration,
    pub rotation_interval: Duration,
    pub max_concurrent_probes: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            probe_interval: Duration::from_secs(5),
            rotation_interval: Duration::from_secs(24 * 3600),
            max_concurrent_probes: 20,
        }
    }
}

/// Coordinates the monitoring pipeline over its injected collaborators.
pub struct Scheduler {
    records: Arc<dyn RecordStore>,
    logs: Arc<dyn LogStore>,
    executor: Arc<ProbeExecutor>,
    processor: Arc<OutcomeProcessor>,
    probe_permits: Arc<Semaphore>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(
        records: Arc<dyn RecordStore>,
        logs: Arc<dyn LogStore>,
        gateway: Arc<dyn AlertGateway>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        let executor = Arc::new(ProbeExecutor::new()?);
        let processor = Arc::new(OutcomeProcessor::new(
            Arc::clone(&records),
            Arc::clone(&logs),
            AlertDispatcher::new(gateway),
        ));

        Ok(Self {
            records,
            logs,
            executor,
            processor,
            probe_permits: Arc::new(Semaphore::new(config.max_concurrent_probes)),
            config,
        })
    }

    /// Start both cycles. Each runs once immediately, then on its timer.
    pub fn start(self: Arc<Self>) -> Vec<JoinHandle<()>> {
        let probe_loop = {
            let scheduler = Arc::clone(&self);
            tokio::spawn(async move {
                let mut timer = interval(scheduler.config.probe_interval);
                let pass_gate = Arc::new(Semaphore::new(1));
                loop {
                    timer.tick().await;
                    match Arc::clone(&pass_gate).try_acquire_owned() {
                        Ok(permit) => {
                            let scheduler = Arc::clone(&scheduler);
                            tokio::spawn(async move {
                                scheduler.run_probe_cycle().await;
                                drop(permit);
                            });
                        }
                        Err(_) => {
                            warn!("previous probe cycle still in flight, skipping tick");
                        }
                    }
                }
            })
        };

        let rotation_loop = tokio::spawn(async move {
            let mut timer = interval(self.config.rotation_interval);
            loop {
                timer.tick().await;
                self.run_rotation_cycle().await;
            }
        });

        vec![probe_loop, rotation_loop]
    }

    /// One probe pass: list all checks, then normalize, probe, and process
    /// each one concurrently. Waits for every task to finish.
    pub async fn run_probe_cycle(&self) {
        let keys = match self.records.list(CHECKS_COLLECTION).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("could not list checks to process: {e}");
                return;
            }
        };
        if keys.is_empty() {
            debug!("no checks to process");
            return;
        }
        debug!(count = keys.len(), "starting probe cycle");

        let mut tasks = JoinSet::new();
        for key in keys {
            let records = Arc::clone(&self.records);
            let executor = Arc::clone(&self.executor);
            let processor = Arc::clone(&self.processor);
            let permits = Arc::clone(&self.probe_permits);

            tasks.spawn(async move {
                let raw = match records.read(CHECKS_COLLECTION, &key).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!(check = %key, "could not read check record: {e}");
                        return;
                    }
                };

                // A malformed check is dropped for this cycle only; it is
                // retried on the next pass without persisted penalty.
                let check = match normalize_check(&raw) {
                    Ok(check) => check,
                    Err(e) => {
                        warn!(check = %key, "dropping malformed check: {e}");
                        return;
                    }
                };

                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                let outcome = executor.probe(&check).await;
                processor.process(check, outcome).await;
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    /// One rotation pass over all live logs. A single log's failure never
    /// blocks rotation of the others.
    pub async fn run_rotation_cycle(&self) {
        let ids = match self.logs.list(false).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!("could not list logs for rotation: {e}");
                return;
            }
        };

        for id in ids {
            if let Err(e) = self.rotate_log(&id).await {
                warn!(log = %id, "log rotation failed: {e}");
            }
        }
    }

    async fn rotate_log(&self, id: &str) -> Result<(), StoreError> {
        let content = self.logs.read(id).await?;
        if content.is_empty() {
            debug!(log = %id, "log is empty, skipping rotation");
            return Ok(());
        }

        let archive_id = format!("{id}-{}", now_millis());
        self.logs.compress(id, &archive_id).await?;
        self.logs.truncate(id).await?;
        info!(log = %id, archive = %archive_id, "log rotated");
        Ok(())
    }
}
