// Copyright (c) James Kassemi, SC, US. All rights reserved.
use chrono::Utc;
use core_types::config::RegistryConfig;
use core_types::status::{OverallStatus, ServiceStatusHandle, StatusGauge};
use core_types::{Poll, PollIndex};
use futures::{StreamExt, TryStreamExt};
use ledger_client::LedgerReader;
use log::{debug, error, info};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{LoadError, Result};
use crate::snapshot::{poll_from_record, PollSnapshot};

/// Poll Registry Cache. Cheap to clone; clones share one snapshot.
#[derive(Clone)]
pub struct PollRegistry {
    reader: Arc<dyn LedgerReader>,
    snapshot: Arc<RwLock<Arc<PollSnapshot>>>,
    next_ticket: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    max_concurrent_reads: usize,
    status: ServiceStatusHandle,
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PollRegistry {
    pub fn new(reader: Arc<dyn LedgerReader>, max_concurrent_reads: usize) -> Self {
        let status = ServiceStatusHandle::new("poll_registry");
        status.set_overall(OverallStatus::Warn);
        status.push_warning("waiting for first poll load");
        Self {
            reader,
            snapshot: Arc::new(RwLock::new(Arc::new(PollSnapshot::default()))),
            next_ticket: Arc::new(AtomicU64::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_concurrent_reads: max_concurrent_reads.max(1),
            status,
        }
    }

    pub fn from_config(reader: Arc<dyn LedgerReader>, config: &RegistryConfig) -> Self {
        Self::new(reader, config.max_concurrent_reads)
    }

    pub fn status_handle(&self) -> ServiceStatusHandle {
        self.status.clone()
    }

    /// Last installed snapshot; never partially written.
    pub fn snapshot(&self) -> Arc<PollSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    pub fn poll(&self, index: PollIndex) -> Option<Poll> {
        self.snapshot.read().poll(index).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Full reload: count, then every index in ledger order.
    ///
    /// Returns the snapshot this call loaded. It is installed only if no refresh
    /// that started later has already installed its own.
    pub async fn refresh(&self) -> Result<Arc<PollSnapshot>> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::enter(&self.in_flight);
        let started = Instant::now();
        match self.load(ticket).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                if self.install(Arc::clone(&snapshot)) {
                    info!(
                        "[registry] loaded {} polls (generation {ticket})",
                        snapshot.len()
                    );
                    self.status.set_overall(OverallStatus::Ok);
                    self.status.clear_errors_matching(|_| true);
                    self.status
                        .clear_warnings_matching(|msg| msg.contains("waiting"));
                    self.publish_gauges(started.elapsed());
                } else {
                    debug!("[registry] generation {ticket} superseded; snapshot not installed");
                }
                Ok(snapshot)
            }
            Err(err) => {
                error!("[registry] refresh {ticket} failed: {err}");
                self.status.set_overall(OverallStatus::Crit);
                self.status.replace_errors(format!("poll load failed: {err}"));
                Err(err)
            }
        }
    }

    async fn load(&self, ticket: u64) -> Result<PollSnapshot> {
        let count = self.reader.poll_count().await.map_err(LoadError::Count)?;
        debug!("[registry] refresh {ticket}: reading {count} polls");
        let reader = &self.reader;
        let polls: Vec<Poll> = futures::stream::iter(0..count)
            .map(|index| async move {
                let record = reader
                    .poll(index)
                    .await
                    .map_err(|source| LoadError::Poll { index, source })?;
                poll_from_record(index, record).map_err(|source| LoadError::Poll { index, source })
            })
            .buffered(self.max_concurrent_reads)
            .try_collect()
            .await?;
        Ok(PollSnapshot {
            generation: ticket,
            polls,
            loaded_at: Some(Utc::now()),
        })
    }

    fn install(&self, snapshot: Arc<PollSnapshot>) -> bool {
        let mut guard = self.snapshot.write();
        if snapshot.generation <= guard.generation {
            return false;
        }
        *guard = snapshot;
        true
    }

    fn publish_gauges(&self, load_time: Duration) {
        let snapshot = self.snapshot();
        self.status.set_gauges(vec![
            StatusGauge::new("polls", snapshot.len() as f64),
            StatusGauge::new("active_polls", snapshot.active_count() as f64),
            StatusGauge::new("generation", snapshot.generation as f64),
            StatusGauge::new("load_time", load_time.as_millis() as f64).with_unit("ms"),
        ]);
    }

    pub fn spawn_refresh_loop(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(err) = registry.refresh().await {
                    error!("[registry] background refresh failed: {err}");
                }
            }
        })
    }
}
