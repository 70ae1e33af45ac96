//! Per-domain crawl worker supervision.
//!
//! Owns the only mapping from domain name to a running worker process.
//! All mutation of the table happens inside this module's entry points;
//! the mutex is never held across an await.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::common::GatewayError;

/// How workers are launched.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Worker executable.
    pub worker_bin: String,
    /// Fixed arguments placed before the per-domain ones.
    pub worker_args: Vec<String>,
    /// Shared seed-URL list passed to every worker.
    pub seed_file: std::path::PathBuf,
}

/// Outcome of a start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A worker for the domain is already running; re-submission must never
    /// spawn a duplicate.
    AlreadyRunning,
}

struct LiveEntry {
    /// OS pid, if the process had one at registration time.
    pid: Option<u32>,
    /// Cancelled by `stop`; the exit watcher turns it into a kill signal.
    stop: CancellationToken,
    /// Distinguishes this entry from a later one for the same domain, so a
    /// stale exit watcher never removes its successor.
    generation: u64,
}

/// Supervises one OS child process per actively-crawling domain.
pub struct ProcessSupervisor {
    config: SupervisorConfig,
    table: Arc<Mutex<HashMap<String, LiveEntry>>>,
    next_generation: AtomicU64,
}

fn lock(table: &Mutex<HashMap<String, LiveEntry>>) -> MutexGuard<'_, HashMap<String, LiveEntry>> {
    // The critical sections only touch the map; continuing after a panic in
    // one of them cannot corrupt it.
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ProcessSupervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            table: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Ensure a worker is running for `domain`.
    ///
    /// Idempotent: if a live entry exists, this is a no-op. Otherwise the
    /// worker is spawned with its stdout/stderr piped into tracing and an
    /// exit watcher that removes the entry exactly once, whether the process
    /// exits naturally or is stopped.
    pub fn start(&self, domain: &str) -> Result<StartOutcome, GatewayError> {
        {
            let table = lock(&self.table);
            if table.contains_key(domain) {
                debug!(domain, "worker already running, start is a no-op");
                return Ok(StartOutcome::AlreadyRunning);
            }
        }

        let mut command = Command::new(&self.config.worker_bin);
        command
            .args(&self.config.worker_args)
            .arg("--domain")
            .arg(domain)
            .arg("--seed-urls")
            .arg(&self.config.seed_file)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(GatewayError::Spawn)?;
        let pid = child.id();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let stop = CancellationToken::new();

        if let Some(stdout) = child.stdout.take() {
            let domain = domain.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(domain = %domain, "worker: {line}");
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let domain = domain.to_string();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!(domain = %domain, "worker: {line}");
                }
            });
        }

        {
            let mut table = lock(&self.table);
            // A concurrent start may have won the race while we were
            // spawning; keep the first entry and drop our child (killed on
            // drop) rather than track two workers for one domain.
            if table.contains_key(domain) {
                debug!(domain, "lost start race, discarding duplicate worker");
                return Ok(StartOutcome::AlreadyRunning);
            }
            table.insert(
                domain.to_string(),
                LiveEntry {
                    pid,
                    stop: stop.clone(),
                    generation,
                },
            );
        }
        info!(domain, pid, "started crawler worker");

        let table = Arc::clone(&self.table);
        let domain = domain.to_string();
        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => info!(domain = %domain, code = ?status.code(), "worker exited"),
                    Err(e) => warn!(domain = %domain, error = %e, "failed to reap worker"),
                },
                _ = stop.cancelled() => {
                    // Advisory termination, no forced-kill escalation.
                    if let Err(e) = child.start_kill() {
                        debug!(domain = %domain, error = %e, "worker already gone on stop");
                    }
                    let _ = child.wait().await;
                    info!(domain = %domain, "worker stopped");
                }
            }

            // First of explicit stop / natural exit wins; the generation
            // check keeps a stale watcher from removing a restarted entry.
            let mut table = lock(&table);
            if table
                .get(&domain)
                .is_some_and(|entry| entry.generation == generation)
            {
                table.remove(&domain);
                debug!(domain = %domain, "live entry removed on exit");
            }
        });

        Ok(StartOutcome::Started)
    }

    /// Stop the worker for `domain`.
    ///
    /// The live entry is removed immediately; the exit watcher delivers the
    /// kill signal and reaps the process in the background. Stopping a
    /// domain with no worker is a normal `NotFound` outcome.
    pub fn stop(&self, domain: &str) -> Result<(), GatewayError> {
        let entry = {
            let mut table = lock(&self.table);
            table.remove(domain)
        };
        match entry {
            None => Err(GatewayError::NotFound(domain.to_string())),
            Some(entry) => {
                entry.stop.cancel();
                info!(domain, pid = entry.pid, "stop requested");
                Ok(())
            }
        }
    }

    /// Whether a worker is currently registered for `domain`. Pure lookup.
    pub fn is_active(&self, domain: &str) -> bool {
        lock(&self.table).contains_key(domain)
    }

    /// Number of live workers.
    pub fn active_count(&self) -> usize {
        lock(&self.table).len()
    }

    /// Point-in-time view of the domains with live workers.
    pub fn active_domains(&self) -> Vec<String> {
        lock(&self.table).keys().cloned().collect()
    }
}
