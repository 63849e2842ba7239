//! Race metrics and tracing setup

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, filtered by `RUST_LOG` (default `info`)
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Metrics handle for recording race counters
#[derive(Debug, Default)]
pub struct Metrics {
    races_started: AtomicU64,
    races_won: AtomicU64,
    races_failed: AtomicU64,
    races_timed_out: AtomicU64,
    races_cancelled: AtomicU64,
    attempts_failed: AtomicU64,
    losers_cancelled: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn race_started(&self) {
        self.races_started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "races_started", "Metric incremented");
    }

    pub fn race_won(&self) {
        self.races_won.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "races_won", "Metric incremented");
    }

    pub fn race_failed(&self) {
        self.races_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "races_failed", "Metric incremented");
    }

    pub fn race_timed_out(&self) {
        self.races_timed_out.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "races_timed_out", "Metric incremented");
    }

    pub fn race_cancelled(&self) {
        self.races_cancelled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "races_cancelled", "Metric incremented");
    }

    pub fn attempt_failed(&self) {
        self.attempts_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "attempts_failed", "Metric incremented");
    }

    pub fn losers_cancelled(&self, count: u64) {
        if count == 0 {
            return;
        }
        self.losers_cancelled.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "losers_cancelled", count, "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            races_started: self.races_started.load(Ordering::Relaxed),
            races_won: self.races_won.load(Ordering::Relaxed),
            races_failed: self.races_failed.load(Ordering::Relaxed),
            races_timed_out: self.races_timed_out.load(Ordering::Relaxed),
            races_cancelled: self.races_cancelled.load(Ordering::Relaxed),
            attempts_failed: self.attempts_failed.load(Ordering::Relaxed),
            losers_cancelled: self.losers_cancelled.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub races_started: u64,
    pub races_won: u64,
    pub races_failed: u64,
    pub races_timed_out: u64,
    pub races_cancelled: u64,
    pub attempts_failed: u64,
    pub losers_cancelled: u64,
}
