//! Logging setup and dispatch counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` picks the crate level
/// (0 = info, 1 = debug, 2+ = trace).
pub fn init_tracing(verbosity: u8) {
    let default_directive = match verbosity {
        0 => "notifybox=info",
        1 => "notifybox=debug",
        _ => "notifybox=trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Per-router delivery counters
#[derive(Debug, Default)]
pub struct DispatchStats {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    fallbacks_sent: AtomicU64,
    fallback_failures: AtomicU64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempted(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "succeeded", "Metric incremented");
    }

    pub fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "failed", "Metric incremented");
    }

    pub fn fallback_sent(&self) {
        self.fallbacks_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fallback_failed(&self) {
        self.fallback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            attempted: self.attempted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            fallbacks_sent: self.fallbacks_sent.load(Ordering::Relaxed),
            fallback_failures: self.fallback_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Primary destinations attempted (fallback deliveries are counted separately)
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub fallbacks_sent: u64,
    pub fallback_failures: u64,
}
