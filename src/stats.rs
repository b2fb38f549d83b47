//! Orchestrator counters.
//!
//! Lock-free counters aggregated into a serializable snapshot for health
//! endpoints and the demo binary.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct OrchestratorStats {
    auctions_started: AtomicU64,
    auctions_completed: AtomicU64,
    auctions_timed_out: AtomicU64,
    bids_received: AtomicU64,
    no_bids: AtomicU64,
    cache_failures: AtomicU64,
    callback_failures: AtomicU64,
    duplicate_responses: AtomicU64,
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub auctions_started: u64,
    pub auctions_completed: u64,
    pub auctions_timed_out: u64,
    pub bids_received: u64,
    pub no_bids: u64,
    pub cache_failures: u64,
    pub callback_failures: u64,
    pub duplicate_responses: u64,
}

impl OrchestratorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn auction_started(&self) {
        self.auctions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn auction_completed(&self, due_to_timeout: bool) {
        self.auctions_completed.fetch_add(1, Ordering::Relaxed);
        if due_to_timeout {
            self.auctions_timed_out.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn bid_received(&self) {
        self.bids_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn no_bid(&self) {
        self.no_bids.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_failure(&self) {
        self.cache_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn callback_failure(&self) {
        self.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn duplicate_response(&self) {
        self.duplicate_responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            auctions_started: self.auctions_started.load(Ordering::Relaxed),
            auctions_completed: self.auctions_completed.load(Ordering::Relaxed),
            auctions_timed_out: self.auctions_timed_out.load(Ordering::Relaxed),
            bids_received: self.bids_received.load(Ordering::Relaxed),
            no_bids: self.no_bids.load(Ordering::Relaxed),
            cache_failures: self.cache_failures.load(Ordering::Relaxed),
            callback_failures: self.callback_failures.load(Ordering::Relaxed),
            duplicate_responses: self.duplicate_responses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_increments() {
        let stats = OrchestratorStats::new();
        stats.auction_started();
        stats.auction_completed(true);
        stats.bid_received();
        stats.bid_received();

        let snap = stats.snapshot();
        assert_eq!(snap.auctions_started, 1);
        assert_eq!(snap.auctions_completed, 1);
        assert_eq!(snap.auctions_timed_out, 1);
        assert_eq!(snap.bids_received, 2);
        assert_eq!(snap.no_bids, 0);
    }
}
