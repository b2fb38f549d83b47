//! External collaborator interfaces.
//!
//! The orchestrator never performs network calls, caches creatives, or
//! renders anything itself. Everything outside the auction lifecycle is
//! reached through the narrow traits here; no-op implementations are
//! provided where a collaborator is optional.

use crate::admission::AdmissionHooks;
use crate::auction::AuctionSignals;
use crate::config::PriceGranularity;
use crate::models::{
    AdUnit, AuctionId, BidResponse, PlacementCode, RequestBatch, SupplierId,
};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// The supplier dispatch layer: builds request batches and performs the
/// actual per-supplier calls, feeding signals back into the auction.
pub trait SupplierDispatch: Send + Sync {
    /// Build one batch per supplier group for the given placements.
    fn build_request_batches(
        &self,
        ad_units: &[AdUnit],
        auction_id: AuctionId,
        timeout: Duration,
        labels: &[String],
    ) -> Vec<RequestBatch>;

    /// Start the asynchronous supplier calls for an admitted batch.
    ///
    /// The implementation must invoke `hooks.note_destination_call` once per
    /// outbound call, feed answers and done signals through `signals`, and
    /// invoke `hooks.destination_completed` when each call finishes.
    fn dispatch(
        &self,
        batch: RequestBatch,
        signals: AuctionSignals,
        hooks: AdmissionHooks,
        timeout: Duration,
    );

    /// Completion cleanup: suppliers that timed out, so future work for
    /// them can be short-circuited.
    fn notify_timed_out_suppliers(
        &self,
        placement_codes: &[PlacementCode],
        suppliers: &[SupplierId],
        timeout: Duration,
    );

    /// A bid won its placement.
    fn notify_won(&self, supplier: &SupplierId, bid: &BidResponse, placements: &[PlacementCode]);

    /// Targeting derived from a winning bid was attached.
    fn notify_targeting_set(&self, supplier: &SupplierId, bid: &BidResponse);

    /// Run the delayed cookie/state sync pass. Default: nothing to sync.
    fn schedule_user_sync(&self, _delay: Duration) {}
}

/// Out-of-process asset cache for rich-media bids. Asynchronous and
/// fallible; a failed store discards the bid, never the auction.
#[async_trait]
pub trait CreativeCache: Send + Sync {
    /// Store the creative and return its cache key.
    async fn store(&self, bid: &BidResponse) -> Result<String>;
}

/// Price-bucket string computation for targeting.
pub trait PriceBucketer: Send + Sync {
    fn bucket(&self, cpm: f64, granularity: PriceGranularity) -> String;
}

/// Floors the value to the granularity increment, capped. Stand-in for a
/// publisher-supplied bucketer.
#[derive(Debug, Default)]
pub struct LinearPriceBucketer;

impl PriceBucketer for LinearPriceBucketer {
    fn bucket(&self, cpm: f64, granularity: PriceGranularity) -> String {
        let (step, cap) = granularity.step_and_cap();
        let clamped = cpm.clamp(0.0, cap);
        let bucketed = (clamped / step).floor() * step;
        format!("{:.2}", bucketed)
    }
}

/// Native-ad targeting pair extraction.
pub trait NativeTargeting: Send + Sync {
    fn extract(&self, bid: &BidResponse) -> Vec<(String, String)>;
}

/// Default extractor: no native targeting.
#[derive(Debug, Default)]
pub struct NoNativeTargeting;

impl NativeTargeting for NoNativeTargeting {
    fn extract(&self, _bid: &BidResponse) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Per-bidder renderer installation for outstream creatives.
pub trait RendererInstaller: Send + Sync {
    fn install(&self, supplier: &SupplierId, bid: &BidResponse);
}

/// Default installer: nothing to install.
#[derive(Debug, Default)]
pub struct NoRenderers;

impl RendererInstaller for NoRenderers {
    fn install(&self, _supplier: &SupplierId, _bid: &BidResponse) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_bucketer_floors_to_increment() {
        let b = LinearPriceBucketer;
        assert_eq!(b.bucket(1.57, PriceGranularity::Medium), "1.50");
        assert_eq!(b.bucket(1.57, PriceGranularity::Low), "1.50");
        assert_eq!(b.bucket(1.57, PriceGranularity::High), "1.57");
    }

    #[test]
    fn linear_bucketer_caps_at_granularity_max() {
        let b = LinearPriceBucketer;
        assert_eq!(b.bucket(9.99, PriceGranularity::Low), "5.00");
        assert_eq!(b.bucket(25.0, PriceGranularity::Medium), "20.00");
    }

    #[test]
    fn linear_bucketer_clamps_negatives_to_zero() {
        let b = LinearPriceBucketer;
        assert_eq!(b.bucket(-1.0, PriceGranularity::Medium), "0.00");
    }
}
