//! bidhub demo runner.
//!
//! Drives one auction end to end against simulated suppliers with
//! randomized latencies, printing lifecycle notifications and the final
//! placement-grouped results.

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};

use bidhub::admission::AdmissionHooks;
use bidhub::auction::AuctionSignals;
use bidhub::dispatch::SupplierDispatch;
use bidhub::{
    AdUnit, AdmissionController, Auction, AuctionDeps, AuctionId, BidResponse, BidResponseKind,
    NotificationBus, OrchestratorConfig, PlacementCode, RequestBatch, SupplierBid, SupplierId,
    SupplierRequest,
};

#[derive(Parser, Debug)]
#[command(name = "bidhub", about = "Run a simulated auction end to end")]
struct Args {
    /// Number of suppliers to simulate
    #[arg(long, default_value_t = 4)]
    suppliers: usize,

    /// Number of placements on the page
    #[arg(long, default_value_t = 2)]
    placements: usize,

    /// Auction timeout in milliseconds
    #[arg(long, default_value_t = 800)]
    timeout_ms: u64,

    /// Suppliers that never answer, taken from the end of the roster
    #[arg(long, default_value_t = 0)]
    silent: usize,

    /// RNG seed for reproducible supplier latencies
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Dispatch layer stand-in: one destination per supplier, random response
/// latency per placement, a configurable tail of suppliers that never
/// answer at all.
struct SimulatedDispatch {
    suppliers: usize,
    silent: usize,
    seed: u64,
}

impl SupplierDispatch for SimulatedDispatch {
    fn build_request_batches(
        &self,
        ad_units: &[AdUnit],
        auction_id: AuctionId,
        timeout: Duration,
        _labels: &[String],
    ) -> Vec<RequestBatch> {
        let codes: Vec<PlacementCode> = ad_units.iter().map(|u| u.code.clone()).collect();
        (0..self.suppliers)
            .map(|i| {
                let mut batch = RequestBatch::new(auction_id, timeout);
                batch
                    .supplier_requests
                    .push(SupplierRequest::for_placements(
                        format!("supplier-{}", i),
                        format!("https://bid.supplier-{}.example", i),
                        &codes,
                    ));
                batch
            })
            .collect()
    }

    fn dispatch(
        &self,
        batch: RequestBatch,
        signals: AuctionSignals,
        hooks: AdmissionHooks,
        _timeout: Duration,
    ) {
        for (i, sr) in batch.supplier_requests.iter().enumerate() {
            hooks.note_destination_call(&sr.supplier, &sr.destination);

            let goes_silent = i >= self.suppliers.saturating_sub(self.silent);
            let sr = sr.clone();
            let signals = signals.clone();
            let hooks = hooks.clone();
            let seed = self.seed.wrapping_add(i as u64);

            tokio::spawn(async move {
                if goes_silent {
                    return;
                }
                let mut rng = StdRng::seed_from_u64(seed);
                for req in &sr.bid_requests {
                    let delay = rng.gen_range(50u64..300);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    if rng.gen_bool(0.8) {
                        let cpm = rng.gen_range(0.10..4.50);
                        signals.bid_response(
                            &req.placement_code,
                            SupplierBid::new(req.request_id.clone(), cpm),
                        );
                    }
                }
                signals.supplier_done(&sr.supplier);
                hooks.destination_completed(&sr.destination);
            });
        }
    }

    fn notify_timed_out_suppliers(
        &self,
        _placement_codes: &[PlacementCode],
        suppliers: &[SupplierId],
        _timeout: Duration,
    ) {
        warn!(suppliers = ?suppliers, "short-circuiting timed-out suppliers");
    }

    fn notify_won(&self, supplier: &SupplierId, bid: &BidResponse, _placements: &[PlacementCode]) {
        info!(supplier = %supplier, cpm = bid.cpm, "winner notified");
    }

    fn notify_targeting_set(&self, supplier: &SupplierId, bid: &BidResponse) {
        info!(supplier = %supplier, bucket = ?bid.price_bucket, "targeting set");
    }

    fn schedule_user_sync(&self, delay: Duration) {
        info!(delay_ms = delay.as_millis() as u64, "user sync scheduled");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("bidhub=debug")),
        )
        .init();

    let args = Args::parse();
    let config = OrchestratorConfig::from_env();

    let dispatch: Arc<dyn SupplierDispatch> = Arc::new(SimulatedDispatch {
        suppliers: args.suppliers,
        silent: args.silent.min(args.suppliers),
        seed: args.seed,
    });
    let admission = Arc::new(AdmissionController::new(config.max_requests_per_destination));
    let bus = NotificationBus::new(config.event_bus_capacity);

    // Stream lifecycle notifications to the log as they happen.
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            info!(
                payload = %serde_json::to_string(&event).unwrap_or_default(),
                "notification"
            );
        }
    });

    let deps = AuctionDeps::new(dispatch, admission, bus);
    let stats = Arc::clone(&deps.stats);

    let ad_units: Vec<AdUnit> = (0..args.placements)
        .map(|i| AdUnit::banner(format!("slot-{}", i)))
        .collect();

    let (tx, done) = oneshot::channel();
    let auction = Auction::new(
        config,
        deps,
        ad_units,
        vec!["demo".to_string()],
        Duration::from_millis(args.timeout_ms),
        Box::new(move |grouped, due_to_timeout| {
            let _ = tx.send((grouped, due_to_timeout));
        }),
    );

    auction.start();
    let (grouped, due_to_timeout) = done.await?;

    info!(due_to_timeout, "auction finished");
    for (placement, bids) in &grouped {
        info!(placement = %placement, bids = bids.len(), "placement result");
        for bid in bids {
            info!(
                "  {} {:?} cpm={:.2} ttr={}ms",
                bid.supplier,
                bid.kind,
                bid.cpm,
                bid.time_to_respond.as_millis()
            );
        }
    }

    // Highest genuine bid per placement wins.
    for bids in grouped.values() {
        let best = bids
            .iter()
            .filter(|b| b.kind == BidResponseKind::Normal)
            .max_by(|a, b| {
                a.cpm
                    .partial_cmp(&b.cpm)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        if let Some(best) = best {
            auction.record_winning_bid(best.clone());
        }
    }

    println!("{}", serde_json::to_string_pretty(&stats.snapshot())?);
    Ok(())
}
