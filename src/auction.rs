//! Auction lifecycle and callback execution.
//!
//! An [`Auction`] owns the full start -> dispatch -> collect -> complete
//! lifecycle for one set of placements. All mutable state sits behind a
//! single `parking_lot::Mutex`, so every signal (incoming bid, supplier
//! done, destination completed, deadline fired) is handled as one serialized
//! turn. The lock is never held across an `.await`: asynchronous seams
//! (creative cache writes, supplier calls) run outside it and re-enter
//! through ordinary methods.
//!
//! The terminal callback fires exactly once per auction. The stored
//! callback is `take()`n on the first finalize, which makes every later
//! finalize (timer racing natural completion, stray signals after
//! completion) a silent no-op.

use crate::admission::AdmissionHooks;
use crate::aggregator::ResponseAggregator;
use crate::config::OrchestratorConfig;
use crate::dispatch::{
    CreativeCache, LinearPriceBucketer, NativeTargeting, NoNativeTargeting, NoRenderers,
    PriceBucketer, RendererInstaller, SupplierDispatch,
};
use crate::models::{
    derive_time_to_respond, AdUnit, AuctionId, AuctionStatus, BidRequest, BidResponse,
    BidResponseKind, PlacementCode, RequestBatch, RequestId, SupplierBid, SupplierId,
    SupplierRequest,
};
use crate::notify::{AuctionEvent, NotificationBus};
use crate::stats::OrchestratorStats;
use crate::timer::AuctionTimer;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Terminal callback: placement-grouped results plus whether completion was
/// forced by the deadline.
pub type AuctionCallback =
    Box<dyn FnOnce(HashMap<PlacementCode, Vec<BidResponse>>, bool) + Send + 'static>;

/// Collaborators an auction talks to. The dispatch layer, admission
/// controller and bus are required; everything else defaults to a no-op
/// stand-in.
pub struct AuctionDeps {
    pub dispatch: Arc<dyn SupplierDispatch>,
    pub admission: Arc<crate::admission::AdmissionController>,
    pub bus: NotificationBus,
    pub stats: Arc<OrchestratorStats>,
    pub cache: Option<Arc<dyn CreativeCache>>,
    pub bucketer: Arc<dyn PriceBucketer>,
    pub native: Arc<dyn NativeTargeting>,
    pub renderers: Arc<dyn RendererInstaller>,
}

impl AuctionDeps {
    pub fn new(
        dispatch: Arc<dyn SupplierDispatch>,
        admission: Arc<crate::admission::AdmissionController>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            dispatch,
            admission,
            bus,
            stats: Arc::new(OrchestratorStats::new()),
            cache: None,
            bucketer: Arc::new(LinearPriceBucketer),
            native: Arc::new(NoNativeTargeting),
            renderers: Arc::new(NoRenderers),
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn CreativeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_stats(mut self, stats: Arc<OrchestratorStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_bucketer(mut self, bucketer: Arc<dyn PriceBucketer>) -> Self {
        self.bucketer = bucketer;
        self
    }

    pub fn with_native_targeting(mut self, native: Arc<dyn NativeTargeting>) -> Self {
        self.native = native;
        self
    }

    pub fn with_renderers(mut self, renderers: Arc<dyn RendererInstaller>) -> Self {
        self.renderers = renderers;
        self
    }
}

struct AuctionState {
    status: AuctionStatus,
    started: bool,
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    /// Set when the deadline fires; unresolved requests synthesize as
    /// `TimedOut` from then on.
    timed_out: bool,
    callback: Option<AuctionCallback>,
    supplier_requests: Vec<SupplierRequest>,
    bids_received: Vec<BidResponse>,
    no_bids: Vec<BidResponse>,
    timeout_bids: Vec<BidResponse>,
    winning_bids: Vec<BidResponse>,
    /// The single retained resolution per bid request id. Synthesis never
    /// overwrites a genuine answer; a late genuine answer upgrades a
    /// synthesized one.
    resolved: HashMap<RequestId, BidResponseKind>,
    /// Per-placement bid count last reported through a placement
    /// notification.
    last_reported: HashMap<PlacementCode, usize>,
    aggregator: ResponseAggregator,
    timer: Option<AuctionTimer>,
}

struct Finalization {
    callback: AuctionCallback,
    grouped: HashMap<PlacementCode, Vec<BidResponse>>,
    silent: Vec<SupplierId>,
    timer: Option<AuctionTimer>,
    events: Vec<AuctionEvent>,
}

/// One auction: identity, placements, deadline, collected responses and the
/// terminal callback.
pub struct Auction {
    id: AuctionId,
    timeout: Duration,
    labels: Vec<String>,
    ad_units: Vec<AdUnit>,
    placement_codes: Vec<PlacementCode>,
    created_at: DateTime<Utc>,
    config: OrchestratorConfig,
    deps: AuctionDeps,
    state: Mutex<AuctionState>,
}

impl Auction {
    pub fn new(
        config: OrchestratorConfig,
        deps: AuctionDeps,
        ad_units: Vec<AdUnit>,
        labels: Vec<String>,
        timeout: Duration,
        callback: AuctionCallback,
    ) -> Arc<Self> {
        let placement_codes = ad_units.iter().map(|u| u.code.clone()).collect();
        Arc::new(Self {
            id: Uuid::new_v4(),
            timeout,
            labels,
            ad_units,
            placement_codes,
            created_at: Utc::now(),
            config,
            deps,
            state: Mutex::new(AuctionState {
                status: AuctionStatus::Started,
                started: false,
                start_time: None,
                end_time: None,
                timed_out: false,
                callback: Some(callback),
                supplier_requests: Vec::new(),
                bids_received: Vec::new(),
                no_bids: Vec::new(),
                timeout_bids: Vec::new(),
                winning_bids: Vec::new(),
                resolved: HashMap::new(),
                last_reported: HashMap::new(),
                aggregator: ResponseAggregator::new(),
                timer: None,
            }),
        })
    }

    /// Kick off the auction: build batches for all placements and submit
    /// them to the admission controller. Zero batches means no bids are
    /// possible and the auction completes immediately.
    pub fn start(self: &Arc<Self>) {
        {
            let mut st = self.state.lock();
            if st.started {
                warn!(auction_id = %self.id, "auction already started");
                return;
            }
            st.started = true;
            st.start_time = Some(Instant::now());
        }

        info!(
            auction_id = %self.id,
            placements = self.placement_codes.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "auction started"
        );
        self.deps.stats.auction_started();
        self.deps.bus.publish(AuctionEvent::AuctionInit {
            auction_id: self.id,
            placement_codes: self.placement_codes.clone(),
            timeout_ms: self.timeout.as_millis() as u64,
        });

        let batches = self.deps.dispatch.build_request_batches(
            &self.ad_units,
            self.id,
            self.timeout,
            &self.labels,
        );
        if batches.is_empty() {
            debug!(auction_id = %self.id, "no request batches built, completing empty");
            self.finalize(false);
            return;
        }

        let batch = RequestBatch::merge(self.id, self.timeout, batches);
        let me = Arc::clone(self);
        self.deps
            .admission
            .try_submit(batch, Box::new(move |b| me.begin_dispatch(b)));
    }

    /// Runs when the admission controller admits our batch: arm the
    /// deadline, fix the supplier roster, and hand the batch to the
    /// dispatch layer.
    fn begin_dispatch(self: Arc<Self>, batch: RequestBatch) {
        let signals = AuctionSignals::new(&self);
        let hooks = AdmissionHooks::new(Arc::clone(&self.deps.admission), self.id);
        {
            let mut st = self.state.lock();
            st.status = AuctionStatus::InProgress;
            st.aggregator
                .set_expected_suppliers(batch.supplier_requests.len());
            st.supplier_requests = batch.supplier_requests.clone();
            let deadline = self.timeout + self.config.timeout_buffer();
            st.timer = Some(AuctionTimer::arm(deadline, Arc::downgrade(&self)));
        }

        debug!(
            auction_id = %self.id,
            suppliers = batch.supplier_requests.len(),
            "batch admitted, dispatching"
        );
        self.deps
            .dispatch
            .dispatch(batch, signals, hooks, self.timeout);
    }

    /// Accept one genuine supplier answer. Rich-media bids suspend on the
    /// external creative cache before being recorded; a cache failure
    /// discards the bid and the auction proceeds.
    pub fn record_bid_response(self: &Arc<Self>, placement_code: &str, bid: SupplierBid) {
        let now = Instant::now();
        let prepared = {
            let mut st = self.state.lock();

            let mut found = None;
            for sr in &st.supplier_requests {
                if let Some(req) = sr
                    .bid_requests
                    .iter()
                    .find(|r| r.request_id == bid.request_id && r.placement_code == placement_code)
                {
                    found = Some((req.clone(), sr.clone()));
                    break;
                }
            }
            let Some((req, sr)) = found else {
                warn!(
                    auction_id = %self.id,
                    request_id = %bid.request_id,
                    placement = placement_code,
                    "bid for unknown request, dropping"
                );
                return;
            };

            let ttr = bid
                .time_to_respond
                .unwrap_or_else(|| derive_time_to_respond(&sr, Some(&req), now));
            let response = BidResponse {
                request_id: req.request_id.clone(),
                placement_code: req.placement_code.clone(),
                supplier: req.supplier.clone(),
                auction_id: self.id,
                cpm: bid.cpm.unwrap_or(0.0),
                kind: BidResponseKind::Normal,
                time_to_respond: ttr,
                cache_key: None,
                price_bucket: None,
                targeting: Vec::new(),
                received_at: Utc::now(),
            };

            if !st.aggregator.begin_add(&response.request_id) {
                // Duplicate answer for an already-answered request: keep the
                // latest value, never touch the in-flight counter again.
                warn!(
                    auction_id = %self.id,
                    request_id = %response.request_id,
                    "duplicate answer for bid request"
                );
                self.deps.stats.duplicate_response();
                if let Some(existing) = st
                    .bids_received
                    .iter_mut()
                    .find(|b| b.request_id == response.request_id)
                {
                    *existing = response;
                }
                return;
            }
            response
        };

        self.deps.renderers.install(&prepared.supplier, &prepared);

        if bid.requires_cache() {
            if let Some(cache) = self.deps.cache.clone() {
                let me = Arc::clone(self);
                tokio::spawn(async move {
                    let mut response = prepared;
                    match cache.store(&response).await {
                        Ok(key) => {
                            response.cache_key = Some(key);
                            me.complete_bid_add(Some(response));
                        }
                        Err(e) => {
                            warn!(
                                auction_id = %me.id,
                                request_id = %response.request_id,
                                error = %e,
                                "creative cache write failed, discarding bid"
                            );
                            me.deps.stats.cache_failure();
                            me.complete_bid_add(None);
                        }
                    }
                });
                return;
            }
        }

        self.complete_bid_add(Some(prepared));
    }

    /// Finish a bid-add operation: record the response (if it survived),
    /// re-run reconciliation, and complete the auction if everything is
    /// quiet.
    fn complete_bid_add(self: &Arc<Self>, response: Option<BidResponse>) {
        let (quiescent, events) = {
            let mut st = self.state.lock();
            let mut events = Vec::new();

            if let Some(response) = response {
                debug!(
                    auction_id = %self.id,
                    placement = %response.placement_code,
                    supplier = %response.supplier,
                    cpm = response.cpm,
                    "bid recorded"
                );
                self.deps.stats.bid_received();
                st.resolved
                    .insert(response.request_id.clone(), BidResponseKind::Normal);
                events.push(AuctionEvent::BidResponseRecorded {
                    auction_id: self.id,
                    placement_code: response.placement_code.clone(),
                    bid: response.clone(),
                });
                st.bids_received.push(response);
            }

            st.aggregator.finish_add();
            let timed = st.timed_out || st.status == AuctionStatus::Completed;
            self.reconcile_locked(&mut st, timed, &mut events);
            (
                st.aggregator.is_quiescent() && st.status != AuctionStatus::Completed,
                events,
            )
        };

        for event in events {
            self.deps.bus.publish(event);
        }
        if quiescent {
            self.auction_done();
        }
    }

    /// A supplier reported done. Its unanswered requests resolve as no-bids
    /// (or timeouts, past the natural window).
    pub fn record_supplier_done(self: &Arc<Self>, supplier: &SupplierId) {
        let now = Instant::now();
        let (quiescent, events) = {
            let mut st = self.state.lock();

            let Some(idx) = st
                .supplier_requests
                .iter()
                .position(|sr| &sr.supplier == supplier)
            else {
                warn!(auction_id = %self.id, supplier = %supplier, "done signal for unknown supplier");
                return;
            };

            if st.supplier_requests[idx].done {
                debug!(auction_id = %self.id, supplier = %supplier, "duplicate done signal");
            } else {
                let sr = &mut st.supplier_requests[idx];
                sr.done = true;
                sr.no_bid = true;
                sr.done_time = Some(now);
            }
            st.aggregator.mark_supplier_done(supplier);

            let snapshot = st.supplier_requests[idx].clone();
            let past_window = st.timed_out || st.status == AuctionStatus::Completed;
            let mut events = Vec::new();
            for req in &snapshot.bid_requests {
                if st.resolved.contains_key(&req.request_id) {
                    continue;
                }
                let kind = if past_window {
                    BidResponseKind::TimedOut
                } else {
                    BidResponseKind::NoBid
                };
                let ttr = derive_time_to_respond(&snapshot, Some(req), now);
                let synthesized = BidResponse::synthesized(kind, req, self.id, ttr);
                self.record_synthesized(&mut st, synthesized, &mut events);
            }

            let timed = st.timed_out || st.status == AuctionStatus::Completed;
            self.reconcile_locked(&mut st, timed, &mut events);
            (
                st.aggregator.is_quiescent() && st.status != AuctionStatus::Completed,
                events,
            )
        };

        debug!(auction_id = %self.id, supplier = %supplier, "supplier done");
        for event in events {
            self.deps.bus.publish(event);
        }
        if quiescent {
            self.auction_done();
        }
    }

    /// Natural completion: every supplier reported done and no bid-add is
    /// outstanding.
    pub fn auction_done(self: &Arc<Self>) {
        let events = {
            let mut st = self.state.lock();
            let mut events = Vec::new();
            let timed = st.timed_out || st.status == AuctionStatus::Completed;
            self.reconcile_locked(&mut st, timed, &mut events);
            events
        };
        for event in events {
            self.deps.bus.publish(event);
        }
        self.finalize(false);
    }

    /// Complete the auction and run the terminal callback exactly once.
    ///
    /// The timeout path first identifies suppliers that never signaled done
    /// and never answered, notifies about them, and forces a reconciliation
    /// pass that demotes every unresolved request to `TimedOut`. A panic in
    /// the publisher callback is caught and logged; cleanup runs either way.
    pub fn finalize(self: &Arc<Self>, due_to_timeout: bool) {
        let fin = {
            let mut st = self.state.lock();
            let Some(callback) = st.callback.take() else {
                debug!(auction_id = %self.id, "finalize after completion ignored");
                return;
            };

            let mut events = Vec::new();
            let mut silent = Vec::new();
            if due_to_timeout {
                st.timed_out = true;
                silent = st
                    .supplier_requests
                    .iter()
                    .filter(|sr| {
                        !sr.done
                            && !sr
                                .bid_requests
                                .iter()
                                .any(|r| st.aggregator.is_answered(&r.request_id))
                    })
                    .map(|sr| sr.supplier.clone())
                    .collect::<Vec<_>>();
                if !silent.is_empty() {
                    warn!(
                        auction_id = %self.id,
                        suppliers = ?silent,
                        "suppliers timed out without responding"
                    );
                    events.push(AuctionEvent::BidTimeout {
                        auction_id: self.id,
                        suppliers: silent.clone(),
                        placement_codes: self.placement_codes.clone(),
                    });
                }
                self.reconcile_locked(&mut st, true, &mut events);
            }

            st.status = AuctionStatus::Completed;
            st.end_time = Some(Instant::now());
            let grouped = group_by_placement(&st, &self.placement_codes);
            events.push(AuctionEvent::AuctionEnd {
                auction_id: self.id,
                due_to_timeout,
                bid_count: st.bids_received.len(),
            });

            Finalization {
                callback,
                grouped,
                silent,
                timer: st.timer.take(),
                events,
            }
        };

        let Finalization {
            callback,
            grouped,
            silent,
            timer,
            events,
        } = fin;

        if let Some(timer) = timer {
            timer.cancel();
        }
        for event in events {
            self.deps.bus.publish(event);
        }
        self.deps.stats.auction_completed(due_to_timeout);
        info!(auction_id = %self.id, due_to_timeout, "auction completed");

        if catch_unwind(AssertUnwindSafe(move || callback(grouped, due_to_timeout))).is_err() {
            self.deps.stats.callback_failure();
            error!(auction_id = %self.id, "terminal callback panicked");
        }

        // Cleanup runs even when the callback panicked.
        if due_to_timeout && !silent.is_empty() {
            self.deps.dispatch.notify_timed_out_suppliers(
                &self.placement_codes,
                &silent,
                self.timeout,
            );
        }
        if self.config.user_sync.enabled {
            self.deps
                .dispatch
                .schedule_user_sync(self.config.user_sync_delay());
        }
    }

    /// Walk every placement and resolve its outstanding requests, in
    /// precedence order: genuine recorded answer, supplier-level no-bid,
    /// auction-level timeout. A placement with any request left pending is
    /// skipped. Ready placements report completion once and updates
    /// whenever their bid count changes afterwards.
    fn reconcile_locked(
        &self,
        st: &mut AuctionState,
        auction_timed_out: bool,
        events: &mut Vec<AuctionEvent>,
    ) {
        let now = Instant::now();
        for code in &self.placement_codes {
            let mut to_synthesize = Vec::new();
            let mut ready = true;

            'placement: for sr in &st.supplier_requests {
                for req in &sr.bid_requests {
                    if req.placement_code != *code || st.resolved.contains_key(&req.request_id) {
                        continue;
                    }
                    let kind = if sr.done && sr.no_bid {
                        BidResponseKind::NoBid
                    } else if auction_timed_out || st.status == AuctionStatus::Completed {
                        BidResponseKind::TimedOut
                    } else {
                        ready = false;
                        break 'placement;
                    };
                    let ttr = derive_time_to_respond(sr, Some(req), now);
                    to_synthesize.push(BidResponse::synthesized(kind, req, self.id, ttr));
                }
            }
            if !ready {
                continue;
            }

            for response in to_synthesize {
                self.record_synthesized(st, response, events);
            }

            let count = st
                .bids_received
                .iter()
                .filter(|b| b.placement_code == *code)
                .count();
            match st.last_reported.get(code) {
                None => {
                    debug!(auction_id = %self.id, placement = %code, bids = count, "placement complete");
                    events.push(AuctionEvent::PlacementComplete {
                        auction_id: self.id,
                        placement_code: code.clone(),
                        bid_count: count,
                    });
                }
                Some(prev) if *prev != count => {
                    // Late arrival after the placement was already reported.
                    // Tolerated: the bid set only ever grows.
                    debug!(auction_id = %self.id, placement = %code, bids = count, "placement updated");
                    events.push(AuctionEvent::PlacementUpdated {
                        auction_id: self.id,
                        placement_code: code.clone(),
                        bid_count: count,
                    });
                }
                Some(_) => {}
            }
            st.last_reported.insert(code.clone(), count);
        }
    }

    /// Record a synthesized placeholder, keeping the one-response-per-
    /// request invariant.
    fn record_synthesized(
        &self,
        st: &mut AuctionState,
        response: BidResponse,
        events: &mut Vec<AuctionEvent>,
    ) {
        st.resolved.insert(response.request_id.clone(), response.kind);
        match response.kind {
            BidResponseKind::NoBid => {
                self.deps.stats.no_bid();
                events.push(AuctionEvent::NoBid {
                    auction_id: self.id,
                    placement_code: response.placement_code.clone(),
                    supplier: response.supplier.clone(),
                    request_id: response.request_id.clone(),
                });
                st.no_bids.push(response);
            }
            BidResponseKind::TimedOut => st.timeout_bids.push(response),
            BidResponseKind::Normal => {
                error!(
                    auction_id = %self.id,
                    request_id = %response.request_id,
                    "attempted to synthesize a normal response"
                );
            }
        }
    }

    /// A bid won its placement: bucket the price, attach targeting, and
    /// notify the dispatch layer.
    pub fn record_winning_bid(&self, mut bid: BidResponse) {
        let bucket = self
            .deps
            .bucketer
            .bucket(bid.cpm, self.config.price_granularity);
        bid.targeting.push(("hb_pb".to_string(), bucket.clone()));
        bid.price_bucket = Some(bucket);
        bid.targeting.extend(self.deps.native.extract(&bid));

        {
            let mut st = self.state.lock();
            st.winning_bids.push(bid.clone());
        }

        info!(
            auction_id = %self.id,
            supplier = %bid.supplier,
            cpm = bid.cpm,
            "winning bid recorded"
        );
        self.deps
            .dispatch
            .notify_won(&bid.supplier, &bid, &self.placement_codes);
        self.deps.dispatch.notify_targeting_set(&bid.supplier, &bid);
    }

    // Accessors

    pub fn id(&self) -> AuctionId {
        self.id
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn status(&self) -> AuctionStatus {
        self.state.lock().status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn placements(&self) -> &[AdUnit] {
        &self.ad_units
    }

    pub fn placement_codes(&self) -> &[PlacementCode] {
        &self.placement_codes
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.state.lock().start_time
    }

    pub fn end_time(&self) -> Option<Instant> {
        self.state.lock().end_time
    }

    pub fn supplier_requests(&self) -> Vec<SupplierRequest> {
        self.state.lock().supplier_requests.clone()
    }

    pub fn bids_received(&self) -> Vec<BidResponse> {
        self.state.lock().bids_received.clone()
    }

    pub fn no_bids(&self) -> Vec<BidResponse> {
        self.state.lock().no_bids.clone()
    }

    pub fn winning_bids(&self) -> Vec<BidResponse> {
        self.state.lock().winning_bids.clone()
    }

    /// Bid requests issued for one placement, across all suppliers.
    pub fn bid_requests_for(&self, placement_code: &str) -> Vec<BidRequest> {
        self.state
            .lock()
            .supplier_requests
            .iter()
            .flat_map(|sr| sr.bid_requests.iter())
            .filter(|r| r.placement_code == placement_code)
            .cloned()
            .collect()
    }

    /// Genuine bids recorded for one placement.
    pub fn bids_for(&self, placement_code: &str) -> Vec<BidResponse> {
        self.state
            .lock()
            .bids_received
            .iter()
            .filter(|b| b.placement_code == placement_code)
            .cloned()
            .collect()
    }

    /// How each bid request ultimately resolved. Complete only after the
    /// auction finished.
    pub fn resolutions(&self) -> HashMap<RequestId, BidResponseKind> {
        self.state.lock().resolved.clone()
    }
}

fn group_by_placement(
    st: &AuctionState,
    codes: &[PlacementCode],
) -> HashMap<PlacementCode, Vec<BidResponse>> {
    let mut grouped: HashMap<PlacementCode, Vec<BidResponse>> =
        codes.iter().map(|c| (c.clone(), Vec::new())).collect();
    for bid in st.bids_received.iter().chain(st.timeout_bids.iter()) {
        grouped
            .entry(bid.placement_code.clone())
            .or_default()
            .push(bid.clone());
    }
    grouped
}

/// Signal entry points handed to the dispatch layer. Holds the auction
/// weakly: signals for an auction that no longer exists are dropped.
#[derive(Clone)]
pub struct AuctionSignals {
    auction: Weak<Auction>,
}

impl AuctionSignals {
    pub fn new(auction: &Arc<Auction>) -> Self {
        Self {
            auction: Arc::downgrade(auction),
        }
    }

    /// One genuine answer from a supplier.
    pub fn bid_response(&self, placement_code: &str, bid: SupplierBid) {
        if let Some(auction) = self.auction.upgrade() {
            auction.record_bid_response(placement_code, bid);
        }
    }

    /// A supplier finished responding for this auction.
    pub fn supplier_done(&self, supplier: &SupplierId) {
        if let Some(auction) = self.auction.upgrade() {
            auction.record_supplier_done(supplier);
        }
    }
}
