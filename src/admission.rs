//! Admission control for outbound request batches.
//!
//! Tracks outstanding in-flight requests per destination endpoint, runs
//! batches that fit under the per-destination cap, and defers the rest in
//! FIFO order until a completion signal frees capacity. One controller is
//! constructed per hosting process and shared by every auction; this is the
//! only cross-auction state in the system.
//!
//! Sources default to a cost of one request per call. A source observed to
//! issue more than one call within a single auction is flagged
//! multi-request and charged its true cost (its bid request count, capped
//! at the destination maximum) on future submissions.

use crate::models::{AuctionId, RequestBatch, SupplierId};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, warn};

type RunFn = Box<dyn FnOnce(RequestBatch) + Send>;

struct DeferredBatch {
    batch: RequestBatch,
    run: RunFn,
}

#[derive(Default)]
struct SourceStats {
    /// Auction the call counter belongs to; reset when a new auction shows up.
    auction: Option<AuctionId>,
    calls_in_auction: u32,
    /// Sticky once observed: the source issues more than one request per call.
    multi_request: bool,
}

#[derive(Default)]
struct AdmissionState {
    outstanding: HashMap<String, usize>,
    sources: HashMap<SupplierId, SourceStats>,
    deferred: VecDeque<DeferredBatch>,
    // Diagnostics
    total_run: u64,
    total_deferred: u64,
}

/// Outcome of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Ran,
    Queued,
}

/// Per-destination concurrency controller with a FIFO deferral queue.
pub struct AdmissionController {
    max_per_destination: usize,
    state: Mutex<AdmissionState>,
}

impl AdmissionController {
    pub fn new(max_per_destination: usize) -> Self {
        Self {
            max_per_destination: max_per_destination.max(1),
            state: Mutex::new(AdmissionState::default()),
        }
    }

    /// Run the batch now if every destination it touches stays under the
    /// cap, otherwise defer it. The run closure is invoked outside the
    /// internal lock.
    pub fn try_submit(&self, batch: RequestBatch, run: RunFn) -> SubmitOutcome {
        let admitted = {
            let mut st = self.state.lock();
            if self.fits(&st, &batch) {
                self.commit(&mut st, &batch);
                st.total_run += 1;
                Some((batch, run))
            } else {
                debug!(
                    auction_id = %batch.auction_id,
                    queued = st.deferred.len() + 1,
                    "destination capacity exhausted, deferring batch"
                );
                st.total_deferred += 1;
                st.deferred.push_back(DeferredBatch { batch, run });
                None
            }
        };

        match admitted {
            Some((batch, run)) => {
                run(batch);
                SubmitOutcome::Ran
            }
            None => SubmitOutcome::Queued,
        }
    }

    /// One in-flight request to `destination` finished. Frees capacity and
    /// makes a single attempt to run the oldest deferred batch.
    pub fn on_destination_completed(&self, destination: &str) {
        let runnable = {
            let mut st = self.state.lock();
            match st.outstanding.get_mut(destination) {
                Some(count) if *count > 0 => *count -= 1,
                _ => warn!(destination, "completion signal for idle destination"),
            }

            let head_fits = st
                .deferred
                .front()
                .map(|head| self.fits(&st, &head.batch))
                .unwrap_or(false);
            if head_fits {
                st.deferred.pop_front().map(|head| {
                    self.commit(&mut st, &head.batch);
                    st.total_run += 1;
                    head
                })
            } else {
                None
            }
        };

        if let Some(DeferredBatch { batch, run }) = runnable {
            debug!(auction_id = %batch.auction_id, "capacity freed, running deferred batch");
            run(batch);
        }
    }

    /// Called once per outbound call a source makes. A second call within
    /// the same auction flips the source's multi-request flag.
    pub fn note_destination_call(
        &self,
        auction_id: AuctionId,
        source: &SupplierId,
        destination: &str,
    ) {
        let mut st = self.state.lock();
        let stats = st.sources.entry(source.clone()).or_default();

        if stats.auction != Some(auction_id) {
            stats.auction = Some(auction_id);
            stats.calls_in_auction = 0;
        }
        stats.calls_in_auction += 1;

        if stats.calls_in_auction > 1 && !stats.multi_request {
            stats.multi_request = true;
            debug!(
                source = %source,
                destination,
                "source issues multiple requests per auction, charging true cost"
            );
        }
    }

    /// Current outstanding count for a destination.
    pub fn outstanding(&self, destination: &str) -> usize {
        self.state
            .lock()
            .outstanding
            .get(destination)
            .copied()
            .unwrap_or(0)
    }

    /// Number of batches waiting for capacity.
    pub fn deferred_len(&self) -> usize {
        self.state.lock().deferred.len()
    }

    /// Diagnostics: batches run / batches deferred over the controller's
    /// lifetime.
    pub fn totals(&self) -> (u64, u64) {
        let st = self.state.lock();
        (st.total_run, st.total_deferred)
    }

    /// Projected cost the batch adds per destination.
    fn projected_cost(&self, st: &AdmissionState, batch: &RequestBatch) -> HashMap<String, usize> {
        let mut added: HashMap<String, usize> = HashMap::new();
        for sr in &batch.supplier_requests {
            let multi = st
                .sources
                .get(&sr.supplier)
                .map(|s| s.multi_request)
                .unwrap_or(false);
            let cost = if multi {
                sr.bid_requests.len().max(1).min(self.max_per_destination)
            } else {
                1
            };
            *added.entry(sr.destination.clone()).or_insert(0) += cost;
        }
        added
    }

    fn fits(&self, st: &AdmissionState, batch: &RequestBatch) -> bool {
        self.projected_cost(st, batch).iter().all(|(dest, added)| {
            let current = st.outstanding.get(dest).copied().unwrap_or(0);
            current + added <= self.max_per_destination
        })
    }

    fn commit(&self, st: &mut AdmissionState, batch: &RequestBatch) {
        for (dest, added) in self.projected_cost(st, batch) {
            *st.outstanding.entry(dest).or_insert(0) += added;
        }
    }
}

/// Handle given to the dispatch layer so it can report outbound calls and
/// completions without holding the whole controller API.
#[derive(Clone)]
pub struct AdmissionHooks {
    controller: Arc<AdmissionController>,
    auction_id: AuctionId,
}

impl AdmissionHooks {
    pub fn new(controller: Arc<AdmissionController>, auction_id: AuctionId) -> Self {
        Self {
            controller,
            auction_id,
        }
    }

    pub fn note_destination_call(&self, source: &SupplierId, destination: &str) {
        self.controller
            .note_destination_call(self.auction_id, source, destination);
    }

    pub fn destination_completed(&self, destination: &str) {
        self.controller.on_destination_completed(destination);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SupplierRequest;
    use parking_lot::Mutex as PlMutex;
    use std::sync::Arc;
    use uuid::Uuid;

    fn batch_for(suppliers: &[(&str, &str, usize)]) -> RequestBatch {
        let mut batch = RequestBatch::new(Uuid::new_v4(), std::time::Duration::from_millis(500));
        for (supplier, dest, placements) in suppliers {
            let codes: Vec<String> = (0..*placements).map(|i| format!("slot-{}", i)).collect();
            batch
                .supplier_requests
                .push(SupplierRequest::for_placements(*supplier, *dest, &codes));
        }
        batch
    }

    fn run_log() -> (Arc<PlMutex<Vec<AuctionId>>>, impl Fn(AuctionId) -> RunFn) {
        let log = Arc::new(PlMutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |id: AuctionId| -> RunFn {
                let log = Arc::clone(&log);
                Box::new(move |_b| log.lock().push(id))
            }
        };
        (log, make)
    }

    #[test]
    fn batches_under_cap_run_immediately_in_order() {
        let ctl = AdmissionController::new(3);
        let (log, make) = run_log();

        for _ in 0..3 {
            let batch = batch_for(&[("sup", "https://d1", 1)]);
            let id = batch.auction_id;
            assert_eq!(ctl.try_submit(batch, make(id)), SubmitOutcome::Ran);
        }

        assert_eq!(log.lock().len(), 3);
        assert_eq!(ctl.outstanding("https://d1"), 3);
        assert_eq!(ctl.deferred_len(), 0);
    }

    #[test]
    fn over_cap_batch_is_deferred_whole() {
        let ctl = AdmissionController::new(1);
        let (log, make) = run_log();

        let first = batch_for(&[("a", "https://d1", 1)]);
        let id1 = first.auction_id;
        ctl.try_submit(first, make(id1));

        // Touches a free destination too, but d1 is full: the whole batch
        // waits.
        let second = batch_for(&[("b", "https://d1", 1), ("c", "https://d2", 1)]);
        let id2 = second.auction_id;
        assert_eq!(ctl.try_submit(second, make(id2)), SubmitOutcome::Queued);

        assert_eq!(*log.lock(), vec![id1]);
        assert_eq!(ctl.outstanding("https://d2"), 0);
        assert_eq!(ctl.deferred_len(), 1);
    }

    #[test]
    fn completion_runs_oldest_deferred_first() {
        let ctl = AdmissionController::new(1);
        let (log, make) = run_log();

        let ids: Vec<AuctionId> = (0..3)
            .map(|_| {
                let batch = batch_for(&[("sup", "https://d1", 1)]);
                let id = batch.auction_id;
                ctl.try_submit(batch, make(id));
                id
            })
            .collect();

        assert_eq!(*log.lock(), ids[..1].to_vec());

        ctl.on_destination_completed("https://d1");
        assert_eq!(*log.lock(), ids[..2].to_vec());

        ctl.on_destination_completed("https://d1");
        assert_eq!(*log.lock(), ids[..3].to_vec());
        assert_eq!(ctl.deferred_len(), 0);
    }

    #[test]
    fn completion_attempts_head_only_once() {
        let ctl = AdmissionController::new(2);
        let (log, make) = run_log();

        let first = batch_for(&[("a", "https://d1", 1), ("b", "https://d1", 1)]);
        let id1 = first.auction_id;
        ctl.try_submit(first, make(id1));

        // Needs two slots; a single completion leaves one in flight.
        let second = batch_for(&[("c", "https://d1", 1), ("d", "https://d1", 1)]);
        let id2 = second.auction_id;
        ctl.try_submit(second, make(id2));

        ctl.on_destination_completed("https://d1");
        assert_eq!(*log.lock(), vec![id1]);
        assert_eq!(ctl.deferred_len(), 1);

        ctl.on_destination_completed("https://d1");
        assert_eq!(*log.lock(), vec![id1, id2]);
    }

    #[test]
    fn outstanding_never_goes_negative() {
        let ctl = AdmissionController::new(2);
        ctl.on_destination_completed("https://never-seen");
        assert_eq!(ctl.outstanding("https://never-seen"), 0);
    }

    #[test]
    fn multi_request_source_charged_true_cost() {
        let ctl = AdmissionController::new(5);
        let (_log, make) = run_log();
        let auction = Uuid::new_v4();

        // Two calls in the same auction flip the flag.
        ctl.note_destination_call(auction, &"sra".to_string(), "https://d1");
        ctl.note_destination_call(auction, &"sra".to_string(), "https://d1");

        // Four bid requests now cost four slots, so a five-request batch
        // from another source no longer fits alongside it.
        let batch = batch_for(&[("sra", "https://d1", 4)]);
        let id = batch.auction_id;
        ctl.try_submit(batch, make(id));
        assert_eq!(ctl.outstanding("https://d1"), 4);

        let crowded = batch_for(&[("other", "https://d1", 1), ("more", "https://d1", 1)]);
        let id2 = crowded.auction_id;
        assert_eq!(ctl.try_submit(crowded, make(id2)), SubmitOutcome::Queued);
    }

    #[test]
    fn single_call_source_stays_cheap() {
        let ctl = AdmissionController::new(5);
        let (_log, make) = run_log();
        let auction = Uuid::new_v4();

        ctl.note_destination_call(auction, &"plain".to_string(), "https://d1");

        let batch = batch_for(&[("plain", "https://d1", 4)]);
        let id = batch.auction_id;
        ctl.try_submit(batch, make(id));
        assert_eq!(ctl.outstanding("https://d1"), 1);
    }

    #[test]
    fn multi_request_cost_capped_at_destination_max() {
        let ctl = AdmissionController::new(3);
        let (_log, make) = run_log();
        let auction = Uuid::new_v4();

        ctl.note_destination_call(auction, &"sra".to_string(), "https://d1");
        ctl.note_destination_call(auction, &"sra".to_string(), "https://d1");

        // Ten requests would project past the cap; charged cost is clamped
        // so the batch can still run on an idle destination.
        let batch = batch_for(&[("sra", "https://d1", 10)]);
        let id = batch.auction_id;
        assert_eq!(ctl.try_submit(batch, make(id)), SubmitOutcome::Ran);
        assert_eq!(ctl.outstanding("https://d1"), 3);
    }
}
