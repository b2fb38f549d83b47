//! Core auction data model.
//!
//! Canonical types shared by the orchestrator: placements, per-supplier
//! participation records, individual bid requests, and normalized bid
//! responses. Identity types follow the alias convention used across the
//! codebase (plain strings for codes, `Uuid` for auction identity).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// Supplier (bidder) code, e.g. "appnexus".
pub type SupplierId = String;

/// Placement (ad unit) code, e.g. "header-banner".
pub type PlacementCode = String;

/// Bid request id, unique within one auction.
pub type RequestId = String;

/// Auction identity, generated once at creation.
pub type AuctionId = Uuid;

/// Auction lifecycle status. Transitions are monotonic:
/// `Started -> InProgress -> Completed`, and `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Started,
    InProgress,
    Completed,
}

impl std::fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Media kind carried by a creative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Banner,
    Video,
    Native,
}

/// How a bid response came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidResponseKind {
    /// Genuine answer from a supplier.
    Normal,
    /// Supplier reported done without answering this request.
    NoBid,
    /// Request never resolved before the auction deadline.
    TimedOut,
}

/// A slot on the page that suppliers may bid on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdUnit {
    pub code: PlacementCode,
    /// Media kinds this placement accepts.
    pub media: Vec<MediaKind>,
}

impl AdUnit {
    pub fn banner(code: impl Into<PlacementCode>) -> Self {
        Self {
            code: code.into(),
            media: vec![MediaKind::Banner],
        }
    }

    pub fn new(code: impl Into<PlacementCode>, media: Vec<MediaKind>) -> Self {
        Self {
            code: code.into(),
            media,
        }
    }
}

/// One supplier-per-placement bid request. Immutable after creation.
#[derive(Debug, Clone)]
pub struct BidRequest {
    pub request_id: RequestId,
    pub placement_code: PlacementCode,
    pub supplier: SupplierId,
    pub start: Instant,
}

/// One supplier's participation record for an auction. Covers one bid
/// request per placement the supplier was asked to bid on. Mutated only by
/// the done-signal handler; never removed.
#[derive(Debug, Clone)]
pub struct SupplierRequest {
    pub supplier: SupplierId,
    /// Network endpoint this supplier's calls count against.
    pub destination: String,
    pub start: Instant,
    pub done_time: Option<Instant>,
    pub done: bool,
    /// Once the supplier reports done, its unanswered requests resolve as
    /// no-bids rather than staying pending.
    pub no_bid: bool,
    pub bid_requests: Vec<BidRequest>,
}

impl SupplierRequest {
    /// Build a participation record with one bid request per placement.
    /// Request ids are `<supplier>:<placement>`, unique within an auction
    /// as long as each supplier is dispatched once.
    pub fn for_placements(
        supplier: impl Into<SupplierId>,
        destination: impl Into<String>,
        placements: &[PlacementCode],
    ) -> Self {
        let supplier = supplier.into();
        let start = Instant::now();
        let bid_requests = placements
            .iter()
            .map(|code| BidRequest {
                request_id: format!("{}:{}", supplier, code),
                placement_code: code.clone(),
                supplier: supplier.clone(),
                start,
            })
            .collect();
        Self {
            supplier,
            destination: destination.into(),
            start,
            done_time: None,
            done: false,
            no_bid: false,
            bid_requests,
        }
    }
}

/// Raw answer from a supplier, before normalization.
#[derive(Debug, Clone)]
pub struct SupplierBid {
    pub request_id: RequestId,
    /// Missing value normalizes to 0.0.
    pub cpm: Option<f64>,
    pub media: MediaKind,
    pub creative_url: Option<String>,
    /// Explicit time-to-respond if the transport measured one.
    pub time_to_respond: Option<Duration>,
}

impl SupplierBid {
    pub fn new(request_id: impl Into<RequestId>, cpm: f64) -> Self {
        Self {
            request_id: request_id.into(),
            cpm: Some(cpm),
            media: MediaKind::Banner,
            creative_url: None,
            time_to_respond: None,
        }
    }

    /// Rich-media bids go through the external creative cache before they
    /// are recorded.
    pub fn requires_cache(&self) -> bool {
        matches!(self.media, MediaKind::Video)
    }
}

/// Normalized bid response, genuine or synthesized.
#[derive(Debug, Clone, Serialize)]
pub struct BidResponse {
    pub request_id: RequestId,
    pub placement_code: PlacementCode,
    pub supplier: SupplierId,
    pub auction_id: AuctionId,
    pub cpm: f64,
    pub kind: BidResponseKind,
    pub time_to_respond: Duration,
    pub cache_key: Option<String>,
    pub price_bucket: Option<String>,
    /// Targeting pairs attached when the bid wins (price bucket, native
    /// fields).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub targeting: Vec<(String, String)>,
    pub received_at: DateTime<Utc>,
}

impl BidResponse {
    /// Placeholder response for a request its supplier never answered.
    pub fn synthesized(
        kind: BidResponseKind,
        req: &BidRequest,
        auction_id: AuctionId,
        time_to_respond: Duration,
    ) -> Self {
        Self {
            request_id: req.request_id.clone(),
            placement_code: req.placement_code.clone(),
            supplier: req.supplier.clone(),
            auction_id,
            cpm: 0.0,
            kind,
            time_to_respond,
            cache_key: None,
            price_bucket: None,
            targeting: Vec::new(),
            received_at: Utc::now(),
        }
    }
}

/// Immutable description of one dispatch attempt: every supplier group the
/// auction will call, with the auction deadline. Data only.
#[derive(Debug, Clone)]
pub struct RequestBatch {
    pub auction_id: AuctionId,
    pub timeout: Duration,
    pub supplier_requests: Vec<SupplierRequest>,
}

impl RequestBatch {
    pub fn new(auction_id: AuctionId, timeout: Duration) -> Self {
        Self {
            auction_id,
            timeout,
            supplier_requests: Vec::new(),
        }
    }

    /// Collapse per-supplier batches into the single batch submitted to the
    /// admission controller.
    pub fn merge(auction_id: AuctionId, timeout: Duration, batches: Vec<RequestBatch>) -> Self {
        let supplier_requests = batches
            .into_iter()
            .flat_map(|b| b.supplier_requests)
            .collect();
        Self {
            auction_id,
            timeout,
            supplier_requests,
        }
    }
}

/// Derive a non-negative time-to-respond for a request. Prefers the span
/// from the bid request's own start to the supplier's done time; falls back
/// to the supplier-level span when the request has no start of its own, and
/// to `now` while the supplier is still outstanding.
pub fn derive_time_to_respond(
    supplier: &SupplierRequest,
    request: Option<&BidRequest>,
    now: Instant,
) -> Duration {
    let end = supplier.done_time.unwrap_or(now);
    let start = request.map(|r| r.start).unwrap_or(supplier.start);
    end.saturating_duration_since(start)
}
