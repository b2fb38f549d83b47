//! Lifecycle notifications.
//!
//! Closed set of auction events published fire-and-forget over a broadcast
//! channel. Publishing never blocks and never fails the auction; events are
//! dropped when nobody listens.

use crate::models::{AuctionId, BidResponse, PlacementCode, RequestId, SupplierId};
use serde::Serialize;
use tokio::sync::broadcast;

/// Every notification the orchestrator emits, with typed payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuctionEvent {
    AuctionInit {
        auction_id: AuctionId,
        placement_codes: Vec<PlacementCode>,
        timeout_ms: u64,
    },
    AuctionEnd {
        auction_id: AuctionId,
        due_to_timeout: bool,
        bid_count: usize,
    },
    BidResponseRecorded {
        auction_id: AuctionId,
        placement_code: PlacementCode,
        bid: BidResponse,
    },
    BidTimeout {
        auction_id: AuctionId,
        suppliers: Vec<SupplierId>,
        placement_codes: Vec<PlacementCode>,
    },
    NoBid {
        auction_id: AuctionId,
        placement_code: PlacementCode,
        supplier: SupplierId,
        request_id: RequestId,
    },
    PlacementComplete {
        auction_id: AuctionId,
        placement_code: PlacementCode,
        bid_count: usize,
    },
    PlacementUpdated {
        auction_id: AuctionId,
        placement_code: PlacementCode,
        bid_count: usize,
    },
}

impl AuctionEvent {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuctionInit { .. } => "auction_init",
            Self::AuctionEnd { .. } => "auction_end",
            Self::BidResponseRecorded { .. } => "bid_response",
            Self::BidTimeout { .. } => "bid_timeout",
            Self::NoBid { .. } => "no_bid",
            Self::PlacementComplete { .. } => "placement_complete",
            Self::PlacementUpdated { .. } => "placement_updated",
        }
    }
}

/// Publish-only, no-acknowledgment event bus.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<AuctionEvent>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Fire-and-forget publish. A send error only means no subscribers.
    pub fn publish(&self, event: AuctionEvent) {
        tracing::trace!(event = event.name(), "publish");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.tx.subscribe()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(256)
    }
}
