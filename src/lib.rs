//! bidhub: in-process auction orchestrator.
//!
//! Dispatches bid requests to asynchronous suppliers under per-destination
//! concurrency caps, reconciles answers that arrive in any order into
//! per-placement completion decisions, synthesizes no-bid/timeout outcomes
//! for suppliers that never answer, and invokes a terminal callback exactly
//! once per auction.

pub mod admission;
pub mod aggregator;
pub mod auction;
pub mod config;
pub mod dispatch;
pub mod models;
pub mod notify;
pub mod stats;
pub mod timer;

pub use admission::{AdmissionController, AdmissionHooks};
pub use auction::{Auction, AuctionCallback, AuctionDeps, AuctionSignals};
pub use config::{OrchestratorConfig, PriceGranularity};
pub use models::{
    AdUnit, AuctionId, AuctionStatus, BidRequest, BidResponse, BidResponseKind, MediaKind,
    PlacementCode, RequestBatch, SupplierBid, SupplierId, SupplierRequest,
};
pub use notify::{AuctionEvent, NotificationBus};
