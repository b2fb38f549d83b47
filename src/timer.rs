//! Single-shot auction deadline.

use crate::auction::Auction;
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Armed once at dispatch start; forces completion if natural completion
/// has not happened first. Canceling after the deadline fired is a no-op,
/// as is firing after the auction completed naturally, since `finalize`
/// is idempotent.
#[derive(Debug)]
pub struct AuctionTimer {
    handle: JoinHandle<()>,
}

impl AuctionTimer {
    pub fn arm(deadline: Duration, auction: Weak<Auction>) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            if let Some(auction) = auction.upgrade() {
                debug!(auction_id = %auction.id(), "auction deadline fired");
                auction.finalize(true);
            }
        });
        Self { handle }
    }

    pub fn cancel(self) {
        self.handle.abort();
    }
}
