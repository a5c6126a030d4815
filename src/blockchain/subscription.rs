use std::ops::RangeInclusive;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::{interval, Interval, MissedTickBehavior};

use crate::blockchain::BlockNode;
use crate::error::WatcherError;

/// New-block notification feed over a plain HTTP endpoint.
///
/// The node's height is polled on a fixed interval. The first reading is
/// only a baseline; afterwards every height above the last reading is
/// delivered once, in ascending order.
pub struct BlockSubscription {
    interval: Interval,
    last_seen: Option<u64>,
}

impl BlockSubscription {
    /// Must be called from within a tokio runtime.
    pub fn new(poll_interval: Duration) -> Self {
        let mut interval = interval(poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Self {
            interval,
            last_seen: None,
        }
    }

    pub fn last_seen(&self) -> Option<u64> {
        self.last_seen
    }

    /// Record a height reported by the node and return the heights that are new.
    pub fn observe(&mut self, height: u64) -> RangeInclusive<u64> {
        let new_heights = match self.last_seen {
            None => {
                debug!("Subscribed at block {}", height);
                RangeInclusive::new(1, 0)
            }
            Some(last) if height > last => (last + 1)..=height,
            Some(last) => {
                if height < last {
                    warn!("Node reported block {} below previously seen block {}", height, last);
                }
                RangeInclusive::new(1, 0)
            }
        };

        self.last_seen = Some(height);
        new_heights
    }

    /// Wait until the node reports at least one new block.
    pub async fn next_blocks<N>(&mut self, node: &N) -> Result<RangeInclusive<u64>, WatcherError>
    where
        N: BlockNode + ?Sized,
    {
        loop {
            self.interval.tick().await;

            let height = node.block_number().await?;
            let new_heights = self.observe(height);
            if !new_heights.is_empty() {
                return Ok(new_heights);
            }
        }
    }
}
