use std::future::Future;
use std::io::Write;
use std::time::{Duration, Instant};

use log::{info, warn};

use crate::blockchain::{BlockNode, BlockSubscription};
use crate::config::WatcherConfig;
use crate::error::WatcherError;
use crate::logging::{LogContext, MetricsLogger};

/// Prints the transactions of every new block the node reports.
///
/// The watcher owns its node handle for its whole lifetime; `into_node`
/// hands it back once watching is over.
pub struct BlockWatcher<N: BlockNode> {
    node: N,
    config: WatcherConfig,
}

impl<N: BlockNode> BlockWatcher<N> {
    pub fn new(node: N, config: WatcherConfig) -> Self {
        Self { node, config }
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn into_node(self) -> N {
        self.node
    }

    /// Handle one new-block notification: fetch the block and write one line
    /// per transaction, in block order. Returns the number of lines written.
    ///
    /// Nothing is written when the fetch fails.
    pub async fn on_block<W>(&self, block_number: u64, out: &mut W) -> Result<usize, WatcherError>
    where
        W: Write + ?Sized,
    {
        let started = Instant::now();
        info!("blockNumber {}", block_number);

        let block = self.node.block_with_transactions(block_number).await?;
        if block.number != block_number {
            warn!("Requested block {} but node returned block {}", block_number, block.number);
        }

        for transaction in &block.transactions {
            writeln!(
                out,
                "{}",
                transaction.display_line(self.config.display_decimals, &self.config.currency_symbol)
            )?;
        }
        out.flush()?;

        MetricsLogger::log_block_observed(
            block_number,
            block.transactions.len(),
            started.elapsed().as_millis() as u64,
        );

        Ok(block.transactions.len())
    }

    /// Watch for new blocks until `shutdown` resolves or the first error.
    pub async fn run<W, F>(&self, out: &mut W, shutdown: F) -> Result<(), WatcherError>
    where
        W: Write + ?Sized,
        F: Future<Output = ()>,
    {
        LogContext::new("block_watcher", "run")
            .with_metadata("poll_interval_ms", serde_json::json!(self.config.poll_interval_ms))
            .info("Listening for new blocks");

        tokio::select! {
            result = self.watch(out) => result,
            _ = shutdown => {
                info!("Shutdown requested, stopping block watcher");
                Ok(())
            }
        }
    }

    async fn watch<W>(&self, out: &mut W) -> Result<(), WatcherError>
    where
        W: Write + ?Sized,
    {
        let mut subscription = BlockSubscription::new(Duration::from_millis(self.config.poll_interval_ms));

        loop {
            let new_blocks = subscription.next_blocks(&self.node).await?;
            for block_number in new_blocks {
                self.on_block(block_number, out).await?;
            }
        }
    }
}
