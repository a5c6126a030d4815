//! The read-only view of a node that the watcher depends on.

use async_trait::async_trait;

use crate::blockchain::RpcClient;
use crate::error::WatcherError;
use crate::models::Block;

/// Queries the watcher issues against a node.
///
/// [`RpcClient`] is the production implementation; tests substitute
/// in-memory nodes.
#[async_trait]
pub trait BlockNode: Send + Sync {
    /// Latest block height known to the node
    async fn block_number(&self) -> Result<u64, WatcherError>;

    /// Block at `block_number` with its full transaction list
    async fn block_with_transactions(&self, block_number: u64) -> Result<Block, WatcherError>;
}

#[async_trait]
impl BlockNode for RpcClient {
    async fn block_number(&self) -> Result<u64, WatcherError> {
        self.get_block_number().await
    }

    async fn block_with_transactions(&self, block_number: u64) -> Result<Block, WatcherError> {
        self.get_block_with_transactions(block_number).await
    }
}
