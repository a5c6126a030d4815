pub mod rpc_client;
pub mod node;
pub mod subscription;
pub mod block_watcher;

pub use rpc_client::RpcClient;
pub use node::BlockNode;
pub use subscription::BlockSubscription;
pub use block_watcher::BlockWatcher;
