pub mod blockchain;
pub mod models;
pub mod error;
pub mod logging;
pub mod config;

pub use blockchain::{BlockNode, BlockSubscription, BlockWatcher, RpcClient};
pub use error::WatcherError;
pub use logging::{LogContext, PerformanceMonitor, ErrorLogger, MetricsLogger};
pub use config::{AppConfig, ConfigOverrides, RpcConfig, WatcherConfig, LoggingConfig};
