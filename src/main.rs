use clap::Parser;
use log::info;

use block_watcher::config::{AppConfig, ConfigOverrides};
use block_watcher::error::WatcherError;
use block_watcher::logging::{init_logging, ErrorLogger, LogContext};
use block_watcher::{BlockWatcher, RpcClient};

#[derive(Parser)]
#[command(name = "block-watcher")]
#[command(about = "Prints the transactions of every new block reported by a JSON-RPC node")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to $CONFIG_FILE or ./config.toml)
    #[arg(long)]
    config: Option<String>,

    /// JSON-RPC endpoint, overrides the configuration
    #[arg(long)]
    rpc_url: Option<String>,

    /// Block height polling interval in milliseconds
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_config {
        println!("{}", AppConfig::generate_sample_config()?);
        return Ok(());
    }

    let overrides = ConfigOverrides {
        config_file: args.config,
        rpc_url: args.rpc_url,
        poll_interval_ms: args.poll_interval_ms,
    };
    let config = match AppConfig::load_with(&overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging)?;
    info!("Start listening...");

    if let Err(e) = watch(config).await {
        ErrorLogger::log_error(&e, Some(LogContext::new("block_watcher", "watch")));
        std::process::exit(1);
    }

    Ok(())
}

async fn watch(config: AppConfig) -> Result<(), WatcherError> {
    let node = RpcClient::new(config.rpc.endpoint, config.rpc.timeout_seconds)?;
    let watcher = BlockWatcher::new(node, config.watcher);

    let mut stdout = std::io::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let result = watcher.run(&mut stdout, shutdown).await;

    let node = watcher.into_node();
    info!("Closing connection to {}", node.endpoint());
    drop(node);

    result
}
