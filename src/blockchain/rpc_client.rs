use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ProcessingError, RpcError, WatcherError};
use crate::logging::{LogContext, MetricsLogger, PerformanceMonitor};
use crate::models::{parse_quantity, Block, Transaction};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'a str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    /// `null` is a valid result (e.g. unknown block), so it is kept as a value
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Block object as returned by `eth_getBlockByNumber` with full transactions
#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: Option<String>,
    hash: Option<String>,
    #[serde(default)]
    transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Deserialize)]
struct RpcTransaction {
    hash: String,
    from: String,
    to: Option<String>,
    value: String,
}

impl RpcBlock {
    fn into_block(self, requested: u64) -> Result<Block, ProcessingError> {
        let number = match self.number {
            Some(number) => parse_hex_to_u64(&number)?,
            None => requested,
        };

        let transactions = self
            .transactions
            .into_iter()
            .map(RpcTransaction::into_transaction)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Block {
            number,
            hash: self.hash,
            transactions,
        })
    }
}

impl RpcTransaction {
    fn into_transaction(self) -> Result<Transaction, ProcessingError> {
        let value = parse_quantity(&self.value).map_err(|e| {
            ProcessingError::TransactionParsing(format!("Transaction {}: {}", self.hash, e))
        })?;

        Ok(Transaction {
            hash: self.hash,
            from: self.from,
            to: self.to,
            value,
        })
    }
}

/// JSON-RPC 2.0 client for a single HTTP node endpoint.
///
/// This is the watcher's only connection handle; dropping it closes the
/// underlying connection pool.
pub struct RpcClient {
    client: Client,
    endpoint: String,
    timeout_seconds: u64,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(endpoint: String, timeout_seconds: u64) -> Result<Self, WatcherError> {
        let context = LogContext::new("rpc_client", "initialization")
            .with_endpoint(&endpoint)
            .with_metadata("timeout_seconds", json!(timeout_seconds));
        context.info("Initializing RPC client");

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .pool_max_idle_per_host(2)
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self {
            client,
            endpoint,
            timeout_seconds,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn make_request(&self, method: &str, params: Vec<Value>) -> Result<Value, WatcherError> {
        let context = LogContext::new("rpc_client", "make_request")
            .with_metadata("method", json!(method))
            .with_endpoint(&self.endpoint);

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        context.trace(&format!("Sending RPC request: {}", method));

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout { seconds: self.timeout_seconds }
                } else if e.is_connect() {
                    RpcError::Connection(e.to_string())
                } else {
                    RpcError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_msg = format!("HTTP error: {} {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown"));
            return Err(RpcError::Connection(error_msg).into());
        }

        let body = response.bytes().await.map_err(RpcError::Http)?;
        let rpc_response: JsonRpcResponse = serde_json::from_slice(&body).map_err(RpcError::Json)?;

        if let Some(error) = rpc_response.error {
            let rpc_error = match error.code {
                -32700 => RpcError::InvalidResponse("Parse error".to_string()),
                -32600 => RpcError::InvalidResponse("Invalid request".to_string()),
                -32602 => RpcError::InvalidResponse("Invalid params".to_string()),
                _ => RpcError::Method { code: error.code, message: error.message },
            };
            return Err(rpc_error.into());
        }

        Ok(rpc_response.result)
    }

    /// Current chain height (`eth_blockNumber`)
    pub async fn get_block_number(&self) -> Result<u64, WatcherError> {
        let monitor = PerformanceMonitor::new("rpc_get_block_number");

        let result = self.make_request("eth_blockNumber", vec![]).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call("eth_blockNumber", duration, result.is_ok());

        let value = result?;
        let hex_string = value
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("Block number is not a string".to_string()))?;

        Ok(parse_hex_to_u64(hex_string)?)
    }

    /// Block at `block_number` with full transaction objects (`eth_getBlockByNumber`)
    pub async fn get_block_with_transactions(&self, block_number: u64) -> Result<Block, WatcherError> {
        let monitor = PerformanceMonitor::new("rpc_get_block")
            .with_metadata("block_number", json!(block_number));

        let params = vec![
            Value::String(format!("0x{:x}", block_number)),
            Value::Bool(true),
        ];

        let result = self.make_request("eth_getBlockByNumber", params).await;
        let duration = monitor.finish_with_result(&result);
        MetricsLogger::log_rpc_call("eth_getBlockByNumber", duration, result.is_ok());

        let value = result?;
        if value.is_null() {
            return Err(RpcError::BlockNotFound { block_number }.into());
        }

        let rpc_block: RpcBlock = serde_json::from_value(value).map_err(|e| {
            ProcessingError::BlockParsing(format!("Failed to parse block {}: {}", block_number, e))
        })?;
        let block = rpc_block.into_block(block_number)?;

        LogContext::new("rpc_client", "get_block")
            .with_block_number(block_number)
            .with_transaction_count(block.transactions.len())
            .debug(&format!("Retrieved block {} with {} transactions", block_number, block.transactions.len()));

        Ok(block)
    }
}

fn parse_hex_to_u64(hex_str: &str) -> Result<u64, ProcessingError> {
    let hex_without_prefix = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    u64::from_str_radix(hex_without_prefix, 16)
        .map_err(|e| ProcessingError::BlockParsing(format!("Failed to parse block number '{}': {}", hex_str, e)))
}
