use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use block_watcher::config::WatcherConfig;
use block_watcher::error::{RpcError, WatcherError};
use block_watcher::{BlockWatcher, RpcClient};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

fn block_json(number: u64, transactions: Value) -> Value {
    json!({
        "number": format!("0x{:x}", number),
        "hash": format!("0x{:064x}", number),
        "parentHash": format!("0x{:064x}", number - 1),
        "timestamp": "0x6553f100",
        "transactions": transactions,
    })
}

fn two_transfers() -> Value {
    json!([
        {
            "hash": "0xaa01",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "value": "0xde0b6b3a7640000",
            "nonce": "0x0",
            "blockNumber": "0x11"
        },
        {
            "hash": "0xaa02",
            "from": "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            "to": null,
            "value": "0x6f05b59d3b20000",
            "nonce": "0x1",
            "blockNumber": "0x11"
        }
    ])
}

async fn mount_block(server: &MockServer, number: u64, transactions: Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_getBlockByNumber",
            "params": [format!("0x{:x}", number), true],
        })))
        .respond_with(rpc_result(block_json(number, transactions)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_block_number_once(server: &MockServer, number: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_blockNumber" })))
        .respond_with(rpc_result(json!(format!("0x{:x}", number))))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_block_number(server: &MockServer, number: u64) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_blockNumber" })))
        .respond_with(rpc_result(json!(format!("0x{:x}", number))))
        .mount(server)
        .await;
}

fn fast_config() -> WatcherConfig {
    WatcherConfig {
        poll_interval_ms: 10,
        ..WatcherConfig::default()
    }
}

#[tokio::test]
async fn test_get_block_number() {
    let server = MockServer::start().await;
    mount_block_number(&server, 0x1b4).await;

    let client = RpcClient::new(server.uri(), 5).unwrap();
    assert_eq!(client.get_block_number().await.unwrap(), 436);
}

#[tokio::test]
async fn test_get_block_with_transactions() {
    let server = MockServer::start().await;
    mount_block(&server, 0x11, two_transfers()).await;

    let client = RpcClient::new(server.uri(), 5).unwrap();
    let block = client.get_block_with_transactions(0x11).await.unwrap();

    assert_eq!(block.number, 0x11);
    assert_eq!(block.transactions.len(), 2);
    assert_eq!(block.transactions[0].hash, "0xaa01");
    assert_eq!(block.transactions[0].value, 1_000_000_000_000_000_000);
    assert_eq!(block.transactions[1].to, None);
}

#[tokio::test]
async fn test_on_block_prints_each_transaction_once() {
    let server = MockServer::start().await;
    mount_block(&server, 0x11, two_transfers()).await;

    let watcher = BlockWatcher::new(RpcClient::new(server.uri(), 5).unwrap(), fast_config());
    let mut out = Vec::new();

    let written = watcher.on_block(0x11, &mut out).await.unwrap();

    assert_eq!(written, 2);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0xaa01 from=0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266 to=0x70997970c51812dc3a010c7d01b50e0d17dc79c8 value=1.0 ETH\n\
         0xaa02 from=0x70997970c51812dc3a010c7d01b50e0d17dc79c8 to=contract creation value=0.5 ETH\n"
    );
}

#[tokio::test]
async fn test_missing_block_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_getBlockByNumber" })))
        .respond_with(rpc_result(Value::Null))
        .mount(&server)
        .await;

    let watcher = BlockWatcher::new(RpcClient::new(server.uri(), 5).unwrap(), fast_config());
    let mut out = Vec::new();

    let result = watcher.on_block(42, &mut out).await;

    assert!(matches!(
        result,
        Err(WatcherError::Rpc(RpcError::BlockNotFound { block_number: 42 }))
    ));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_rpc_failure_modes() {
    let server = MockServer::start().await;
    let client = RpcClient::new(server.uri(), 5).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    let result = client.get_block_number().await;
    assert!(matches!(result, Err(WatcherError::Rpc(RpcError::Connection(_)))));

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("invalid json"))
        .mount(&server)
        .await;
    let result = client.get_block_number().await;
    assert!(matches!(result, Err(WatcherError::Rpc(RpcError::Json(_)))));

    server.reset().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "header not found" }
        })))
        .mount(&server)
        .await;
    let result = client.get_block_with_transactions(1).await;
    match result {
        Err(WatcherError::Rpc(RpcError::Method { code, message })) => {
            assert_eq!(code, -32000);
            assert_eq!(message, "header not found");
        }
        other => panic!("expected method error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = RpcClient::new(format!("http://127.0.0.1:{}", port), 5).unwrap();
    let result = client.get_block_number().await;

    assert!(matches!(result, Err(WatcherError::Rpc(RpcError::Connection(_)))));
}

#[tokio::test]
async fn test_run_prints_only_new_blocks() {
    let server = MockServer::start().await;
    // Baseline at 0x10, then the chain advances to 0x11 and stays there
    mount_block_number_once(&server, 0x10).await;
    mount_block_number(&server, 0x11).await;
    mount_block(&server, 0x11, two_transfers()).await;

    let watcher = BlockWatcher::new(RpcClient::new(server.uri(), 5).unwrap(), fast_config());
    let mut out = Vec::new();

    let result = watcher
        .run(&mut out, tokio::time::sleep(Duration::from_millis(300)))
        .await;

    assert!(result.is_ok());
    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("0xaa01 "));
    assert!(lines[1].starts_with("0xaa02 "));
}

#[tokio::test]
async fn test_run_terminates_on_fetch_failure() {
    let server = MockServer::start().await;
    mount_block_number_once(&server, 0x10).await;
    mount_block_number(&server, 0x12).await;
    mount_block(&server, 0x11, json!([])).await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_getBlockByNumber",
            "params": ["0x12", true],
        })))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let watcher = BlockWatcher::new(RpcClient::new(server.uri(), 5).unwrap(), fast_config());
    let mut out = Vec::new();

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        watcher.run(&mut out, std::future::pending()),
    )
    .await
    .expect("watcher should stop on its own");

    assert!(matches!(result, Err(WatcherError::Rpc(RpcError::Connection(_)))));
    assert!(out.is_empty());
}
