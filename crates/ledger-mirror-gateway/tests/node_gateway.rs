//! NodeGateway against a scripted JSON-RPC node on a local socket.

use std::sync::Arc;
use std::time::Duration;

use ledger_mirror_core::{
    decode_hex, encode_hex, keccak256, Address, AuthoritativeValue, CallContext,
    LegacyTransaction, Signer,
};
use ledger_mirror_gateway::{ContractInterface, Gateway, GatewayConfig, GatewayError, NodeGateway};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const ABI: &str = r#"{"contractName":"SimpleStorage","abi":[
    {"type":"function","name":"get","inputs":[],"outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
    {"type":"function","name":"set","inputs":[{"name":"x","type":"uint256"}],"outputs":[],"stateMutability":"nonpayable"}
]}"#;

#[derive(Default)]
struct NodeState {
    call_result: String,
    failing_method: Option<String>,
    delay: Duration,
    methods: Vec<String>,
    raw_txs: Vec<String>,
}

#[derive(Default)]
struct FakeNode {
    state: Mutex<NodeState>,
}

impl FakeNode {
    fn holding(value: u64) -> Arc<Self> {
        let node = Self::default();
        node.state.lock().call_result = format!("0x{:064x}", value);
        Arc::new(node)
    }

    fn methods(&self) -> Vec<String> {
        self.state.lock().methods.clone()
    }

    fn respond(&self, request: &Value) -> Value {
        let id = request["id"].clone();
        let method = request["method"].as_str().unwrap_or_default().to_string();
        let params = &request["params"];

        let mut state = self.state.lock();
        state.methods.push(method.clone());

        if state.failing_method.as_deref() == Some(method.as_str()) {
            return json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {"code": -32000, "message": "injected failure"},
            });
        }

        let result = match method.as_str() {
            "eth_call" => json!(state.call_result),
            "eth_chainId" => json!("0x539"),
            "eth_getTransactionCount" => json!("0x5"),
            "eth_gasPrice" => json!("0x3b9aca00"),
            "eth_estimateGas" => json!("0xb411"),
            "eth_sendRawTransaction" => {
                let raw = params[0].as_str().unwrap_or_default().to_string();
                let hash = keccak256(&decode_hex(&raw).unwrap_or_default());
                state.raw_txs.push(raw);
                json!(encode_hex(&hash))
            }
            _ => {
                return json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32601, "message": "method not found"},
                })
            }
        };

        json!({"jsonrpc": "2.0", "id": id, "result": result})
    }
}

async fn serve(mut stream: TcpStream, node: Arc<FakeNode>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let body = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let start = end + 4;
        if buf.len() >= start + length {
            break buf[start..start + length].to_vec();
        }
    };

    let delay = node.state.lock().delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let payload = serde_json::to_vec(&node.respond(&request)).unwrap_or_default();
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    );
    let _ = stream.write_all(head.as_bytes()).await;
    let _ = stream.write_all(&payload).await;
    let _ = stream.shutdown().await;
}

async fn spawn_node(node: Arc<FakeNode>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, node.clone()));
        }
    });
    format!("http://{}", addr)
}

fn gateway(url: &str, gas_limit: Option<u64>) -> NodeGateway {
    let mut config = GatewayConfig::new(url, CONTRACT, KEY, ABI);
    config.gas_limit = gas_limit;
    NodeGateway::connect(config).unwrap()
}

fn ctx() -> CallContext {
    CallContext::with_timeout(Duration::from_secs(10))
}

#[tokio::test]
async fn test_read_decodes_getter_word() {
    let node = FakeNode::holding(42);
    let url = spawn_node(node.clone()).await;

    let value = gateway(&url, None).read_authoritative(&ctx()).await.unwrap();
    assert_eq!(value, AuthoritativeValue::from(42u64));
    assert_eq!(node.methods(), ["eth_call"]);
}

#[tokio::test]
async fn test_read_rejects_short_return() {
    let node = FakeNode::holding(0);
    node.state.lock().call_result = "0x".into();
    let url = spawn_node(node).await;

    let err = gateway(&url, None).read_authoritative(&ctx()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Malformed(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_read_node_error_is_unavailable() {
    let node = FakeNode::holding(0);
    node.state.lock().failing_method = Some("eth_call".into());
    let url = spawn_node(node).await;

    let err = gateway(&url, None).read_authoritative(&ctx()).await.unwrap_err();
    assert!(matches!(err, GatewayError::Unavailable(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_submit_broadcasts_expected_transaction() {
    let node = FakeNode::holding(0);
    let url = spawn_node(node.clone()).await;
    let value = AuthoritativeValue::from(42u64);

    let hash = gateway(&url, None).submit_change(&ctx(), &value).await.unwrap();

    let expected = LegacyTransaction {
        nonce: 5,
        gas_price: 1_000_000_000,
        gas_limit: 0xb411,
        to: Address::from_hex(CONTRACT).unwrap(),
        value: 0,
        data: ContractInterface::uint256_storage().encode_set(&value).unwrap(),
        chain_id: 1337,
    }
    .sign(&Signer::from_hex(KEY).unwrap())
    .unwrap();

    assert_eq!(hash, expected.hash);
    assert_eq!(node.state.lock().raw_txs, [encode_hex(&expected.raw)]);
    assert_eq!(
        node.methods(),
        [
            "eth_chainId",
            "eth_getTransactionCount",
            "eth_gasPrice",
            "eth_estimateGas",
            "eth_sendRawTransaction",
        ]
    );
}

#[tokio::test]
async fn test_fixed_gas_limit_skips_estimate() {
    let node = FakeNode::holding(0);
    let url = spawn_node(node.clone()).await;

    gateway(&url, Some(100_000))
        .submit_change(&ctx(), &AuthoritativeValue::from(1u64))
        .await
        .unwrap();
    assert!(!node.methods().iter().any(|m| m == "eth_estimateGas"));
}

#[tokio::test]
async fn test_rejected_broadcast_is_submission_error() {
    let node = FakeNode::holding(0);
    node.state.lock().failing_method = Some("eth_sendRawTransaction".into());
    let url = spawn_node(node).await;

    let err = gateway(&url, None)
        .submit_change(&ctx(), &AuthoritativeValue::from(1u64))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Submission(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_node() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let gw = gateway(&url, None);
    assert!(matches!(
        gw.read_authoritative(&ctx()).await,
        Err(GatewayError::Unavailable(_))
    ));
    assert!(matches!(
        gw.submit_change(&ctx(), &AuthoritativeValue::from(1u64)).await,
        Err(GatewayError::Submission(_))
    ));
}

#[tokio::test]
async fn test_slow_node_times_out() {
    let node = FakeNode::holding(7);
    node.state.lock().delay = Duration::from_secs(5);
    let url = spawn_node(node).await;

    let ctx = CallContext::with_timeout(Duration::from_millis(100));
    let err = gateway(&url, None).read_authoritative(&ctx).await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout));
}
