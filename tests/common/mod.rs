//! Shared utilities for integration testing against a mock CometBFT node.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cosmrs::proto::cosmos::auth::v1beta1::{BaseAccount, QueryAccountResponse};
use cosmrs::proto::prost::Message as _;
use cosmrs::proto::Any;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const CHAIN_ID: &str = "Oraichain";

/// What the mock node answers for one JSON-RPC call
#[allow(dead_code)]
pub enum Reply {
    Result(Value),
    RpcError {
        code: i64,
        message: &'static str,
        data: String,
    },
    Http(u16),
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Read one HTTP request and return its JSON body
async fn read_request(socket: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = end + 4;
            while buf.len() < body_start + len {
                let n = socket.read(&mut chunk).await.ok()?;
                if n == 0 {
                    return None;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            return serde_json::from_slice(&buf[body_start..body_start + len]).ok();
        }
    }
}

/// Start a programmable JSON-RPC node on an ephemeral port; returns its URL.
pub async fn start_mock_node<F>(handler: F) -> String
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let method = request["method"].as_str().unwrap_or_default().to_string();
                        let id = request["id"].clone();

                        let (status, body) = match handler(&method, &request["params"]) {
                            Reply::Result(result) => (
                                "200 OK",
                                json!({"jsonrpc": "2.0", "id": id, "result": result}).to_string(),
                            ),
                            Reply::RpcError {
                                code,
                                message,
                                data,
                            } => (
                                "200 OK",
                                json!({
                                    "jsonrpc": "2.0",
                                    "id": id,
                                    "error": {"code": code, "message": message, "data": data}
                                })
                                .to_string(),
                            ),
                            Reply::Http(500) => ("500 Internal Server Error", String::new()),
                            Reply::Http(_) => ("502 Bad Gateway", String::new()),
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    format!("http://{}", addr)
}

/// URL of a port with nothing listening
#[allow(dead_code)]
pub async fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[allow(dead_code)]
pub fn status_result() -> Value {
    json!({
        "node_info": {"network": CHAIN_ID, "version": "0.38.12"},
        "sync_info": {"latest_block_height": "1000", "catching_up": false}
    })
}

/// `abci_query` result carrying an encoded protobuf response
#[allow(dead_code)]
pub fn abci_value(bytes: Vec<u8>) -> Value {
    json!({
        "response": {
            "code": 0,
            "log": "",
            "value": STANDARD.encode(bytes),
            "height": "1000"
        }
    })
}

#[allow(dead_code)]
pub fn abci_error(code: u32, log: &str) -> Value {
    json!({
        "response": {"code": code, "log": log, "value": null, "height": "1000"}
    })
}

#[allow(dead_code)]
pub fn account_response(account_number: u64, sequence: u64) -> Vec<u8> {
    let base = BaseAccount {
        address: "orai1f5nyvnx5ks738d5ys7pwa0evc42v6ff043h6d2".to_string(),
        pub_key: None,
        account_number,
        sequence,
    };
    QueryAccountResponse {
        account: Some(Any {
            type_url: "/cosmos.auth.v1beta1.BaseAccount".to_string(),
            value: base.encode_to_vec(),
        }),
    }
    .encode_to_vec()
}

/// Decode the base64 `tx` param of `broadcast_tx_sync`
#[allow(dead_code)]
pub fn broadcast_bytes(params: &Value) -> Vec<u8> {
    STANDARD
        .decode(params["tx"].as_str().unwrap_or_default())
        .unwrap()
}

#[allow(dead_code)]
pub fn public_key() -> String {
    let mut key = vec![0x02];
    key.extend_from_slice(&[0x5a; 32]);
    STANDARD.encode(key)
}
