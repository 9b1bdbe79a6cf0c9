//! Websocket JSON-RPC connection to a node.
//!
//! One reader task owns the incoming half of the socket and routes every
//! frame either to the oneshot of the request that carries the same id, or
//! to the channel of the subscription named in a notification. One writer
//! task drains an unbounded queue into the outgoing half.

use crate::types::BlockNumber;
use crate::utils::misc::{Typename, decode_hex};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error, strum_macros::IntoStaticStr)]
pub enum Error {
    #[error("websocket error: {0}")]
    Ws(#[from] Box<tokio_tungstenite::tungstenite::Error>),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("request {0} timed out")]
    Timeout(String),
    #[error("not connected to node")]
    Disconnected,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Typename for Error {
    fn typename(&self) -> &'static str {
        self.into()
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::Ws(Box::new(e))
    }
}

/// Read access to chain state, the seam between explorer logic and transport
#[async_trait::async_trait]
pub trait ChainSource: Send + Sync {
    async fn chain_name(&self) -> Result<String, Error>;

    /// Raw SCALE bytes stored under `key`, `None` when the key is absent
    async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error>;

    /// Stream of best block numbers, one per imported head
    async fn subscribe_new_heads(&self) -> Result<mpsc::UnboundedReceiver<BlockNumber>, Error>;

    fn is_connected(&self) -> bool {
        true
    }

    /// Release the transport, called when the explorer drops this source
    fn close(&self) {}
}

enum Pending {
    Call(oneshot::Sender<Result<Value, Error>>),
    Subscribe(oneshot::Sender<Result<Value, Error>>, mpsc::UnboundedSender<Value>),
}

struct Shared {
    pending: scc::HashMap<u64, Pending>,
    subscriptions: scc::HashMap<String, mpsc::UnboundedSender<Value>>,
    connected: AtomicBool,
}

impl Shared {
    fn new() -> Self {
        Self { pending: scc::HashMap::new(), subscriptions: scc::HashMap::new(), connected: AtomicBool::new(true) }
    }

    /// Route one decoded frame to its waiting request or subscription
    fn dispatch(&self, msg: Value) {
        if let Some(id) = msg.get("id").and_then(Value::as_u64) {
            let Some((_, pending)) = self.pending.remove(&id) else {
                debug!("response for unknown request id {id}");
                return;
            };
            let result = match msg.get("error") {
                Some(err) => Err(Error::Rpc {
                    code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
                    message: err.get("message").and_then(Value::as_str).unwrap_or_default().to_string(),
                }),
                None => Ok(msg.get("result").cloned().unwrap_or(Value::Null)),
            };
            match pending {
                Pending::Call(tx) => {
                    let _ = tx.send(result);
                }
                Pending::Subscribe(tx, sink) => {
                    // registered before the caller wakes up, so no notification is lost
                    if let Ok(sub_id) = &result
                        && let Some(key) = subscription_key(sub_id)
                    {
                        let _ = self.subscriptions.insert(key, sink);
                    }
                    let _ = tx.send(result);
                }
            }
        } else if let Some(params) = msg.get("params") {
            let Some(key) = params.get("subscription").and_then(subscription_key) else {
                debug!("notification without subscription id");
                return;
            };
            let result = params.get("result").cloned().unwrap_or(Value::Null);
            let delivered = self.subscriptions.read(&key, |_, sink| sink.send(result).is_ok());
            if delivered == Some(false) {
                self.subscriptions.remove(&key);
            }
        }
    }

    /// Fail every in-flight request and end every subscription stream
    fn close(&self) {
        self.connected.store(false, Ordering::Release);
        self.pending.retain(|_, _| false);
        self.subscriptions.retain(|_, _| false);
    }
}

fn subscription_key(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse the `number` field of a header notification ("0x1a2b")
pub fn parse_block_number(header: &Value) -> Option<BlockNumber> {
    let number = header.get("number")?.as_str()?;
    BlockNumber::from_str_radix(number.strip_prefix("0x").unwrap_or(number), 16).ok()
}

pub struct RpcClient {
    timeout: Duration,
    next_id: AtomicU64,
    outgoing: mpsc::UnboundedSender<Message>,
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl RpcClient {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, Error> {
        let (ws, _) = tokio::time::timeout(timeout, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| Error::Timeout("connect".into()))??;
        info!("connected to {url}");

        let (mut sink, mut stream) = ws.split();
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel::<Message>();
        let shared = Arc::new(Shared::new());

        let writer = tokio::spawn(async move {
            while let Some(msg) = outgoing_rx.recv().await {
                if let Err(e) = sink.send(msg).await {
                    warn!("websocket write failed: {e}");
                    break;
                }
            }
        });

        let reader = tokio::spawn({
            let shared = shared.clone();
            let url = url.to_string();
            async move {
                while let Some(frame) = stream.next().await {
                    match frame {
                        Ok(Message::Text(text)) => match serde_json::from_str::<Value>(&text) {
                            Ok(msg) => shared.dispatch(msg),
                            Err(e) => warn!("malformed rpc frame: {e}"),
                        },
                        Ok(Message::Close(_)) => break,
                        Ok(_) => {}
                        Err(e) => {
                            warn!("websocket read failed: {e}");
                            break;
                        }
                    }
                }
                info!("disconnected from {url}");
                shared.close();
            }
        });

        Ok(Self {
            timeout,
            next_id: AtomicU64::new(1),
            outgoing,
            shared,
            tasks: vec![reader, writer],
        })
    }

    fn send(&self, id: u64, method: &str, params: Value, pending: Pending) -> Result<(), Error> {
        if !self.shared.connected.load(Ordering::Acquire) {
            return Err(Error::Disconnected);
        }
        let _ = self.shared.pending.insert(id, pending);
        let frame = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        if self.outgoing.send(Message::Text(frame.to_string())).is_err() {
            self.shared.pending.remove(&id);
            return Err(Error::Disconnected);
        }
        Ok(())
    }

    async fn wait(&self, id: u64, method: &str, rx: oneshot::Receiver<Result<Value, Error>>) -> Result<Value, Error> {
        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            // sender dropped by Shared::close
            Ok(Err(_)) => Err(Error::Disconnected),
            Err(_) => {
                self.shared.pending.remove(&id);
                Err(Error::Timeout(method.to_string()))
            }
        }
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.send(id, method, params, Pending::Call(tx))?;
        self.wait(id, method, rx).await
    }

    /// Start a subscription, returning its id and the notification stream
    pub async fn subscribe(&self, method: &str, params: Value) -> Result<(String, mpsc::UnboundedReceiver<Value>), Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let (sink, notifications) = mpsc::unbounded_channel();
        self.send(id, method, params, Pending::Subscribe(tx, sink))?;
        let sub_id = self.wait(id, method, rx).await?;
        let sub_id = subscription_key(&sub_id).ok_or_else(|| Error::InvalidResponse(format!("subscription id {sub_id}")))?;
        Ok((sub_id, notifications))
    }

    pub async fn system_chain(&self) -> Result<String, Error> {
        match self.request("system_chain", json!([])).await? {
            Value::String(name) => Ok(name),
            other => Err(Error::InvalidResponse(format!("system_chain returned {other}"))),
        }
    }

    pub async fn get_storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        let key = format!("0x{}", hex::encode(key));
        match self.request("state_getStorage", json!([key])).await? {
            Value::Null => Ok(None),
            Value::String(data) => {
                decode_hex(&data).map(Some).map_err(|e| Error::InvalidResponse(format!("storage hex: {e}")))
            }
            other => Err(Error::InvalidResponse(format!("state_getStorage returned {other}"))),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    pub fn disconnect(&self) {
        let _ = self.outgoing.send(Message::Close(None));
        self.shared.close();
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[async_trait::async_trait]
impl ChainSource for RpcClient {
    async fn chain_name(&self) -> Result<String, Error> {
        self.system_chain().await
    }

    async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, Error> {
        self.get_storage(key).await
    }

    async fn subscribe_new_heads(&self) -> Result<mpsc::UnboundedReceiver<BlockNumber>, Error> {
        let (sub_id, mut headers) = self.subscribe("chain_subscribeNewHeads", json!([])).await?;
        debug!("new heads subscription {sub_id}");
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(header) = headers.recv().await {
                match parse_block_number(&header) {
                    Some(number) => {
                        if tx.send(number).is_err() {
                            break;
                        }
                    }
                    None => warn!("header without block number: {header}"),
                }
            }
        });
        Ok(rx)
    }

    fn is_connected(&self) -> bool {
        RpcClient::is_connected(self)
    }

    fn close(&self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_block_number() {
        assert_eq!(parse_block_number(&json!({ "number": "0x1a" })), Some(26));
        assert_eq!(parse_block_number(&json!({ "number": "ff" })), Some(255));
        assert_eq!(parse_block_number(&json!({ "parentHash": "0x00" })), None);
    }

    #[tokio::test]
    async fn test_dispatch_routes_response_and_error() {
        let shared = Shared::new();
        let (tx_ok, rx_ok) = oneshot::channel();
        let (tx_err, rx_err) = oneshot::channel();
        let _ = shared.pending.insert(1, Pending::Call(tx_ok));
        let _ = shared.pending.insert(2, Pending::Call(tx_err));

        shared.dispatch(json!({ "jsonrpc": "2.0", "id": 1, "result": "KOD Chain" }));
        shared.dispatch(json!({ "jsonrpc": "2.0", "id": 2, "error": { "code": -32601, "message": "Method not found" } }));

        assert_eq!(rx_ok.await.unwrap().unwrap(), json!("KOD Chain"));
        match rx_err.await.unwrap() {
            Err(Error::Rpc { code, message }) => {
                assert_eq!(code, -32601);
                assert_eq!(message, "Method not found");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(shared.pending.len(), 0);
    }

    #[tokio::test]
    async fn test_dispatch_registers_subscription_before_notifications() {
        let shared = Shared::new();
        let (tx, rx) = oneshot::channel();
        let (sink, mut notifications) = mpsc::unbounded_channel();
        let _ = shared.pending.insert(7, Pending::Subscribe(tx, sink));

        shared.dispatch(json!({ "jsonrpc": "2.0", "id": 7, "result": "sub-1" }));
        shared.dispatch(json!({
            "jsonrpc": "2.0",
            "method": "chain_newHead",
            "params": { "subscription": "sub-1", "result": { "number": "0x10" } }
        }));

        assert_eq!(rx.await.unwrap().unwrap(), json!("sub-1"));
        assert_eq!(notifications.recv().await.unwrap(), json!({ "number": "0x10" }));
    }

    #[tokio::test]
    async fn test_close_fails_pending_requests() {
        let shared = Shared::new();
        let (tx, rx) = oneshot::channel::<Result<Value, Error>>();
        let _ = shared.pending.insert(1, Pending::Call(tx));
        shared.close();
        assert!(rx.await.is_err());
        assert!(!shared.connected.load(Ordering::Acquire));
    }

    /// Minimal node: answers system_chain, state_getStorage and one head subscription
    async fn spawn_fake_node() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let req: Value = serde_json::from_str(&text).unwrap();
                let id = req["id"].clone();
                match req["method"].as_str().unwrap() {
                    "system_chain" => {
                        let reply = json!({ "jsonrpc": "2.0", "id": id, "result": "KOD Local" });
                        ws.send(Message::Text(reply.to_string())).await.unwrap();
                    }
                    "state_getStorage" => {
                        let reply = json!({ "jsonrpc": "2.0", "id": id, "result": "0x2a00000000000000" });
                        ws.send(Message::Text(reply.to_string())).await.unwrap();
                    }
                    "chain_subscribeNewHeads" => {
                        let reply = json!({ "jsonrpc": "2.0", "id": id, "result": "heads" });
                        ws.send(Message::Text(reply.to_string())).await.unwrap();
                        let note = json!({
                            "jsonrpc": "2.0",
                            "method": "chain_newHead",
                            "params": { "subscription": "heads", "result": { "number": "0x64" } }
                        });
                        ws.send(Message::Text(note.to_string())).await.unwrap();
                    }
                    "close" => {
                        ws.close(None).await.unwrap();
                        break;
                    }
                    _ => {
                        let reply = json!({ "jsonrpc": "2.0", "id": id, "error": { "code": -32601, "message": "nope" } });
                        ws.send(Message::Text(reply.to_string())).await.unwrap();
                    }
                }
            }
        });
        format!("ws://{addr}")
    }

    #[tokio::test]
    async fn test_client_against_fake_node() {
        let url = spawn_fake_node().await;
        let client = RpcClient::connect(&url, Duration::from_secs(5)).await.unwrap();

        assert_eq!(client.chain_name().await.unwrap(), "KOD Local");
        assert_eq!(client.storage(&[1, 2, 3]).await.unwrap(), Some(42u64.to_le_bytes().to_vec()));

        let mut heads = client.subscribe_new_heads().await.unwrap();
        assert_eq!(heads.recv().await, Some(100));

        assert!(matches!(client.request("bogus", json!([])).await, Err(Error::Rpc { code: -32601, .. })));

        // node hangs up; the pending request resolves as disconnected
        let result = client.request("close", json!([])).await;
        assert!(matches!(result, Err(Error::Disconnected)));
        assert!(!client.is_connected());
        assert!(matches!(client.system_chain().await, Err(Error::Disconnected)));
    }

    #[tokio::test]
    async fn test_close_fails_later_requests() {
        let url = spawn_fake_node().await;
        let client = RpcClient::connect(&url, Duration::from_secs(5)).await.unwrap();
        assert!(client.is_connected());

        ChainSource::close(&client);
        assert!(!client.is_connected());
        assert!(matches!(client.storage(&[1]).await, Err(Error::Disconnected)));
    }
}
