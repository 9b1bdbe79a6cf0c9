use crate::config::Config;
use crate::contract_view::{self, Section};
use crate::decrypt::{self, Participant, Phrase};
use crate::metrics::Metrics;
use crate::rpc::{self, ChainSource, RpcClient};
use crate::storage::{self, TradeStorage};
use crate::types::{ChainStats, DiagnosticReport, Trade};
use crate::utils::misc::Typename;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, thiserror::Error, strum_macros::IntoStaticStr)]
pub enum Error {
    #[error("not connected to a node")]
    NotConnected,
    #[error("Trade #{0} not found")]
    TradeNotFound(u64),
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error(transparent)]
    Storage(#[from] storage::Error),
    #[error(transparent)]
    Decrypt(#[from] decrypt::Error),
}

impl Typename for Error {
    fn typename(&self) -> &'static str {
        match self {
            Error::Rpc(e) => e.typename(),
            Error::Storage(e) => e.typename(),
            Error::Decrypt(e) => e.typename(),
            other => other.into(),
        }
    }
}

/// One live node connection; dropping it stops the head subscription
struct Connection {
    endpoint: String,
    chain: String,
    source: Arc<dyn ChainSource>,
    best_block: Arc<AtomicU64>,
    heads: Option<JoinHandle<()>>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Some(heads) = self.heads.take() {
            heads.abort();
        }
        self.source.close();
    }
}

/// The trade most recently looked up, target of the decrypt form
#[derive(Debug, Clone)]
struct QueryContext {
    trade_id: u64,
    trade: Trade,
    encrypted: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub endpoint: Option<String>,
    pub chain: Option<String>,
    pub best_block: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct TradeLookup {
    pub trade_id: u64,
    pub trade: Trade,
    pub has_encrypted: bool,
    /// Only fetched when the trade is flagged as having diagnostics
    pub diagnostics: Option<DiagnosticReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecryptedContract {
    pub trade_id: u64,
    /// SS58 address the phrase derives to
    pub address: String,
    pub contract: Value,
    pub sections: Vec<Section>,
}

/// Runtime container for config, metrics, the node connection and the
/// current query context.
pub struct Context {
    config: Config,
    metrics: Metrics,
    connection: RwLock<Option<Connection>>,
    current: RwLock<Option<QueryContext>>,
}

impl Context {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self { config, metrics: Metrics::new(), connection: RwLock::new(None), current: RwLock::new(None) })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn get_prometheus_metrics(&self) -> String {
        self.metrics.get_prometheus()
    }

    pub fn get_json_metrics(&self) -> Value {
        self.metrics.get_json()
    }

    /// Open a websocket to `endpoint`, replacing any previous connection
    #[instrument(skip(self))]
    pub async fn connect(&self, endpoint: &str) -> Result<String, Error> {
        let endpoint = endpoint.trim();
        let client = match RpcClient::connect(endpoint, self.config.rpc_timeout).await {
            Ok(client) => client,
            Err(e) => {
                self.metrics.add_error(&e);
                // a failed attempt still tears down the old connection
                self.connection.write().await.take();
                return Err(e.into());
            }
        };
        self.attach(endpoint, Arc::new(client)).await
    }

    /// Install an already connected source, used by `connect` and by tests
    pub async fn attach(&self, endpoint: &str, source: Arc<dyn ChainSource>) -> Result<String, Error> {
        let chain = source.chain_name().await.inspect_err(|e| self.metrics.add_error(e))?;

        let best_block = Arc::new(AtomicU64::new(0));
        let heads = match source.subscribe_new_heads().await {
            Ok(mut rx) => {
                let best_block = best_block.clone();
                Some(tokio::spawn(async move {
                    while let Some(number) = rx.recv().await {
                        best_block.store(u64::from(number), Ordering::Relaxed);
                    }
                    debug!("new heads stream ended");
                }))
            }
            Err(e) => {
                warn!("new heads subscription failed: {e}");
                self.metrics.add_error(&e);
                None
            }
        };

        let conn = Connection { endpoint: endpoint.to_string(), chain: chain.clone(), source, best_block, heads };
        let previous = self.connection.write().await.replace(conn);
        if previous.is_some() {
            debug!("replaced previous connection");
        }
        drop(previous);
        self.current.write().await.take();

        self.metrics.add_connect();
        info!("connected to {chain} at {endpoint}");
        Ok(chain)
    }

    pub async fn disconnect(&self) {
        self.connection.write().await.take();
        self.current.write().await.take();
    }

    pub async fn status(&self) -> ConnectionStatus {
        match self.connection.read().await.as_ref() {
            Some(conn) => {
                let best = conn.best_block.load(Ordering::Relaxed);
                ConnectionStatus {
                    connected: conn.source.is_connected(),
                    endpoint: Some(conn.endpoint.clone()),
                    chain: Some(conn.chain.clone()),
                    best_block: (best > 0).then_some(best),
                }
            }
            None => ConnectionStatus { connected: false, endpoint: None, chain: None, best_block: None },
        }
    }

    async fn source(&self) -> Result<Arc<dyn ChainSource>, Error> {
        match self.connection.read().await.as_ref() {
            Some(conn) if conn.source.is_connected() => Ok(conn.source.clone()),
            _ => Err(Error::NotConnected),
        }
    }

    fn track<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &result {
            self.metrics.add_error(e);
        }
        result
    }

    /// The four dashboard counters, fetched concurrently
    pub async fn load_stats(&self) -> Result<ChainStats, Error> {
        let result = async {
            let source = self.source().await?;
            Ok::<_, Error>(TradeStorage::new(source.as_ref()).stats().await?)
        }
        .await;
        self.metrics.add_stats_load();
        self.track(result)
    }

    async fn lookup(source: &dyn ChainSource, trade_id: u64) -> Result<(TradeLookup, Option<Vec<u8>>), Error> {
        let storage = TradeStorage::new(source);
        let trade = storage.trade(trade_id).await?.ok_or(Error::TradeNotFound(trade_id))?;

        let (encrypted, has_diagnostics) =
            tokio::try_join!(storage.encrypted_contract(trade_id), storage.has_diagnostics(trade_id))?;
        let diagnostics = match has_diagnostics {
            true => storage.diagnostic_report(trade_id).await?,
            false => None,
        };

        let lookup = TradeLookup { trade_id, trade, has_encrypted: encrypted.is_some(), diagnostics };
        Ok((lookup, encrypted))
    }

    /// Look up a trade and make it the target of `decrypt_current`.
    ///
    /// A miss clears the current query context so a stale encrypted blob
    /// can never be decrypted under a different trade id.
    #[instrument(skip(self))]
    pub async fn query_trade(&self, trade_id: u64) -> Result<TradeLookup, Error> {
        self.metrics.add_trade_query();
        let result = async { Self::lookup(self.source().await?.as_ref(), trade_id).await }.await;

        let mut current = self.current.write().await;
        match result {
            Ok((lookup, encrypted)) => {
                *current = Some(QueryContext { trade_id, trade: lookup.trade.clone(), encrypted });
                Ok(lookup)
            }
            Err(e) => {
                *current = None;
                drop(current);
                self.track(Err(e))
            }
        }
    }

    pub async fn current_trade_id(&self) -> Option<u64> {
        self.current.read().await.as_ref().map(|q| q.trade_id)
    }

    /// Decrypt the contract of the trade last returned by `query_trade`
    pub async fn decrypt_current(&self, phrase: &str) -> Result<DecryptedContract, Error> {
        let result = async {
            let phrase = Phrase::parse(phrase)?;
            let query = self.current.read().await.clone();
            let Some(QueryContext { trade_id, trade, encrypted: Some(encrypted) }) = query else {
                return Err(decrypt::Error::NoEncryptedContract.into());
            };
            let participant = Participant::from_phrase(&phrase)?;
            if !trade.is_party(participant.account()) {
                return Err(decrypt::Error::NotAParty.into());
            }
            self.run_decrypt(trade_id, &encrypted, &participant).await
        }
        .await;
        self.metrics.add_decrypt(result.is_ok());
        self.track(result)
    }

    /// Look up `trade_id` and decrypt it without touching the current query context.
    ///
    /// The phrase is checked before the node is asked for anything, and an
    /// account that is neither buyer nor seller is turned away without
    /// fetching a wrapped key.
    pub async fn decrypt_trade(&self, trade_id: u64, phrase: &str) -> Result<DecryptedContract, Error> {
        let result = async {
            let phrase = Phrase::parse(phrase)?;
            let source = self.source().await?;
            let storage = TradeStorage::new(source.as_ref());
            let trade = storage.trade(trade_id).await?.ok_or(Error::TradeNotFound(trade_id))?;
            let encrypted = storage.encrypted_contract(trade_id).await?.ok_or(decrypt::Error::NoEncryptedContract)?;

            let participant = Participant::from_phrase(&phrase)?;
            if !trade.is_party(participant.account()) {
                return Err(decrypt::Error::NotAParty.into());
            }
            self.run_decrypt(trade_id, &encrypted, &participant).await
        }
        .await;
        self.metrics.add_decrypt(result.is_ok());
        self.track(result)
    }

    async fn run_decrypt(
        &self,
        trade_id: u64,
        encrypted: &[u8],
        participant: &Participant,
    ) -> Result<DecryptedContract, Error> {
        let address = participant.address(self.config.ss58_prefix);
        debug!(trade_id, %address, "decrypting contract");

        let source = self.source().await?;
        let wrapped = TradeStorage::new(source.as_ref())
            .wrapped_key(trade_id, participant.account())
            .await?
            .ok_or(decrypt::Error::NotAParty)?;

        let contract = decrypt::open_contract(participant, &wrapped, encrypted)?;
        let sections = contract_view::sections(&contract);
        info!(trade_id, "contract decrypted");
        Ok(DecryptedContract { trade_id, address, contract, sections })
    }
}
