pub mod config;
pub mod context;
pub mod contract_view;
pub mod decrypt;
pub mod metrics;
pub mod rpc;
pub mod storage;
pub mod types;
pub mod utils;

pub use config::Config;
pub use context::{Context, ConnectionStatus, DecryptedContract, TradeLookup};
pub use metrics::Metrics;
pub use rpc::{ChainSource, RpcClient};
pub use types::{AccountId32, ChainStats, DiagnosticReport, Trade, TradeStatus};
