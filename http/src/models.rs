use kod_core::config::TOKEN_SYMBOL;
use kod_core::utils::format::{format_balance, hex0x};
use kod_core::{ChainStats, ConnectionStatus, DecryptedContract, DiagnosticReport, TradeLookup};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { error: "ok".to_string(), data: Some(data) }
    }

    pub fn error(msg: &str) -> Self {
        Self { error: msg.to_string(), data: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NodeStatus {
    pub connected: bool,
    pub endpoint: Option<String>,
    pub chain: Option<String>,
    pub best_block: Option<u64>,
}

/// Balances travel as decimal strings, u128 does not fit a JSON number
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(title = "ChainStats")]
pub struct Stats {
    pub total_trades: u64,
    pub trades_completed: u64,
    pub total_volume: String,
    pub total_volume_formatted: String,
    pub total_listings: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Diagnostics {
    pub score: u8,
    pub passed_count: u32,
    pub failed_count: u32,
    pub test_count: u32,
    pub submitter: String,
    pub submitted_at: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TradeInfo {
    pub trade_id: u64,
    pub listing_id: u64,
    pub buyer: String,
    pub seller: String,
    pub price: String,
    pub price_formatted: String,
    pub buyer_bond: String,
    pub seller_bond: String,
    /// Fiat price in kuruş, 0 for KOD-only trades
    pub tl_price: u64,
    pub status: String,
    pub status_label: String,
    pub created_at: u32,
    pub contract_hash: String,
    pub has_encrypted_contract: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecryptRequest {
    /// 12-word recovery phrase; used in-process, never forwarded to the node
    pub phrase: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContractRow {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContractSection {
    pub title: String,
    pub rows: Vec<ContractRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Contract {
    pub trade_id: u64,
    pub address: String,
    #[schema(value_type = Object)]
    pub contract: serde_json::Value,
    pub sections: Vec<ContractSection>,
}

impl From<ConnectionStatus> for NodeStatus {
    fn from(s: ConnectionStatus) -> Self {
        Self { connected: s.connected, endpoint: s.endpoint, chain: s.chain, best_block: s.best_block }
    }
}

impl From<&ChainStats> for Stats {
    fn from(s: &ChainStats) -> Self {
        Self {
            total_trades: s.total_trades,
            trades_completed: s.trades_completed,
            total_volume: s.total_volume.to_string(),
            total_volume_formatted: format!("{} {TOKEN_SYMBOL}", format_balance(s.total_volume)),
            total_listings: s.total_listings,
        }
    }
}

impl Diagnostics {
    fn new(d: &DiagnosticReport, ss58_prefix: u8) -> Self {
        Self {
            score: d.score,
            passed_count: d.passed_count,
            failed_count: d.failed_count,
            test_count: d.test_count,
            submitter: d.submitter.to_ss58(ss58_prefix),
            submitted_at: d.submitted_at,
        }
    }
}

impl TradeInfo {
    pub fn new(lookup: &TradeLookup, ss58_prefix: u8) -> Self {
        let t = &lookup.trade;
        Self {
            trade_id: lookup.trade_id,
            listing_id: t.listing_id,
            buyer: t.buyer.to_ss58(ss58_prefix),
            seller: t.seller.to_ss58(ss58_prefix),
            price: t.price.to_string(),
            price_formatted: format!("{} {TOKEN_SYMBOL}", format_balance(t.price)),
            buyer_bond: t.buyer_bond.to_string(),
            seller_bond: t.seller_bond.to_string(),
            tl_price: t.tl_price,
            status: t.status.name(),
            status_label: t.status.label(),
            created_at: t.created_at,
            contract_hash: hex0x(&t.contract_hash),
            has_encrypted_contract: lookup.has_encrypted,
            diagnostics: lookup.diagnostics.as_ref().map(|d| Diagnostics::new(d, ss58_prefix)),
        }
    }
}

impl From<DecryptedContract> for Contract {
    fn from(d: DecryptedContract) -> Self {
        let sections = d
            .sections
            .into_iter()
            .map(|s| ContractSection {
                title: s.title.to_string(),
                rows: s.rows.into_iter().map(|r| ContractRow { key: r.key, value: r.value }).collect(),
            })
            .collect();
        Self { trade_id: d.trade_id, address: d.address, contract: d.contract, sections }
    }
}

pub type StatusResponse = ApiResponse<NodeStatus>;
pub type ChainStatsResponse = ApiResponse<Stats>;
pub type TradeResponse = ApiResponse<TradeInfo>;
pub type ContractResponse = ApiResponse<Contract>;
pub type ErrorResponse = ApiResponse<()>;
