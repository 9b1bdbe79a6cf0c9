//! Storage keys and typed reads for the trade pallet.
//!
//! Keys follow the FRAME layout:
//!   twox128(pallet) ++ twox128(item) ++ hasher(key1) ++ hasher(key2)
//! where every map in the trade pallet uses `Blake2_128Concat`.

use crate::rpc::{self, ChainSource};
use crate::types::{AccountId32, Balance, ChainStats, DiagnosticReport, Trade};
use blake2::Blake2b;
use blake2::digest::{Digest, consts::U16};
use parity_scale_codec::{Decode, Encode};
use std::hash::Hasher;
use twox_hash::XxHash64;

pub const PALLET: &str = "Trade";

#[derive(Debug, thiserror::Error, strum_macros::IntoStaticStr)]
pub enum Error {
    #[error(transparent)]
    Rpc(#[from] rpc::Error),
    #[error("failed to decode {item}: {source}")]
    Decode {
        item: &'static str,
        #[source]
        source: parity_scale_codec::Error,
    },
}

impl crate::utils::misc::Typename for Error {
    fn typename(&self) -> &'static str {
        self.into()
    }
}

pub fn twox_128(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (seed, chunk) in out.chunks_mut(8).enumerate() {
        let mut hasher = XxHash64::with_seed(seed as u64);
        hasher.write(data);
        chunk.copy_from_slice(&hasher.finish().to_le_bytes());
    }
    out
}

pub fn blake2_128(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Blake2b::<U16>::digest(data));
    out
}

pub fn blake2_128_concat(data: &[u8]) -> Vec<u8> {
    let mut out = blake2_128(data).to_vec();
    out.extend_from_slice(data);
    out
}

pub fn storage_value_key(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

pub fn storage_map_key<K: Encode>(pallet: &str, item: &str, k: &K) -> Vec<u8> {
    let mut key = storage_value_key(pallet, item);
    key.extend_from_slice(&blake2_128_concat(&k.encode()));
    key
}

pub fn storage_double_map_key<K1: Encode, K2: Encode>(pallet: &str, item: &str, k1: &K1, k2: &K2) -> Vec<u8> {
    let mut key = storage_map_key(pallet, item, k1);
    key.extend_from_slice(&blake2_128_concat(&k2.encode()));
    key
}

/// Storage items of the trade pallet that the explorer reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item {
    NextTradeId,
    TotalTradesCompleted,
    TotalVolume,
    NextListingId,
    Trades(u64),
    EncryptedContracts(u64),
    HasDiagnostics(u64),
    DiagnosticReports(u64),
    ContractEncryptionKeys(u64, AccountId32),
}

impl Item {
    pub fn name(&self) -> &'static str {
        match self {
            Item::NextTradeId => "NextTradeId",
            Item::TotalTradesCompleted => "TotalTradesCompleted",
            Item::TotalVolume => "TotalVolume",
            Item::NextListingId => "NextListingId",
            Item::Trades(_) => "Trades",
            Item::EncryptedContracts(_) => "EncryptedContracts",
            Item::HasDiagnostics(_) => "HasDiagnostics",
            Item::DiagnosticReports(_) => "DiagnosticReports",
            Item::ContractEncryptionKeys(..) => "ContractEncryptionKeys",
        }
    }

    pub fn key(&self) -> Vec<u8> {
        let name = self.name();
        match self {
            Item::NextTradeId | Item::TotalTradesCompleted | Item::TotalVolume | Item::NextListingId => {
                storage_value_key(PALLET, name)
            }
            Item::Trades(id) | Item::EncryptedContracts(id) | Item::HasDiagnostics(id) | Item::DiagnosticReports(id) => {
                storage_map_key(PALLET, name, id)
            }
            Item::ContractEncryptionKeys(id, account) => storage_double_map_key(PALLET, name, id, account),
        }
    }
}

/// Typed, read-only view of the trade pallet over any [`ChainSource`]
pub struct TradeStorage<'a> {
    source: &'a dyn ChainSource,
}

impl<'a> TradeStorage<'a> {
    pub fn new(source: &'a dyn ChainSource) -> Self {
        Self { source }
    }

    async fn fetch<T: Decode>(&self, item: Item) -> Result<Option<T>, Error> {
        match self.source.storage(&item.key()).await? {
            None => Ok(None),
            Some(raw) => T::decode(&mut raw.as_slice())
                .map(Some)
                .map_err(|source| Error::Decode { item: item.name(), source }),
        }
    }

    /// ValueQuery items read as their default when the key is absent
    async fn fetch_or_default<T: Decode + Default>(&self, item: Item) -> Result<T, Error> {
        Ok(self.fetch(item).await?.unwrap_or_default())
    }

    pub async fn next_trade_id(&self) -> Result<u64, Error> {
        self.fetch_or_default(Item::NextTradeId).await
    }

    pub async fn total_trades_completed(&self) -> Result<u64, Error> {
        self.fetch_or_default(Item::TotalTradesCompleted).await
    }

    pub async fn total_volume(&self) -> Result<Balance, Error> {
        self.fetch_or_default(Item::TotalVolume).await
    }

    pub async fn next_listing_id(&self) -> Result<u64, Error> {
        self.fetch_or_default(Item::NextListingId).await
    }

    /// The four dashboard counters, queried concurrently
    pub async fn stats(&self) -> Result<ChainStats, Error> {
        let (total_trades, trades_completed, total_volume, total_listings) = tokio::try_join!(
            self.next_trade_id(),
            self.total_trades_completed(),
            self.total_volume(),
            self.next_listing_id(),
        )?;
        Ok(ChainStats { total_trades, trades_completed, total_volume, total_listings })
    }

    pub async fn trade(&self, trade_id: u64) -> Result<Option<Trade>, Error> {
        self.fetch(Item::Trades(trade_id)).await
    }

    pub async fn encrypted_contract(&self, trade_id: u64) -> Result<Option<Vec<u8>>, Error> {
        self.fetch(Item::EncryptedContracts(trade_id)).await
    }

    pub async fn has_diagnostics(&self, trade_id: u64) -> Result<bool, Error> {
        self.fetch_or_default(Item::HasDiagnostics(trade_id)).await
    }

    pub async fn diagnostic_report(&self, trade_id: u64) -> Result<Option<DiagnosticReport>, Error> {
        self.fetch(Item::DiagnosticReports(trade_id)).await
    }

    pub async fn wrapped_key(&self, trade_id: u64, account: &AccountId32) -> Result<Option<Vec<u8>>, Error> {
        self.fetch(Item::ContractEncryptionKeys(trade_id, *account)).await
    }
}
