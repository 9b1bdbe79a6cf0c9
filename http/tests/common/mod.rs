#![allow(dead_code)]

use async_trait::async_trait;
use kod_core::decrypt::{Participant, Phrase, SealedContract, WrappedKey};
use kod_core::rpc::{self, ChainSource};
use kod_core::storage::Item;
use kod_core::Context;
use kod_core::types::{AccountId32, BlockNumber, Trade, TradeStatus};
use parity_scale_codec::Encode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::mpsc;

pub const BUYER_PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const OUTSIDER_PHRASE: &str = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong";

/// Lookup of another trade run from inside a storage read
struct Interleave {
    key: Vec<u8>,
    ctx: Weak<Context>,
    trade_id: u64,
}

#[derive(Default)]
pub struct MemoryChain {
    state: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    reads: Mutex<Vec<Vec<u8>>>,
    interleave: Mutex<Option<Interleave>>,
    stall: Mutex<Option<Duration>>,
}

impl MemoryChain {
    pub fn put<V: Encode>(&self, item: Item, value: &V) {
        self.state.lock().unwrap().insert(item.key(), value.encode());
    }

    /// Storage keys read so far, in order; clears the log
    pub fn take_reads(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.reads.lock().unwrap())
    }

    /// The first read of `item` runs `ctx.query_trade(trade_id)` before answering
    pub fn interleave_query(&self, item: Item, ctx: &Arc<Context>, trade_id: u64) {
        *self.interleave.lock().unwrap() =
            Some(Interleave { key: item.key(), ctx: Arc::downgrade(ctx), trade_id });
    }

    /// Every storage read waits `delay` before answering
    pub fn stall(&self, delay: Duration) {
        *self.stall.lock().unwrap() = Some(delay);
    }

    pub fn interleave_pending(&self) -> bool {
        self.interleave.lock().unwrap().is_some()
    }
}

#[async_trait]
impl ChainSource for MemoryChain {
    async fn chain_name(&self) -> Result<String, rpc::Error> {
        Ok("KOD Local".to_string())
    }

    async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, rpc::Error> {
        self.reads.lock().unwrap().push(key.to_vec());
        let stall = *self.stall.lock().unwrap();
        if let Some(delay) = stall {
            tokio::time::sleep(delay).await;
        }
        let hook = {
            let mut slot = self.interleave.lock().unwrap();
            match slot.as_ref() {
                Some(i) if i.key == key => slot.take(),
                _ => None,
            }
        };
        if let Some(Interleave { ctx, trade_id, .. }) = hook
            && let Some(ctx) = ctx.upgrade()
        {
            let _ = ctx.query_trade(trade_id).await;
        }
        Ok(self.state.lock().unwrap().get(key).cloned())
    }

    async fn subscribe_new_heads(&self) -> Result<mpsc::UnboundedReceiver<BlockNumber>, rpc::Error> {
        Err(rpc::Error::InvalidResponse("no subscriptions".into()))
    }
}

pub fn participant(phrase: &str) -> Participant {
    Participant::from_phrase(&Phrase::parse(phrase).unwrap()).unwrap()
}

pub fn trade(buyer: AccountId32, status: TradeStatus) -> Trade {
    Trade {
        listing_id: 4,
        buyer,
        seller: AccountId32([8; 32]),
        price: 1_250_000_000_000_000_000,
        buyer_bond: 0,
        seller_bond: 100_000_000_000_000_000,
        tl_price: 1_999_950,
        seller_iban_hash: None,
        buyer_iban_hash: None,
        contract_hash: [0xcd; 32],
        delivery_attestation_hash: None,
        final_hash: None,
        status,
        created_at: 77,
    }
}

/// Trade `id` with a contract sealed for the buyer phrase only
pub fn seed_encrypted_trade(chain: &MemoryChain, id: u64, contract: &serde_json::Value) {
    let buyer = participant(BUYER_PHRASE);
    chain.put(Item::Trades(id), &trade(*buyer.account(), TradeStatus::Escrow));
    let key = [7u8; 32];
    let sealed = SealedContract::seal(&key, [1u8; 24], contract.to_string().as_bytes()).unwrap();
    chain.put(Item::EncryptedContracts(id), &sealed.to_bytes());
    let wrapped = WrappedKey::wrap(&key, &buyer.encryption_public()).unwrap();
    chain.put(Item::ContractEncryptionKeys(id, *buyer.account()), &wrapped.to_bytes());
}
