#![allow(dead_code)]

use async_trait::async_trait;
use kod_core::decrypt::{Participant, Phrase, SealedContract, WrappedKey};
use kod_core::rpc::{self, ChainSource};
use kod_core::storage::Item;
use kod_core::types::{AccountId32, BlockNumber, Trade, TradeStatus};
use parity_scale_codec::Encode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

pub const ALICE_PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
pub const BOB_PHRASE: &str = "legal winner thank year wave sausage worth useful legal winner thank yellow";
pub const EVE_PHRASE: &str = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong";

/// In-memory chain state keyed by raw storage key
pub struct MemoryChain {
    name: String,
    state: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
    heads: Mutex<Option<mpsc::UnboundedSender<BlockNumber>>>,
    connected: AtomicBool,
}

impl MemoryChain {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: Mutex::new(HashMap::new()),
            heads: Mutex::new(None),
            connected: AtomicBool::new(true),
        }
    }

    pub fn put<V: Encode>(&self, item: Item, value: &V) {
        self.state.lock().unwrap().insert(item.key(), value.encode());
    }

    pub fn remove(&self, item: Item) {
        self.state.lock().unwrap().remove(&item.key());
    }

    pub fn push_head(&self, number: BlockNumber) {
        if let Some(tx) = self.heads.lock().unwrap().as_ref() {
            let _ = tx.send(number);
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    pub fn is_open(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChainSource for MemoryChain {
    async fn chain_name(&self) -> Result<String, rpc::Error> {
        Ok(self.name.clone())
    }

    async fn storage(&self, key: &[u8]) -> Result<Option<Vec<u8>>, rpc::Error> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(rpc::Error::Disconnected);
        }
        Ok(self.state.lock().unwrap().get(key).cloned())
    }

    async fn subscribe_new_heads(&self) -> Result<mpsc::UnboundedReceiver<BlockNumber>, rpc::Error> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.heads.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn close(&self) {
        self.set_connected(false);
    }
}

pub fn participant(phrase: &str) -> Participant {
    Participant::from_phrase(&Phrase::parse(phrase).unwrap()).unwrap()
}

pub fn trade(buyer: AccountId32, seller: AccountId32, status: TradeStatus) -> Trade {
    Trade {
        listing_id: 11,
        buyer,
        seller,
        price: 250 * 10u128.pow(18),
        buyer_bond: 25 * 10u128.pow(18),
        seller_bond: 25 * 10u128.pow(18),
        tl_price: 0,
        seller_iban_hash: None,
        buyer_iban_hash: None,
        contract_hash: [0xab; 32],
        delivery_attestation_hash: None,
        final_hash: None,
        status,
        created_at: 120,
    }
}

/// Store a trade whose contract is sealed for both buyer and seller
pub fn seed_encrypted_trade(chain: &MemoryChain, trade_id: u64, contract: &serde_json::Value) -> (Participant, Participant) {
    let buyer = participant(ALICE_PHRASE);
    let seller = participant(BOB_PHRASE);
    chain.put(Item::Trades(trade_id), &trade(*buyer.account(), *seller.account(), TradeStatus::Escrow));

    let key = [0x5au8; 32];
    let sealed = SealedContract::seal(&key, [3u8; 24], contract.to_string().as_bytes()).unwrap();
    chain.put(Item::EncryptedContracts(trade_id), &sealed.to_bytes());
    for party in [&buyer, &seller] {
        let wrapped = WrappedKey::wrap(&key, &party.encryption_public()).unwrap();
        chain.put(Item::ContractEncryptionKeys(trade_id, *party.account()), &wrapped.to_bytes());
    }
    (buyer, seller)
}
