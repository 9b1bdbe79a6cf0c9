//! On-chain records of the trade pallet, decoded from SCALE storage values.
//!
//! Field order mirrors the runtime structs exactly; SCALE has no field tags,
//! so reordering anything here breaks decoding.

use blake2::{Blake2b512, Digest};
use parity_scale_codec::{Decode, Encode, Input, Output};
use serde::Serialize;
use std::fmt;

pub type Balance = u128;
pub type BlockNumber = u32;
pub type Hash32 = [u8; 32];

const SS58_PREFIX_CONTEXT: &[u8] = b"SS58PRE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Ss58Error {
    #[error("invalid base58: {0}")]
    Base58(String),
    #[error("bad address length {0}, expected 35")]
    BadLength(usize),
    #[error("unsupported address prefix {0}")]
    UnsupportedPrefix(u8),
    #[error("checksum mismatch")]
    BadChecksum,
}

/// 32-byte account identifier (sr25519 public key)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Encode, Decode)]
pub struct AccountId32(pub [u8; 32]);

impl AccountId32 {
    /// SS58 encoding for simple (single byte) prefixes
    ///
    /// <<prefix::8, pk::32-binary, checksum::16>> where checksum is the first
    /// two bytes of blake2b-512("SS58PRE" || prefix || pk)
    pub fn to_ss58(&self, prefix: u8) -> String {
        let mut payload = Vec::with_capacity(35);
        payload.push(prefix & 0x3f);
        payload.extend_from_slice(&self.0);
        let checksum = ss58_checksum(&payload);
        payload.extend_from_slice(&checksum);
        bs58::encode(payload).into_string()
    }

    pub fn from_ss58(address: &str) -> Result<(Self, u8), Ss58Error> {
        let data = bs58::decode(address).into_vec().map_err(|e| Ss58Error::Base58(e.to_string()))?;
        if data.len() != 35 {
            return Err(Ss58Error::BadLength(data.len()));
        }
        let prefix = data[0];
        if prefix >= 64 {
            return Err(Ss58Error::UnsupportedPrefix(prefix));
        }
        let checksum = ss58_checksum(&data[..33]);
        if checksum[..] != data[33..35] {
            return Err(Ss58Error::BadChecksum);
        }
        let mut pk = [0u8; 32];
        pk.copy_from_slice(&data[1..33]);
        Ok((Self(pk), prefix))
    }
}

fn ss58_checksum(payload: &[u8]) -> [u8; 2] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX_CONTEXT);
    hasher.update(payload);
    let hash = hasher.finalize();
    [hash[0], hash[1]]
}

impl fmt::Debug for AccountId32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Trade lifecycle status.
///
/// Decoded from the raw variant index so that a runtime upgrade adding
/// variants does not make every trade undecodable; unknown indices are kept
/// and displayed by their code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    PendingSellerConfirm,
    Escrow,
    AwaitingPayment,
    PaymentSent,
    Completed,
    Disputed,
    Refunded,
    Unknown(u8),
}

impl TradeStatus {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::PendingSellerConfirm,
            1 => Self::Escrow,
            2 => Self::AwaitingPayment,
            3 => Self::PaymentSent,
            4 => Self::Completed,
            5 => Self::Disputed,
            6 => Self::Refunded,
            other => Self::Unknown(other),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            Self::PendingSellerConfirm => 0,
            Self::Escrow => 1,
            Self::AwaitingPayment => 2,
            Self::PaymentSent => 3,
            Self::Completed => 4,
            Self::Disputed => 5,
            Self::Refunded => 6,
            Self::Unknown(code) => *code,
        }
    }

    /// Variant name as the runtime metadata spells it
    pub fn name(&self) -> String {
        match self {
            Self::PendingSellerConfirm => "PendingSellerConfirm".into(),
            Self::Escrow => "Escrow".into(),
            Self::AwaitingPayment => "AwaitingPayment".into(),
            Self::PaymentSent => "PaymentSent".into(),
            Self::Completed => "Completed".into(),
            Self::Disputed => "Disputed".into(),
            Self::Refunded => "Refunded".into(),
            Self::Unknown(code) => code.to_string(),
        }
    }

    /// Human readable label, unknown codes fall back to the raw code
    pub fn label(&self) -> String {
        match self {
            Self::PendingSellerConfirm => "Awaiting seller confirmation".into(),
            Self::Escrow => "Escrow".into(),
            Self::AwaitingPayment => "Awaiting payment".into(),
            Self::PaymentSent => "Payment sent".into(),
            Self::Completed => "Completed".into(),
            Self::Disputed => "Disputed".into(),
            Self::Refunded => "Refunded".into(),
            Self::Unknown(code) => code.to_string(),
        }
    }

    /// CSS badge class used by the explorer pages
    pub fn badge_class(&self) -> &'static str {
        match self {
            Self::Escrow | Self::AwaitingPayment | Self::PaymentSent => "badge-escrow",
            Self::Completed => "badge-completed",
            Self::Disputed => "badge-disputed",
            Self::Refunded => "badge-refunded",
            Self::PendingSellerConfirm | Self::Unknown(_) => "badge-pending",
        }
    }
}

impl Encode for TradeStatus {
    fn size_hint(&self) -> usize {
        1
    }

    fn encode_to<T: Output + ?Sized>(&self, dest: &mut T) {
        dest.push_byte(self.code());
    }
}

impl Decode for TradeStatus {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        Ok(Self::from_code(input.read_byte()?))
    }
}

/// Escrow trade between a buyer and a seller
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Trade {
    pub listing_id: u64,
    pub buyer: AccountId32,
    pub seller: AccountId32,
    pub price: Balance,
    pub buyer_bond: Balance,
    pub seller_bond: Balance,
    /// Fiat price in kuruş, 0 for KOD-only trades
    pub tl_price: u64,
    pub seller_iban_hash: Option<Hash32>,
    pub buyer_iban_hash: Option<Hash32>,
    pub contract_hash: Hash32,
    pub delivery_attestation_hash: Option<Hash32>,
    pub final_hash: Option<Hash32>,
    pub status: TradeStatus,
    pub created_at: BlockNumber,
}

impl Trade {
    pub fn is_party(&self, account: &AccountId32) -> bool {
        self.buyer == *account || self.seller == *account
    }
}

/// Device diagnostics summary attached to a trade
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DiagnosticReport {
    pub submitter: AccountId32,
    pub device_model_hash: Hash32,
    pub device_manufacturer_hash: Hash32,
    pub os_hash: Hash32,
    pub test_count: u32,
    pub passed_count: u32,
    pub failed_count: u32,
    /// 0-100
    pub score: u8,
    pub report_hash: Hash32,
    pub submitted_at: BlockNumber,
}

impl DiagnosticReport {
    pub fn total(&self) -> u32 {
        self.passed_count.saturating_add(self.failed_count)
    }

    /// Score clamped into 0..=100, used as a percentage width
    pub fn score_pct(&self) -> u8 {
        self.score.min(100)
    }
}

/// Aggregated counters shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    /// `NextTradeId`, i.e. the number of trades ever opened
    pub total_trades: u64,
    pub trades_completed: u64,
    pub total_volume: Balance,
    /// `NextListingId`, i.e. the number of listings ever created
    pub total_listings: u64,
}
