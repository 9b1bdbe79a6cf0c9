//! Client-side contract decryption.
//!
//! A trade's contract JSON is sealed once with a random symmetric key
//! (XSalsa20-Poly1305 secret box). That key is then wrapped for each party
//! with a curve25519 box from a throwaway ephemeral keypair to the party's
//! x25519 public key. Both blobs live on chain; only the recovery phrase
//! stays local.
//!
//! Wrapped key layout (104 bytes):
//!
//! Offset  Length  Field
//! ──────────────────────────────────────────
//! 0-31    32      Ephemeral x25519 public key
//! 32-55   24      Nonce
//! 56-103  48      Boxed symmetric key (16 tag + 32 key)
//!
//! Sealed contract layout:
//!
//! Offset  Length  Field
//! ──────────────────────────────────────────
//! 0-23    24      Nonce
//! 24+     N       Secret box (16 tag + JSON bytes)

use crate::types::AccountId32;
use crate::utils::misc::Typename;
use crypto_box::aead::generic_array::GenericArray;
use crypto_box::aead::{Aead, KeyInit};
use crypto_box::{PublicKey, SalsaBox, SecretKey};
use crypto_secretbox::XSalsa20Poly1305;
use rand::RngCore;
use schnorrkel::{ExpansionMode, MiniSecretKey};
use serde_json::Value;
use sha2::Sha512;
use zeroize::Zeroizing;

pub const PHRASE_WORDS: usize = 12;
pub const PUBLIC_KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;
pub const SYMMETRIC_KEY_LEN: usize = 32;
pub const TAG_LEN: usize = 16;
pub const WRAPPED_CIPHERTEXT_LEN: usize = SYMMETRIC_KEY_LEN + TAG_LEN;
pub const WRAPPED_KEY_LEN: usize = PUBLIC_KEY_LEN + NONCE_LEN + WRAPPED_CIPHERTEXT_LEN;

const PBKDF2_ROUNDS: u32 = 2048;

pub type SymmetricKey = [u8; SYMMETRIC_KEY_LEN];

#[derive(Debug, thiserror::Error, strum_macros::IntoStaticStr, PartialEq, Eq)]
pub enum Error {
    #[error("enter your 12-word recovery phrase")]
    EmptyPhrase,
    #[error("expected 12 words, got {0}")]
    WrongWordCount(usize),
    #[error("recovery phrase is not a valid BIP-39 mnemonic")]
    InvalidMnemonic,
    #[error("no encrypted contract is loaded for this trade")]
    NoEncryptedContract,
    #[error("no encryption key found for this account; you must be a party to this trade")]
    NotAParty,
    #[error("wrapped key has invalid format ({0} bytes, expected at least 104)")]
    WrappedKeyTooShort(usize),
    #[error("key unwrap failed: wrong recovery phrase or not a party to this trade")]
    UnwrapFailed,
    #[error("encrypted contract has invalid format ({0} bytes, expected at least 24)")]
    PayloadTooShort(usize),
    #[error("contract decryption failed: data may be corrupted or tampered with")]
    OpenFailed,
    #[error("decrypted contract is not valid UTF-8")]
    InvalidUtf8,
    #[error("decrypted contract is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("encryption failed")]
    SealFailed,
}

impl Typename for Error {
    fn typename(&self) -> &'static str {
        self.into()
    }
}

/// A whitespace-normalised 12-word recovery phrase
pub struct Phrase(Zeroizing<String>);

impl Phrase {
    /// Validates word count only; checked before any network or crypto work
    pub fn parse(input: &str) -> Result<Self, Error> {
        let words: Vec<&str> = input.split_whitespace().collect();
        if words.is_empty() {
            return Err(Error::EmptyPhrase);
        }
        if words.len() != PHRASE_WORDS {
            return Err(Error::WrongWordCount(words.len()));
        }
        Ok(Self(Zeroizing::new(words.join(" "))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Derive the 32-byte mini secret the same way substrate wallets do:
/// PBKDF2-HMAC-SHA512(entropy, "mnemonic", 2048) truncated to 32 bytes
pub fn mini_secret(phrase: &Phrase) -> Result<Zeroizing<[u8; 32]>, Error> {
    let mnemonic =
        bip39::Mnemonic::parse_in_normalized(bip39::Language::English, phrase.as_str()).map_err(|_| Error::InvalidMnemonic)?;
    let entropy = Zeroizing::new(mnemonic.to_entropy());

    let mut seed = Zeroizing::new([0u8; 64]);
    pbkdf2::pbkdf2_hmac::<Sha512>(&entropy, b"mnemonic", PBKDF2_ROUNDS, &mut seed[..]);

    let mut mini = Zeroizing::new([0u8; 32]);
    mini.copy_from_slice(&seed[..32]);
    Ok(mini)
}

/// Keys a trade participant derives from their recovery phrase.
///
/// The encryption key and the on-chain account come from the same mini
/// secret through two unrelated derivations.
pub struct Participant {
    encryption_secret: SecretKey,
    account: AccountId32,
}

impl Participant {
    pub fn from_phrase(phrase: &Phrase) -> Result<Self, Error> {
        let mini = mini_secret(phrase)?;
        Self::from_mini_secret(&mini)
    }

    pub fn from_mini_secret(mini: &[u8; 32]) -> Result<Self, Error> {
        let encryption_secret = SecretKey::from(*mini);
        let account = MiniSecretKey::from_bytes(mini)
            .map(|msk| AccountId32(msk.expand_to_keypair(ExpansionMode::Ed25519).public.to_bytes()))
            .map_err(|_| Error::InvalidMnemonic)?;
        Ok(Self { encryption_secret, account })
    }

    pub fn account(&self) -> &AccountId32 {
        &self.account
    }

    pub fn address(&self, ss58_prefix: u8) -> String {
        self.account.to_ss58(ss58_prefix)
    }

    pub fn encryption_public(&self) -> PublicKey {
        self.encryption_secret.public_key()
    }

    pub fn encryption_secret(&self) -> &SecretKey {
        &self.encryption_secret
    }
}

/// Symmetric contract key boxed for one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    pub ephemeral_public: [u8; PUBLIC_KEY_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl TryFrom<&[u8]> for WrappedKey {
    type Error = Error;

    fn try_from(bin: &[u8]) -> Result<Self, Self::Error> {
        if bin.len() < WRAPPED_KEY_LEN {
            return Err(Error::WrappedKeyTooShort(bin.len()));
        }

        let mut ephemeral_public = [0u8; PUBLIC_KEY_LEN];
        ephemeral_public.copy_from_slice(&bin[..PUBLIC_KEY_LEN]);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bin[PUBLIC_KEY_LEN..PUBLIC_KEY_LEN + NONCE_LEN]);
        let ciphertext = bin[PUBLIC_KEY_LEN + NONCE_LEN..].to_vec();

        Ok(Self { ephemeral_public, nonce, ciphertext })
    }
}

impl WrappedKey {
    /// Box `key` for `recipient` from a fresh ephemeral keypair
    pub fn wrap(key: &SymmetricKey, recipient: &PublicKey) -> Result<Self, Error> {
        let mut ephemeral = Zeroizing::new([0u8; 32]);
        let mut nonce = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut ephemeral[..]);
        rand::rng().fill_bytes(&mut nonce);

        let ephemeral = SecretKey::from(*ephemeral);
        let ciphertext = SalsaBox::new(recipient, &ephemeral)
            .encrypt(GenericArray::from_slice(&nonce), key.as_slice())
            .map_err(|_| Error::SealFailed)?;

        Ok(Self { ephemeral_public: *ephemeral.public_key().as_bytes(), nonce, ciphertext })
    }

    /// Open the box with the participant's secret; authentication failure
    /// means the phrase does not belong to the intended recipient
    pub fn unwrap_key(&self, secret: &SecretKey) -> Result<Zeroizing<SymmetricKey>, Error> {
        let ephemeral = PublicKey::from(self.ephemeral_public);
        let opened = Zeroizing::new(
            SalsaBox::new(&ephemeral, secret)
                .decrypt(GenericArray::from_slice(&self.nonce), self.ciphertext.as_slice())
                .map_err(|_| Error::UnwrapFailed)?,
        );
        if opened.len() != SYMMETRIC_KEY_LEN {
            return Err(Error::UnwrapFailed);
        }
        let mut key = Zeroizing::new([0u8; SYMMETRIC_KEY_LEN]);
        key.copy_from_slice(&opened);
        Ok(key)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PUBLIC_KEY_LEN + NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.ephemeral_public);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

/// Contract payload sealed under the trade's symmetric key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedContract {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl TryFrom<&[u8]> for SealedContract {
    type Error = Error;

    fn try_from(bin: &[u8]) -> Result<Self, Self::Error> {
        if bin.len() < NONCE_LEN {
            return Err(Error::PayloadTooShort(bin.len()));
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bin[..NONCE_LEN]);
        Ok(Self { nonce, ciphertext: bin[NONCE_LEN..].to_vec() })
    }
}

impl SealedContract {
    pub fn seal(key: &SymmetricKey, nonce: [u8; NONCE_LEN], plaintext: &[u8]) -> Result<Self, Error> {
        let cipher = XSalsa20Poly1305::new(GenericArray::from_slice(key));
        let ciphertext =
            cipher.encrypt(GenericArray::from_slice(&nonce), plaintext).map_err(|_| Error::SealFailed)?;
        Ok(Self { nonce, ciphertext })
    }

    /// Authenticated open, never yields partial plaintext
    pub fn open(&self, key: &SymmetricKey) -> Result<Vec<u8>, Error> {
        let cipher = XSalsa20Poly1305::new(GenericArray::from_slice(key));
        cipher.decrypt(GenericArray::from_slice(&self.nonce), self.ciphertext.as_slice()).map_err(|_| Error::OpenFailed)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(NONCE_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }
}

pub fn decode_contract(plaintext: &[u8]) -> Result<Value, Error> {
    let text = std::str::from_utf8(plaintext).map_err(|_| Error::InvalidUtf8)?;
    serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))
}

/// Steps 4-8 of the pipeline once both blobs are in hand
pub fn open_contract(participant: &Participant, wrapped_key: &[u8], contract: &[u8]) -> Result<Value, Error> {
    let wrapped = WrappedKey::try_from(wrapped_key)?;
    let key = wrapped.unwrap_key(participant.encryption_secret())?;
    let sealed = SealedContract::try_from(contract)?;
    let plaintext = Zeroizing::new(sealed.open(&key)?);
    decode_contract(&plaintext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // BIP-39 test vector with all-zero entropy
    const ABANDON: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const ZOO: &str = "zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo zoo wrong";
    // substrate development phrase, root account without derivation path
    const DEV: &str = "bottom drive obey lake curtain smoke basket hold race lonely fit walk";

    fn participant(phrase: &str) -> Participant {
        Participant::from_phrase(&Phrase::parse(phrase).unwrap()).unwrap()
    }

    fn sealed_trade(recipient: &Participant, contract: &Value) -> (Vec<u8>, Vec<u8>) {
        let key = [11u8; SYMMETRIC_KEY_LEN];
        let wrapped = WrappedKey::wrap(&key, &recipient.encryption_public()).unwrap();
        let sealed = SealedContract::seal(&key, [5u8; NONCE_LEN], contract.to_string().as_bytes()).unwrap();
        (wrapped.to_bytes(), sealed.to_bytes())
    }

    #[test]
    fn test_phrase_word_count() {
        assert_eq!(Phrase::parse("   ").err(), Some(Error::EmptyPhrase));
        assert_eq!(Phrase::parse("abandon about").err(), Some(Error::WrongWordCount(2)));
        let thirteen = format!("{ABANDON} abandon");
        assert_eq!(Phrase::parse(&thirteen).err(), Some(Error::WrongWordCount(13)));
        let spaced = ABANDON.replace(' ', "  \n ");
        assert_eq!(Phrase::parse(&spaced).unwrap().as_str(), ABANDON);
    }

    #[test]
    fn test_invalid_checksum_rejected() {
        let phrase = Phrase::parse("abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon").unwrap();
        assert_eq!(Participant::from_phrase(&phrase).err(), Some(Error::InvalidMnemonic));
    }

    #[test]
    fn test_mini_secret_stretches_entropy_not_seed() {
        // all-zero 128-bit entropy, empty password
        let mini = mini_secret(&Phrase::parse(ABANDON).unwrap()).unwrap();
        let mut expected = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(&[0u8; 16], b"mnemonic", PBKDF2_ROUNDS, &mut expected);
        assert_eq!(&mini[..], &expected[..32]);

        let mut bip39_seed = [0u8; 64];
        pbkdf2::pbkdf2_hmac::<Sha512>(ABANDON.as_bytes(), b"mnemonic", PBKDF2_ROUNDS, &mut bip39_seed);
        assert_ne!(&mini[..], &bip39_seed[..32]);
    }

    #[test]
    fn test_dev_phrase_known_answers() {
        let phrase = Phrase::parse(DEV).unwrap();
        let mini = mini_secret(&phrase).unwrap();
        assert_eq!(hex::encode(&mini[..]), "fac7959dbfe72f052e5a0c3c8d6530f202b02fd8f9f5ca3580ec8deb7797479e");

        let dev = Participant::from_phrase(&phrase).unwrap();
        assert_eq!(dev.address(42), "5DfhGyQdFobKM8NsWvEeAKk5EQQgYe9AydgJ7rMB6E1EqRzV");
        assert_eq!(
            hex::encode(dev.encryption_public().as_bytes()),
            "1a50b0d94e2a48da7d125bd6224154237e4ea61020aefe73908afa9b4e83f759"
        );

        let abandon = participant(ABANDON);
        assert_eq!(
            hex::encode(abandon.encryption_public().as_bytes()),
            "afe2c45279de591c0a57e8fa3d9562a5f2502d9ab100179c3ab1e2d77f92a27b"
        );
    }

    #[test]
    fn test_derivation_is_deterministic_and_distinct() {
        let a = participant(ABANDON);
        let b = participant(ABANDON);
        let c = participant(ZOO);
        assert_eq!(a.account(), b.account());
        assert_eq!(a.encryption_public(), b.encryption_public());
        assert_ne!(a.account(), c.account());
        // the two derivations do not coincide
        assert_ne!(a.account().0, *a.encryption_public().as_bytes());
        assert!(a.address(42).starts_with('5'));
    }

    #[test]
    fn test_open_contract_for_recipient() {
        let alice = participant(ABANDON);
        let contract = json!({ "tradeId": 3, "listing": { "title": "Phone" } });
        let (wrapped, sealed) = sealed_trade(&alice, &contract);
        assert_eq!(wrapped.len(), WRAPPED_KEY_LEN);
        assert_eq!(open_contract(&alice, &wrapped, &sealed).unwrap(), contract);
    }

    #[test]
    fn test_wrong_phrase_fails_unwrap() {
        let alice = participant(ABANDON);
        let mallory = participant(ZOO);
        let (wrapped, sealed) = sealed_trade(&alice, &json!({ "a": 1 }));
        assert_eq!(open_contract(&mallory, &wrapped, &sealed).err(), Some(Error::UnwrapFailed));
    }

    #[test]
    fn test_every_byte_flip_is_detected() {
        let alice = participant(ABANDON);
        let (wrapped, sealed) = sealed_trade(&alice, &json!({ "price": "100" }));

        for i in PUBLIC_KEY_LEN + NONCE_LEN..wrapped.len() {
            let mut bad = wrapped.clone();
            bad[i] ^= 0x01;
            assert_eq!(open_contract(&alice, &bad, &sealed).err(), Some(Error::UnwrapFailed), "wrapped byte {i}");
        }
        for i in NONCE_LEN..sealed.len() {
            let mut bad = sealed.clone();
            bad[i] ^= 0x80;
            assert_eq!(open_contract(&alice, &wrapped, &bad).err(), Some(Error::OpenFailed), "payload byte {i}");
        }
    }

    #[test]
    fn test_short_blobs_rejected() {
        let alice = participant(ABANDON);
        let (wrapped, sealed) = sealed_trade(&alice, &json!({}));
        assert_eq!(open_contract(&alice, &wrapped[..103], &sealed).err(), Some(Error::WrappedKeyTooShort(103)));
        assert_eq!(open_contract(&alice, &wrapped, &sealed[..10]).err(), Some(Error::PayloadTooShort(10)));
        // nonce only: passes the length check, fails authentication
        assert_eq!(open_contract(&alice, &wrapped, &sealed[..NONCE_LEN]).err(), Some(Error::OpenFailed));
    }

    #[test]
    fn test_seal_then_open_reproduces_bytes() {
        let key = [42u8; SYMMETRIC_KEY_LEN];
        let plaintext = br#"{"meeting":{"location":"Kadikoy"}}"#;
        let sealed = SealedContract::seal(&key, [1u8; NONCE_LEN], plaintext).unwrap();
        assert_eq!(sealed.ciphertext.len(), plaintext.len() + TAG_LEN);
        let parsed = SealedContract::try_from(sealed.to_bytes().as_slice()).unwrap();
        assert_eq!(parsed.open(&key).unwrap(), plaintext);
    }

    #[test]
    fn test_malformed_plaintext_reported() {
        assert_eq!(decode_contract(&[0xff, 0xfe]).err(), Some(Error::InvalidUtf8));
        assert!(matches!(decode_contract(b"{not json"), Err(Error::InvalidJson(_))));
    }
}
