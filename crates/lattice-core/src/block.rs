//! Block construction, canonical hashing, signing and proof-of-work.
//!
//! A block is a typed record over the five block kinds. Each kind has a
//! fixed required field set, a small optional set, and a canonical byte
//! layout whose Blake2b digest is the block hash. Signature and work
//! validity are memoized; every setter that touches a hashed or
//! work-relevant field drops the affected cache entries.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Blake2b512, Digest};
use ed25519_dalek::hazmat::{raw_sign, raw_verify};
use ed25519_dalek::{Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::{self, AccountError, AccountPrefix, AccountSource, KeySource};
use crate::work::{self, WorkError, WORK_DIFFICULTY};

type Blake2bHash = Blake2b<U32>;

/// Hash value used as the empty marker for `previous` and `link`.
pub const ZERO_BLOCK_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Account ID of the all-zero public key, the burn address.
pub const ZERO_ACCOUNT_ID: &str =
    "xrb_1111111111111111111111111111111111111111111111111111hifc8npp";

/// `link` value marking an account upgrade to epoch v1. The bytes spell
/// `epoch v1 block`.
pub const EPOCH_LINK_V1: &str =
    "65706F636820763120626C6F636B000000000000000000000000000000000000";

/// Public key that signs epoch blocks regardless of the block's account.
pub const EPOCH_SIGN_PUBLIC_KEY: &str =
    "e89208dd038fbb269987689621d52292ae9c35941a7484756ecced92a65093ba";

/// Highest representable balance.
pub const MAX_BALANCE: u128 = u128::MAX;

/// Preamble distinguishing state block hashes from legacy block hashes.
const STATE_BLOCK_HEADER_BYTES: [u8; 32] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    6,
];

/// Errors raised when constructing, mutating or verifying blocks.
#[derive(Debug, Error)]
pub enum BlockError {
    /// A required field for the block type is absent.
    #[error("block with type '{block_type}' is missing required parameters: {missing}")]
    MissingParameters {
        block_type: &'static str,
        missing: String,
    },
    /// A field outside the block type's schema is present.
    #[error("block with type '{block_type}' has prohibited parameters: {prohibited}")]
    ProhibitedParameters {
        block_type: &'static str,
        prohibited: String,
    },
    /// The block type string is not one of the five kinds.
    #[error("'{0}' is not a valid block type")]
    InvalidBlockType(String),
    /// A hash field is not a 64-character hexadecimal string.
    #[error("block hash must be a 64-character hexadecimal string")]
    InvalidBlockHash,
    /// The balance is not parseable in the expected format for the type.
    #[error("balance must be an integer in range 0..2^128-1 in the type's wire format")]
    InvalidBalance,
    /// The signature is not a 128-character hexadecimal string.
    #[error("signature must be a 128-character hexadecimal string")]
    MalformedSignature,
    /// The signature did not verify against the block hash.
    #[error("signature could not be verified")]
    InvalidSignature,
    /// An operation needs a field the block does not carry.
    #[error("'{0}' has not been added to this block")]
    MissingField(&'static str),
    /// The block already carries a valid signature.
    #[error("the block already has a signature")]
    AlreadySigned,
    /// The block already carries work meeting the difficulty.
    #[error("the block already has a valid proof-of-work")]
    WorkAlreadyValid,
    /// An account field failed to validate or resolve.
    #[error(transparent)]
    Account(#[from] AccountError),
    /// A work or difficulty value failed to validate.
    #[error(transparent)]
    Work(#[from] WorkError),
    /// The block JSON could not be parsed.
    #[error("invalid block JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The five block kinds. Fixed at construction; a block never changes type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    Send,
    Receive,
    Open,
    Change,
    State,
}

impl BlockType {
    /// The type name as used in the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Send => "send",
            BlockType::Receive => "receive",
            BlockType::Open => "open",
            BlockType::Change => "change",
            BlockType::State => "state",
        }
    }

    fn required_params(&self) -> &'static [&'static str] {
        match self {
            BlockType::Send => &["type", "previous", "destination", "balance"],
            BlockType::Receive => &["type", "previous", "source"],
            BlockType::Open => &["type", "source", "representative", "account"],
            BlockType::Change => &["type", "previous", "representative"],
            BlockType::State => &[
                "type",
                "account",
                "previous",
                "representative",
                "balance",
                "link",
            ],
        }
    }

    fn optional_params(&self) -> &'static [&'static str] {
        match self {
            BlockType::Send | BlockType::Receive | BlockType::Change => {
                &["work", "signature", "account"]
            }
            BlockType::Open => &["work", "signature"],
            BlockType::State => &["work", "signature", "link_as_account"],
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "send" => Ok(BlockType::Send),
            "receive" => Ok(BlockType::Receive),
            "open" => Ok(BlockType::Open),
            "change" => Ok(BlockType::Change),
            "state" => Ok(BlockType::State),
            other => Err(BlockError::InvalidBlockType(other.to_string())),
        }
    }
}

/// Transaction classification, distinct from the stored block type.
///
/// Legacy blocks classify as themselves. State blocks derive their
/// classification from the `link` and `previous` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxType {
    Send,
    Receive,
    Open,
    Change,
    Epoch,
    SendOrReceive,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Send => "send",
            TxType::Receive => "receive",
            TxType::Open => "open",
            TxType::Change => "change",
            TxType::Epoch => "epoch",
            TxType::SendOrReceive => "send/receive",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wire representation of a block: the exact field set broadcast to the
/// network as JSON, every value a string.
///
/// `balance` is a 32-character padded hex string on legacy `send` blocks and
/// a decimal string on `state` blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockFields {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub block_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_as_account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

/// Convert a balance to the 32-character padded hex form used by legacy
/// `send` blocks.
pub fn balance_to_hex(balance: u128) -> String {
    format!("{:032X}", balance)
}

/// Parse a legacy `send` block balance from its padded hex form.
pub fn parse_hex_balance(balance: &str) -> Result<u128, BlockError> {
    if balance.len() != 32 || !crate::is_hex(balance) {
        return Err(BlockError::InvalidBalance);
    }
    u128::from_str_radix(balance, 16).map_err(|_| BlockError::InvalidBalance)
}

/// Parse a signature, returning it in canonical uppercase form. Only the
/// format is checked; signatures are verified through [`Block`].
pub fn parse_signature(signature: &str) -> Result<String, BlockError> {
    if signature.len() != 128 || !crate::is_hex(signature) {
        return Err(BlockError::MalformedSignature);
    }
    Ok(signature.to_uppercase())
}

/// Validate a block hash, returning it in canonical uppercase form.
pub fn validate_block_hash(hash: &str) -> Result<String, BlockError> {
    if hash.len() != 64 || !crate::is_hex(hash) {
        return Err(BlockError::InvalidBlockHash);
    }
    Ok(hash.to_uppercase())
}

/// A single block of an account chain.
///
/// Holds the validated field values in canonical form, the active work
/// difficulty, and the memoized signature/work validity. Not safe for
/// concurrent mutation; distinct blocks can be used from distinct threads.
#[derive(Debug, Clone)]
pub struct Block {
    block_type: BlockType,
    account: Option<String>,
    previous: Option<String>,
    destination: Option<String>,
    representative: Option<String>,
    balance: Option<u128>,
    source: Option<String>,
    link: Option<String>,
    signature: Option<String>,
    work: Option<String>,
    difficulty: u64,
    cached_signature_valid: Cell<Option<bool>>,
    cached_work_valid: Cell<Option<bool>>,
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        // Memoized validity is derived state, not part of block identity
        self.block_type == other.block_type
            && self.account == other.account
            && self.previous == other.previous
            && self.destination == other.destination
            && self.representative == other.representative
            && self.balance == other.balance
            && self.source == other.source
            && self.link == other.link
            && self.signature == other.signature
            && self.work == other.work
            && self.difficulty == other.difficulty
    }
}

impl Block {
    /// Build a block from its wire fields, verifying any included signature
    /// and work against the default network difficulty.
    pub fn from_fields(fields: &BlockFields) -> Result<Block, BlockError> {
        Self::from_fields_with(fields, true, None)
    }

    /// Build a block from its wire fields.
    ///
    /// With `verify` set, an included signature is checked whenever the
    /// block also carries an account, and included work is checked against
    /// `difficulty` (network default when `None`).
    pub fn from_fields_with(
        fields: &BlockFields,
        verify: bool,
        difficulty: Option<u64>,
    ) -> Result<Block, BlockError> {
        let type_str = fields
            .block_type
            .as_deref()
            .ok_or(BlockError::MissingField("type"))?;
        let block_type: BlockType = type_str.parse()?;

        let mut block = Block {
            block_type,
            account: None,
            previous: None,
            destination: None,
            representative: None,
            balance: None,
            source: None,
            link: None,
            signature: None,
            work: None,
            difficulty: difficulty.unwrap_or(WORK_DIFFICULTY),
            cached_signature_valid: Cell::new(None),
            cached_work_valid: Cell::new(None),
        };

        if let Some(account) = fields.account.as_deref() {
            block.set_account(Some(account))?;
        }
        if let Some(previous) = fields.previous.as_deref() {
            block.set_previous(Some(previous))?;
        }
        if let Some(destination) = fields.destination.as_deref() {
            block.set_destination(Some(destination))?;
        }
        if let Some(representative) = fields.representative.as_deref() {
            block.set_representative(Some(representative))?;
        }
        if let Some(balance) = fields.balance.as_deref() {
            let parsed = match block_type {
                // Blocks that predate state blocks use hexadecimal balances
                BlockType::Send => parse_hex_balance(balance)?,
                _ => balance
                    .parse::<u128>()
                    .map_err(|_| BlockError::InvalidBalance)?,
            };
            block.set_balance(Some(parsed));
        }
        if let Some(source) = fields.source.as_deref() {
            block.set_source(Some(source))?;
        }
        if let Some(link) = fields.link.as_deref() {
            block.set_link(Some(link))?;
        }
        if let Some(link_as_account) = fields.link_as_account.as_deref() {
            block.set_link_as_account(Some(link_as_account))?;
        }
        if let Some(signature) = fields.signature.as_deref() {
            block.set_signature(Some(signature))?;
        }
        if let Some(work) = fields.work.as_deref() {
            block.set_work(Some(work))?;
        }

        block.validate(verify)?;

        Ok(block)
    }

    /// Deserialize a block from its JSON wire format, verifying any
    /// included signature and work.
    pub fn from_json(json: &str) -> Result<Block, BlockError> {
        Self::from_json_with(json, true, None)
    }

    /// Deserialize a block from its JSON wire format.
    pub fn from_json_with(
        json: &str,
        verify: bool,
        difficulty: Option<u64>,
    ) -> Result<Block, BlockError> {
        let fields: BlockFields = serde_json::from_str(json)?;
        Self::from_fields_with(&fields, verify, difficulty)
    }

    /// The block's wire fields, ready for serialization or broadcast.
    pub fn to_fields(&self) -> BlockFields {
        BlockFields {
            block_type: Some(self.block_type.as_str().to_string()),
            account: self.account.clone(),
            previous: self.previous.clone(),
            destination: self.destination.clone(),
            representative: self.representative.clone(),
            balance: self.balance.map(|balance| match self.block_type {
                BlockType::State => balance.to_string(),
                _ => balance_to_hex(balance),
            }),
            source: self.source.clone(),
            link: self.link.clone(),
            link_as_account: self.link_as_account(),
            signature: self.signature.clone(),
            work: self.work.clone(),
        }
    }

    /// Serialize the block to its JSON wire format.
    pub fn to_json(&self) -> Result<String, BlockError> {
        Ok(serde_json::to_string(&self.to_fields())?)
    }

    fn validate(&self, verify: bool) -> Result<(), BlockError> {
        let present = self.present_params();
        let required = self.block_type.required_params();
        let optional = self.block_type.optional_params();

        let missing: Vec<&str> = required
            .iter()
            .filter(|param| !present.contains(param))
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(BlockError::MissingParameters {
                block_type: self.block_type.as_str(),
                missing: missing.join(", "),
            });
        }

        let prohibited: Vec<&str> = present
            .iter()
            .filter(|param| !required.contains(param) && !optional.contains(param))
            .copied()
            .collect();
        if !prohibited.is_empty() {
            return Err(BlockError::ProhibitedParameters {
                block_type: self.block_type.as_str(),
                prohibited: prohibited.join(", "),
            });
        }

        if verify {
            // A signature can only be checked when the signing account is
            // known; the reference node omits 'account' on some legacy
            // blocks it serves
            if self.signature.is_some() && self.account.is_some() {
                self.verify_signature()?;
            }
            if self.work.is_some() {
                self.verify_work(None)?;
            }
        }

        Ok(())
    }

    fn present_params(&self) -> Vec<&'static str> {
        let mut params = vec!["type"];
        if self.account.is_some() {
            params.push("account");
        }
        if self.previous.is_some() {
            params.push("previous");
        }
        if self.destination.is_some() {
            params.push("destination");
        }
        if self.representative.is_some() {
            params.push("representative");
        }
        if self.balance.is_some() {
            params.push("balance");
        }
        if self.source.is_some() {
            params.push("source");
        }
        if self.link.is_some() {
            params.push("link");
            params.push("link_as_account");
        }
        if self.signature.is_some() {
            params.push("signature");
        }
        if self.work.is_some() {
            params.push("work");
        }
        params
    }

    fn invalidate_signature(&self) {
        self.cached_signature_valid.set(None);
    }

    fn invalidate_work(&self) {
        self.cached_work_valid.set(None);
    }

    fn hash_field(&self, field: &Option<String>, name: &'static str) -> Result<Vec<u8>, BlockError> {
        let value = field.as_deref().ok_or(BlockError::MissingField(name))?;
        hex::decode(value).map_err(|_| BlockError::InvalidBlockHash)
    }

    fn key_field(&self, field: &Option<String>, name: &'static str) -> Result<Vec<u8>, BlockError> {
        let account_id = field.as_deref().ok_or(BlockError::MissingField(name))?;
        let public_key = account::get_account_public_key(AccountSource::AccountId(account_id))?;
        hex::decode(public_key).map_err(|_| BlockError::InvalidBlockHash)
    }

    fn balance_field(&self) -> Result<[u8; 16], BlockError> {
        self.balance
            .map(u128::to_be_bytes)
            .ok_or(BlockError::MissingField("balance"))
    }

    /// The canonical Blake2b hash identifying this block, as uppercase hex.
    pub fn block_hash(&self) -> Result<String, BlockError> {
        let mut hasher = Blake2bHash::new();

        match self.block_type {
            BlockType::Send => {
                hasher.update(self.hash_field(&self.previous, "previous")?);
                hasher.update(self.key_field(&self.destination, "destination")?);
                hasher.update(self.balance_field()?);
            }
            BlockType::Receive => {
                hasher.update(self.hash_field(&self.previous, "previous")?);
                hasher.update(self.hash_field(&self.source, "source")?);
            }
            BlockType::Open => {
                hasher.update(self.hash_field(&self.source, "source")?);
                hasher.update(self.key_field(&self.representative, "representative")?);
                hasher.update(self.key_field(&self.account, "account")?);
            }
            BlockType::Change => {
                hasher.update(self.hash_field(&self.previous, "previous")?);
                hasher.update(self.key_field(&self.representative, "representative")?);
            }
            BlockType::State => {
                hasher.update(STATE_BLOCK_HEADER_BYTES);
                hasher.update(self.key_field(&self.account, "account")?);
                hasher.update(self.hash_field(&self.previous, "previous")?);
                hasher.update(self.key_field(&self.representative, "representative")?);
                hasher.update(self.balance_field()?);
                hasher.update(self.hash_field(&self.link, "link")?);
            }
        }

        Ok(hex::encode_upper(hasher.finalize()))
    }

    /// The transaction classification of this block.
    pub fn tx_type(&self) -> TxType {
        match self.block_type {
            BlockType::Send => TxType::Send,
            BlockType::Receive => TxType::Receive,
            BlockType::Open => TxType::Open,
            BlockType::Change => TxType::Change,
            BlockType::State => match (self.link.as_deref(), self.previous.as_deref()) {
                (Some(ZERO_BLOCK_HASH), _) => TxType::Change,
                (Some(EPOCH_LINK_V1), _) => TxType::Epoch,
                (_, Some(ZERO_BLOCK_HASH)) => TxType::Open,
                _ => TxType::SendOrReceive,
            },
        }
    }

    /// The hash the proof-of-work must be generated against.
    ///
    /// Open transactions target the account's public key so that work for
    /// the first block of an account can be computed before the block
    /// exists; every other transaction targets `previous`, letting work for
    /// a successor be precomputed while the current head is still pending.
    pub fn work_block_hash(&self) -> Result<String, BlockError> {
        if self.tx_type() == TxType::Open {
            let account = self
                .account
                .as_deref()
                .ok_or(BlockError::MissingField("account"))?;
            let public_key = account::get_account_public_key(AccountSource::AccountId(account))?;
            Ok(public_key.to_uppercase())
        } else {
            self.previous
                .clone()
                .ok_or(BlockError::MissingField("previous"))
        }
    }

    /// The 64-bit work value attached to this block, or `None` when the
    /// block carries no work or no work hash can be derived.
    pub fn work_value(&self) -> Option<u64> {
        let work = self.work.as_deref()?;
        let work_hash = self.work_block_hash().ok()?;
        work::get_work_value(&work_hash, work).ok()
    }

    /// Verify the signature in the block against its hash.
    ///
    /// Epoch blocks are signed by the genesis account, so their signatures
    /// are checked against that key instead of the block's account.
    pub fn verify_signature(&self) -> Result<(), BlockError> {
        let account = self
            .account
            .as_deref()
            .ok_or(BlockError::MissingField("account"))?;
        let signature = self
            .signature
            .as_deref()
            .ok_or(BlockError::MissingField("signature"))?;

        let public_key = if self.tx_type() == TxType::Epoch {
            EPOCH_SIGN_PUBLIC_KEY.to_string()
        } else {
            account::get_account_public_key(AccountSource::AccountId(account))?
        };

        let key_bytes: [u8; 32] = hex::decode(public_key)
            .map_err(|_| BlockError::InvalidSignature)?
            .try_into()
            .map_err(|_| BlockError::InvalidSignature)?;
        let verifying_key =
            VerifyingKey::from_bytes(&key_bytes).map_err(|_| BlockError::InvalidSignature)?;

        let signature_bytes: [u8; 64] = hex::decode(signature)
            .map_err(|_| BlockError::InvalidSignature)?
            .try_into()
            .map_err(|_| BlockError::InvalidSignature)?;
        let signature = Signature::from_bytes(&signature_bytes);

        let message = hex::decode(self.block_hash()?).map_err(|_| BlockError::InvalidBlockHash)?;

        raw_verify::<Blake2b512>(&verifying_key, &message, &signature)
            .map_err(|_| BlockError::InvalidSignature)
    }

    /// Sign the block hash with the given private key and attach the
    /// signature. Fails if the block already carries a valid signature.
    pub fn sign(&mut self, private_key: &str) -> Result<(), BlockError> {
        if self.has_valid_signature() {
            return Err(BlockError::AlreadySigned);
        }

        account::validate_private_key(private_key)?;
        let key_bytes: [u8; 32] = hex::decode(private_key)
            .map_err(|_| AccountError::InvalidPrivateKey)?
            .try_into()
            .map_err(|_| AccountError::InvalidPrivateKey)?;
        let (expanded, verifying_key) = account::signing_keys(&key_bytes);

        let message = hex::decode(self.block_hash()?).map_err(|_| BlockError::InvalidBlockHash)?;
        let signature = raw_sign::<Blake2b512>(&expanded, &message, &verifying_key);

        self.set_signature(Some(&hex::encode_upper(signature.to_bytes())))
    }

    /// Verify the work in the block against the given difficulty (the
    /// block's own difficulty when `None`).
    pub fn verify_work(&self, difficulty: Option<u64>) -> Result<(), BlockError> {
        let difficulty = difficulty.unwrap_or(self.difficulty);
        let work = self
            .work
            .as_deref()
            .ok_or(BlockError::MissingField("work"))?;

        work::validate_work(&self.work_block_hash()?, work, difficulty)?;
        Ok(())
    }

    /// Solve the work for this block and attach it.
    ///
    /// A given `difficulty` replaces the block's difficulty before solving.
    /// Returns `true` when work was found, `false` when the timeout elapsed
    /// first. Fails with [`BlockError::WorkAlreadyValid`] when attached work
    /// already meets the difficulty.
    pub fn solve_work(
        &mut self,
        difficulty: Option<u64>,
        timeout: Option<Duration>,
    ) -> Result<bool, BlockError> {
        if let Some(difficulty) = difficulty {
            self.set_difficulty(difficulty);
        }
        let difficulty = self.difficulty;

        if self.work.is_some() && self.verify_work(Some(difficulty)).is_ok() {
            return Err(BlockError::WorkAlreadyValid);
        }

        match work::solve_work(&self.work_block_hash()?, difficulty, timeout)? {
            Some(work) => {
                self.set_work(Some(&work))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether the block carries a signature that verifies. Memoized; never
    /// fails, a missing account or signature counts as invalid.
    pub fn has_valid_signature(&self) -> bool {
        if let Some(cached) = self.cached_signature_valid.get() {
            return cached;
        }

        let valid = self.signature.is_some()
            && self.account.is_some()
            && self.verify_signature().is_ok();
        self.cached_signature_valid.set(Some(valid));
        valid
    }

    /// Whether the block carries work meeting its difficulty. Memoized;
    /// never fails, missing work counts as invalid.
    pub fn has_valid_work(&self) -> bool {
        if let Some(cached) = self.cached_work_valid.get() {
            return cached;
        }

        let valid = self.work.is_some() && self.verify_work(None).is_ok();
        self.cached_work_valid.set(Some(valid));
        valid
    }

    /// Whether the block has both a valid signature and valid work.
    pub fn complete(&self) -> bool {
        self.has_valid_signature() && self.has_valid_work()
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn previous(&self) -> Option<&str> {
        self.previous.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn representative(&self) -> Option<&str> {
        self.representative.as_deref()
    }

    pub fn balance(&self) -> Option<u128> {
        self.balance
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// The `link` field re-encoded as an account ID.
    pub fn link_as_account(&self) -> Option<String> {
        self.link.as_deref().and_then(|link| {
            account::get_account_id(KeySource::PublicKey(link), AccountPrefix::default()).ok()
        })
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn work(&self) -> Option<&str> {
        self.work.as_deref()
    }

    pub fn difficulty(&self) -> u64 {
        self.difficulty
    }

    /// Set the account ID. Clears the cached signature and work validity.
    pub fn set_account(&mut self, account: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        self.invalidate_work();
        match account {
            Some(account) => {
                account::validate_account_id(account)?;
                self.account = Some(account.to_string());
            }
            None => self.account = None,
        }
        Ok(())
    }

    /// Set the previous block hash; `None` stores the zero hash. Clears the
    /// cached signature and work validity.
    pub fn set_previous(&mut self, previous: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        self.invalidate_work();
        self.previous = Some(match previous {
            Some(previous) => validate_block_hash(previous)?,
            None => ZERO_BLOCK_HASH.to_string(),
        });
        Ok(())
    }

    /// Set the destination account ID. Clears the cached signature
    /// validity.
    pub fn set_destination(&mut self, destination: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        match destination {
            Some(destination) => {
                account::validate_account_id(destination)?;
                self.destination = Some(destination.to_string());
            }
            None => self.destination = None,
        }
        Ok(())
    }

    /// Set the representative account ID. Clears the cached signature
    /// validity.
    pub fn set_representative(&mut self, representative: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        match representative {
            Some(representative) => {
                account::validate_account_id(representative)?;
                self.representative = Some(representative.to_string());
            }
            None => self.representative = None,
        }
        Ok(())
    }

    /// Set the balance. Clears the cached signature validity.
    pub fn set_balance(&mut self, balance: Option<u128>) {
        self.invalidate_signature();
        self.balance = balance;
    }

    /// Set the source block hash. Clears the cached signature and work
    /// validity.
    pub fn set_source(&mut self, source: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        self.invalidate_work();
        match source {
            Some(source) => self.source = Some(validate_block_hash(source)?),
            None => self.source = None,
        }
        Ok(())
    }

    /// Set the link hash; `None` stores the zero hash. Clears the cached
    /// signature and work validity, since `link` steers the transaction
    /// classification and with it the work hash of state blocks.
    pub fn set_link(&mut self, link: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        self.invalidate_work();
        self.link = Some(match link {
            Some(link) => validate_block_hash(link)?,
            None => ZERO_BLOCK_HASH.to_string(),
        });
        Ok(())
    }

    /// Set the link from an account ID; `None` stores the zero hash. Clears
    /// the cached signature and work validity.
    pub fn set_link_as_account(&mut self, link_as_account: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        self.invalidate_work();
        self.link = Some(match link_as_account {
            Some(account_id) => {
                let public_key =
                    account::get_account_public_key(AccountSource::AccountId(account_id))?;
                public_key.to_uppercase()
            }
            None => ZERO_BLOCK_HASH.to_string(),
        });
        Ok(())
    }

    /// Set the signature. Clears the cached signature validity.
    pub fn set_signature(&mut self, signature: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_signature();
        match signature {
            Some(signature) => self.signature = Some(parse_signature(signature)?),
            None => self.signature = None,
        }
        Ok(())
    }

    /// Set the work. Clears the cached work validity.
    pub fn set_work(&mut self, work: Option<&str>) -> Result<(), BlockError> {
        self.invalidate_work();
        match work {
            Some(work) => self.work = Some(work::parse_work(work)?),
            None => self.work = None,
        }
        Ok(())
    }

    /// Set the difficulty used to validate attached work. Clears the cached
    /// work validity.
    pub fn set_difficulty(&mut self, difficulty: u64) {
        self.invalidate_work();
        self.difficulty = difficulty;
    }
}
