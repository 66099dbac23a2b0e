//! Error type shared by every stage of the multisig workflow.

use thiserror::Error;

/// Errors raised while building, signing or finalizing a multisig spend.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("insufficient funds: have {available} sat, need {required} sat")]
    InsufficientFunds { available: u64, required: u64 },
    #[error("invalid destination address: {0}")]
    InvalidAddress(String),
    #[error("invalid utxo reference: {0}")]
    InvalidUtxoReference(String),
    #[error("key {0} is not part of this multisig address")]
    UnknownSigner(String),
    #[error("transaction already signed by key {0}")]
    AlreadySigned(String),
    #[error("missing signatures, got {have} of {need} required")]
    InsufficientSignatures { have: usize, need: usize },
    #[error("invalid input index {index} (transaction has {inputs} inputs)")]
    InvalidInputIndex { index: usize, inputs: usize },
    #[error("signature by {signer} does not verify for input {input}")]
    InvalidSignature { signer: String, input: usize },
    #[error("key {signer} signed {signed} of {inputs} inputs")]
    IncompleteSignatures { signer: String, signed: usize, inputs: usize },
    #[error("signatures belong to a different transaction")]
    TransactionMismatch,
    #[error("config mismatch: {0}")]
    ConfigMismatch(String),
    #[error("descriptor error: {0}")]
    Descriptor(#[from] miniscript::Error),
    #[error("psbt error: {0}")]
    Psbt(#[from] bitcoin::psbt::Error),
    #[error("sighash error: {0}")]
    Sighash(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;
