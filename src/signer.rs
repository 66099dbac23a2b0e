//! Signature collection for a [`SpendTransaction`].
//!
//! Every key of the address gets one ledger entry. An entry starts out
//! unsigned and moves to signed exactly once, carrying one signature per
//! transaction input in input order.

use crate::error::{Error, Result};
use crate::keys::{parse_wif, public_key_for};
use crate::transaction::SpendTransaction;
use bitcoin::ecdsa::Signature;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{Message, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{NetworkKind, PublicKey, Script, Transaction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerState {
    Unsigned,
    /// One signature per input, in input order.
    Signed(Vec<Signature>),
}

/// Per-key signing state, iterated in address key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureLedger {
    entries: Vec<(PublicKey, SignerState)>,
}

impl SignatureLedger {
    pub(crate) fn new(keys: &[PublicKey]) -> Self {
        Self {
            entries: keys.iter().map(|k| (*k, SignerState::Unsigned)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn state(&self, key: &PublicKey) -> Option<&SignerState> {
        self.entries
            .iter()
            .find(|(k, _)| k.inner == key.inner)
            .map(|(_, state)| state)
    }

    pub fn is_signed(&self, key: &PublicKey) -> bool {
        matches!(self.state(key), Some(SignerState::Signed(_)))
    }

    pub fn signed_count(&self) -> usize {
        self.signed().count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PublicKey, &SignerState)> {
        self.entries.iter().map(|(k, s)| (k, s))
    }

    /// Keys that have signed, with their per-input signatures.
    pub fn signed(&self) -> impl Iterator<Item = (&PublicKey, &[Signature])> {
        self.entries.iter().filter_map(|(k, s)| match s {
            SignerState::Signed(sigs) => Some((k, sigs.as_slice())),
            SignerState::Unsigned => None,
        })
    }

    fn record(&mut self, position: usize, signatures: Vec<Signature>) -> Result<()> {
        let (key, state) = &mut self.entries[position];
        if let SignerState::Signed(_) = state {
            return Err(Error::AlreadySigned(key.to_string()));
        }
        *state = SignerState::Signed(signatures);
        Ok(())
    }
}

/// Legacy (pre-segwit) sighash of `index`, with `script_code` standing in for
/// the spent output's script.
pub fn legacy_sighash(
    tx: &Transaction,
    index: usize,
    script_code: &Script,
    sighash_type: EcdsaSighashType,
) -> Result<Message> {
    let sighash = SighashCache::new(tx)
        .legacy_signature_hash(index, script_code, sighash_type.to_u32())
        .map_err(|e| Error::Sighash(e.to_string()))?;
    Ok(Message::from_digest(*sighash.as_byte_array()))
}

/// SIGHASH_SINGLE on an input past the last output signs the digest `1`
/// instead of failing.
fn signs_without_matching_output(
    sighash_type: EcdsaSighashType,
    index: usize,
    outputs: usize,
) -> bool {
    matches!(
        sighash_type,
        EcdsaSighashType::Single | EcdsaSighashType::SinglePlusAnyoneCanPay
    ) && index >= outputs
}

impl SpendTransaction {
    /// Signs every input with a raw private key.
    pub fn sign(&mut self, secret: &SecretKey, sighash_type: EcdsaSighashType) -> Result<()> {
        let key = public_key_for(secret);
        let position = self
            .address
            .position_of(&key)
            .ok_or_else(|| Error::UnknownSigner(key.to_string()))?;
        if self.ledger.is_signed(&key) {
            return Err(Error::AlreadySigned(key.to_string()));
        }

        let secp = Secp256k1::signing_only();
        let redeem_script = self.address.redeem_script();
        let mut signatures = Vec::with_capacity(self.tx.input.len());
        for index in 0..self.tx.input.len() {
            if signs_without_matching_output(sighash_type, index, self.tx.output.len()) {
                log::warn!(
                    "input {} has no matching output, {} commits to the constant 1 digest",
                    index,
                    sighash_type
                );
            }
            let message = legacy_sighash(&self.tx, index, redeem_script, sighash_type)?;
            let signature = secp.sign_ecdsa(&message, secret);
            log::debug!("input {} signed by {} ({})", index, key, sighash_type);
            signatures.push(Signature { signature, sighash_type });
        }

        self.ledger.record(position, signatures)?;
        log::info!(
            "{} signed, {} of {} required signatures present",
            key,
            self.ledger.signed_count(),
            self.address.signatures_required()
        );
        Ok(())
    }

    /// Signs every input with a WIF encoded private key.
    pub fn sign_with_wif(&mut self, wif: &str, sighash_type: EcdsaSighashType) -> Result<()> {
        let key = parse_wif(wif)?;
        if key.network != NetworkKind::from(self.address.network()) {
            log::warn!(
                "wif key is for {:?}, spend is on {}",
                key.network,
                self.address.network()
            );
        }
        self.sign(&key.inner, sighash_type)
    }

    /// Number of keys that have signed.
    pub fn signatures_provided(&self) -> usize {
        self.ledger.signed_count()
    }

    /// Checks every collected signature against its signer's key.
    pub fn verify_signatures(&self) -> Result<()> {
        for (key, signatures) in self.ledger.signed() {
            self.verify_for(key, signatures)?;
        }
        Ok(())
    }

    /// Records signatures produced elsewhere. Every entry is checked and
    /// verified before any of them is recorded, so on error the ledger is
    /// unchanged. Returns how many keys moved to signed.
    pub(crate) fn adopt_signatures(
        &mut self,
        found: Vec<(PublicKey, Vec<Signature>)>,
    ) -> Result<usize> {
        let mut checked = Vec::with_capacity(found.len());
        for (key, signatures) in found {
            let position = self
                .address
                .position_of(&key)
                .ok_or_else(|| Error::UnknownSigner(key.to_string()))?;
            if self.ledger.is_signed(&key) || checked.iter().any(|(p, _, _)| *p == position) {
                return Err(Error::AlreadySigned(key.to_string()));
            }
            if signatures.len() != self.tx.input.len() {
                return Err(Error::IncompleteSignatures {
                    signer: key.to_string(),
                    signed: signatures.len(),
                    inputs: self.tx.input.len(),
                });
            }
            self.verify_for(&key, &signatures)?;
            checked.push((position, key, signatures));
        }

        let count = checked.len();
        for (position, key, signatures) in checked {
            self.ledger.record(position, signatures)?;
            log::info!("adopted signatures from {}", key);
        }
        Ok(count)
    }

    fn verify_for(&self, key: &PublicKey, signatures: &[Signature]) -> Result<()> {
        let secp = Secp256k1::verification_only();
        for (index, sig) in signatures.iter().enumerate() {
            let message =
                legacy_sighash(&self.tx, index, self.address.redeem_script(), sig.sighash_type)?;
            secp.verify_ecdsa(&message, &sig.signature, &key.inner)
                .map_err(|_| Error::InvalidSignature {
                    signer: key.to_string(),
                    input: index,
                })?;
        }
        Ok(())
    }
}
