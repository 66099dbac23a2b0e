//! PSBT interchange between signers working on separate copies of a spend.
//!
//! Exported PSBTs carry the redeem script on every input and one
//! `partial_sig` per input for each key that has signed. Importing only
//! ever fills unsigned ledger entries, and every imported signature is
//! verified first.

use crate::error::{Error, Result};
use crate::signer::SignerState;
use crate::transaction::SpendTransaction;
use base64::{Engine, engine::general_purpose::STANDARD};
use bitcoin::ecdsa::Signature;
use bitcoin::psbt::Psbt;

impl SpendTransaction {
    pub fn to_psbt(&self) -> Result<Psbt> {
        let mut psbt = Psbt::from_unsigned_tx(self.unsigned_transaction())?;
        for (index, input) in psbt.inputs.iter_mut().enumerate() {
            input.redeem_script = Some(self.address.redeem_script().clone());
            for (key, sigs) in self.ledger.signed() {
                input.partial_sigs.insert(*key, sigs[index]);
            }
        }
        Ok(psbt)
    }

    pub fn to_psbt_base64(&self) -> Result<String> {
        Ok(STANDARD.encode(self.to_psbt()?.serialize()))
    }

    /// Adopts signatures from a PSBT of the same unsigned transaction.
    /// Returns how many keys moved to signed.
    pub fn import_psbt(&mut self, psbt: &Psbt) -> Result<usize> {
        if psbt.unsigned_tx.compute_txid() != self.unsigned_transaction().compute_txid() {
            return Err(Error::TransactionMismatch);
        }
        let redeem_script = self.address.redeem_script();
        if psbt
            .inputs
            .iter()
            .filter_map(|i| i.redeem_script.as_ref())
            .any(|script| script != redeem_script)
        {
            return Err(Error::TransactionMismatch);
        }

        let mut found = Vec::new();
        for (key, state) in self.ledger.iter() {
            if *state != SignerState::Unsigned {
                continue;
            }
            let sigs: Vec<Signature> = psbt
                .inputs
                .iter()
                .filter_map(|input| {
                    input
                        .partial_sigs
                        .iter()
                        .find(|(k, _)| k.inner == key.inner)
                        .map(|(_, sig)| *sig)
                })
                .collect();
            if !sigs.is_empty() {
                found.push((*key, sigs));
            }
        }

        self.adopt_signatures(found)
    }

    pub fn import_psbt_base64(&mut self, encoded: &str) -> Result<usize> {
        let psbt = Psbt::deserialize(&STANDARD.decode(encoded.trim())?)?;
        self.import_psbt(&psbt)
    }

    /// Copies signatures from another copy of this spend, e.g. one signed in
    /// another process. Returns how many keys moved to signed.
    pub fn merge(&mut self, other: &SpendTransaction) -> Result<usize> {
        if self.address != other.address
            || self.unsigned_transaction().compute_txid()
                != other.unsigned_transaction().compute_txid()
        {
            return Err(Error::TransactionMismatch);
        }

        let found = other
            .ledger
            .signed()
            .filter(|(key, _)| !self.ledger.is_signed(key))
            .map(|(key, sigs)| (*key, sigs.to_vec()))
            .collect();
        self.adopt_signatures(found)
    }
}
