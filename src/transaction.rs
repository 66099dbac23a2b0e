//! Unsigned spends from a multisig address.

use crate::address::MultiSigAddress;
use crate::error::{Error, Result};
use crate::signer::SignatureLedger;
use crate::utxo::{Output, SelectionPolicy, Utxo, output_total_sats, select_utxos, to_sats, utxo_total_sats};
use bitcoin::consensus::encode;
use bitcoin::{
    Address, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness,
    absolute, transaction,
};
use std::str::FromStr;

/// A transaction spending outputs locked to a [`MultiSigAddress`], together
/// with the signatures collected for it so far.
#[derive(Debug, Clone)]
pub struct SpendTransaction {
    pub(crate) tx: Transaction,
    pub(crate) address: MultiSigAddress,
    pub(crate) ledger: SignatureLedger,
    input_values: Vec<Amount>,
}

impl SpendTransaction {
    /// Spends every UTXO in `utxos`, in order, to `outputs`, in order.
    pub fn new(address: &MultiSigAddress, utxos: &[Utxo], outputs: &[Output]) -> Result<Self> {
        let available = utxo_total_sats(utxos)?;
        let required = output_total_sats(outputs)?;
        if available < required {
            return Err(Error::InsufficientFunds { available, required });
        }

        let mut input = Vec::with_capacity(utxos.len());
        let mut input_values = Vec::with_capacity(utxos.len());
        for utxo in utxos {
            let txid = Txid::from_str(&utxo.hash)
                .map_err(|_| Error::InvalidUtxoReference(utxo.hash.clone()))?;
            input.push(TxIn {
                previous_output: OutPoint::new(txid, utxo.vout),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            });
            input_values.push(Amount::from_sat(to_sats(utxo.amount)?));
        }

        let mut output = Vec::with_capacity(outputs.len());
        for target in outputs {
            let destination = Address::from_str(&target.address)
                .ok()
                .and_then(|addr| addr.require_network(address.network()).ok())
                .ok_or_else(|| Error::InvalidAddress(target.address.clone()))?;
            output.push(TxOut {
                value: Amount::from_sat(to_sats(target.amount)?),
                script_pubkey: destination.script_pubkey(),
            });
        }

        let tx = Transaction {
            version: transaction::Version::ONE,
            lock_time: absolute::LockTime::ZERO,
            input,
            output,
        };

        log::info!(
            "built spend from {}: {} inputs, {} outputs, {} sat in, {} sat out",
            address,
            tx.input.len(),
            tx.output.len(),
            available,
            required
        );

        Ok(Self {
            tx,
            ledger: SignatureLedger::new(address.public_keys()),
            address: address.clone(),
            input_values,
        })
    }

    /// Selects inputs from `utxos` with [`SelectionPolicy::IncludeCrossing`]
    /// before building the spend.
    pub fn with_auto_selection(
        address: &MultiSigAddress,
        utxos: &[Utxo],
        outputs: &[Output],
    ) -> Result<Self> {
        Self::with_selection(address, utxos, outputs, SelectionPolicy::IncludeCrossing)
    }

    pub fn with_selection(
        address: &MultiSigAddress,
        utxos: &[Utxo],
        outputs: &[Output],
        policy: SelectionPolicy,
    ) -> Result<Self> {
        let selected = select_utxos(utxos, outputs, policy)?;
        Self::new(address, &selected, outputs)
    }

    pub fn address(&self) -> &MultiSigAddress {
        &self.address
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn ledger(&self) -> &SignatureLedger {
        &self.ledger
    }

    /// The transaction with every unlocking script cleared.
    pub fn unsigned_transaction(&self) -> Transaction {
        let mut tx = self.tx.clone();
        for input in &mut tx.input {
            input.script_sig = ScriptBuf::new();
        }
        tx
    }

    pub fn input_count(&self) -> usize {
        self.tx.input.len()
    }

    pub fn output_count(&self) -> usize {
        self.tx.output.len()
    }

    pub fn input_total(&self) -> Amount {
        sum_amounts(self.input_values.iter().copied())
    }

    pub fn output_total(&self) -> Amount {
        sum_amounts(self.tx.output.iter().map(|o| o.value))
    }

    /// Inputs minus outputs; zero when outputs exceed inputs.
    pub fn fee(&self) -> Amount {
        self.input_total()
            .checked_sub(self.output_total())
            .unwrap_or(Amount::ZERO)
    }

    /// Legacy wire encoding as hex.
    pub fn serialize_hex(&self) -> String {
        encode::serialize_hex(&self.tx)
    }

    pub(crate) fn check_input_index(&self, index: usize) -> Result<()> {
        if index >= self.tx.input.len() {
            return Err(Error::InvalidInputIndex {
                index,
                inputs: self.tx.input.len(),
            });
        }
        Ok(())
    }
}

/// Saturates at `Amount::MAX`; construction already bounds every total.
fn sum_amounts(mut amounts: impl Iterator<Item = Amount>) -> Amount {
    amounts
        .try_fold(Amount::ZERO, |acc, a| acc.checked_add(a))
        .unwrap_or(Amount::MAX)
}
