//! Unlocking script assembly.

use crate::error::{Error, Result};
use crate::transaction::SpendTransaction;
use bitcoin::ecdsa::Signature;
use bitcoin::opcodes::OP_0;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::{Script, ScriptBuf};

/// `OP_0 <sig_1> ... <sig_m> <redeem_script>`
///
/// The leading empty element is consumed by CHECKMULTISIG's extra pop.
pub fn unlocking_script<'a, I>(signatures: I, redeem_script: &Script) -> Result<ScriptBuf>
where
    I: IntoIterator<Item = &'a Signature>,
{
    let mut builder = Builder::new().push_opcode(OP_0);
    for sig in signatures {
        builder = builder.push_slice(push_bytes(sig.to_vec())?);
    }
    Ok(builder
        .push_slice(push_bytes(redeem_script.to_bytes())?)
        .into_script())
}

fn push_bytes(data: Vec<u8>) -> Result<PushBytesBuf> {
    PushBytesBuf::try_from(data)
        .map_err(|e| Error::InvalidParameters(format!("script push too large: {}", e)))
}

impl SpendTransaction {
    /// Assembles the unlocking script of every input.
    pub fn finalize(&mut self) -> Result<()> {
        self.check_threshold()?;
        for index in 0..self.tx.input.len() {
            self.finalize_input(index)?;
        }
        log::info!(
            "finalized {} inputs of {}",
            self.tx.input.len(),
            self.tx.compute_txid()
        );
        Ok(())
    }

    /// Assembles the unlocking script of one input, replacing any previous one.
    ///
    /// Exactly `signatures_required` signatures go in, taken in address key
    /// order; surplus signatures stay in the ledger.
    pub fn finalize_input(&mut self, index: usize) -> Result<()> {
        self.check_threshold()?;
        self.check_input_index(index)?;

        let required = self.address.signatures_required();
        let signed = self.ledger.signed_count();
        if signed > required {
            log::warn!(
                "input {}: using {} of {} collected signatures",
                index,
                required,
                signed
            );
        }

        let signatures = self
            .ledger
            .signed()
            .take(required)
            .map(|(_, sigs)| &sigs[index]);
        let script = unlocking_script(signatures, self.address.redeem_script())?;
        log::debug!("input {} unlocking script is {} bytes", index, script.len());

        self.tx.input[index].script_sig = script;
        Ok(())
    }

    /// Whether every input carries an unlocking script.
    pub fn is_finalized(&self) -> bool {
        !self.tx.input.is_empty() && self.tx.input.iter().all(|i| !i.script_sig.is_empty())
    }

    fn check_threshold(&self) -> Result<()> {
        let have = self.ledger.signed_count();
        let need = self.address.signatures_required();
        if have < need {
            return Err(Error::InsufficientSignatures { have, need });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{public_key_for, secret_key_from_slice};
    use crate::transaction::tests::{DEST, TXID_A, TXID_B, output, two_of_three, utxo};
    use bitcoin::script::Instruction;
    use bitcoin::secp256k1::SecretKey;
    use bitcoin::sighash::EcdsaSighashType;

    fn secret(byte: u8) -> SecretKey {
        secret_key_from_slice(&[byte; 32]).unwrap()
    }

    fn spend() -> SpendTransaction {
        SpendTransaction::new(
            &two_of_three(),
            &[utxo(TXID_A, 0, 0.4), utxo(TXID_B, 3, 0.6)],
            &[output(DEST, 0.9)],
        )
        .unwrap()
    }

    fn pushes(script: &Script) -> Vec<Vec<u8>> {
        script
            .instructions()
            .map(|i| match i.unwrap() {
                Instruction::PushBytes(data) => data.as_bytes().to_vec(),
                Instruction::Op(op) => panic!("unexpected opcode {}", op),
            })
            .collect()
    }

    #[test]
    fn below_threshold_reports_counts() {
        let mut tx = spend();
        assert!(matches!(
            tx.finalize(),
            Err(Error::InsufficientSignatures { have: 0, need: 2 })
        ));

        tx.sign(&secret(0x33), EcdsaSighashType::All).unwrap();
        assert!(matches!(
            tx.finalize_input(0),
            Err(Error::InsufficientSignatures { have: 1, need: 2 })
        ));
        assert!(!tx.is_finalized());
    }

    #[test]
    fn scripts_follow_key_order() {
        let mut tx = spend();
        tx.sign(&secret(0x33), EcdsaSighashType::All).unwrap();
        tx.sign(&secret(0x11), EcdsaSighashType::All).unwrap();
        tx.finalize().unwrap();
        assert!(tx.is_finalized());

        let first = public_key_for(&secret(0x11));
        let third = public_key_for(&secret(0x33));
        let sig_of = |key, index: usize| match tx.ledger().state(&key) {
            Some(crate::signer::SignerState::Signed(sigs)) => sigs[index].to_vec(),
            _ => panic!("key has not signed"),
        };

        for index in 0..tx.input_count() {
            let elements = pushes(&tx.transaction().input[index].script_sig);
            assert_eq!(elements.len(), 4);
            assert!(elements[0].is_empty());
            assert_eq!(elements[1], sig_of(first, index));
            assert_eq!(elements[2], sig_of(third, index));
            assert_eq!(elements[3], tx.address().redeem_script().to_bytes());
        }
    }

    #[test]
    fn refinalizing_is_stable_and_caps_signatures() {
        let mut tx = spend();
        tx.sign(&secret(0x11), EcdsaSighashType::All).unwrap();
        tx.sign(&secret(0x22), EcdsaSighashType::All).unwrap();
        tx.finalize().unwrap();
        let once = tx.transaction().clone();

        tx.finalize().unwrap();
        assert_eq!(tx.transaction(), &once);

        tx.sign(&secret(0x33), EcdsaSighashType::All).unwrap();
        tx.finalize().unwrap();
        assert_eq!(tx.transaction(), &once);
        assert_eq!(pushes(&tx.transaction().input[1].script_sig).len(), 4);
    }

    #[test]
    fn single_input_and_range_check() {
        let mut tx = spend();
        tx.sign(&secret(0x11), EcdsaSighashType::All).unwrap();
        tx.sign(&secret(0x22), EcdsaSighashType::All).unwrap();

        tx.finalize_input(1).unwrap();
        assert!(tx.transaction().input[0].script_sig.is_empty());
        assert!(!tx.transaction().input[1].script_sig.is_empty());
        assert!(!tx.is_finalized());

        assert!(matches!(
            tx.finalize_input(2),
            Err(Error::InvalidInputIndex { index: 2, inputs: 2 })
        ));
    }
}
