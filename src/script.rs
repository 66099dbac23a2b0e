//! Bare M-of-N CHECKMULTISIG redeem scripts.

use crate::error::{Error, Result};
use bitcoin::opcodes::all::OP_CHECKMULTISIG;
use bitcoin::script::Builder;
use bitcoin::{PublicKey, ScriptBuf};

/// Consensus ceiling on the number of keys a small-integer push can express.
pub const MAX_MULTISIG_KEYS: usize = 16;

/// Checks `threshold` against the key set.
pub fn check_parameters(threshold: usize, keys: &[PublicKey]) -> Result<()> {
    if keys.is_empty() || keys.len() > MAX_MULTISIG_KEYS {
        return Err(Error::InvalidParameters(format!(
            "invalid number of public keys: {} (expected 1..={})",
            keys.len(),
            MAX_MULTISIG_KEYS
        )));
    }
    if threshold == 0 {
        return Err(Error::InvalidParameters(
            "signatures required must be at least 1".to_string(),
        ));
    }
    if threshold > keys.len() {
        return Err(Error::InvalidParameters(format!(
            "signatures required {} exceeds key count {}",
            threshold,
            keys.len()
        )));
    }
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            return Err(Error::InvalidParameters(format!("duplicate public key {}", key)));
        }
    }
    Ok(())
}

/// `<threshold> <key_1> ... <key_n> <n> OP_CHECKMULTISIG`, keys in the given order.
pub fn multisig_redeem_script(threshold: usize, keys: &[PublicKey]) -> Result<ScriptBuf> {
    check_parameters(threshold, keys)?;

    let mut builder = Builder::new().push_int(threshold as i64);
    for key in keys {
        builder = builder.push_key(key);
    }
    Ok(builder
        .push_int(keys.len() as i64)
        .push_opcode(OP_CHECKMULTISIG)
        .into_script())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{public_key_for, secret_key_from_slice};
    use bitcoin::opcodes::Opcode;
    use bitcoin::script::Instruction;
    use rand::RngCore;

    fn key(byte: u8) -> PublicKey {
        public_key_for(&secret_key_from_slice(&[byte; 32]).unwrap())
    }

    fn random_keys(n: usize) -> Vec<PublicKey> {
        let mut keys = Vec::with_capacity(n);
        while keys.len() < n {
            let mut seed = [0u8; 32];
            rand::rngs::OsRng.fill_bytes(&mut seed);
            if let Ok(secret) = secret_key_from_slice(&seed) {
                keys.push(public_key_for(&secret));
            }
        }
        keys
    }

    fn small_int(n: usize) -> Opcode {
        Opcode::from(0x50 + n as u8)
    }

    #[test]
    fn two_of_three_layout() {
        let keys = vec![key(1), key(2), key(3)];
        let script = multisig_redeem_script(2, &keys).unwrap();
        let bytes = script.as_bytes();

        assert_eq!(bytes.len(), 1 + 3 * 34 + 2);
        assert_eq!(bytes[0], 0x52);
        assert_eq!(bytes[1], 33);
        assert_eq!(&bytes[2..35], &keys[0].to_bytes()[..]);
        assert_eq!(bytes[bytes.len() - 2], 0x53);
        assert_eq!(bytes[bytes.len() - 1], 0xae);
    }

    #[test]
    fn threshold_and_count_follow_parameters() {
        for n in 1..=MAX_MULTISIG_KEYS {
            let keys = random_keys(n);
            for t in 1..=n {
                let script = multisig_redeem_script(t, &keys).unwrap();
                let instructions: Vec<_> =
                    script.instructions().collect::<std::result::Result<_, _>>().unwrap();

                assert_eq!(instructions.len(), n + 3);
                assert_eq!(instructions[0], Instruction::Op(small_int(t)));
                for (i, key) in keys.iter().enumerate() {
                    match instructions[i + 1] {
                        Instruction::PushBytes(data) => {
                            assert_eq!(data.as_bytes(), &key.to_bytes()[..])
                        }
                        ref other => panic!("expected key push, got {:?}", other),
                    }
                }
                assert_eq!(instructions[n + 1], Instruction::Op(small_int(n)));
                assert_eq!(instructions[n + 2], Instruction::Op(OP_CHECKMULTISIG));
            }
        }
    }

    #[test]
    fn key_order_is_significant() {
        let a = multisig_redeem_script(1, &[key(1), key(2)]).unwrap();
        let b = multisig_redeem_script(1, &[key(2), key(1)]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_bad_parameters() {
        let three = vec![key(1), key(2), key(3)];
        let seventeen = random_keys(17);

        for (t, keys) in [(0, &three[..]), (4, &three[..]), (1, &[][..]), (1, &seventeen[..])] {
            assert!(matches!(
                multisig_redeem_script(t, keys),
                Err(Error::InvalidParameters(_))
            ));
        }
    }

    #[test]
    fn rejects_duplicate_keys() {
        let keys = vec![key(1), key(2), key(1)];
        assert!(matches!(check_parameters(2, &keys), Err(Error::InvalidParameters(_))));
    }
}
