//! Parsing of externally supplied key material.
//!
//! Public keys arrive as hex (compressed or uncompressed SEC encoding) and are
//! always carried as compressed keys from here on. Private keys arrive either
//! as raw 32-byte secrets (hex) or as WIF strings.

use crate::error::{Error, Result};
use bitcoin::secp256k1::{self, Secp256k1, SecretKey};
use bitcoin::{PrivateKey, PublicKey};

/// Parses a hex encoded public key into its compressed form.
pub fn parse_public_key(encoded: &str) -> Result<PublicKey> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| Error::ParseError(format!("public key {}: {}", encoded, e)))?;
    let inner = secp256k1::PublicKey::from_slice(&bytes)
        .map_err(|e| Error::ParseError(format!("public key {}: {}", encoded, e)))?;
    Ok(PublicKey::new(inner))
}

/// Parses an ordered list of hex public keys, preserving order.
pub fn parse_public_keys<I, S>(encoded: I) -> Result<Vec<PublicKey>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    encoded
        .into_iter()
        .map(|key| parse_public_key(key.as_ref()))
        .collect()
}

/// Builds a secret key from its raw 32 bytes.
pub fn secret_key_from_slice(bytes: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(bytes).map_err(|e| Error::ParseError(format!("private key: {}", e)))
}

/// Parses a hex encoded raw private key.
pub fn parse_secret_key_hex(encoded: &str) -> Result<SecretKey> {
    let bytes = hex::decode(encoded.trim())
        .map_err(|e| Error::ParseError(format!("private key: {}", e)))?;
    secret_key_from_slice(&bytes)
}

/// Decodes a WIF private key, checksum included.
pub fn parse_wif(wif: &str) -> Result<PrivateKey> {
    PrivateKey::from_wif(wif.trim()).map_err(|e| Error::ParseError(format!("wif: {}", e)))
}

/// Compressed public key belonging to `secret`.
pub fn public_key_for(secret: &SecretKey) -> PublicKey {
    let secp = Secp256k1::signing_only();
    PublicKey::new(secp256k1::PublicKey::from_secret_key(&secp, secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::NetworkKind;

    const PRIVKEY_HEX: &str = "9a7026f99a0452991d675cad5cf8ec4a1cba046cbc67f41f8b9fccdd993328a8";
    const PUBKEY_HEX: &str = "0234bb639abd8f8a108013674a6d90582189afd06fc529147a854ec4dc43565e4f";
    const TESTNET_WIF: &str = "cTG4L8A7QAr5FyhwW2sYg35ydGLTs8o19ypnBoNhzubKdLpwBZBN";

    #[test]
    fn raw_private_key_derives_known_public_key() {
        let secret = parse_secret_key_hex(PRIVKEY_HEX).unwrap();
        assert_eq!(public_key_for(&secret), parse_public_key(PUBKEY_HEX).unwrap());
    }

    #[test]
    fn public_keys_are_kept_compressed() {
        let key = parse_public_key(PUBKEY_HEX).unwrap();
        assert!(key.compressed);
        assert_eq!(key.to_bytes().len(), 33);
        assert_eq!(hex::encode(key.to_bytes()), PUBKEY_HEX);
    }

    #[test]
    fn uncompressed_input_is_normalised() {
        let secp = Secp256k1::new();
        let secret = secret_key_from_slice(&[0x11; 32]).unwrap();
        let full = secp256k1::PublicKey::from_secret_key(&secp, &secret).serialize_uncompressed();

        let key = parse_public_key(&hex::encode(full)).unwrap();
        assert!(key.compressed);
        assert_eq!(key, public_key_for(&secret));
    }

    #[test]
    fn wif_decodes_testnet_key() {
        let key = parse_wif(TESTNET_WIF).unwrap();
        assert_eq!(key.network, NetworkKind::Test);
        assert!(key.compressed);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(parse_public_key("zz"), Err(Error::ParseError(_))));
        assert!(matches!(parse_public_key(&PUBKEY_HEX[..64]), Err(Error::ParseError(_))));
        // x coordinate above the field prime
        assert!(parse_public_key(&format!("02{}", "ff".repeat(32))).is_err());
        assert!(parse_secret_key_hex("abcd").is_err());
        assert!(parse_secret_key_hex(&"00".repeat(32)).is_err());

        let mut wif = TESTNET_WIF.to_string();
        wif.pop();
        wif.push('M');
        assert!(matches!(parse_wif(&wif), Err(Error::ParseError(_))));
    }

    #[test]
    fn list_preserves_order() {
        let a = public_key_for(&secret_key_from_slice(&[0x22; 32]).unwrap());
        let b = public_key_for(&secret_key_from_slice(&[0x11; 32]).unwrap());
        let parsed =
            parse_public_keys([hex::encode(a.to_bytes()), hex::encode(b.to_bytes())]).unwrap();
        assert_eq!(parsed, vec![a, b]);
    }
}
