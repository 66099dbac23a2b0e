//! Pay-to-script-hash multisig addresses.

use crate::error::{Error, Result};
use crate::keys::parse_public_keys;
use crate::script::multisig_redeem_script;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Network, PublicKey, ScriptBuf, ScriptHash};
use miniscript::{Descriptor, Miniscript, Terminal, Threshold};
use std::fmt;

/// Wraps a 20-byte script hash into a P2SH address for `network`.
pub fn p2sh_address(script_hash: &[u8], network: Network) -> Result<Address> {
    let hash = ScriptHash::from_slice(script_hash).map_err(|_| {
        Error::ParseError(format!("script hash must be 20 bytes, got {}", script_hash.len()))
    })?;
    Ok(Address::p2sh_from_hash(hash, network))
}

/// An M-of-N multisig address. Everything here is derived from the ordered
/// key set, the threshold and the network, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSigAddress {
    public_keys: Vec<PublicKey>,
    signatures_required: usize,
    redeem_script: ScriptBuf,
    script_hash: ScriptHash,
    network: Network,
    address: Address,
}

impl MultiSigAddress {
    pub fn new(
        network: Network,
        signatures_required: usize,
        public_keys: Vec<PublicKey>,
    ) -> Result<Self> {
        let redeem_script = multisig_redeem_script(signatures_required, &public_keys)?;
        let script_hash = redeem_script.script_hash();
        let address = p2sh_address(script_hash.as_byte_array(), network)?;

        log::debug!(
            "derived {}-of-{} address {} on {}",
            signatures_required,
            public_keys.len(),
            address,
            network
        );

        Ok(Self {
            public_keys,
            signatures_required,
            redeem_script,
            script_hash,
            network,
            address,
        })
    }

    /// Builds an address from hex encoded public keys.
    pub fn from_hex_keys<I, S>(network: Network, signatures_required: usize, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(network, signatures_required, parse_public_keys(keys)?)
    }

    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    pub fn signatures_required(&self) -> usize {
        self.signatures_required
    }

    pub fn redeem_script(&self) -> &ScriptBuf {
        &self.redeem_script
    }

    pub fn script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Address string for the configured network.
    pub fn encoded(&self) -> String {
        self.address.to_string()
    }

    /// Human readable disassembly of the redeem script.
    pub fn redeem_script_asm(&self) -> String {
        self.redeem_script.to_asm_string()
    }

    /// Locking script that pays to this address.
    pub fn script_pubkey(&self) -> ScriptBuf {
        self.address.script_pubkey()
    }

    /// `sh(multi(..))` descriptor with the keys in address order.
    ///
    /// Key sets whose redeem script exceeds the legacy push limit have no
    /// descriptor and fail here even though the address itself is valid.
    pub fn descriptor(&self) -> Result<Descriptor<PublicKey>> {
        let thresh = Threshold::new(self.signatures_required, self.public_keys.clone())
            .map_err(miniscript::Error::Threshold)?;
        Ok(Descriptor::new_sh(Miniscript::from_ast(Terminal::Multi(thresh))?)?)
    }

    pub(crate) fn position_of(&self, key: &PublicKey) -> Option<usize> {
        self.public_keys.iter().position(|k| k.inner == key.inner)
    }
}

impl fmt::Display for MultiSigAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
