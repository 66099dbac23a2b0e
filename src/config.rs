//! JSON files shared between the command line tools.

use crate::address::MultiSigAddress;
use crate::error::{Error, Result};
use crate::utxo::{Output, Utxo};
use bitcoin::Network;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to rebuild a [`MultiSigAddress`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressConfig {
    pub network: Network,
    pub threshold: usize,
    /// Hex public keys, in script order.
    pub public_keys: Vec<String>,
    /// The derived address, checked on [`AddressConfig::build`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl AddressConfig {
    pub fn from_address(address: &MultiSigAddress) -> Self {
        Self {
            network: address.network(),
            threshold: address.signatures_required(),
            public_keys: address
                .public_keys()
                .iter()
                .map(|k| hex::encode(k.to_bytes()))
                .collect(),
            address: Some(address.encoded()),
        }
    }

    pub fn build(&self) -> Result<MultiSigAddress> {
        let address = MultiSigAddress::from_hex_keys(self.network, self.threshold, &self.public_keys)?;
        if let Some(expected) = &self.address {
            if *expected != address.encoded() {
                return Err(Error::ConfigMismatch(format!(
                    "keys derive {}, config says {}",
                    address, expected
                )));
            }
        }
        Ok(address)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }
}

/// Funds available to a spend and where they go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRequest {
    pub utxos: Vec<Utxo>,
    pub outputs: Vec<Output>,
}

impl SpendRequest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_json(self, path)
    }
}

fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    log::debug!("reading {}", path.display());
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn save_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    log::debug!("writing {}", path.display());
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::tests::{DEST, TXID_A, output, two_of_three, utxo};

    #[test]
    fn address_config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("address.json");
        let addr = two_of_three();

        AddressConfig::from_address(&addr).save(&path).unwrap();
        let loaded = AddressConfig::load(&path).unwrap();

        assert_eq!(loaded.network, Network::Testnet);
        assert_eq!(loaded.build().unwrap(), addr);
    }

    #[test]
    fn tampered_address_is_caught() {
        let mut config = AddressConfig::from_address(&two_of_three());
        config.threshold = 3;
        assert!(matches!(config.build(), Err(Error::ConfigMismatch(_))));

        config.address = None;
        assert_eq!(config.build().unwrap().signatures_required(), 3);
    }

    #[test]
    fn spend_request_reads_plain_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spend.json");
        std::fs::write(
            &path,
            format!(
                r#"{{"utxos":[{{"hash":"{}","vout":1,"amount":0.0002}}],
                    "outputs":[{{"address":"{}","amount":0.00015}}]}}"#,
                TXID_A, DEST
            ),
        )
        .unwrap();

        let request = SpendRequest::load(&path).unwrap();
        assert_eq!(request.utxos, vec![utxo(TXID_A, 1, 0.0002)]);
        assert_eq!(request.outputs, vec![output(DEST, 0.00015)]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SpendRequest::load(dir.path().join("absent.json")),
            Err(Error::Io(_))
        ));
    }
}
