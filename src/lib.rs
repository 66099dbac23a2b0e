//! M-of-N pay-to-script-hash multisig addresses and the transactions that
//! spend from them: build, collect signatures key by key, finalize.

pub mod address;
pub mod config;
pub mod error;
pub mod finalize;
pub mod keys;
pub mod psbt;
pub mod script;
pub mod signer;
pub mod transaction;
pub mod utxo;

pub use address::MultiSigAddress;
pub use bitcoin::Network;
pub use bitcoin::sighash::EcdsaSighashType;
pub use config::{AddressConfig, SpendRequest};
pub use error::{Error, Result};
pub use signer::{SignatureLedger, SignerState};
pub use transaction::SpendTransaction;
pub use utxo::{Output, SelectionPolicy, Utxo};

pub fn print_address_info(address: &MultiSigAddress) {
    println!("Network: {}", address.network());
    println!(
        "Threshold: {}-of-{}",
        address.signatures_required(),
        address.public_keys().len()
    );
    println!();
    for (i, key) in address.public_keys().iter().enumerate() {
        println!("Signer {}: {}", i + 1, key);
    }
    println!();
    println!("Redeem script: {}", address.redeem_script_asm());
    match address.descriptor() {
        Ok(descriptor) => println!("Descriptor: {}", descriptor),
        Err(e) => println!("Descriptor: unavailable ({})", e),
    }
    println!();
    println!("Address: {}", address);
}

pub fn print_spend_info(spend: &SpendTransaction) {
    let tx = spend.transaction();
    for (i, input) in tx.input.iter().enumerate() {
        println!("  Input {}: {}", i, input.previous_output);
    }
    for (i, output) in tx.output.iter().enumerate() {
        println!("  Output {}: {} sat -> {}", i, output.value.to_sat(), output.script_pubkey);
    }
    println!();
    println!("  Total In:  {} sat", spend.input_total().to_sat());
    println!("  Total Out: {} sat", spend.output_total().to_sat());
    println!("  Fee:       {} sat", spend.fee().to_sat());
    println!();
    for (key, state) in spend.ledger().iter() {
        let status = match state {
            SignerState::Signed(_) => "signed",
            SignerState::Unsigned => "-",
        };
        println!("  {} {}", status, key);
    }
    println!(
        "  Signatures: {}/{}",
        spend.signatures_provided(),
        spend.address().signatures_required()
    );
}
