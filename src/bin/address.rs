//! Creates an M-of-N P2SH multisig address from hex public keys.

use clap::Parser;
use p2sh_multisig::{AddressConfig, MultiSigAddress, Network, print_address_info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "address", about = "Create an M-of-N P2SH multisig address")]
struct Args {
    /// bitcoin, testnet, signet or regtest
    #[arg(short, long, default_value = "testnet")]
    network: Network,

    /// Signatures required to spend (M)
    #[arg(short = 'm', long)]
    threshold: usize,

    /// Hex public keys, in script order
    #[arg(required = true)]
    public_keys: Vec<String>,

    /// Where to write the address config
    #[arg(short, long, default_value = "address.json")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let address = MultiSigAddress::from_hex_keys(args.network, args.threshold, &args.public_keys)?;
    print_address_info(&address);

    AddressConfig::from_address(&address).save(&args.output)?;
    println!("\nSaved to: {}", args.output.display());
    println!("Share this file with every signer; fund the address, then list its UTXOs in spend.json.");

    Ok(())
}
