//! Combines signed PSBTs, assembles every unlocking script and prints the
//! raw transaction.

use bitcoin::consensus::encode;
use clap::Parser;
use p2sh_multisig::{AddressConfig, SpendRequest, SpendTransaction};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "finalizer", about = "Finalize a multisig spend and extract the raw TX")]
struct Args {
    /// Signed PSBTs, one or more
    #[arg(required = true)]
    psbts: Vec<PathBuf>,

    #[arg(short, long, default_value = "address.json")]
    address: PathBuf,

    #[arg(long, default_value = "spend.plan.json")]
    plan: PathBuf,

    #[arg(short, long, default_value = "final_tx.hex")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let address = AddressConfig::load(&args.address)?.build()?;
    let request = SpendRequest::load(&args.plan)?;
    let mut spend = SpendTransaction::new(&address, &request.utxos, &request.outputs)?;

    for path in &args.psbts {
        let adopted = spend.import_psbt_base64(&std::fs::read_to_string(path)?)?;
        println!("{}: {} new signers", path.display(), adopted);
    }
    println!(
        "\nSignatures: {}/{}",
        spend.signatures_provided(),
        address.signatures_required()
    );

    spend.verify_signatures()?;
    spend.finalize()?;

    let tx = spend.transaction();
    let tx_hex = spend.serialize_hex();

    println!("\nTXID: {}", tx.compute_txid());
    println!("Size: {} bytes", encode::serialize(tx).len());
    println!("Fee:  {} sat", spend.fee().to_sat());
    println!("\nSigned Transaction (Hex):\n{}", tx_hex);

    std::fs::write(&args.output, &tx_hex)?;
    println!("\nSaved to: {}", args.output.display());

    Ok(())
}
