//! Builds the unsigned spend and writes it out as a PSBT.

use clap::Parser;
use p2sh_multisig::utxo::select_utxos;
use p2sh_multisig::{AddressConfig, SelectionPolicy, SpendRequest, SpendTransaction, print_spend_info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coordinator", about = "Create an unsigned spend from a multisig address")]
struct Args {
    /// Address config written by `address`
    #[arg(short, long, default_value = "address.json")]
    address: PathBuf,

    /// Candidate UTXOs and payment targets
    #[arg(short, long, default_value = "spend.json")]
    spend: PathBuf,

    /// Spend only the largest UTXOs needed to cover the outputs
    #[arg(long)]
    auto_select: bool,

    /// Stop before the UTXO that crosses the target (literal greedy selection)
    #[arg(long, requires = "auto_select")]
    exclude_crossing: bool,

    /// Spend plan (the UTXOs actually used) for signers and the finalizer
    #[arg(long, default_value = "spend.plan.json")]
    plan: PathBuf,

    #[arg(short, long, default_value = "unsigned.psbt.base64")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let address = AddressConfig::load(&args.address)?.build()?;
    let mut request = SpendRequest::load(&args.spend)?;
    println!("Spending from {}\n", address);

    if args.auto_select {
        let policy = if args.exclude_crossing {
            SelectionPolicy::ExcludeCrossing
        } else {
            SelectionPolicy::IncludeCrossing
        };
        let candidates = request.utxos.len();
        request.utxos = select_utxos(&request.utxos, &request.outputs, policy)?;
        println!("Selected {} of {} UTXOs ({:?})\n", request.utxos.len(), candidates, policy);
    }

    let spend = SpendTransaction::new(&address, &request.utxos, &request.outputs)?;
    print_spend_info(&spend);

    request.save(&args.plan)?;
    std::fs::write(&args.output, spend.to_psbt_base64()?)?;

    println!("\nPSBT created: {}", args.output.display());
    println!("Plan saved:   {}", args.plan.display());
    println!("\nNext: cargo run --bin signer -- --wif <WIF> --psbt {}", args.output.display());

    Ok(())
}
