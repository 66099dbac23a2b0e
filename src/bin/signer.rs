//! Adds one key's signatures to a spend.
//!
//! The spend is rebuilt from the address config and spend plan, signatures
//! already present in the incoming PSBT are adopted, and this key signs
//! every input.

use clap::Parser;
use p2sh_multisig::keys::{parse_secret_key_hex, parse_wif, public_key_for};
use p2sh_multisig::{AddressConfig, EcdsaSighashType, SpendRequest, SpendTransaction, print_spend_info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signer", about = "Sign a multisig spend with one key")]
struct Args {
    #[arg(short, long, default_value = "address.json")]
    address: PathBuf,

    #[arg(long, default_value = "spend.plan.json")]
    plan: PathBuf,

    /// PSBT produced by the coordinator or a previous signer
    #[arg(short, long, default_value = "unsigned.psbt.base64")]
    psbt: PathBuf,

    /// Raw private key as hex
    #[arg(long, conflicts_with = "wif", required_unless_present = "wif")]
    key: Option<String>,

    /// WIF encoded private key
    #[arg(long)]
    wif: Option<String>,

    /// SIGHASH_ALL, SIGHASH_NONE, SIGHASH_SINGLE, or one of them with _ANYONECANPAY
    #[arg(long, default_value = "SIGHASH_ALL")]
    sighash: EcdsaSighashType,

    /// Output PSBT, defaults to signed_by_<key prefix>.psbt.base64
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let address = AddressConfig::load(&args.address)?.build()?;
    let request = SpendRequest::load(&args.plan)?;
    let mut spend = SpendTransaction::new(&address, &request.utxos, &request.outputs)?;

    let imported = spend.import_psbt_base64(&std::fs::read_to_string(&args.psbt)?)?;
    println!("Loaded {} ({} existing signers)\n", args.psbt.display(), imported);

    // verify before signing
    print_spend_info(&spend);

    let signer = match (&args.key, &args.wif) {
        (Some(hex), _) => {
            let secret = parse_secret_key_hex(hex)?;
            spend.sign(&secret, args.sighash)?;
            public_key_for(&secret)
        }
        (None, Some(wif)) => {
            spend.sign_with_wif(wif, args.sighash)?;
            public_key_for(&parse_wif(wif)?.inner)
        }
        (None, None) => return Err("either --key or --wif is required".into()),
    };

    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!("signed_by_{}.psbt.base64", &signer.to_string()[..16]))
    });
    std::fs::write(&output, spend.to_psbt_base64()?)?;

    println!("\nSigned {} inputs with {}", spend.input_count(), signer);
    let required = address.signatures_required();
    if spend.signatures_provided() >= required {
        println!("Threshold reached ({}/{})", spend.signatures_provided(), required);
        println!("Ready to finalize with: cargo run --bin finalizer -- {}", output.display());
    } else {
        println!("Signatures collected: {}/{} needed", spend.signatures_provided(), required);
        println!("Send {} to another signer", output.display());
    }

    Ok(())
}
