fn main() {
    println!("p2sh-multisig: M-of-N P2SH multisig spend toolkit");
    println!();
    println!("Available commands:");
    println!("  cargo run --bin address      Create a multisig address from public keys");
    println!("  cargo run --bin coordinator  Build an unsigned spend as a PSBT");
    println!("  cargo run --bin signer       Sign the spend with one key");
    println!("  cargo run --bin finalizer    Assemble scripts and print the raw TX");
}
