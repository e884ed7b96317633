#![forbid(unsafe_code)]
//! Demonstration harness: mint two addresses, fund one, transfer between
//! them, admit the result, then show the two rejected paths.

use bc_wallet::{Amount, Blockchain, Identifier, LedgerConfig, LedgerError, Transaction, Wallet};
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bc-wallet",
    version,
    about = "Mint two addresses, transfer between them and admit the signed transaction"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Balance given to the sending address
    #[arg(long, default_value = "100")]
    initial_balance: Amount,

    /// Amount to transfer
    #[arg(long, default_value = "50")]
    amount: Amount,
}

fn report_rejection(label: &str, result: Result<Transaction, LedgerError>) {
    match result {
        Ok(tx) => println!(
            "  {} {} unexpectedly succeeded (nonce {})",
            "!".yellow(),
            label,
            tx.nonce
        ),
        Err(e) => println!("  {} {}: {}", "✗".red(), label, e.to_string().red()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = LedgerConfig::load_or_default(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("{}", "bc-wallet".bright_cyan().bold());
    println!("{}", "---------".bright_cyan());

    let wallet = Arc::new(Wallet::new());
    let ledger = Blockchain::new(wallet.clone(), &config)?;

    let sender = wallet.mint()?;
    let receiver = wallet.mint()?;
    wallet.set_balance(&sender, cli.initial_balance)?;
    println!("{} {}", "Sender:  ".bright_green(), sender);
    println!("{} {}", "Receiver:".bright_green(), receiver);
    println!();

    let tx = wallet.transfer(&sender, &receiver, cli.amount)?;
    println!("{}", "Signed transaction:".bright_green().underline());
    println!("{}", serde_json::to_string_pretty(&tx)?);
    println!("{} {}", "Signature:".bright_white(), tx.signature_hex());
    println!();

    if ledger.admit(tx) {
        println!(
            "  {} Transaction admitted (pending: {})",
            "✓".green(),
            ledger.pool().len()
        );
    } else {
        println!("  {} Transaction verification failed", "✗".red());
    }

    println!(
        "  Balance of {}: {}",
        sender,
        wallet.balance(&sender)?.to_string().bright_white()
    );
    println!(
        "  Balance of {}: {}",
        receiver,
        wallet.balance(&receiver)?.to_string().bright_white()
    );
    println!();

    println!("{}", "Rejected transfers:".bright_green().underline());
    let too_much = cli
        .initial_balance
        .checked_add(Amount::from_units(1000))
        .unwrap_or(Amount::MAX);
    report_rejection(
        "over-balance transfer",
        wallet.transfer(&sender, &receiver, too_much),
    );
    report_rejection(
        "transfer from unknown address",
        wallet.transfer(&Identifier::from("nonexistent"), &receiver, Amount::from_units(1)),
    );

    println!();
    println!(
        "Ledger height {}, genesis link {}",
        ledger.height(),
        hex::encode(ledger.genesis_previous_hash()).italic()
    );
    Ok(())
}
