//! carbon-ledger: operator entry point for the carbon credit ledger.

mod args;

use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;

use carbon_client::{LedgerClient, OperatorSession, ReceiptStatus};
use carbon_dashboard::DashboardState;
use carbon_types::TxHash;
use carbon_utils::format_tons;

use crate::args::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    carbon_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    let session = if cli.command.needs_key() {
        let Some(key) = cli.read_key()? else {
            bail!("no private key: set CARBON_PRIVATE_KEY or pass --key-file");
        };
        Some(OperatorSession::from_hex(&key)?)
    } else {
        None
    };
    let operator = || session.as_ref().context("no operator session");

    let connect = || LedgerClient::connect(&config);

    match cli.command {
        Command::Whoami => {
            println!("{}", operator()?.address());
        }
        Command::Total => {
            println!("{}", connect()?.total_issued().await?);
        }
        Command::View { id, json } => {
            let credit = connect()?.credit(id).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&credit)?);
            } else {
                println!("id:       {}", credit.id);
                println!("owner:    {}", credit.owner);
                println!("amount:   {}", format_tons(credit.amount));
                println!("retired:  {}", credit.retired);
                println!("location: {}", credit.location);
            }
        }
        Command::Location { id } => {
            println!("{}", connect()?.credit_location(id).await?);
        }
        Command::Issue {
            to,
            amount,
            location,
        } => {
            let client = connect()?;
            let hash = client
                .issue_credit(operator()?, to, amount, &location)
                .await?;
            report(&client, &hash);
        }
        Command::Transfer { id, to, amount } => {
            let client = connect()?;
            let hash = client.transfer_credit(operator()?, id, to, amount).await?;
            report(&client, &hash);
        }
        Command::Retire { id } => {
            let client = connect()?;
            let hash = client.retire_credit(operator()?, id).await?;
            report(&client, &hash);
        }
        Command::Relocate { id, location } => {
            let client = connect()?;
            let hash = client
                .update_credit_location(operator()?, id, &location)
                .await?;
            report(&client, &hash);
        }
        Command::Receipt { hash, json } => {
            let client = connect()?;
            let receipt = client.transaction_receipt(&hash).await?;
            match (receipt, json) {
                (receipt, true) => println!("{}", serde_json::to_string_pretty(&receipt)?),
                (None, false) => println!("pending"),
                (Some(receipt), false) => {
                    let status = match receipt.status {
                        ReceiptStatus::Success => "confirmed",
                        ReceiptStatus::Reverted => "reverted",
                    };
                    println!(
                        "{status} in block {} (gas used {})",
                        receipt.block_number, receipt.gas_used
                    );
                }
            }
            println!("{}", client.explorer_link(&hash));
        }
        Command::Serve { .. } => {
            let client = connect()?;
            tracing::info!(
                contract = %client.contract(),
                bind = %config.dashboard_bind,
                "starting dashboard"
            );
            let state = Arc::new(DashboardState::new(client));
            carbon_dashboard::serve(config.dashboard_bind, state).await?;
        }
    }

    Ok(())
}

fn report<T>(client: &LedgerClient<T>, hash: &TxHash)
where
    T: carbon_client::RpcTransport,
{
    println!("{hash}");
    println!("{}", client.explorer_link(hash));
}
