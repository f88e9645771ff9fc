// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use std::time::Duration;

use alloy_primitives::{utils::format_ether, Address};
use anyhow::Context;
use clap::Args;
use setcode_client::{delegation_status, AuthorizationOutcome, Session};
use setcode_provider::{AlloyConnector, Connect, EvmProvider};
use setcode_signer::{Executor, LocalCredential};
use tracing::{info, warn};

use super::{print_tx, CommonArgs, WaitArgs};

#[derive(Debug, Args)]
pub(super) struct WatchArgs {
    /// Seconds between delegation checks
    #[arg(long = "interval_seconds", default_value = "5")]
    pub(super) interval_seconds: u64,
}

#[derive(Debug, Args)]
pub(super) struct AuthorizationArgs {
    /// Have the gas fee payer send the authorization transaction
    #[arg(long = "sponsored", required = false, num_args = 0)]
    pub(super) sponsored: bool,

    #[command(flatten)]
    pub(super) wait: WaitArgs,
}

#[derive(Debug, Args)]
pub(super) struct SignAuthorizationArgs {
    /// Contract to delegate to. Defaults to the batch call delegation contract
    #[arg(long = "contract")]
    pub(super) contract: Option<Address>,

    /// Sign an authorization that clears the delegation
    #[arg(long = "revoke", required = false, num_args = 0, conflicts_with = "contract")]
    pub(super) revoke: bool,

    /// Account that will send the authorization. Defaults to the signer itself
    #[arg(long = "executor")]
    pub(super) executor: Option<Address>,
}

pub(super) async fn status(session: &Session<AlloyConnector>) -> anyhow::Result<()> {
    let snapshot = session.snapshot();
    let chain = session.chain();
    println!("Account:    {}", snapshot.tx_account);
    if let Some(payer) = snapshot.gas_fee_payer {
        println!("Gas payer:  {payer}");
    }
    println!("Chain:      {} ({})", snapshot.chain_name, snapshot.chain_id);
    println!("RPC:        {}", snapshot.rpc_url);

    let delegation = delegation_status(session.provider(), snapshot.tx_account).await;
    match (delegation.is_delegated, delegation.delegate) {
        (true, Some(delegate)) => println!("Delegated:  yes, to {delegate}"),
        (true, None) => println!("Delegated:  account has code"),
        (false, _) => println!("Delegated:  no"),
    }

    let native = session.native_balance(None).await?;
    println!(
        "Balance:    {} {}",
        format_ether(native),
        chain.native_currency_symbol
    );
    match session.token_balance(None).await {
        Ok(balance) => println!(
            "Token:      {} ({})",
            format_ether(balance),
            snapshot.contracts.token
        ),
        Err(e) => warn!("Token balance unavailable: {e}"),
    }
    if let Some(url) = chain.address_url(snapshot.tx_account) {
        println!("Explorer:   {url}");
    }
    Ok(())
}

pub(super) async fn watch(
    mut session: Session<AlloyConnector>,
    args: WatchArgs,
) -> anyhow::Result<()> {
    let interval = Duration::from_secs(args.interval_seconds);
    let mut last = None;
    loop {
        let status = session.refresh_delegation_status().await;
        if last != Some(status) {
            println!(
                "{}: delegated {}{}",
                session.tx_account(),
                status.is_delegated,
                status
                    .delegate
                    .map(|d| format!(" to {d}"))
                    .unwrap_or_default()
            );
            last = Some(status);
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c, stopping");
                break;
            }
            _ = tokio::time::sleep(interval) => {}
        }
    }
    session.logout();
    Ok(())
}

pub(super) async fn bind(
    session: &mut Session<AlloyConnector>,
    args: AuthorizationArgs,
) -> anyhow::Result<()> {
    let outcome = session.bind(args.sponsored).await?;
    finish_authorization(session, outcome, &args.wait).await
}

pub(super) async fn unbind(
    session: &mut Session<AlloyConnector>,
    args: AuthorizationArgs,
) -> anyhow::Result<()> {
    let outcome = session.unbind(args.sponsored).await?;
    finish_authorization(session, outcome, &args.wait).await
}

async fn finish_authorization(
    session: &mut Session<AlloyConnector>,
    outcome: AuthorizationOutcome,
    wait: &WaitArgs,
) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&outcome.authorization)?);
    print_tx(session.chain(), "Transaction", outcome.tx_hash);

    if let Some(polling) = wait.polling() {
        session.wait_for_receipt(outcome.tx_hash, polling).await?;
        let status = session.refresh_delegation_status().await;
        println!("Delegated: {}", status.is_delegated);
    }
    Ok(())
}

pub(super) async fn sign_authorization(
    args: SignAuthorizationArgs,
    common: &CommonArgs,
) -> anyhow::Result<()> {
    // parse the key before touching the network
    let key = common
        .tx_account_key
        .as_ref()
        .context("TX_ACCOUNT_PRIVATE_KEY must be set")?;
    let credential = LocalCredential::from_secret(key)?;

    let rpc_url = common
        .rpc_url
        .as_deref()
        .context("RPC_URL must be set, or pass --rpc_url")?;
    let provider = common.connector().connect(rpc_url)?;
    let chain_id = match common.chain_id {
        Some(chain_id) => chain_id,
        None => provider.get_chain_id().await?,
    };

    let contract = if args.revoke {
        Address::ZERO
    } else {
        args.contract.unwrap_or(common.delegation_contract)
    };
    let executor = match args.executor {
        Some(executor) if executor != credential.address() => Executor::Sponsor(executor),
        _ => Executor::SelfExecuting,
    };

    let auth =
        setcode_signer::sign_authorization(&provider, &credential, contract, chain_id, executor)
            .await?;
    println!("{}", serde_json::to_string_pretty(&auth)?);
    Ok(())
}
