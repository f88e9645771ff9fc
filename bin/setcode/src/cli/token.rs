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

use alloy_primitives::{
    utils::{format_ether, parse_ether},
    Address, U256,
};
use anyhow::Context;
use clap::Args;
use secrecy::SecretString;
use setcode_client::Session;
use setcode_provider::AlloyConnector;
use setcode_signer::LocalCredential;

use super::{parse_secret, print_tx, WaitArgs};

#[derive(Debug, Args)]
pub(super) struct MintArgs {
    /// Recipient. Defaults to the tx account
    #[arg(long = "to")]
    pub(super) to: Option<Address>,

    /// Amount in whole tokens. Defaults to 1000
    #[arg(long = "amount", value_parser = parse_ether)]
    pub(super) amount: Option<U256>,

    /// Mint with the deployer key instead of the tx account
    #[arg(long = "as_deployer", required = false, num_args = 0)]
    pub(super) as_deployer: bool,

    /// Private key of the token deployer
    #[arg(
        long = "deploy_key",
        name = "deploy_key",
        env = "DEPLOY_PRIVATE_KEY",
        value_parser = parse_secret,
        hide_env_values = true
    )]
    pub(super) deploy_key: Option<SecretString>,

    #[command(flatten)]
    pub(super) wait: WaitArgs,
}

#[derive(Debug, Args)]
pub(super) struct BalanceArgs {
    /// Account to check. Defaults to the tx account
    #[arg(long = "address")]
    pub(super) address: Option<Address>,
}

pub(super) async fn mint(session: &Session<AlloyConnector>, args: MintArgs) -> anyhow::Result<()> {
    let minter = if args.as_deployer {
        let key = args
            .deploy_key
            .as_ref()
            .context("DEPLOY_PRIVATE_KEY must be set to mint as the deployer")?;
        Some(LocalCredential::from_secret(key)?)
    } else {
        None
    };

    let tx_hash = session.mint(args.to, args.amount, minter.as_ref()).await?;
    print_tx(session.chain(), "Mint", tx_hash);

    if let Some(polling) = args.wait.polling() {
        session.wait_for_receipt(tx_hash, polling).await?;
        let balance = session.token_balance(args.to).await?;
        println!("Token balance: {}", format_ether(balance));
    }
    Ok(())
}

pub(super) async fn balance(
    session: &Session<AlloyConnector>,
    args: BalanceArgs,
) -> anyhow::Result<()> {
    let native = session.native_balance(args.address).await?;
    let token = session.token_balance(args.address).await?;
    println!(
        "{}: {} {}, {} tokens",
        args.address.unwrap_or(session.tx_account()),
        format_ether(native),
        session.chain().native_currency_symbol,
        format_ether(token)
    );
    Ok(())
}
