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

use clap::Args;
use setcode_client::{Error, SendOptions, SendOutcome, Session};
use setcode_provider::AlloyConnector;
use setcode_types::Transfer;

use super::{print_tx, WaitArgs};

#[derive(Debug, Args)]
pub(super) struct SendArgs {
    /// Transfer as ADDRESS:AMOUNT, amount in whole tokens with up to 18 decimals. Repeatable
    #[arg(long = "transfer", name = "transfer", required = true)]
    pub(super) transfers: Vec<Transfer>,

    /// Have the gas fee payer send the batched transaction. Needs a delegated account or --authorize
    #[arg(long = "sponsored", required = false, num_args = 0)]
    pub(super) sponsored: bool,

    /// Attach a fresh authorization and batch even if the account is not delegated yet
    #[arg(long = "authorize", required = false, num_args = 0)]
    pub(super) authorize: bool,

    #[command(flatten)]
    pub(super) wait: WaitArgs,
}

impl SendArgs {
    fn options(&self) -> SendOptions {
        SendOptions {
            sponsored: self.sponsored,
            authorize: self.authorize,
        }
    }
}

pub(super) async fn send_native(
    session: &Session<AlloyConnector>,
    args: SendArgs,
) -> anyhow::Result<()> {
    let result = session.send_native(&args.transfers, args.options()).await;
    report(session, result, &args).await
}

pub(super) async fn send_erc20(
    session: &Session<AlloyConnector>,
    args: SendArgs,
) -> anyhow::Result<()> {
    let result = session.send_erc20(&args.transfers, args.options()).await;
    report(session, result, &args).await
}

async fn report(
    session: &Session<AlloyConnector>,
    result: Result<SendOutcome, Error>,
    args: &SendArgs,
) -> anyhow::Result<()> {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(Error::PartialSend(partial)) => {
            // transactions already accepted stay sent, show them before failing
            for tx_hash in &partial.sent {
                print_tx(session.chain(), "Sent", *tx_hash);
            }
            return Err(Error::PartialSend(partial).into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "Sent {} transfer(s) {}",
        args.transfers.len(),
        outcome.mode
    );
    for tx_hash in &outcome.tx_hashes {
        print_tx(session.chain(), "Transaction", *tx_hash);
    }

    if let Some(polling) = args.wait.polling() {
        for tx_hash in outcome.tx_hashes {
            session.wait_for_receipt(tx_hash, polling).await?;
        }
        println!("Mined");
    }
    Ok(())
}
