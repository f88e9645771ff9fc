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

//! Batched and per-call transfer senders.

use alloy_primitives::{Address, TxHash};
use alloy_sol_types::SolCall;
use setcode_contracts::batch_call::BatchCallDelegation;
use setcode_provider::EvmProvider;
use setcode_signer::LocalCredential;
use setcode_types::{total_value, BatchCall, Eip7702Auth};
use tracing::{info, warn};

use crate::{Error, PartialSendError, Result, Submitter, TxParams};

/// Send all `calls` in one transaction through the delegation contract at `tx_account`.
///
/// The transaction targets the tx-account itself, calls `execute` with the calls in order, and
/// attaches their total value. `authorization_list` may carry a fresh delegation that the node
/// applies before the call runs.
pub async fn send_batch<P: EvmProvider>(
    provider: &P,
    submitter: &Submitter,
    tx_account: Address,
    sender: &LocalCredential,
    calls: Vec<BatchCall>,
    authorization_list: Vec<Eip7702Auth>,
) -> Result<TxHash> {
    if calls.is_empty() {
        return Err(Error::NoTransfers);
    }
    let num_calls = calls.len();
    let value = total_value(&calls);
    let input = BatchCallDelegation::executeCall { calls }.abi_encode();

    let tx_hash = submitter
        .submit(
            provider,
            sender,
            TxParams {
                to: tx_account,
                value,
                input: input.into(),
                authorization_list,
                nonce: None,
            },
        )
        .await?;
    info!("Sent batch of {num_calls} calls through {tx_account:?} in {tx_hash:?}");
    Ok(tx_hash)
}

/// Send each call as its own transaction from `sender`, in order.
///
/// The nonce is read once and incremented locally. Sending stops at the first failure, and the
/// error carries the hashes already accepted by the node.
pub async fn send_per_call<P: EvmProvider>(
    provider: &P,
    submitter: &Submitter,
    sender: &LocalCredential,
    calls: Vec<BatchCall>,
) -> std::result::Result<Vec<TxHash>, PartialSendError> {
    let mut sent = Vec::with_capacity(calls.len());
    if calls.is_empty() {
        return Err(PartialSendError {
            sent,
            source: Error::NoTransfers,
        });
    }

    let mut nonce = match provider.get_transaction_count(sender.address()).await {
        Ok(nonce) => nonce,
        Err(e) => {
            return Err(PartialSendError {
                sent,
                source: e.into(),
            })
        }
    };

    let total = calls.len();
    for (i, call) in calls.into_iter().enumerate() {
        let tx = TxParams {
            to: call.to,
            value: call.value,
            input: call.data,
            authorization_list: vec![],
            nonce: Some(nonce),
        };
        match submitter.submit(provider, sender, tx).await {
            Ok(tx_hash) => {
                sent.push(tx_hash);
                nonce += 1;
            }
            Err(source) => {
                warn!("Call {} of {total} failed, {} already sent", i + 1, sent.len());
                return Err(PartialSendError { sent, source });
            }
        }
    }
    Ok(sent)
}
