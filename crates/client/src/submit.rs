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

//! Transaction submission: fees, gas, local signing, and receipt polling.

use std::time::Duration;

use alloy_eips::{eip2718::Encodable2718, eip7702::SignedAuthorization};
use alloy_network::{TransactionBuilder, TransactionBuilder7702};
use alloy_primitives::{Address, Bytes, TxHash, U256};
use setcode_provider::{EvmProvider, TransactionReceipt, TransactionRequest};
use setcode_signer::LocalCredential;
use setcode_types::Eip7702Auth;
use tracing::{debug, info};

use crate::{Error, Result};

/// Fee settings applied to every transaction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GasSettings {
    /// Multiplier applied to `eth_gasPrice` to get the max fee per gas
    pub gas_price_multiplier: f64,
}

impl Default for GasSettings {
    fn default() -> Self {
        Self {
            gas_price_multiplier: 1.0,
        }
    }
}

/// How long to wait for a receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptPolling {
    /// Time between polls
    pub interval: Duration,
    /// Polls before giving up
    pub max_polls: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_polls: 60,
        }
    }
}

/// A transaction to sign and send
#[derive(Clone, Debug, Default)]
pub struct TxParams {
    /// Destination
    pub to: Address,
    /// Native value attached
    pub value: U256,
    /// Call data
    pub input: Bytes,
    /// EIP-7702 authorizations, turns the transaction into a set code transaction when non-empty
    pub authorization_list: Vec<Eip7702Auth>,
    /// Nonce to use instead of the sender's current transaction count
    pub nonce: Option<u64>,
}

/// Signs transactions locally and sends them raw
#[derive(Clone, Copy, Debug)]
pub struct Submitter {
    chain_id: u64,
    gas: GasSettings,
}

impl Submitter {
    /// Create a submitter for `chain_id`
    pub fn new(chain_id: u64, gas: GasSettings) -> Self {
        Self { chain_id, gas }
    }

    /// The chain transactions are signed for
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Max fee and max priority fee per gas for the next transaction
    pub async fn fees<P: EvmProvider>(&self, provider: &P) -> Result<(u128, u128)> {
        let gas_price = provider.get_gas_price().await?;
        let max_fee = (gas_price as f64 * self.gas.gas_price_multiplier) as u128;
        let priority_fee = provider.get_max_priority_fee().await?.min(max_fee);
        Ok((max_fee, priority_fee))
    }

    /// Sign `tx` with `sender` and send it. Returns once the node has accepted the transaction.
    pub async fn submit<P: EvmProvider>(
        &self,
        provider: &P,
        sender: &LocalCredential,
        tx: TxParams,
    ) -> Result<TxHash> {
        let from = sender.address();
        let nonce = match tx.nonce {
            Some(nonce) => nonce,
            None => provider.get_transaction_count(from).await?,
        };
        let (max_fee, priority_fee) = self.fees(provider).await?;

        let mut request = TransactionRequest::default()
            .with_from(from)
            .with_to(tx.to)
            .with_value(tx.value)
            .with_input(tx.input);
        if !tx.authorization_list.is_empty() {
            request = request.with_authorization_list(
                tx.authorization_list
                    .into_iter()
                    .map(SignedAuthorization::from)
                    .collect(),
            );
        }
        let gas_limit = provider.estimate_gas(&request).await?;
        debug!("Estimated {gas_limit} gas for transaction from {from:?} to {:?}", tx.to);

        let envelope = request
            .with_chain_id(self.chain_id)
            .with_nonce(nonce)
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(priority_fee)
            .with_gas_limit(gas_limit)
            .build(&sender.wallet())
            .await
            .map_err(setcode_signer::Error::from)?;

        let mut raw_tx = vec![];
        envelope.encode_2718(&mut raw_tx);
        let tx_hash = provider.send_raw_transaction(raw_tx.into()).await?;
        info!("Sent transaction {tx_hash:?} from {from:?} with nonce {nonce}");
        Ok(tx_hash)
    }
}

/// Poll for the receipt of `tx_hash`. A reverted transaction is an error.
pub async fn wait_for_receipt<P: EvmProvider>(
    provider: &P,
    tx_hash: TxHash,
    polling: ReceiptPolling,
) -> Result<TransactionReceipt> {
    for _ in 0..polling.max_polls {
        if let Some(receipt) = provider.get_transaction_receipt(tx_hash).await? {
            if !receipt.status() {
                return Err(Error::TransactionReverted(tx_hash));
            }
            info!(
                "Transaction {tx_hash:?} mined in block {:?}",
                receipt.block_number
            );
            return Ok(receipt);
        }
        tokio::time::sleep(polling.interval).await;
    }
    Err(Error::ReceiptTimeout {
        tx_hash,
        polls: polling.max_polls,
    })
}
