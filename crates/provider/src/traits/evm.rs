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

//! Trait for interacting with chain data and submitting transactions.

use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
#[cfg(feature = "test-utils")]
use mockall::automock;

use super::error::ProviderResult;

/// Trait for interacting with chain data and submitting transactions.
#[cfg_attr(feature = "test-utils", automock)]
#[async_trait::async_trait]
pub trait EvmProvider: Send + Sync {
    /// Get the chain id reported by the node
    async fn get_chain_id(&self) -> ProviderResult<u64>;

    /// Get the code at an address
    async fn get_code(&self, address: Address) -> ProviderResult<Bytes>;

    /// Get the nonce/transaction count of an address
    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64>;

    /// Get the native balance of an address
    async fn get_balance(&self, address: Address) -> ProviderResult<U256>;

    /// Get the gas price as reported by the node's RPC
    async fn get_gas_price(&self) -> ProviderResult<u128>;

    /// Get the max priority fee per gas as reported by the node's RPC
    async fn get_max_priority_fee(&self) -> ProviderResult<u128>;

    /// Estimate the gas limit of a transaction
    async fn estimate_gas(&self, tx: &TransactionRequest) -> ProviderResult<u64>;

    /// Simulate a transaction via an eth_call against the latest block
    async fn call(&self, tx: &TransactionRequest) -> ProviderResult<Bytes>;

    /// Send a signed, encoded transaction
    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash>;

    /// Get transaction receipt by hash
    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>>;
}
