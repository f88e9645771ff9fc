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

use alloy_primitives::{Address, Bytes, TxHash, U256, U64};
use alloy_provider::Provider as AlloyProvider;
use alloy_rpc_types_eth::{BlockId, TransactionReceipt, TransactionRequest};

use crate::{EvmProvider, ProviderResult};

/// Evm Provider implementation using [alloy-provider](https://github.com/alloy-rs/alloy-rs)
#[derive(Clone, Debug)]
pub struct AlloyEvmProvider<AP> {
    inner: AP,
}

impl<AP> AlloyEvmProvider<AP> {
    /// Create a new `AlloyEvmProvider`
    pub fn new(inner: AP) -> Self {
        Self { inner }
    }
}

impl<AP> From<AP> for AlloyEvmProvider<AP>
where
    AP: AlloyProvider,
{
    fn from(inner: AP) -> Self {
        Self::new(inner)
    }
}

#[async_trait::async_trait]
impl<AP> EvmProvider for AlloyEvmProvider<AP>
where
    AP: AlloyProvider,
{
    async fn get_chain_id(&self) -> ProviderResult<u64> {
        Ok(self.inner.get_chain_id().await?)
    }

    async fn get_code(&self, address: Address) -> ProviderResult<Bytes> {
        Ok(self.inner.get_code_at(address).await?)
    }

    async fn get_transaction_count(&self, address: Address) -> ProviderResult<u64> {
        Ok(self.inner.get_transaction_count(address).await?)
    }

    async fn get_balance(&self, address: Address) -> ProviderResult<U256> {
        Ok(self.inner.get_balance(address).await?)
    }

    async fn get_gas_price(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_gas_price().await?)
    }

    async fn get_max_priority_fee(&self) -> ProviderResult<u128> {
        Ok(self.inner.get_max_priority_fee_per_gas().await?)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> ProviderResult<u64> {
        let gas: U64 = self
            .inner
            .raw_request("eth_estimateGas".into(), (tx.clone(),))
            .await?;
        Ok(gas.to())
    }

    async fn call(&self, tx: &TransactionRequest) -> ProviderResult<Bytes> {
        Ok(self
            .inner
            .raw_request("eth_call".into(), (tx.clone(), BlockId::latest()))
            .await?)
    }

    async fn send_raw_transaction(&self, tx: Bytes) -> ProviderResult<TxHash> {
        let pending = self.inner.send_raw_transaction(&tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn get_transaction_receipt(
        &self,
        tx: TxHash,
    ) -> ProviderResult<Option<TransactionReceipt>> {
        Ok(self.inner.get_transaction_receipt(tx).await?)
    }
}
