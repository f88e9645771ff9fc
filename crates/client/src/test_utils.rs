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

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};

use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use secrecy::SecretString;
use setcode_contracts::batch_call::BatchCallDelegation;
use setcode_provider::{Connect, MockEvmProvider, TransactionReceipt};
use setcode_signer::LocalCredential;
use setcode_types::BatchCall;

pub(crate) const TX_ACCOUNT_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub(crate) const SPONSOR_KEY: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub(crate) fn credential(key: &str) -> LocalCredential {
    LocalCredential::from_secret(&SecretString::from(key.to_string())).unwrap()
}

pub(crate) fn decode_tx(raw: &Bytes) -> TxEnvelope {
    TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap()
}

pub(crate) fn decode_batch(raw: &Bytes) -> (Option<Address>, Vec<BatchCall>) {
    let tx = decode_tx(raw);
    let calls = BatchCallDelegation::executeCall::abi_decode(tx.input(), true)
        .unwrap()
        .calls;
    (tx.to(), calls)
}

pub(crate) fn receipt(success: bool) -> TransactionReceipt {
    let status = if success { "0x1" } else { "0x0" };
    serde_json::from_value(serde_json::json!({
        "type": "0x2",
        "status": status,
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "0".repeat(512)),
        "transactionHash": format!("0x{}", "11".repeat(32)),
        "transactionIndex": "0x0",
        "blockHash": format!("0x{}", "22".repeat(32)),
        "blockNumber": "0x10",
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x1",
        "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "to": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        "contractAddress": null
    }))
    .unwrap()
}

/// Hands out prepared mock providers, last pushed first.
pub(crate) struct MockConnector {
    providers: Mutex<Vec<MockEvmProvider>>,
    connects: Arc<AtomicU32>,
}

impl MockConnector {
    pub(crate) fn new(providers: Vec<MockEvmProvider>) -> (Self, Arc<AtomicU32>) {
        let connects = Arc::new(AtomicU32::new(0));
        (
            Self {
                providers: Mutex::new(providers),
                connects: connects.clone(),
            },
            connects,
        )
    }
}

impl Connect for MockConnector {
    type Provider = MockEvmProvider;

    fn connect(&self, _rpc_url: &str) -> anyhow::Result<MockEvmProvider> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.providers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("no provider prepared"))
    }
}
