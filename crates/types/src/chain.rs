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

//! Chain specification for Setcode

use alloy_primitives::TxHash;
use serde::{Deserialize, Serialize};

/// Name given to chains that are not in the registry
pub const CUSTOM_CHAIN_NAME: &str = "Custom Chain";

/// Chain specification for Setcode
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChainSpec {
    /// name for display purposes, e.g. "Sepolia", no logic is performed on this
    pub name: String,
    /// chain id
    pub id: u64,
    /// default RPC URL used when switching to this chain
    pub rpc_url: String,
    /// block explorer base URL, if any
    pub explorer_url: Option<String>,
    /// symbol of the native currency
    pub native_currency_symbol: String,
    /// native currency decimals
    pub native_currency_decimals: u8,
    /// true for test networks
    pub testnet: bool,
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self {
            name: CUSTOM_CHAIN_NAME.to_string(),
            id: 0,
            rpc_url: String::new(),
            explorer_url: None,
            native_currency_symbol: "ETH".to_string(),
            native_currency_decimals: 18,
            testnet: true,
        }
    }
}

impl ChainSpec {
    /// Descriptor for a chain that is not in the registry
    pub fn custom(id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            id,
            rpc_url: rpc_url.into(),
            ..Default::default()
        }
    }

    /// Link to a transaction on the block explorer, if one is known
    pub fn tx_url(&self, tx_hash: TxHash) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|url| format!("{}/tx/{tx_hash}", url.trim_end_matches('/')))
    }

    /// Link to an address on the block explorer, if one is known
    pub fn address_url(&self, address: impl std::fmt::Display) -> Option<String> {
        self.explorer_url
            .as_ref()
            .map(|url| format!("{}/address/{address}", url.trim_end_matches('/')))
    }
}

/// Static registry of known chains, keyed by chain id
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    chains: Vec<ChainSpec>,
}

impl ChainRegistry {
    /// Create a registry. Later entries win over earlier entries with the same id.
    pub fn new(chains: impl IntoIterator<Item = ChainSpec>) -> Self {
        let mut registry = Self::default();
        for chain in chains {
            registry.insert(chain);
        }
        registry
    }

    /// Insert or replace a chain
    pub fn insert(&mut self, chain: ChainSpec) {
        match self.chains.iter_mut().find(|c| c.id == chain.id) {
            Some(existing) => *existing = chain,
            None => self.chains.push(chain),
        }
    }

    /// Look up a chain by id
    pub fn get(&self, chain_id: u64) -> Option<&ChainSpec> {
        self.chains.iter().find(|c| c.id == chain_id)
    }

    /// Build the descriptor for `chain_id` reached through `rpc_url`.
    ///
    /// Known chains keep their name and explorer, unknown chains become a custom chain.
    pub fn describe(&self, chain_id: u64, rpc_url: &str) -> ChainSpec {
        match self.get(chain_id) {
            Some(chain) => ChainSpec {
                rpc_url: rpc_url.to_string(),
                ..chain.clone()
            },
            None => ChainSpec::custom(chain_id, rpc_url),
        }
    }

    /// All registered chains
    pub fn chains(&self) -> &[ChainSpec] {
        &self.chains
    }
}
