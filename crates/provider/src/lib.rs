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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Setcode providers
//! A provider is a type that provides access to blockchain data and lets callers submit
//! signed transactions.

mod alloy;
pub use alloy::{
    evm::AlloyEvmProvider, new_alloy_evm_provider, new_alloy_provider,
    provider_retry::RateLimitExt, AlloyConnector, ProviderSettings,
};

mod traits;
// re-export alloy RPC types
pub use alloy_rpc_types_eth::{BlockId, TransactionReceipt, TransactionRequest};
pub use traits::*;
