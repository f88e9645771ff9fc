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

//! Transfers and the batch calls built from them.

use std::str::FromStr;

use alloy_primitives::{
    utils::{format_ether, parse_ether},
    Address, Bytes, U256,
};
use alloy_sol_types::SolCall;
use setcode_contracts::{
    batch_call::{self, BatchCallDelegation},
    erc20::ERC20Mintable,
};

/// One leg of a multi-call transaction
pub type BatchCall = BatchCallDelegation::Call;

/// Error parsing a transfer
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransferError {
    /// Transfer is not of the form `ADDRESS:AMOUNT`
    #[error("transfer {0:?} must be of the form ADDRESS:AMOUNT")]
    Format(String),
    /// Recipient is not a valid address
    #[error("invalid recipient {0:?}")]
    Recipient(String),
    /// Amount is not a valid decimal ether amount
    #[error("invalid amount {0:?}")]
    Amount(String),
}

/// A transfer of `amount` (18 decimals) to `to`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    /// Recipient
    pub to: Address,
    /// Amount in wei, or token base units
    pub amount: U256,
}

impl FromStr for Transfer {
    type Err = TransferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (to, amount) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TransferError::Format(s.to_string()))?;
        let (to, amount) = (to.trim(), amount.trim());
        if to.is_empty() || amount.is_empty() {
            return Err(TransferError::Format(s.to_string()));
        }
        let to = Address::from_str(to).map_err(|_| TransferError::Recipient(to.to_string()))?;
        let amount = parse_ether(amount).map_err(|_| TransferError::Amount(amount.to_string()))?;
        Ok(Self { to, amount })
    }
}

impl std::fmt::Display for Transfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.to, format_ether(self.amount))
    }
}

/// Parse a list of transfers, failing on the first invalid entry.
pub fn parse_transfers<S: AsRef<str>>(transfers: &[S]) -> Result<Vec<Transfer>, TransferError> {
    transfers.iter().map(|t| t.as_ref().parse()).collect()
}

/// Calls sending native token to each recipient
pub fn native_transfer_calls(transfers: &[Transfer]) -> Vec<BatchCall> {
    transfers
        .iter()
        .map(|t| batch_call::create_call_value_only(t.to, t.amount))
        .collect()
}

/// Calls invoking `transfer` on `token` for each recipient
pub fn erc20_transfer_calls(token: Address, transfers: &[Transfer]) -> Vec<BatchCall> {
    transfers
        .iter()
        .map(|t| BatchCall {
            data: erc20_transfer_data(t),
            to: token,
            value: U256::ZERO,
        })
        .collect()
}

/// Call data for an ERC-20 `transfer`
pub fn erc20_transfer_data(transfer: &Transfer) -> Bytes {
    ERC20Mintable::transferCall {
        to: transfer.to,
        amount: transfer.amount,
    }
    .abi_encode()
    .into()
}

/// Total native value attached to a list of calls
pub fn total_value(calls: &[BatchCall]) -> U256 {
    calls.iter().map(|c| c.value).sum()
}
