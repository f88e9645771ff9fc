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
//! 7702 authorization list support.

use alloy_eips::eip7702::{Authorization, SignedAuthorization};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// authorization tuple for 7702 txn support
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Eip7702Auth {
    /// The chain ID of the authorization.
    pub chain_id: u64,
    /// The delegation contract, or the zero address to clear a delegation.
    pub address: Address,
    /// The nonce for the authorization.
    pub nonce: u64,
    /// signed authorization tuple.
    pub y_parity: u8,
    /// signed authorization tuple.
    pub r: U256,
    /// signed authorization tuple.
    pub s: U256,
}

impl From<Eip7702Auth> for SignedAuthorization {
    fn from(value: Eip7702Auth) -> Self {
        let authorization = Authorization {
            chain_id: U256::from(value.chain_id),
            address: value.address,
            nonce: value.nonce,
        };

        SignedAuthorization::new_unchecked(authorization, value.y_parity, value.r, value.s)
    }
}

impl From<SignedAuthorization> for Eip7702Auth {
    fn from(value: SignedAuthorization) -> Self {
        Self {
            chain_id: value.chain_id.saturating_to(),
            address: value.address,
            nonce: value.nonce,
            y_parity: value.y_parity(),
            r: value.r(),
            s: value.s(),
        }
    }
}

impl Eip7702Auth {
    /// True if this authorization clears the delegation instead of setting one.
    pub fn is_revocation(&self) -> bool {
        self.address == Address::ZERO
    }

    /// Recover the account that signed this authorization.
    pub fn authority(&self) -> anyhow::Result<Address> {
        SignedAuthorization::from(self.clone())
            .recover_authority()
            .map_err(|e| anyhow::anyhow!(e.to_string()))
    }
}
