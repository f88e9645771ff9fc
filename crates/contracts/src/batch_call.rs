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

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::sol;

// BatchCallDelegation from https://viem.sh/experimental/eip7702/contract-writes
sol! {
    #[allow(missing_docs)]
    interface BatchCallDelegation {
        #[derive(Default, Debug, PartialEq, Eq)]
        struct Call {
            bytes data;
            address to;
            uint256 value;
        }

        function execute(Call[] calldata calls) external payable;
    }
}

/// Create a call that transfers `value` native token to `to`
pub fn create_call_value_only(to: Address, value: U256) -> BatchCallDelegation::Call {
    BatchCallDelegation::Call {
        data: Bytes::new(),
        to,
        value,
    }
}
