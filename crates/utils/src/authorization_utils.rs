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

//! Utilities for 7702 delegation designators

use alloy_primitives::{fixed_bytes, Address, Bytes, FixedBytes};

/// Code prefix of an account delegated through a
/// [7702](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-7702.md) authorization.
pub const DELEGATION_DESIGNATOR_PREFIX: FixedBytes<3> = fixed_bytes!("ef0100");

/// Build the code a delegated account reports for `authorization_contract`.
pub fn delegation_designator(authorization_contract: Address) -> Bytes {
    let code: FixedBytes<23> =
        DELEGATION_DESIGNATOR_PREFIX.concat_const(authorization_contract.into());
    code.into()
}

/// Extract the delegated-to contract from account code, if the code is a designator.
pub fn parse_delegation_designator(code: &[u8]) -> Option<Address> {
    match code.strip_prefix(DELEGATION_DESIGNATOR_PREFIX.as_slice()) {
        Some(address) if address.len() == 20 => Some(Address::from_slice(address)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes};

    use super::*;

    #[test]
    fn test_designator_roundtrip() {
        let contract = address!("90489BDa2d09131471c287F3cc67EA60cf48c157");
        let code = delegation_designator(contract);
        assert_eq!(code.len(), 23);
        assert_eq!(parse_delegation_designator(&code), Some(contract));
    }

    #[test]
    fn test_non_designator_code() {
        assert_eq!(parse_delegation_designator(&[]), None);
        assert_eq!(parse_delegation_designator(&bytes!("6080604052")), None);
        // prefix with a truncated address
        assert_eq!(parse_delegation_designator(&bytes!("ef01001234")), None);
    }
}
