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

use std::{fmt, str::FromStr};

use alloy_network::EthereumWallet;
use alloy_primitives::{Address, B256};
use alloy_signer_local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Check that `private_key` is 32 bytes of hex, with an optional `0x` prefix.
///
/// Surrounding whitespace is ignored.
pub fn validate_private_key(private_key: &str) -> Result<()> {
    let key = strip_hex_prefix(private_key.trim());
    if key.len() != 64 {
        return Err(Error::InvalidPrivateKey("expected 64 hex characters"));
    }
    if !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidPrivateKey("non hex character"));
    }
    Ok(())
}

fn strip_hex_prefix(key: &str) -> &str {
    key.strip_prefix("0x")
        .or_else(|| key.strip_prefix("0X"))
        .unwrap_or(key)
}

/// A private key held in memory for the lifetime of a session.
///
/// The key is zeroized on drop. `Debug` only shows the derived address and there is no
/// serialization path.
#[derive(Clone)]
pub struct LocalCredential {
    signer: PrivateKeySigner,
}

impl LocalCredential {
    /// Parse a credential, rejecting malformed keys before anything touches the network.
    pub fn from_secret(private_key: &SecretString) -> Result<Self> {
        let key = private_key.expose_secret().trim();
        validate_private_key(key)?;
        let bytes = B256::from_str(strip_hex_prefix(key))
            .map_err(|_| Error::InvalidPrivateKey("non hex character"))?;
        let signer = PrivateKeySigner::from_bytes(&bytes)
            .map_err(|_| Error::InvalidPrivateKey("not a valid secp256k1 scalar"))?;
        Ok(Self { signer })
    }

    /// The account controlled by this credential
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying local signer
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// A single-signer wallet for building and signing transactions
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for LocalCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalCredential")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
