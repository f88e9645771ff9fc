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

use alloy_eips::eip7702::Authorization;
use alloy_primitives::{Address, U256};
use alloy_signer::SignerSync;
use setcode_provider::EvmProvider;
use setcode_types::Eip7702Auth;
use tracing::info;

use crate::{Error, LocalCredential, Result};

/// Who sends the transaction carrying an authorization
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Executor {
    /// The signer sends it, consuming its current nonce before the authorization is applied
    SelfExecuting,
    /// A separate account pays for and sends it
    Sponsor(Address),
}

impl Executor {
    /// Offset added to the signer's current nonce for the authorization tuple.
    pub fn nonce_offset(&self) -> u64 {
        match self {
            Executor::SelfExecuting => 1,
            Executor::Sponsor(_) => 0,
        }
    }
}

/// Sign an EIP-7702 authorization delegating `credential`'s account to `contract`.
///
/// Pass the zero address as `contract` to clear an existing delegation. The tuple nonce is the
/// signer's pending transaction count, plus one when the signer executes the transaction itself.
pub async fn sign_authorization<P: EvmProvider>(
    provider: &P,
    credential: &LocalCredential,
    contract: Address,
    chain_id: u64,
    executor: Executor,
) -> Result<Eip7702Auth> {
    let authority = credential.address();
    let nonce = provider.get_transaction_count(authority).await? + executor.nonce_offset();

    let authorization = Authorization {
        chain_id: U256::from(chain_id),
        address: contract,
        nonce,
    };
    let signature = credential
        .signer()
        .sign_hash_sync(&authorization.signature_hash())?;
    let auth: Eip7702Auth = authorization.into_signed(signature).into();

    verify_authority(&auth, authority)?;
    info!("Signed authorization for {authority:?} to {contract:?}, chain {chain_id}, nonce {nonce}");
    Ok(auth)
}

fn verify_authority(auth: &Eip7702Auth, expected: Address) -> Result<()> {
    let recovered = auth.authority()?;
    if recovered != expected {
        return Err(Error::AuthorizationVerification {
            expected,
            recovered,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use mockall::predicate::eq;
    use secrecy::SecretString;
    use setcode_provider::{MockEvmProvider, ProviderError};

    use super::*;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DELEGATION_CONTRACT: Address = address!("90489BDa2d09131471c287F3cc67EA60cf48c157");
    const SEPOLIA: u64 = 11155111;

    fn credential() -> LocalCredential {
        LocalCredential::from_secret(&SecretString::from(ANVIL_KEY.to_string())).unwrap()
    }

    fn provider_with_nonce(address: Address, nonce: u64) -> MockEvmProvider {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_transaction_count()
            .with(eq(address))
            .times(1)
            .returning(move |_| Ok(nonce));
        provider
    }

    #[tokio::test]
    async fn test_self_executing_uses_next_nonce() {
        let cred = credential();
        let provider = provider_with_nonce(cred.address(), 5);

        let auth = sign_authorization(
            &provider,
            &cred,
            DELEGATION_CONTRACT,
            SEPOLIA,
            Executor::SelfExecuting,
        )
        .await
        .unwrap();

        assert_eq!(auth.nonce, 6);
        assert_eq!(auth.chain_id, SEPOLIA);
        assert_eq!(auth.address, DELEGATION_CONTRACT);
        assert_eq!(auth.authority().unwrap(), cred.address());
    }

    #[tokio::test]
    async fn test_sponsored_uses_current_nonce() {
        let cred = credential();
        let provider = provider_with_nonce(cred.address(), 5);
        let sponsor = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");

        let auth = sign_authorization(
            &provider,
            &cred,
            DELEGATION_CONTRACT,
            SEPOLIA,
            Executor::Sponsor(sponsor),
        )
        .await
        .unwrap();

        assert_eq!(auth.nonce, 5);
    }

    #[tokio::test]
    async fn test_revocation_targets_zero_address() {
        let cred = credential();
        let provider = provider_with_nonce(cred.address(), 0);

        let auth = sign_authorization(
            &provider,
            &cred,
            Address::ZERO,
            SEPOLIA,
            Executor::SelfExecuting,
        )
        .await
        .unwrap();

        assert!(auth.is_revocation());
        assert_eq!(auth.nonce, 1);
    }

    #[tokio::test]
    async fn test_nonce_error_propagates() {
        let cred = credential();
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_transaction_count()
            .returning(|_| Err(ProviderError::ContractError("boom".to_string())));

        let err = sign_authorization(
            &provider,
            &cred,
            DELEGATION_CONTRACT,
            SEPOLIA,
            Executor::SelfExecuting,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::ProviderError(_)));
    }

    #[tokio::test]
    async fn test_verification_mismatch() {
        let cred = credential();
        let provider = provider_with_nonce(cred.address(), 2);
        let auth = sign_authorization(
            &provider,
            &cred,
            DELEGATION_CONTRACT,
            SEPOLIA,
            Executor::SelfExecuting,
        )
        .await
        .unwrap();

        let other = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
        let err = verify_authority(&auth, other).unwrap_err();
        assert!(matches!(
            err,
            Error::AuthorizationVerification { expected, recovered }
                if expected == other && recovered == cred.address()
        ));
    }
}
