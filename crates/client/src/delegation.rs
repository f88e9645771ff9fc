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

use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::Serialize;
use setcode_provider::EvmProvider;
use setcode_signer::{sign_authorization, Executor, LocalCredential};
use setcode_types::Eip7702Auth;
use setcode_utils::authorization_utils::parse_delegation_designator;
use tracing::{info, warn};

use crate::{Result, Submitter, TxParams};

/// Delegation state of an account
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationStatus {
    /// True if the account has code
    pub is_delegated: bool,
    /// The contract the account delegates to, when its code is a 7702 designator
    pub delegate: Option<Address>,
}

/// Read the delegation state of `address`.
///
/// Never fails: a provider error is logged and reported as not delegated.
pub async fn delegation_status<P: EvmProvider>(provider: &P, address: Address) -> DelegationStatus {
    match provider.get_code(address).await {
        Ok(code) => DelegationStatus {
            is_delegated: !code.is_empty(),
            delegate: parse_delegation_designator(&code),
        },
        Err(e) => {
            warn!("Failed to check delegation status of {address:?}: {e:?}");
            DelegationStatus::default()
        }
    }
}

/// True if `address` has code. Errors count as not delegated.
pub async fn check_delegation_status<P: EvmProvider>(provider: &P, address: Address) -> bool {
    delegation_status(provider, address).await.is_delegated
}

/// A signed authorization and the transaction that carried it
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationOutcome {
    /// The signed authorization
    pub authorization: Eip7702Auth,
    /// Hash of the transaction carrying it
    pub tx_hash: TxHash,
}

/// Delegate `tx_account` to `contract`, or clear its delegation when `contract` is zero.
///
/// The authorization travels in an empty call from the sponsor to the tx-account when a sponsor
/// is given, otherwise the tx-account sends it to itself.
pub async fn send_authorization<P: EvmProvider>(
    provider: &P,
    submitter: &Submitter,
    tx_account: &LocalCredential,
    sponsor: Option<&LocalCredential>,
    contract: Address,
) -> Result<AuthorizationOutcome> {
    let executor = match sponsor {
        Some(sponsor) => Executor::Sponsor(sponsor.address()),
        None => Executor::SelfExecuting,
    };
    let authorization = sign_authorization(
        provider,
        tx_account,
        contract,
        submitter.chain_id(),
        executor,
    )
    .await?;

    let sender = sponsor.unwrap_or(tx_account);
    let tx_hash = submitter
        .submit(
            provider,
            sender,
            TxParams {
                to: tx_account.address(),
                value: U256::ZERO,
                input: Bytes::new(),
                authorization_list: vec![authorization.clone()],
                nonce: None,
            },
        )
        .await?;

    if authorization.is_revocation() {
        info!("Sent delegation removal for {:?} in {tx_hash:?}", tx_account.address());
    } else {
        info!(
            "Sent delegation of {:?} to {contract:?} in {tx_hash:?}",
            tx_account.address()
        );
    }
    Ok(AuthorizationOutcome {
        authorization,
        tx_hash,
    })
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Transaction;
    use alloy_primitives::{address, B256};
    use mockall::predicate::eq;
    use setcode_provider::{MockEvmProvider, ProviderError};
    use setcode_utils::authorization_utils::delegation_designator;

    use super::*;
    use crate::{
        test_utils::{credential, decode_tx, SPONSOR_KEY, TX_ACCOUNT_KEY},
        GasSettings,
    };

    const ACCOUNT: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
    const DELEGATION_CONTRACT: Address = address!("90489BDa2d09131471c287F3cc67EA60cf48c157");

    fn provider_with_code(code: Bytes) -> MockEvmProvider {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_code()
            .with(eq(ACCOUNT))
            .returning(move |_| Ok(code.clone()));
        provider
    }

    #[tokio::test]
    async fn test_empty_code_not_delegated() {
        let provider = provider_with_code(Bytes::new());
        assert!(!check_delegation_status(&provider, ACCOUNT).await);
    }

    #[tokio::test]
    async fn test_code_delegated() {
        let provider = provider_with_code(delegation_designator(DELEGATION_CONTRACT));
        assert!(check_delegation_status(&provider, ACCOUNT).await);
        assert_eq!(
            delegation_status(&provider, ACCOUNT).await,
            DelegationStatus {
                is_delegated: true,
                delegate: Some(DELEGATION_CONTRACT),
            }
        );
    }

    #[tokio::test]
    async fn test_plain_contract_code() {
        let provider = provider_with_code(Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]));
        let status = delegation_status(&provider, ACCOUNT).await;
        assert!(status.is_delegated);
        assert_eq!(status.delegate, None);
    }

    #[tokio::test]
    async fn test_error_not_delegated() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_code()
            .returning(|_| Err(ProviderError::ContractError("connection reset".to_string())));
        assert!(!check_delegation_status(&provider, ACCOUNT).await);
    }

    fn provider_for_send(nonce: u64) -> MockEvmProvider {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_transaction_count()
            .returning(move |_| Ok(nonce));
        provider.expect_get_gas_price().returning(|| Ok(10));
        provider.expect_get_max_priority_fee().returning(|| Ok(1));
        provider.expect_estimate_gas().returning(|_| Ok(60_000));
        provider
    }

    #[tokio::test]
    async fn test_self_executed_bind() {
        let tx_account = credential(TX_ACCOUNT_KEY);
        let mut provider = provider_for_send(3);
        provider
            .expect_send_raw_transaction()
            .once()
            .withf(|raw| {
                let tx = decode_tx(raw);
                let auths = tx.authorization_list().unwrap();
                tx.to() == Some(ACCOUNT)
                    && tx.input().is_empty()
                    && tx.nonce() == 3
                    && auths.len() == 1
                    && auths[0].address == DELEGATION_CONTRACT
                    && auths[0].nonce == 4
            })
            .returning(|_| Ok(B256::repeat_byte(7)));

        let outcome = send_authorization(
            &provider,
            &Submitter::new(11155111, GasSettings::default()),
            &tx_account,
            None,
            DELEGATION_CONTRACT,
        )
        .await
        .unwrap();

        assert_eq!(outcome.tx_hash, B256::repeat_byte(7));
        assert_eq!(outcome.authorization.nonce, 4);
    }

    #[tokio::test]
    async fn test_sponsored_unbind() {
        let tx_account = credential(TX_ACCOUNT_KEY);
        let sponsor = credential(SPONSOR_KEY);
        let sponsor_address = sponsor.address();
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_transaction_count()
            .with(eq(ACCOUNT))
            .returning(|_| Ok(3));
        provider
            .expect_get_transaction_count()
            .with(eq(sponsor_address))
            .returning(|_| Ok(11));
        provider.expect_get_gas_price().returning(|| Ok(10));
        provider.expect_get_max_priority_fee().returning(|| Ok(1));
        provider
            .expect_estimate_gas()
            .withf(move |req| req.from == Some(sponsor_address))
            .returning(|_| Ok(60_000));
        provider
            .expect_send_raw_transaction()
            .once()
            .withf(|raw| {
                let tx = decode_tx(raw);
                let auths = tx.authorization_list().unwrap();
                tx.to() == Some(ACCOUNT)
                    && tx.nonce() == 11
                    && auths[0].address == Address::ZERO
                    && auths[0].nonce == 3
            })
            .returning(|_| Ok(B256::ZERO));

        let outcome = send_authorization(
            &provider,
            &Submitter::new(11155111, GasSettings::default()),
            &tx_account,
            Some(&sponsor),
            Address::ZERO,
        )
        .await
        .unwrap();

        assert!(outcome.authorization.is_revocation());
    }
}
