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

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use setcode_contracts::erc20::ERC20Mintable;
use setcode_provider::{EvmProvider, ProviderError, TransactionRequest};
use setcode_signer::LocalCredential;
use tracing::info;

use crate::{Result, Submitter, TxParams};

/// 1000 tokens at 18 decimals
pub const DEFAULT_MINT_AMOUNT: U256 = U256::from_limbs([3_875_820_019_684_212_736, 54, 0, 0]);

/// Mint `amount` of the test token at `token` to `to`, signed by `minter`.
pub async fn mint<P: EvmProvider>(
    provider: &P,
    submitter: &Submitter,
    minter: &LocalCredential,
    token: Address,
    to: Address,
    amount: U256,
) -> Result<TxHash> {
    let input = ERC20Mintable::mintCall { to, amount }.abi_encode();
    let tx_hash = submitter
        .submit(
            provider,
            minter,
            TxParams {
                to: token,
                input: input.into(),
                ..Default::default()
            },
        )
        .await?;
    info!("Minting {amount} of {token:?} to {to:?} in {tx_hash:?}");
    Ok(tx_hash)
}

/// Token balance of `owner`, read with `eth_call`
pub async fn token_balance<P: EvmProvider>(
    provider: &P,
    token: Address,
    owner: Address,
) -> Result<U256> {
    let call = ERC20Mintable::balanceOfCall { account: owner };
    let tx = TransactionRequest::default()
        .with_to(token)
        .with_input(call.abi_encode());
    let ret = provider.call(&tx).await?;
    let balance = ERC20Mintable::balanceOfCall::abi_decode_returns(&ret, true)
        .map_err(|e| ProviderError::ContractError(format!("balanceOf({owner}) on {token}: {e}")))?;
    Ok(balance._0)
}

/// Native balance of `owner`
pub async fn native_balance<P: EvmProvider>(provider: &P, owner: Address) -> Result<U256> {
    Ok(provider.get_balance(owner).await?)
}

#[cfg(test)]
mod tests {
    use alloy_consensus::Transaction;
    use alloy_primitives::{address, utils::parse_ether, Bytes, B256};
    use alloy_sol_types::SolValue;
    use mockall::predicate::eq;
    use setcode_provider::MockEvmProvider;

    use super::*;
    use crate::{
        test_utils::{credential, decode_tx, TX_ACCOUNT_KEY},
        Error, GasSettings,
    };

    const TOKEN: Address = address!("0D3c26B307115AD096d856dC4C8f95Ca2fFD4F4b");
    const OWNER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");

    #[test]
    fn test_default_mint_amount() {
        assert_eq!(DEFAULT_MINT_AMOUNT, parse_ether("1000").unwrap());
    }

    #[tokio::test]
    async fn test_mint() {
        let mut provider = MockEvmProvider::new();
        provider.expect_get_transaction_count().returning(|_| Ok(0));
        provider.expect_get_gas_price().returning(|| Ok(10));
        provider.expect_get_max_priority_fee().returning(|| Ok(1));
        provider.expect_estimate_gas().returning(|_| Ok(70_000));
        provider
            .expect_send_raw_transaction()
            .once()
            .withf(|raw| {
                let tx = decode_tx(raw);
                let call = ERC20Mintable::mintCall::abi_decode(tx.input(), true).unwrap();
                tx.to() == Some(TOKEN)
                    && tx.value() == U256::ZERO
                    && call.to == OWNER
                    && call.amount == DEFAULT_MINT_AMOUNT
            })
            .returning(|_| Ok(B256::ZERO));

        mint(
            &provider,
            &Submitter::new(11155111, GasSettings::default()),
            &credential(TX_ACCOUNT_KEY),
            TOKEN,
            OWNER,
            DEFAULT_MINT_AMOUNT,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_token_balance() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_call()
            .withf(|tx| {
                let call = ERC20Mintable::balanceOfCall::abi_decode(tx.input.input().unwrap(), true)
                    .unwrap();
                tx.to == Some(TOKEN.into()) && call.account == OWNER
            })
            .returning(|_| Ok(Bytes::from(parse_ether("12.5").unwrap().abi_encode())));

        let balance = token_balance(&provider, TOKEN, OWNER).await.unwrap();
        assert_eq!(balance, parse_ether("12.5").unwrap());
    }

    #[tokio::test]
    async fn test_token_balance_bad_return() {
        let mut provider = MockEvmProvider::new();
        provider.expect_call().returning(|_| Ok(Bytes::new()));

        let err = token_balance(&provider, TOKEN, OWNER).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::ContractError(_))
        ));
    }

    #[tokio::test]
    async fn test_native_balance() {
        let mut provider = MockEvmProvider::new();
        provider
            .expect_get_balance()
            .with(eq(OWNER))
            .returning(|_| Ok(U256::from(42)));
        assert_eq!(native_balance(&provider, OWNER).await.unwrap(), U256::from(42));
    }
}
