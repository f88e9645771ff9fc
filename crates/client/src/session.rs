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

//! An explicit login session: credentials, the active chain, and the actions run against it.

use alloy_primitives::{Address, TxHash, U256};
use parse_display::Display;
use secrecy::SecretString;
use serde::Serialize;
use setcode_provider::{Connect, EvmProvider, TransactionReceipt};
use setcode_signer::{sign_authorization, Executor, LocalCredential};
use setcode_types::{
    chain::{ChainRegistry, ChainSpec},
    erc20_transfer_calls, native_transfer_calls, BatchCall, Transfer,
};
use tracing::info;

use crate::{
    batch::{send_batch, send_per_call},
    delegation::{delegation_status, send_authorization, AuthorizationOutcome, DelegationStatus},
    submit::{wait_for_receipt, GasSettings, ReceiptPolling, Submitter},
    token, Error, Result,
};

/// Contracts the session works with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contracts {
    /// Batch call delegation contract accounts delegate to
    pub delegation: Address,
    /// Mintable ERC-20 test token
    pub token: Address,
}

/// Everything needed to open a session
pub struct LoginParams {
    /// RPC endpoint to connect to
    pub rpc_url: String,
    /// Key of the account that delegates and sends transfers
    pub tx_account_key: SecretString,
    /// Key of an account that pays gas for sponsored transactions
    pub gas_fee_payer_key: Option<SecretString>,
    /// Contract addresses
    pub contracts: Contracts,
    /// Fee settings
    pub gas: GasSettings,
}

/// Options for sending transfers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Have the gas fee payer send a batched transaction
    pub sponsored: bool,
    /// Sign a fresh authorization and attach it to the batched transaction, batching even if the
    /// account is not delegated yet
    pub authorize: bool,
}

/// How transfers were sent
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize)]
#[display(style = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum SendMode {
    /// One transaction through the delegation contract
    Batched,
    /// One transaction per transfer
    PerCall,
}

/// Result of sending transfers
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    /// How the transfers were sent
    pub mode: SendMode,
    /// Transaction hashes in send order
    pub tx_hashes: Vec<TxHash>,
}

/// Serializable view of a session. Never holds key material.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// The tx-account
    pub tx_account: Address,
    /// The gas fee payer, if configured
    pub gas_fee_payer: Option<Address>,
    /// Active chain id
    pub chain_id: u64,
    /// Active chain name
    pub chain_name: String,
    /// Active RPC endpoint
    pub rpc_url: String,
    /// Block explorer of the active chain
    pub explorer_url: Option<String>,
    /// Always true for a live session
    pub connected: bool,
    /// Delegation flag as of the last check
    pub is_delegated: bool,
    /// Contract addresses
    pub contracts: Contracts,
}

/// A logged in user.
///
/// Created by [`Session::login`] and destroyed by [`Session::logout`]. Keys are held only for
/// the lifetime of the session.
pub struct Session<C: Connect> {
    connector: C,
    provider: C::Provider,
    registry: ChainRegistry,
    chain: ChainSpec,
    tx_account: LocalCredential,
    gas_fee_payer: Option<LocalCredential>,
    contracts: Contracts,
    gas: GasSettings,
    is_delegated: bool,
}

impl<C: Connect> Session<C> {
    /// Validate keys, connect, identify the chain and check the tx-account's delegation.
    ///
    /// Malformed keys are rejected before any connection is made.
    pub async fn login(connector: C, registry: ChainRegistry, params: LoginParams) -> Result<Self> {
        let tx_account = LocalCredential::from_secret(&params.tx_account_key)?;
        let gas_fee_payer = params
            .gas_fee_payer_key
            .as_ref()
            .map(LocalCredential::from_secret)
            .transpose()?;

        let provider = connector.connect(&params.rpc_url)?;
        let chain_id = provider.get_chain_id().await?;
        let chain = registry.describe(chain_id, &params.rpc_url);
        let is_delegated = delegation_status(&provider, tx_account.address())
            .await
            .is_delegated;

        info!(
            "Logged in as {:?} on {} ({chain_id}), delegated: {is_delegated}",
            tx_account.address(),
            chain.name
        );
        Ok(Self {
            connector,
            provider,
            registry,
            chain,
            tx_account,
            gas_fee_payer,
            contracts: params.contracts,
            gas: params.gas,
            is_delegated,
        })
    }

    /// End the session, dropping its keys.
    pub fn logout(self) {
        info!("Logged out {:?}", self.tx_account.address());
    }

    /// Re-read the tx-account's delegation state
    pub async fn refresh_delegation_status(&mut self) -> DelegationStatus {
        let status = delegation_status(&self.provider, self.tx_account.address()).await;
        self.is_delegated = status.is_delegated;
        status
    }

    /// Move the session to a registered chain.
    ///
    /// An unknown chain id fails without touching the network or the session.
    pub async fn switch_chain(&mut self, chain_id: u64) -> Result<()> {
        let chain = self
            .registry
            .get(chain_id)
            .cloned()
            .ok_or(Error::UnknownChain(chain_id))?;
        let provider = self.connector.connect(&chain.rpc_url)?;
        let is_delegated = delegation_status(&provider, self.tx_account.address())
            .await
            .is_delegated;

        info!("Switched to {} ({chain_id}), delegated: {is_delegated}", chain.name);
        self.provider = provider;
        self.chain = chain;
        self.is_delegated = is_delegated;
        Ok(())
    }

    /// Serializable view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tx_account: self.tx_account.address(),
            gas_fee_payer: self.gas_fee_payer.as_ref().map(LocalCredential::address),
            chain_id: self.chain.id,
            chain_name: self.chain.name.clone(),
            rpc_url: self.chain.rpc_url.clone(),
            explorer_url: self.chain.explorer_url.clone(),
            connected: true,
            is_delegated: self.is_delegated,
            contracts: self.contracts,
        }
    }

    /// Delegate the tx-account to the batch call delegation contract
    pub async fn bind(&self, sponsored: bool) -> Result<AuthorizationOutcome> {
        let sponsor = self.sponsor(sponsored)?;
        send_authorization(
            &self.provider,
            &self.submitter(),
            &self.tx_account,
            sponsor,
            self.contracts.delegation,
        )
        .await
    }

    /// Clear the tx-account's delegation
    pub async fn unbind(&self, sponsored: bool) -> Result<AuthorizationOutcome> {
        let sponsor = self.sponsor(sponsored)?;
        send_authorization(
            &self.provider,
            &self.submitter(),
            &self.tx_account,
            sponsor,
            Address::ZERO,
        )
        .await
    }

    /// Send native token transfers
    pub async fn send_native(
        &self,
        transfers: &[Transfer],
        options: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_calls(native_transfer_calls(transfers), options)
            .await
    }

    /// Send transfers of the session's ERC-20 token
    pub async fn send_erc20(
        &self,
        transfers: &[Transfer],
        options: SendOptions,
    ) -> Result<SendOutcome> {
        self.send_calls(
            erc20_transfer_calls(self.contracts.token, transfers),
            options,
        )
        .await
    }

    /// Batch through the delegation contract when possible, otherwise send call by call.
    async fn send_calls(&self, calls: Vec<BatchCall>, options: SendOptions) -> Result<SendOutcome> {
        if calls.is_empty() {
            return Err(Error::NoTransfers);
        }
        let sponsor = self.sponsor(options.sponsored)?;
        let submitter = self.submitter();

        if !self.is_delegated && !options.authorize {
            // per-call transactions are always signed and paid by the tx-account
            if sponsor.is_some() {
                return Err(Error::SponsorshipNeedsDelegation);
            }
            let tx_hashes =
                send_per_call(&self.provider, &submitter, &self.tx_account, calls).await?;
            return Ok(SendOutcome {
                mode: SendMode::PerCall,
                tx_hashes,
            });
        }

        let authorization_list = if options.authorize {
            let executor = match sponsor {
                Some(sponsor) => Executor::Sponsor(sponsor.address()),
                None => Executor::SelfExecuting,
            };
            vec![
                sign_authorization(
                    &self.provider,
                    &self.tx_account,
                    self.contracts.delegation,
                    self.chain.id,
                    executor,
                )
                .await?,
            ]
        } else {
            vec![]
        };
        let tx_hash = send_batch(
            &self.provider,
            &submitter,
            self.tx_account.address(),
            sponsor.unwrap_or(&self.tx_account),
            calls,
            authorization_list,
        )
        .await?;
        Ok(SendOutcome {
            mode: SendMode::Batched,
            tx_hashes: vec![tx_hash],
        })
    }

    /// Mint test tokens. Defaults to 1000 tokens to the tx-account, signed by the tx-account.
    pub async fn mint(
        &self,
        to: Option<Address>,
        amount: Option<U256>,
        minter: Option<&LocalCredential>,
    ) -> Result<TxHash> {
        token::mint(
            &self.provider,
            &self.submitter(),
            minter.unwrap_or(&self.tx_account),
            self.contracts.token,
            to.unwrap_or(self.tx_account.address()),
            amount.unwrap_or(token::DEFAULT_MINT_AMOUNT),
        )
        .await
    }

    /// Native balance of `owner`, defaulting to the tx-account
    pub async fn native_balance(&self, owner: Option<Address>) -> Result<U256> {
        token::native_balance(&self.provider, owner.unwrap_or(self.tx_account.address())).await
    }

    /// Token balance of `owner`, defaulting to the tx-account
    pub async fn token_balance(&self, owner: Option<Address>) -> Result<U256> {
        token::token_balance(
            &self.provider,
            self.contracts.token,
            owner.unwrap_or(self.tx_account.address()),
        )
        .await
    }

    /// Wait for a transaction sent in this session to be mined
    pub async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        polling: ReceiptPolling,
    ) -> Result<TransactionReceipt> {
        wait_for_receipt(&self.provider, tx_hash, polling).await
    }

    /// The active chain
    pub fn chain(&self) -> &ChainSpec {
        &self.chain
    }

    /// The tx-account's address
    pub fn tx_account(&self) -> Address {
        self.tx_account.address()
    }

    /// Delegation flag as of the last check
    pub fn is_delegated(&self) -> bool {
        self.is_delegated
    }

    /// The provider for the active chain
    pub fn provider(&self) -> &C::Provider {
        &self.provider
    }

    fn submitter(&self) -> Submitter {
        Submitter::new(self.chain.id, self.gas)
    }

    fn sponsor(&self, sponsored: bool) -> Result<Option<&LocalCredential>> {
        if !sponsored {
            return Ok(None);
        }
        self.gas_fee_payer
            .as_ref()
            .map(Some)
            .ok_or(Error::NoGasFeePayer)
    }
}
