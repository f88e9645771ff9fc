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

use alloy_primitives::TxHash;
use setcode_provider::ProviderError;
use setcode_types::TransferError;

/// Error type for the client crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Signing or credential error
    #[error(transparent)]
    Signer(#[from] setcode_signer::Error),
    /// Provider error
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    /// A transfer could not be parsed
    #[error(transparent)]
    InvalidTransfer(#[from] TransferError),
    /// Nothing to send
    #[error("no transfers given")]
    NoTransfers,
    /// Chain is not in the registry
    #[error("chain {0} is not in the registry")]
    UnknownChain(u64),
    /// Sponsorship requested without a gas fee payer configured
    #[error("no gas fee payer configured")]
    NoGasFeePayer,
    /// Sponsorship requested for an account that is not delegated
    #[error("sponsored sends need a delegated account, bind first or pass --authorize")]
    SponsorshipNeedsDelegation,
    /// Transaction was mined but reverted
    #[error("transaction {0} reverted")]
    TransactionReverted(TxHash),
    /// Transaction was not mined within the polling budget
    #[error("transaction {tx_hash} not mined after {polls} polls")]
    ReceiptTimeout {
        /// The transaction being waited on
        tx_hash: TxHash,
        /// Number of receipt polls made
        polls: u32,
    },
    /// Some per-call transactions were sent before one failed
    #[error(transparent)]
    PartialSend(Box<PartialSendError>),
    /// Other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for the client crate
pub type Result<T> = std::result::Result<T, Error>;

/// A per-call send that stopped at its first failure.
///
/// Transactions in `sent` were accepted by the node and are not rolled back.
#[derive(Debug, thiserror::Error)]
#[error("{} transaction(s) sent before failure: {source}", sent.len())]
pub struct PartialSendError {
    /// Hashes of the transactions accepted before the failure, in send order
    pub sent: Vec<TxHash>,
    /// The failure that stopped the send
    pub source: Error,
}

impl From<PartialSendError> for Error {
    fn from(value: PartialSendError) -> Self {
        Error::PartialSend(Box::new(value))
    }
}
