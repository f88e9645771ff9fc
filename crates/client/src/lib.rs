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

#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]
#![doc(test(
    no_crate_inject,
    attr(deny(warnings, rust_2018_idioms), allow(dead_code, unused_variables))
))]

//! Setcode client
//!
//! Binds an account to a batch-call delegation contract and sends transfers through it, or one
//! transaction at a time when the account is not delegated.

mod batch;
pub use batch::{send_batch, send_per_call};

mod delegation;
pub use delegation::{
    check_delegation_status, delegation_status, send_authorization, AuthorizationOutcome,
    DelegationStatus,
};

mod error;
pub use error::{Error, PartialSendError, Result};

mod session;
pub use session::{
    Contracts, LoginParams, SendMode, SendOptions, SendOutcome, Session, SessionSnapshot,
};

mod submit;
pub use submit::{wait_for_receipt, GasSettings, ReceiptPolling, Submitter, TxParams};

mod token;
pub use token::{mint, native_balance, token_balance, DEFAULT_MINT_AMOUNT};

#[cfg(test)]
mod test_utils;
