// This file is part of tideline-ledger.
// Copyright (C) 2025 Tideline Foundation
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::structure::Epoch;
use coin_structure::coin::{TransactionHash, UserAddress};
use coin_structure::utxo::UtxoRef;
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// A reason a transaction is rejected by validation.
///
/// Validation accumulates these: a rejected transaction reports every
/// violated rule, not just the first one found. All variants are
/// recoverable from the caller's perspective; none abort anything beyond
/// the offending transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInvalid {
    /// One or more consumed inputs are absent from the unspent-output set.
    UnknownInputs(Vec<UtxoRef>),
    /// The transaction produces more value than it consumes.
    IncreasedTotalBalance {
        /// Total value of the consumed inputs present in the UTXO set.
        consumed: u128,
        /// Total value of the produced outputs.
        produced: u128,
    },
    /// The input witnesses do not exactly cover the consumed inputs.
    InsufficientTxWitnesses,
    /// The certificate witnesses do not exactly cover the certificates.
    InsufficientCertWitnesses,
    /// A stake-key registration collides with a registered pool.
    BadRegistration(UserAddress),
    /// A deregistration names a stake key that is not registered.
    BadDeregistration(UserAddress),
    /// A delegation names a pool that is not registered.
    BadDelegation(UserAddress),
    /// Reserved: pool registrations are currently unconditionally valid,
    /// and only certificate witnessing constrains them.
    BadPoolRegistration(UserAddress),
    /// A pool retirement is scheduled outside the permitted window.
    BadPoolRetirement {
        /// The pool being retired.
        pool: UserAddress,
        /// The requested retirement epoch.
        epoch: Epoch,
    },
}

impl Display for TransactionInvalid {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        use TransactionInvalid::*;
        match self {
            UnknownInputs(inputs) => {
                write!(
                    formatter,
                    "attempt to spend inputs absent from the utxo set: {:?}",
                    inputs
                )
            }
            IncreasedTotalBalance { consumed, produced } => {
                write!(
                    formatter,
                    "transaction produces {produced} coins while consuming only {consumed}"
                )
            }
            InsufficientTxWitnesses => {
                write!(
                    formatter,
                    "input witnesses do not exactly cover the transaction's inputs"
                )
            }
            InsufficientCertWitnesses => {
                write!(
                    formatter,
                    "certificate witnesses do not exactly cover the transaction's certificates"
                )
            }
            BadRegistration(addr) => {
                write!(
                    formatter,
                    "stake key registration for {addr} collides with a registered pool"
                )
            }
            BadDeregistration(addr) => {
                write!(formatter, "deregistration of unregistered stake key {addr}")
            }
            BadDelegation(addr) => {
                write!(formatter, "delegation to unregistered pool {addr}")
            }
            BadPoolRegistration(addr) => {
                write!(formatter, "invalid registration of pool {addr}")
            }
            BadPoolRetirement { pool, epoch } => {
                write!(
                    formatter,
                    "pool {pool} cannot be scheduled to retire at {epoch}"
                )
            }
        }
    }
}

impl Error for TransactionInvalid {}

/// A block batch stopped at its first invalid transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockApplicationFailure {
    /// Position of the failing block in the batch.
    pub block: usize,
    /// Position of the failing transaction within its block.
    pub transaction: usize,
    /// Identity of the failing transaction.
    pub tx_hash: TransactionHash,
    /// The accumulated validation errors, verbatim.
    pub errors: Vec<TransactionInvalid>,
}

impl Display for BlockApplicationFailure {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(
            formatter,
            "transaction {} in block {} ({:?}) is invalid: ",
            self.transaction, self.block, self.tx_hash
        )?;
        let mut sep = "";
        for error in &self.errors {
            write!(formatter, "{sep}{error}")?;
            sep = "; ";
        }
        Ok(())
    }
}

impl Error for BlockApplicationFailure {}
