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

//! State-transition semantics.
//!
//! Application is total on verified input: a [`VerifiedTransaction`] always
//! yields a successor state. A failure here is a logic defect in
//! validation, not a runtime condition to recover from.

use crate::error::{BlockApplicationFailure, TransactionInvalid};
use crate::structure::{Block, Certificate, Epoch, LedgerState, Transaction};
use crate::verify::VerifiedTransaction;
use coin_structure::coin::UserAddress;
use itertools::{Either, Itertools};
use std::collections::BTreeMap;

impl LedgerState {
    /// Applies one certificate's state effect.
    pub fn apply_cert(&self, certificate: &Certificate) -> Self {
        let mut res = self.clone();
        match certificate {
            Certificate::RegisterKey(key) => {
                let addr = UserAddress::from(key);
                res.stake_keys.insert(addr);
                // Map-insert semantics: re-registration resets the account.
                res.accounts.insert(addr, 0);
            }
            Certificate::DeregisterKey(key) => {
                let addr = UserAddress::from(key);
                res.stake_keys.remove(&addr);
                res.accounts.remove(&addr);
                res.delegations.remove(&addr);
            }
            Certificate::RegisterPool(pool) => {
                let addr = pool.address();
                res.pools.insert(addr);
                // Re-registering cancels a pending retirement.
                res.retiring.remove(&addr);
            }
            Certificate::RetirePool { pool, epoch } => {
                // The pool stays registered until the epoch boundary sweep.
                res.retiring.insert(UserAddress::from(pool), *epoch);
            }
            Certificate::Delegate(delegation) => {
                res.delegations.insert(
                    UserAddress::from(&delegation.delegator),
                    UserAddress::from(&delegation.pool),
                );
            }
        }
        res
    }

    /// Folds every certificate of `tx` over the state, in the certificate
    /// set's canonical order.
    fn apply_certs(&self, tx: &Transaction) -> Self {
        tx.body
            .certificates
            .iter()
            .fold(self.clone(), |state, certificate| {
                state.apply_cert(certificate)
            })
    }

    /// Replaces the unspent-output set with
    /// `(utxo ∖ consumed inputs) ∪ produced outputs`.
    fn apply_tx_body(&self, tx: &Transaction) -> Self {
        let mut res = self.clone();
        res.utxo = self
            .utxo
            .without(tx.body.inputs.iter())
            .disjoint_union(&tx.produced_utxos());
        res
    }

    /// Applies a verified transaction: certificate effects first, then the
    /// unspent-output update.
    pub fn apply(&self, tx: &VerifiedTransaction) -> Self {
        self.apply_certs(&tx.0).apply_tx_body(&tx.0)
    }

    /// The single state-transition entry point: validates `tx` against this
    /// state and, if nothing is violated, applies it.
    ///
    /// On rejection the accumulated errors are returned verbatim and the
    /// state is unchanged.
    pub fn apply_transaction(&self, tx: &Transaction) -> Result<Self, Vec<TransactionInvalid>> {
        let verified = tx.well_formed(self)?;
        Ok(self.apply(&verified))
    }

    /// Applies ordered blocks transaction by transaction, stopping at the
    /// first invalid one.
    ///
    /// This is the primitive a block-ingestion worker drives; batching and
    /// rollback policy live with the caller.
    pub fn apply_blocks<'a>(
        &self,
        blocks: impl IntoIterator<Item = &'a Block>,
    ) -> Result<Self, BlockApplicationFailure> {
        let mut state = self.clone();
        for (block_no, block) in blocks.into_iter().enumerate() {
            for (tx_no, tx) in block.transactions.iter().enumerate() {
                state = state
                    .apply_transaction(tx)
                    .map_err(|errors| BlockApplicationFailure {
                        block: block_no,
                        transaction: tx_no,
                        tx_hash: tx.transaction_hash(),
                        errors,
                    })?;
            }
        }
        Ok(state)
    }

    /// Processes an epoch boundary: records the new epoch and removes every
    /// pool whose scheduled retirement epoch is exactly `epoch`.
    ///
    /// Must be invoked by the caller at each boundary; transaction
    /// application never triggers it.
    pub fn post_epoch_update(&self, epoch: Epoch) -> Self {
        let (retired, retained): (Vec<UserAddress>, BTreeMap<UserAddress, Epoch>) = self
            .retiring
            .iter()
            .partition_map(|(pool, scheduled)| {
                if *scheduled == epoch {
                    Either::Left(*pool)
                } else {
                    Either::Right((*pool, *scheduled))
                }
            });
        if !retired.is_empty() {
            debug!(count = retired.len(), %epoch, "retiring pools at epoch boundary");
        }
        let mut res = self.clone();
        for pool in &retired {
            res.pools.remove(pool);
        }
        res.retiring = retained;
        res.epoch = epoch;
        res
    }

    /// Total delegated coin per pool: every unspent output whose owning
    /// credential delegates resolves to its pool; undelegated outputs are
    /// skipped. Read-only.
    pub fn delegated_stake(&self) -> BTreeMap<UserAddress, u128> {
        let mut res = BTreeMap::new();
        for (_, output) in self.utxo.iter() {
            if let Some(pool) = self.delegations.get(&output.owner) {
                let total: &mut u128 = res.entry(*pool).or_default();
                *total = total.saturating_add(output.value);
            }
        }
        res
    }
}
