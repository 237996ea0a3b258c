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

//! Transaction validation.
//!
//! Each rule is an independent predicate over the pre-transaction state;
//! their outcomes are combined with [`Validity`], which accumulates every
//! violation rather than stopping at the first. A transaction that passes
//! becomes a [`VerifiedTransaction`], the only thing the application engine
//! accepts.

use crate::error::TransactionInvalid;
use crate::structure::{Certificate, LedgerState, MAX_EPOCH_RETIREMENT, Transaction};
use coin_structure::coin::{TransactionHash, UserAddress};
use coin_structure::utxo::UtxoRef;

/// An accumulating validation outcome.
///
/// [`Validity::valid`] is the identity of [`Validity::and`], which is
/// associative; combining two failures concatenates their error lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validity {
    errors: Vec<TransactionInvalid>,
}

impl Validity {
    /// The passing outcome.
    pub fn valid() -> Self {
        Validity { errors: Vec::new() }
    }

    /// A single-violation outcome.
    pub fn invalid(error: TransactionInvalid) -> Self {
        Validity {
            errors: vec![error],
        }
    }

    /// Combines two outcomes, keeping every violation of both.
    #[must_use]
    pub fn and(mut self, other: Validity) -> Validity {
        self.errors.extend(other.errors);
        self
    }

    /// Whether no rule was violated.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The accumulated violations, in rule order.
    pub fn errors(&self) -> &[TransactionInvalid] {
        &self.errors
    }

    /// `Ok(value)` if nothing was violated, the violations otherwise.
    pub fn into_result<T>(self, value: T) -> Result<T, Vec<TransactionInvalid>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

impl FromIterator<Validity> for Validity {
    fn from_iter<I: IntoIterator<Item = Validity>>(iter: I) -> Self {
        iter.into_iter().fold(Validity::valid(), Validity::and)
    }
}

/// A transaction that passed [`Transaction::well_formed`] against some
/// reference state, and may be applied to it.
#[derive(Clone, Debug)]
pub struct VerifiedTransaction(pub(crate) Transaction);

impl VerifiedTransaction {
    /// The underlying transaction's identity.
    pub fn transaction_hash(&self) -> TransactionHash {
        self.0.transaction_hash()
    }

    /// The underlying transaction.
    pub fn inner(&self) -> &Transaction {
        &self.0
    }
}

impl Transaction {
    /// Checks every validation rule against `ref_state`, accumulating all
    /// violations.
    ///
    /// Validation reads the state and the transaction only; checking the
    /// same pair twice yields the same outcome.
    pub fn well_formed(
        &self,
        ref_state: &LedgerState,
    ) -> Result<VerifiedTransaction, Vec<TransactionInvalid>> {
        let validity = self
            .existing_inputs(ref_state)
            .and(self.conserves_balance(ref_state))
            .and(self.witnessed_inputs(ref_state))
            .and(self.witnessed_certificates())
            .and(self.valid_certificates(ref_state));
        if !validity.is_valid() {
            debug!(
                tx = ?self.transaction_hash(),
                errors = ?validity.errors(),
                "rejecting malformed transaction"
            );
        }
        validity.into_result(VerifiedTransaction(self.clone()))
    }

    /// Every consumed input must be a key of the unspent-output set.
    fn existing_inputs(&self, ref_state: &LedgerState) -> Validity {
        let missing: Vec<UtxoRef> = self
            .body
            .inputs
            .iter()
            .filter(|input| !ref_state.utxo.contains(input))
            .copied()
            .collect();
        if missing.is_empty() {
            Validity::valid()
        } else {
            Validity::invalid(TransactionInvalid::UnknownInputs(missing))
        }
    }

    /// Produced value may not exceed consumed value. Strictly less is
    /// permitted; the difference is an implicit fee.
    fn conserves_balance(&self, ref_state: &LedgerState) -> Validity {
        let consumed = self
            .body
            .inputs
            .iter()
            .filter_map(|input| ref_state.utxo.get(input))
            .fold(0u128, |acc, output| acc.saturating_add(output.value));
        let produced = self
            .body
            .outputs
            .iter()
            .fold(0u128, |acc, output| acc.saturating_add(output.value));
        if produced <= consumed {
            Validity::valid()
        } else {
            Validity::invalid(TransactionInvalid::IncreasedTotalBalance { consumed, produced })
        }
    }

    /// The input witnesses must number exactly as many as the inputs, and
    /// each input's owning credential must be matched by a witness whose
    /// signature verifies over the body.
    ///
    /// An input absent from the unspent-output set has no recorded owner
    /// and therefore cannot be witnessed.
    fn witnessed_inputs(&self, ref_state: &LedgerState) -> Validity {
        let witnesses = &self.witnesses.inputs;
        if witnesses.len() != self.body.inputs.len() {
            return Validity::invalid(TransactionInvalid::InsufficientTxWitnesses);
        }
        let payload = self.data_to_sign();
        let covered = |input: &UtxoRef| {
            ref_state.utxo.get(input).is_some_and(|output| {
                witnesses.iter().any(|witness| {
                    UserAddress::from(&witness.key) == output.owner
                        && witness.key.verify(&payload, &witness.signature)
                })
            })
        };
        if self.body.inputs.iter().all(covered) {
            Validity::valid()
        } else {
            Validity::invalid(TransactionInvalid::InsufficientTxWitnesses)
        }
    }

    /// The symmetric rule over certificates, using each certificate's
    /// required signer.
    fn witnessed_certificates(&self) -> Validity {
        let witnesses = &self.witnesses.certificates;
        if witnesses.len() != self.body.certificates.len() {
            return Validity::invalid(TransactionInvalid::InsufficientCertWitnesses);
        }
        let payload = self.data_to_sign();
        let covered = |certificate: &Certificate| {
            let signer = certificate.required_signer();
            witnesses.iter().any(|witness| {
                witness.key == *signer && witness.key.verify(&payload, &witness.signature)
            })
        };
        if self.body.certificates.iter().all(covered) {
            Validity::valid()
        } else {
            Validity::invalid(TransactionInvalid::InsufficientCertWitnesses)
        }
    }

    /// Per-certificate semantic rules, checked independently against the
    /// pre-transaction state.
    fn valid_certificates(&self, ref_state: &LedgerState) -> Validity {
        self.body
            .certificates
            .iter()
            .map(|certificate| valid_certificate(certificate, ref_state))
            .collect()
    }
}

fn valid_certificate(certificate: &Certificate, ref_state: &LedgerState) -> Validity {
    match certificate {
        // The collision guard is against the pool namespace only;
        // re-registering an already-registered stake key is accepted.
        Certificate::RegisterKey(key) => {
            let addr = UserAddress::from(key);
            if ref_state.pools.contains(&addr) {
                Validity::invalid(TransactionInvalid::BadRegistration(addr))
            } else {
                Validity::valid()
            }
        }
        Certificate::DeregisterKey(key) => {
            let addr = UserAddress::from(key);
            if ref_state.stake_keys.contains(&addr) {
                Validity::valid()
            } else {
                Validity::invalid(TransactionInvalid::BadDeregistration(addr))
            }
        }
        // Beyond its signature, a pool registration is unconstrained.
        Certificate::RegisterPool(_) => Validity::valid(),
        Certificate::RetirePool { pool, epoch } => {
            if ref_state.epoch < *epoch && *epoch < MAX_EPOCH_RETIREMENT {
                Validity::valid()
            } else {
                Validity::invalid(TransactionInvalid::BadPoolRetirement {
                    pool: UserAddress::from(pool),
                    epoch: *epoch,
                })
            }
        }
        Certificate::Delegate(delegation) => {
            let pool = UserAddress::from(&delegation.pool);
            if ref_state.pools.contains(&pool) {
                Validity::valid()
            } else {
                Validity::invalid(TransactionInvalid::BadDelegation(pool))
            }
        }
    }
}
