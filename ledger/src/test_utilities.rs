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

//! Helpers for assembling keys, transactions, and states in test setups.

use crate::error::TransactionInvalid;
use crate::structure::{
    Certificate, LedgerState, StakePool, Transaction, TransactionBody, Witness, WitnessSet,
};
use base_crypto::signatures::SigningKey;
use coin_structure::coin::UserAddress;
use coin_structure::utxo::{UtxoOutput, UtxoRef};
use rand::{CryptoRng, Rng};
use std::collections::{BTreeMap, BTreeSet};

/// A ledger state under test, advanced in place.
pub struct TestState {
    /// The current state.
    pub ledger: LedgerState,
}

impl TestState {
    /// A fresh state holding one genesis output of `genesis_value` coins,
    /// owned by the returned key.
    pub fn new<R: Rng + CryptoRng>(rng: &mut R, genesis_value: u128) -> (TestState, SigningKey) {
        let key = SigningKey::sample(&mut *rng);
        let owner = UserAddress::from(key.verifying_key());
        let ledger = LedgerState::genesis([UtxoOutput {
            owner,
            value: genesis_value,
        }]);
        (TestState { ledger }, key)
    }

    /// Applies `tx`, panicking on rejection.
    pub fn assert_apply(&mut self, tx: &Transaction) {
        match self.ledger.apply_transaction(tx) {
            Ok(state) => self.ledger = state,
            Err(errors) => panic!("transaction unexpectedly rejected: {errors:?}"),
        }
    }

    /// Asserts `tx` is rejected, returning the accumulated errors. The
    /// state is left untouched.
    pub fn assert_reject(&self, tx: &Transaction) -> Vec<TransactionInvalid> {
        match self.ledger.apply_transaction(tx) {
            Ok(_) => panic!("transaction unexpectedly accepted"),
            Err(errors) => errors,
        }
    }

    /// Advances to the next epoch boundary.
    pub fn step_epoch(&mut self) {
        self.ledger = self.ledger.post_epoch_update(self.ledger.epoch.next());
    }
}

/// A transfer spending `inputs`, all owned by `key`, into `outputs`.
pub fn transfer_tx<R: Rng + CryptoRng>(
    rng: &mut R,
    key: &SigningKey,
    inputs: impl IntoIterator<Item = UtxoRef>,
    outputs: Vec<UtxoOutput>,
) -> Transaction {
    let body = TransactionBody {
        inputs: inputs.into_iter().collect(),
        outputs,
        certificates: BTreeSet::new(),
    };
    let witnesses = WitnessSet {
        inputs: body
            .inputs
            .iter()
            .map(|_| Witness::for_body(key, rng, &body))
            .collect(),
        certificates: BTreeSet::new(),
    };
    Transaction::new(body, witnesses)
}

/// A certificate-only transaction, each certificate signed by the key given
/// alongside it.
pub fn cert_tx<R: Rng + CryptoRng>(
    rng: &mut R,
    certificates: Vec<(Certificate, &SigningKey)>,
) -> Transaction {
    let body = TransactionBody {
        inputs: BTreeSet::new(),
        outputs: Vec::new(),
        certificates: certificates
            .iter()
            .map(|(certificate, _)| certificate.clone())
            .collect(),
    };
    let witnesses = WitnessSet {
        inputs: BTreeSet::new(),
        certificates: certificates
            .iter()
            .map(|(_, key)| Witness::for_body(key, rng, &body))
            .collect(),
    };
    Transaction::new(body, witnesses)
}

/// A pool registration record with no pledges and zero cost.
pub fn simple_pool(key: &SigningKey) -> StakePool {
    StakePool {
        pool_key: key.verifying_key(),
        pledges: BTreeMap::new(),
        cost: 0,
        margin_basis_points: 0,
        reward_account: None,
    }
}
