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

//! The unspent-output set and its operators.
//!
//! All updates are persistent-style: methods take `&self` and return a new
//! set, leaving the receiver untouched. Iteration is in key order, so any
//! fold over the set is deterministic.

use crate::coin::{TransactionHash, UserAddress};
use base_crypto::repr::{BinaryHashRepr, MemWrite};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reference to one produced output: the input that would consume it.
#[derive(
    Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UtxoRef {
    /// The transaction whose output is consumed.
    pub txid: TransactionHash,
    /// The index of the output in the producing transaction.
    pub output_no: u32,
}

impl BinaryHashRepr for UtxoRef {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.txid.binary_repr(writer);
        self.output_no.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.txid.binary_len() + self.output_no.binary_len()
    }
}

/// One produced output: a payment credential and a coin amount.
#[derive(
    Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UtxoOutput {
    /// The credential that may spend this output.
    pub owner: UserAddress,
    /// The coin amount held.
    pub value: u128,
}

impl BinaryHashRepr for UtxoOutput {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.owner.binary_repr(writer);
        self.value.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.owner.binary_len() + self.value.binary_len()
    }
}

/// The set of currently unspent outputs, keyed by the input reference that
/// would consume each one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoState {
    utxos: BTreeMap<UtxoRef, UtxoOutput>,
}

impl UtxoState {
    /// An empty set.
    pub fn new() -> Self {
        UtxoState::default()
    }

    /// The outputs of one transaction, keyed under its hash with indices
    /// assigned by position, starting at 0.
    pub fn from_outputs(
        txid: TransactionHash,
        outputs: impl IntoIterator<Item = UtxoOutput>,
    ) -> Self {
        UtxoState {
            utxos: outputs
                .into_iter()
                .enumerate()
                .map(|(output_no, output)| {
                    (
                        UtxoRef {
                            txid,
                            // Cast safe, as we assume transactions with less
                            // than 4B outputs.
                            output_no: output_no as u32,
                        },
                        output,
                    )
                })
                .collect(),
        }
    }

    /// Whether `input` refers to an unspent output.
    pub fn contains(&self, input: &UtxoRef) -> bool {
        self.utxos.contains_key(input)
    }

    /// The output `input` refers to, if unspent.
    pub fn get(&self, input: &UtxoRef) -> Option<&UtxoOutput> {
        self.utxos.get(input)
    }

    /// Inserts a single entry.
    pub fn insert(&self, input: UtxoRef, output: UtxoOutput) -> Self {
        let mut utxos = self.utxos.clone();
        utxos.insert(input, output);
        UtxoState { utxos }
    }

    /// Removes a single entry.
    pub fn remove(&self, input: &UtxoRef) -> Self {
        let mut utxos = self.utxos.clone();
        utxos.remove(input);
        UtxoState { utxos }
    }

    /// Domain restriction: the entries whose keys appear in `inputs`.
    pub fn restricted_to<'a>(&self, inputs: impl IntoIterator<Item = &'a UtxoRef>) -> Self {
        UtxoState {
            utxos: inputs
                .into_iter()
                .filter_map(|input| self.utxos.get_key_value(input))
                .map(|(input, output)| (*input, *output))
                .collect(),
        }
    }

    /// Domain exclusion: the entries whose keys do not appear in `inputs`.
    pub fn without<'a>(&self, inputs: impl IntoIterator<Item = &'a UtxoRef>) -> Self {
        let mut utxos = self.utxos.clone();
        for input in inputs {
            utxos.remove(input);
        }
        UtxoState { utxos }
    }

    /// Union of two sets with disjoint keys.
    ///
    /// Disjointness is guaranteed by construction when the right-hand side
    /// holds freshly produced outputs, since those are keyed under a fresh
    /// transaction hash.
    pub fn disjoint_union(&self, other: &Self) -> Self {
        debug_assert!(other.utxos.keys().all(|input| !self.contains(input)));
        let mut utxos = self.utxos.clone();
        utxos.extend(other.utxos.iter().map(|(input, output)| (*input, *output)));
        UtxoState { utxos }
    }

    /// The summed value of every entry.
    pub fn total_value(&self) -> u128 {
        self.utxos
            .values()
            .fold(0u128, |acc, output| acc.saturating_add(output.value))
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&UtxoRef, &UtxoOutput)> {
        self.utxos.iter()
    }

    /// The number of unspent outputs.
    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}

impl FromIterator<(UtxoRef, UtxoOutput)> for UtxoState {
    fn from_iter<I: IntoIterator<Item = (UtxoRef, UtxoOutput)>>(iter: I) -> Self {
        UtxoState {
            utxos: iter.into_iter().collect(),
        }
    }
}
