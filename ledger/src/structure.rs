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

use base_crypto::hash::{BLANK_HASH, PersistentHashWriter, persistent_hash};
use base_crypto::repr::{BinaryHashRepr, MemWrite};
use base_crypto::signatures::{Signature, SigningKey, VerifyingKey};
use coin_structure::coin::{TransactionHash, UserAddress};
use coin_structure::utxo::{UtxoOutput, UtxoRef, UtxoState};
use rand::{CryptoRng, Rng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};

/// Pools may not schedule a retirement at this epoch or beyond.
pub const MAX_EPOCH_RETIREMENT: Epoch = Epoch(100);

/// A discrete era counter. Pool retirement is scoped to epoch boundaries.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct Epoch(pub u64);

impl Epoch {
    /// The epoch immediately following this one.
    pub fn next(self) -> Epoch {
        Epoch(self.0 + 1)
    }
}

impl Display for Epoch {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "epoch {}", self.0)
    }
}

impl BinaryHashRepr for Epoch {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.0.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.0.binary_len()
    }
}

/// A stake pool's registration data.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StakePool {
    /// The pool's own key; its hash identifies the pool everywhere.
    pub pool_key: VerifyingKey,
    /// Pledged amounts, per pledging key.
    pub pledges: BTreeMap<VerifyingKey, u128>,
    /// Fixed operating cost, charged before the margin.
    pub cost: u128,
    /// Operator margin, in basis points of the remaining rewards.
    pub margin_basis_points: u32,
    /// An alternate account to receive operator rewards, if any.
    pub reward_account: Option<UserAddress>,
}

impl StakePool {
    /// The address identifying this pool.
    pub fn address(&self) -> UserAddress {
        UserAddress::from(&self.pool_key)
    }
}

impl BinaryHashRepr for StakePool {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.pool_key.binary_repr(writer);
        (self.pledges.len() as u64).binary_repr(writer);
        for (key, amount) in &self.pledges {
            key.binary_repr(writer);
            amount.binary_repr(writer);
        }
        self.cost.binary_repr(writer);
        self.margin_basis_points.binary_repr(writer);
        match &self.reward_account {
            Some(account) => {
                true.binary_repr(writer);
                account.binary_repr(writer);
            }
            None => {
                false.binary_repr(writer);
                BLANK_HASH.binary_repr(writer);
            }
        }
    }
    fn binary_len(&self) -> usize {
        self.pool_key.binary_len()
            + u64::BITS as usize / 8
            + self
                .pledges
                .iter()
                .map(|(key, amount)| key.binary_len() + amount.binary_len())
                .sum::<usize>()
            + self.cost.binary_len()
            + self.margin_basis_points.binary_len()
            + 1
            + BLANK_HASH.binary_len()
    }
}

/// An instruction binding a stake credential to a pool.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Delegation {
    /// The delegating credential's key.
    pub delegator: VerifyingKey,
    /// The key of the pool delegated to.
    pub pool: VerifyingKey,
}

impl BinaryHashRepr for Delegation {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.delegator.binary_repr(writer);
        self.pool.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.delegator.binary_len() + self.pool.binary_len()
    }
}

/// A ledger-state-mutating instruction embedded in a transaction.
///
/// Each variant carries the data needed to authorize and apply it, and has
/// exactly one required signer, returned by [`Certificate::required_signer`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Certificate {
    /// Register a stake credential.
    RegisterKey(VerifyingKey),
    /// Deregister a stake credential.
    DeregisterKey(VerifyingKey),
    /// Register a stake pool.
    RegisterPool(StakePool),
    /// Schedule a pool for retirement at a future epoch.
    RetirePool {
        /// The key of the pool to retire.
        pool: VerifyingKey,
        /// The epoch at which the retirement takes effect.
        epoch: Epoch,
    },
    /// Bind a stake credential to a pool.
    Delegate(Delegation),
}

impl Certificate {
    /// The key whose signature authorizes this certificate: the delegator
    /// for delegations, the pool's own key for pool registration and
    /// retirement, and the subject key otherwise.
    pub fn required_signer(&self) -> &VerifyingKey {
        match self {
            Certificate::RegisterKey(key) => key,
            Certificate::DeregisterKey(key) => key,
            Certificate::RegisterPool(pool) => &pool.pool_key,
            Certificate::RetirePool { pool, .. } => pool,
            Certificate::Delegate(delegation) => &delegation.delegator,
        }
    }
}

impl BinaryHashRepr for Certificate {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        match self {
            Certificate::RegisterKey(key) => {
                0u8.binary_repr(writer);
                key.binary_repr(writer);
            }
            Certificate::DeregisterKey(key) => {
                1u8.binary_repr(writer);
                key.binary_repr(writer);
            }
            Certificate::RegisterPool(pool) => {
                2u8.binary_repr(writer);
                pool.binary_repr(writer);
            }
            Certificate::RetirePool { pool, epoch } => {
                3u8.binary_repr(writer);
                pool.binary_repr(writer);
                epoch.binary_repr(writer);
            }
            Certificate::Delegate(delegation) => {
                4u8.binary_repr(writer);
                delegation.binary_repr(writer);
            }
        }
    }
    fn binary_len(&self) -> usize {
        1 + match self {
            Certificate::RegisterKey(key) => key.binary_len(),
            Certificate::DeregisterKey(key) => key.binary_len(),
            Certificate::RegisterPool(pool) => pool.binary_len(),
            Certificate::RetirePool { pool, epoch } => pool.binary_len() + epoch.binary_len(),
            Certificate::Delegate(delegation) => delegation.binary_len(),
        }
    }
}

/// The signed portion of a transaction: what it consumes, what it produces,
/// and which certificates it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
    /// Consumed inputs. Unique; order carries no meaning.
    pub inputs: BTreeSet<UtxoRef>,
    /// Produced outputs. Position assigns the output index, starting at 0.
    pub outputs: Vec<UtxoOutput>,
    /// Carried certificates. Unique; applied in their canonical order.
    pub certificates: BTreeSet<Certificate>,
}

impl TransactionBody {
    /// The hash of this body's canonical encoding.
    pub fn hash(&self) -> TransactionHash {
        let mut writer = PersistentHashWriter::new();
        self.binary_repr(&mut writer);
        TransactionHash(writer.finalize())
    }

    /// The exact bytes every witness signs.
    pub fn data_to_sign(&self) -> Vec<u8> {
        self.binary_vec()
    }
}

impl BinaryHashRepr for TransactionBody {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        (self.inputs.len() as u64).binary_repr(writer);
        for input in &self.inputs {
            input.binary_repr(writer);
        }
        (self.outputs.len() as u64).binary_repr(writer);
        for output in &self.outputs {
            output.binary_repr(writer);
        }
        (self.certificates.len() as u64).binary_repr(writer);
        for certificate in &self.certificates {
            certificate.binary_repr(writer);
        }
    }
    fn binary_len(&self) -> usize {
        3 * (u64::BITS as usize / 8)
            + self.inputs.iter().map(BinaryHashRepr::binary_len).sum::<usize>()
            + self.outputs.iter().map(BinaryHashRepr::binary_len).sum::<usize>()
            + self
                .certificates
                .iter()
                .map(BinaryHashRepr::binary_len)
                .sum::<usize>()
    }
}

/// One authorization: a key and its signature over a transaction body.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Witness {
    /// The authorizing key.
    pub key: VerifyingKey,
    /// The key's signature over the body's [`TransactionBody::data_to_sign`].
    pub signature: Signature,
}

impl Witness {
    /// Signs `body` with `key`.
    pub fn for_body<R: Rng + CryptoRng>(
        key: &SigningKey,
        rng: &mut R,
        body: &TransactionBody,
    ) -> Witness {
        Witness {
            key: key.verifying_key(),
            signature: key.sign(rng, &body.data_to_sign()),
        }
    }
}

/// The witnesses accompanying a transaction body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WitnessSet {
    /// Witnesses authorizing the consumed inputs.
    pub inputs: BTreeSet<Witness>,
    /// Witnesses authorizing the carried certificates.
    pub certificates: BTreeSet<Witness>,
}

/// A transaction: a body plus the witnesses authorizing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transaction {
    /// The signed portion.
    pub body: TransactionBody,
    /// The authorizations over it.
    pub witnesses: WitnessSet,
}

impl Transaction {
    /// Assembles a transaction.
    pub fn new(body: TransactionBody, witnesses: WitnessSet) -> Self {
        Transaction { body, witnesses }
    }

    /// The transaction's identity.
    ///
    /// This commits to the body only: attaching or reordering witnesses
    /// never perturbs references to the transaction's outputs.
    pub fn transaction_hash(&self) -> TransactionHash {
        self.body.hash()
    }

    /// The exact bytes every witness signs.
    pub fn data_to_sign(&self) -> Vec<u8> {
        self.body.data_to_sign()
    }

    /// The outputs this transaction produces, keyed under its hash with
    /// indices assigned by position.
    pub fn produced_utxos(&self) -> UtxoState {
        UtxoState::from_outputs(self.transaction_hash(), self.body.outputs.iter().copied())
    }
}

/// An ordered batch of transactions, as handed over by block ingestion.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    /// The block's transactions, in application order.
    pub transactions: Vec<Transaction>,
}

/// The hash under which genesis outputs are keyed.
pub fn genesis_hash() -> TransactionHash {
    TransactionHash(persistent_hash(b"tideline:genesis"))
}

/// The complete snapshot of chain state between transitions.
///
/// A state is never mutated in place: it is created once from a genesis
/// output list and then advanced strictly by transaction application and
/// epoch maintenance, each of which produces a new value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[must_use]
pub struct LedgerState {
    /// The unspent-output set.
    pub utxo: UtxoState,
    /// Reward-account balances, per registered stake credential.
    pub accounts: BTreeMap<UserAddress, u128>,
    /// The registered stake credentials.
    pub stake_keys: BTreeSet<UserAddress>,
    /// Active delegations: stake credential to pool.
    pub delegations: BTreeMap<UserAddress, UserAddress>,
    /// The registered pools.
    pub pools: BTreeSet<UserAddress>,
    /// Pools scheduled to retire, with their retirement epochs.
    pub retiring: BTreeMap<UserAddress, Epoch>,
    /// The current epoch.
    pub epoch: Epoch,
}

impl LedgerState {
    /// The state at the start of the chain: the given outputs keyed under
    /// [`genesis_hash`], and nothing else.
    pub fn genesis(outputs: impl IntoIterator<Item = UtxoOutput>) -> Self {
        LedgerState {
            utxo: UtxoState::from_outputs(genesis_hash(), outputs),
            accounts: BTreeMap::new(),
            stake_keys: BTreeSet::new(),
            delegations: BTreeMap::new(),
            pools: BTreeSet::new(),
            retiring: BTreeMap::new(),
            epoch: Epoch(0),
        }
    }
}
