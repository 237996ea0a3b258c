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

use base_crypto::hash::{HashOutput, persistent_hash};
use base_crypto::repr::{BinaryHashRepr, MemWrite};
use base_crypto::signatures::VerifyingKey;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

/// A compact credential identifier: the persistent hash of a verifying key's
/// canonical byte encoding.
///
/// Two verifying keys denote the same credential iff their addresses are
/// equal. Addresses identify stake credentials, pool operators, and the
/// payment credential of an unspent output alike.
#[derive(
    Default,
    Copy,
    Clone,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct UserAddress(pub HashOutput);

impl Debug for UserAddress {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "<user address {}>", self.0)
    }
}

impl Display for UserAddress {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl BinaryHashRepr for UserAddress {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.0.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.0.binary_len()
    }
}

impl rand::distributions::Distribution<UserAddress> for rand::distributions::Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> UserAddress {
        UserAddress(rng.r#gen())
    }
}

impl From<VerifyingKey> for UserAddress {
    fn from(value: VerifyingKey) -> Self {
        UserAddress(persistent_hash(value.binary_vec().as_slice()))
    }
}

impl From<&VerifyingKey> for UserAddress {
    fn from(value: &VerifyingKey) -> Self {
        UserAddress(persistent_hash(value.binary_vec().as_slice()))
    }
}

/// The identity of a transaction, used to reference the outputs it produced.
#[derive(
    Default,
    Copy,
    Clone,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct TransactionHash(pub HashOutput);

impl Debug for TransactionHash {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "<transaction hash {}>", self.0)
    }
}

impl BinaryHashRepr for TransactionHash {
    fn binary_repr<W: MemWrite<u8>>(&self, writer: &mut W) {
        self.0.binary_repr(writer);
    }
    fn binary_len(&self) -> usize {
        self.0.binary_len()
    }
}

impl rand::distributions::Distribution<TransactionHash> for rand::distributions::Standard {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> TransactionHash {
        TransactionHash(rng.r#gen())
    }
}
