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

#![deny(warnings)]

use rand::{SeedableRng, rngs::StdRng};
use tideline_base_crypto::hash::persistent_hash;
use tideline_base_crypto::signatures::SigningKey;

#[test]
fn signature_verifies_for_matching_key_and_payload() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let key = SigningKey::sample(&mut rng);
    let msg = b"the quick brown fox";
    let sig = key.sign(&mut rng, msg);
    assert!(key.verifying_key().verify(msg, &sig));
}

#[test]
fn signature_rejects_other_payload() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let key = SigningKey::sample(&mut rng);
    let sig = key.sign(&mut rng, b"payload one");
    assert!(!key.verifying_key().verify(b"payload two", &sig));
}

#[test]
fn signature_rejects_other_key() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let key = SigningKey::sample(&mut rng);
    let other = SigningKey::sample(&mut rng);
    let msg = b"shared payload";
    let sig = key.sign(&mut rng, msg);
    assert!(!other.verifying_key().verify(msg, &sig));
}

#[test]
fn persistent_hash_is_stable_and_injective_on_samples() {
    assert_eq!(persistent_hash(b"tideline"), persistent_hash(b"tideline"));
    assert_ne!(persistent_hash(b"tideline"), persistent_hash(b"tidelinf"));
}
