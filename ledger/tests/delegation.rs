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

use base_crypto::signatures::SigningKey;
use coin_structure::coin::UserAddress;
use rand::{SeedableRng, rngs::StdRng};
use std::collections::BTreeMap;
use tideline_ledger::error::TransactionInvalid;
use tideline_ledger::structure::{Certificate, Delegation};
use tideline_ledger::test_utilities::{TestState, cert_tx, simple_pool};

#[test]
fn register_then_deregister_restores_keys_and_accounts() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);

    let keys_before = state.ledger.stake_keys.clone();
    let accounts_before = state.ledger.accounts.clone();

    let register = cert_tx(
        &mut rng,
        vec![(Certificate::RegisterKey(staker.verifying_key()), &staker)],
    );
    state.assert_apply(&register);
    let addr = UserAddress::from(staker.verifying_key());
    assert!(state.ledger.stake_keys.contains(&addr));
    assert_eq!(state.ledger.accounts.get(&addr), Some(&0));

    let deregister = cert_tx(
        &mut rng,
        vec![(Certificate::DeregisterKey(staker.verifying_key()), &staker)],
    );
    state.assert_apply(&deregister);
    assert_eq!(state.ledger.stake_keys, keys_before);
    assert_eq!(state.ledger.accounts, accounts_before);
}

#[test]
fn deregistration_also_clears_the_delegation() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);
    let operator = SigningKey::sample(&mut rng);

    let setup = cert_tx(
        &mut rng,
        vec![
            (Certificate::RegisterKey(staker.verifying_key()), &staker),
            (
                Certificate::RegisterPool(simple_pool(&operator)),
                &operator,
            ),
        ],
    );
    state.assert_apply(&setup);
    let delegate = cert_tx(
        &mut rng,
        vec![(
            Certificate::Delegate(Delegation {
                delegator: staker.verifying_key(),
                pool: operator.verifying_key(),
            }),
            &staker,
        )],
    );
    state.assert_apply(&delegate);
    let addr = UserAddress::from(staker.verifying_key());
    assert!(state.ledger.delegations.contains_key(&addr));

    let deregister = cert_tx(
        &mut rng,
        vec![(Certificate::DeregisterKey(staker.verifying_key()), &staker)],
    );
    state.assert_apply(&deregister);
    assert!(!state.ledger.delegations.contains_key(&addr));
}

#[test]
fn delegated_stake_attributes_the_genesis_coin() {
    let mut rng = StdRng::seed_from_u64(0x42);
    // Genesis: one output of 1000 coin to the staker's credential.
    let (mut state, staker) = TestState::new(&mut rng, 1000);
    let operator = SigningKey::sample(&mut rng);

    // Registration first: delegation is checked against the pre-transaction
    // state, so the pool must already be registered when delegating.
    let setup = cert_tx(
        &mut rng,
        vec![
            (Certificate::RegisterKey(staker.verifying_key()), &staker),
            (
                Certificate::RegisterPool(simple_pool(&operator)),
                &operator,
            ),
        ],
    );
    state.assert_apply(&setup);
    let delegate = cert_tx(
        &mut rng,
        vec![(
            Certificate::Delegate(Delegation {
                delegator: staker.verifying_key(),
                pool: operator.verifying_key(),
            }),
            &staker,
        )],
    );
    state.assert_apply(&delegate);

    let expected: BTreeMap<UserAddress, u128> =
        BTreeMap::from([(UserAddress::from(operator.verifying_key()), 1000)]);
    assert_eq!(state.ledger.delegated_stake(), expected);
}

#[test]
fn delegation_to_unregistered_pool_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);
    let operator = SigningKey::sample(&mut rng);

    let register = cert_tx(
        &mut rng,
        vec![(Certificate::RegisterKey(staker.verifying_key()), &staker)],
    );
    state.assert_apply(&register);

    let delegate = cert_tx(
        &mut rng,
        vec![(
            Certificate::Delegate(Delegation {
                delegator: staker.verifying_key(),
                pool: operator.verifying_key(),
            }),
            &staker,
        )],
    );
    let errors = state.assert_reject(&delegate);
    let pool_addr = UserAddress::from(operator.verifying_key());
    assert_eq!(errors, vec![TransactionInvalid::BadDelegation(pool_addr)]);
}

#[test]
fn deregistering_an_unknown_key_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);

    let deregister = cert_tx(
        &mut rng,
        vec![(Certificate::DeregisterKey(staker.verifying_key()), &staker)],
    );
    let errors = state.assert_reject(&deregister);
    let addr = UserAddress::from(staker.verifying_key());
    assert_eq!(errors, vec![TransactionInvalid::BadDeregistration(addr)]);
}

#[test]
fn stake_key_registration_may_not_shadow_a_pool() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, _) = TestState::new(&mut rng, 1000);
    let operator = SigningKey::sample(&mut rng);

    let register_pool = cert_tx(
        &mut rng,
        vec![(
            Certificate::RegisterPool(simple_pool(&operator)),
            &operator,
        )],
    );
    state.assert_apply(&register_pool);

    let shadow = cert_tx(
        &mut rng,
        vec![(Certificate::RegisterKey(operator.verifying_key()), &operator)],
    );
    let errors = state.assert_reject(&shadow);
    let addr = UserAddress::from(operator.verifying_key());
    assert_eq!(errors, vec![TransactionInvalid::BadRegistration(addr)]);
}

#[test]
fn re_registering_a_stake_key_is_accepted() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);

    for _ in 0..2 {
        let register = cert_tx(
            &mut rng,
            vec![(Certificate::RegisterKey(staker.verifying_key()), &staker)],
        );
        state.assert_apply(&register);
    }
    let addr = UserAddress::from(staker.verifying_key());
    assert!(state.ledger.stake_keys.contains(&addr));
    assert_eq!(state.ledger.accounts.get(&addr), Some(&0));
}

#[test]
fn certificate_witness_must_come_from_the_required_signer() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (state, _) = TestState::new(&mut rng, 1000);
    let staker = SigningKey::sample(&mut rng);
    let impostor = SigningKey::sample(&mut rng);

    // The impostor's signature is genuine, but not the subject key's.
    let forged = cert_tx(
        &mut rng,
        vec![(Certificate::RegisterKey(staker.verifying_key()), &impostor)],
    );
    let errors = state.assert_reject(&forged);
    assert_eq!(errors, vec![TransactionInvalid::InsufficientCertWitnesses]);
}
