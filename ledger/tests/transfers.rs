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
use coin_structure::utxo::{UtxoOutput, UtxoRef};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::BTreeSet;
use tideline_ledger::error::TransactionInvalid;
use tideline_ledger::structure::{
    Block, Transaction, TransactionBody, Witness, WitnessSet, genesis_hash,
};
use tideline_ledger::test_utilities::{TestState, transfer_tx};

fn genesis_ref() -> UtxoRef {
    UtxoRef {
        txid: genesis_hash(),
        output_no: 0,
    }
}

#[test]
fn genesis_spend_splits_into_two_outputs() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, key) = TestState::new(&mut rng, 1000);

    let recipient_a = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let recipient_b = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let tx = transfer_tx(
        &mut rng,
        &key,
        [genesis_ref()],
        vec![
            UtxoOutput {
                owner: recipient_a,
                value: 400,
            },
            UtxoOutput {
                owner: recipient_b,
                value: 600,
            },
        ],
    );
    state.assert_apply(&tx);

    let utxo = &state.ledger.utxo;
    assert_eq!(utxo.len(), 2);
    assert!(!utxo.contains(&genesis_ref()));
    assert_eq!(utxo.total_value(), 1000);
    for output_no in 0..2 {
        assert!(utxo.contains(&UtxoRef {
            txid: tx.transaction_hash(),
            output_no,
        }));
    }
}

#[test]
fn implicit_fee_is_permitted() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, key) = TestState::new(&mut rng, 1000);

    let recipient = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let tx = transfer_tx(
        &mut rng,
        &key,
        [genesis_ref()],
        vec![UtxoOutput {
            owner: recipient,
            value: 990,
        }],
    );
    state.assert_apply(&tx);
    assert_eq!(state.ledger.utxo.total_value(), 990);
}

#[test]
fn tampered_witness_is_rejected_without_state_change() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (state, key) = TestState::new(&mut rng, 1000);

    let recipient = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let body = TransactionBody {
        inputs: BTreeSet::from([genesis_ref()]),
        outputs: vec![UtxoOutput {
            owner: recipient,
            value: 1000,
        }],
        certificates: BTreeSet::new(),
    };
    // A signature by the right key over the wrong payload.
    let witness = Witness {
        key: key.verifying_key(),
        signature: key.sign(&mut rng, b"some unrelated payload"),
    };
    let tx = Transaction::new(
        body,
        WitnessSet {
            inputs: BTreeSet::from([witness]),
            certificates: BTreeSet::new(),
        },
    );

    let before = state.ledger.clone();
    let errors = state.assert_reject(&tx);
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, TransactionInvalid::InsufficientTxWitnesses))
    );
    assert_eq!(state.ledger, before);
}

#[test]
fn witness_set_must_match_input_count_exactly() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (mut state, key) = TestState::new(&mut rng, 1000);

    // Spend genesis into two outputs held by the same key, then spend both.
    let owner = UserAddress::from(key.verifying_key());
    let split = transfer_tx(
        &mut rng,
        &key,
        [genesis_ref()],
        vec![
            UtxoOutput { owner, value: 300 },
            UtxoOutput { owner, value: 700 },
        ],
    );
    state.assert_apply(&split);
    let inputs = [
        UtxoRef {
            txid: split.transaction_hash(),
            output_no: 0,
        },
        UtxoRef {
            txid: split.transaction_hash(),
            output_no: 1,
        },
    ];

    let recipient = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let well_formed = transfer_tx(
        &mut rng,
        &key,
        inputs,
        vec![UtxoOutput {
            owner: recipient,
            value: 1000,
        }],
    );

    // One individually valid witness short.
    let mut starved = well_formed.clone();
    let dropped = starved.witnesses.inputs.iter().next().cloned().unwrap();
    starved.witnesses.inputs.remove(&dropped);
    let errors = state.assert_reject(&starved);
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, TransactionInvalid::InsufficientTxWitnesses))
    );

    // One individually valid witness too many.
    let mut padded = well_formed.clone();
    let stranger = SigningKey::sample(&mut rng);
    padded
        .witnesses
        .inputs
        .insert(Witness::for_body(&stranger, &mut rng, &padded.body));
    let errors = state.assert_reject(&padded);
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, TransactionInvalid::InsufficientTxWitnesses))
    );

    // The untampered transaction passes.
    state.assert_apply(&well_formed);
}

#[test]
fn unknown_input_is_rejected() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (state, key) = TestState::new(&mut rng, 1000);

    let bogus = UtxoRef {
        txid: rng.r#gen(),
        output_no: 0,
    };
    let recipient = UserAddress::from(SigningKey::sample(&mut rng).verifying_key());
    let tx = transfer_tx(
        &mut rng,
        &key,
        [bogus],
        vec![UtxoOutput {
            owner: recipient,
            value: 1,
        }],
    );
    let errors = state.assert_reject(&tx);
    assert!(
        errors
            .iter()
            .any(|error| matches!(error, TransactionInvalid::UnknownInputs(missing) if missing == &vec![bogus]))
    );
}

#[test]
fn apply_blocks_folds_in_order_and_reports_position() {
    let mut rng = StdRng::seed_from_u64(0x42);
    let (state, key) = TestState::new(&mut rng, 1000);

    let owner = UserAddress::from(key.verifying_key());
    let hop_one = transfer_tx(
        &mut rng,
        &key,
        [genesis_ref()],
        vec![UtxoOutput { owner, value: 1000 }],
    );
    let hop_two = transfer_tx(
        &mut rng,
        &key,
        [UtxoRef {
            txid: hop_one.transaction_hash(),
            output_no: 0,
        }],
        vec![UtxoOutput { owner, value: 1000 }],
    );

    let blocks = [
        Block {
            transactions: vec![hop_one.clone()],
        },
        Block {
            transactions: vec![hop_two.clone()],
        },
    ];
    let after = state.ledger.apply_blocks(&blocks).unwrap();
    assert_eq!(after.utxo.len(), 1);
    assert!(after.utxo.contains(&UtxoRef {
        txid: hop_two.transaction_hash(),
        output_no: 0,
    }));

    // Replaying the second hop without the first pins the failure position.
    let failure = state
        .ledger
        .apply_blocks(&[Block {
            transactions: vec![hop_two.clone()],
        }])
        .unwrap_err();
    assert_eq!((failure.block, failure.transaction), (0, 0));
    assert_eq!(failure.tx_hash, hop_two.transaction_hash());
}
