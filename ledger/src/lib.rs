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

#![deny(unreachable_pub)]
#![deny(warnings)]

//! This crate implements the transaction format and state-transition
//! semantics for the Tideline delegation ledger.
//!
//! The entry point is [`structure::LedgerState`]: transactions are checked
//! against a state with [`structure::Transaction::well_formed`], applied
//! with [`semantics`]' `apply_transaction`, and epoch boundaries are
//! processed with `post_epoch_update`.

#[macro_use]
extern crate tracing;

pub mod error;
#[path = "tracing.rs"]
mod ledger_tracing;
pub mod semantics;
pub mod structure;
pub mod verify;

pub use ledger_tracing::{LogLevel, init_logger};

#[cfg(feature = "test-utilities")]
pub mod test_utilities;
