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

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::filter::targets::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Verbosity threshold for [`init_logger`].
pub enum LogLevel {
    /// Disable logging altogether.
    Off,
    /// The most verbose setting, primarily per-check diagnostics.
    Trace,
    /// Per-transaction diagnostics, including rejection reasons.
    Debug,
    /// High-level lifecycle messages.
    Info,
    /// Suspicious but non-fatal conditions only.
    Warn,
    /// Logic defects only.
    Error,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        use LogLevel::*;
        match level {
            Off => LevelFilter::OFF,
            Trace => LevelFilter::TRACE,
            Debug => LevelFilter::DEBUG,
            Info => LevelFilter::INFO,
            Warn => LevelFilter::WARN,
            Error => LevelFilter::ERROR,
        }
    }
}

/// Installs a global subscriber writing to stdout at the given level.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger(level: LogLevel) {
    Registry::default()
        .with(tracing_subscriber::fmt::layer().with_filter(Targets::new().with_default(level)))
        .try_init()
        .ok();
    info!("Welcome to ledger v{}!", env!("CARGO_PKG_VERSION"));
}
