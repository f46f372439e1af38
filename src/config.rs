// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Engine configuration.
//!
//! Settings are read from an optional file (TOML, YAML or JSON, picked by extension)
//! and then overridden by `RESERVATION__*` environment variables, e.g.
//! `RESERVATION__LOCK__WAIT_MS=20` or `RESERVATION__ALLOW_PARTIAL_DEFAULT=true`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Bounded wait policy for acquiring a per-inventory lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LockPolicy {
    /// How long a single acquisition attempt may block.
    pub wait_ms: u64,
    /// Number of attempts before giving up with `TransientBusy`.
    pub max_attempts: u32,
    /// Linear backoff step slept between attempts.
    pub backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl LockPolicy {
    pub fn wait(&self) -> Duration {
        Duration::from_millis(self.wait_ms)
    }

    /// Sleep before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let ms = self
            .backoff_ms
            .saturating_mul(u64::from(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            wait_ms: 50,
            max_attempts: 5,
            backoff_ms: 10,
            max_backoff_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lock: LockPolicy,
    /// Partial-booking mode used when a caller does not choose one explicitly.
    pub allow_partial_default: bool,
    /// First PNR sequence number handed out by the booking ledger.
    pub pnr_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock: LockPolicy::default(),
            allow_partial_default: false,
            pnr_seed: 4_210_000_001,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(
                config::Environment::with_prefix("RESERVATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
