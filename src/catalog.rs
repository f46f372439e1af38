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

//! Collaborator seams: the train catalog and the confirmation predictor.

use crate::ReservationError;
use crate::base::InventoryKey;
use crate::capacity::CapacityConfig;
use crate::status::QueueKind;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Source of truth for which inventories exist and how large they are.
pub trait Catalog: Send + Sync {
    /// Capacity configuration for `key`, or `None` if the train does not run that
    /// class/date/quota.
    fn capacity(&self, key: &InventoryKey) -> Option<CapacityConfig>;
}

/// Estimates the chance that a queued passenger ends up confirmed.
///
/// Purely informational: the engine reports the estimate alongside a queue position
/// and never consults it when admitting or promoting passengers.
pub trait ConfirmationPredictor: Send + Sync {
    fn confirmation_probability(
        &self,
        key: &InventoryKey,
        kind: QueueKind,
        ordinal: u32,
    ) -> Option<f64>;
}

/// Catalog backed by an in-memory map, filled at startup or by tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: DashMap<InventoryKey, CapacityConfig>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns [`ReservationError::DuplicateInventory`] if `key` is already registered.
    pub fn register(
        &self,
        key: InventoryKey,
        config: CapacityConfig,
    ) -> Result<(), ReservationError> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => Err(ReservationError::DuplicateInventory),
            Entry::Vacant(entry) => {
                entry.insert(config);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn capacity(&self, key: &InventoryKey) -> Option<CapacityConfig> {
        self.entries.get(key).map(|config| *config)
    }
}
