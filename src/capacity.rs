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

//! Capacity ledger.
//!
//! Counts confirmed seats and RAC slots for one inventory and hands out seat slots.
//! Only the allocation engine mutates a ledger, always under the inventory lock.
//!
//! # Example
//!
//! ```
//! use rail_reservation_rs::{CapacityConfig, CapacityLedger, SeatSlot};
//!
//! let mut ledger = CapacityLedger::new(CapacityConfig::new(2, 1, 10));
//! assert_eq!(ledger.reserve_confirmed(), Some(SeatSlot(1)));
//! assert_eq!(ledger.available_seats(), 1);
//! ```

use crate::ReservationError;
use crate::base::SeatSlot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-inventory limits, supplied by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    pub total_seats: u16,
    pub rac_limit: u32,
    pub waitlist_cap: u32,
}

impl CapacityConfig {
    pub fn new(total_seats: u16, rac_limit: u32, waitlist_cap: u32) -> Self {
        Self {
            total_seats,
            rac_limit,
            waitlist_cap,
        }
    }
}

/// Point-in-time view of a ledger, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapacitySnapshot {
    pub total_seats: u16,
    pub confirmed_count: u32,
    pub available_seats: u32,
    pub rac_limit: u32,
    pub rac_count: u32,
    pub waitlist_cap: u32,
}

#[derive(Debug, Clone)]
pub struct CapacityLedger {
    config: CapacityConfig,
    confirmed_count: u32,
    rac_count: u32,
    /// Seat slots not currently held by a confirmed passenger.
    free_seats: BTreeSet<SeatSlot>,
}

impl CapacityLedger {
    pub fn new(config: CapacityConfig) -> Self {
        Self {
            config,
            confirmed_count: 0,
            rac_count: 0,
            free_seats: (1..=config.total_seats).map(SeatSlot).collect(),
        }
    }

    pub fn config(&self) -> CapacityConfig {
        self.config
    }

    pub fn confirmed_count(&self) -> u32 {
        self.confirmed_count
    }

    pub fn rac_count(&self) -> u32 {
        self.rac_count
    }

    pub fn available_seats(&self) -> u32 {
        u32::from(self.config.total_seats) - self.confirmed_count
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.confirmed_count <= u32::from(self.config.total_seats),
            "Invariant violated: confirmed_count {} exceeds total_seats {}",
            self.confirmed_count,
            self.config.total_seats
        );
        debug_assert!(
            self.rac_count <= self.config.rac_limit,
            "Invariant violated: rac_count {} exceeds rac_limit {}",
            self.rac_count,
            self.config.rac_limit
        );
        debug_assert_eq!(
            self.free_seats.len() as u32 + self.confirmed_count,
            u32::from(self.config.total_seats),
            "Invariant violated: seat slots out of sync with confirmed_count"
        );
    }

    /// Verifies count bounds and seat bookkeeping.
    pub fn check_invariants(&self) -> Result<(), ReservationError> {
        let total = u32::from(self.config.total_seats);
        if self.confirmed_count > total {
            return Err(ReservationError::consistency(format!(
                "confirmed_count {} exceeds total_seats {}",
                self.confirmed_count, total
            )));
        }
        if self.rac_count > self.config.rac_limit {
            return Err(ReservationError::consistency(format!(
                "rac_count {} exceeds rac_limit {}",
                self.rac_count, self.config.rac_limit
            )));
        }
        if self.free_seats.len() as u32 + self.confirmed_count != total {
            return Err(ReservationError::consistency(
                "free seat slots out of sync with confirmed_count",
            ));
        }
        Ok(())
    }

    /// Takes the lowest free seat slot, or `None` when the class is full.
    pub fn reserve_confirmed(&mut self) -> Option<SeatSlot> {
        let seat = self.free_seats.pop_first()?;
        self.confirmed_count += 1;
        self.assert_invariants();
        Some(seat)
    }

    /// Takes one RAC slot if the pool has headroom.
    pub fn reserve_rac(&mut self) -> bool {
        if self.rac_count >= self.config.rac_limit {
            return false;
        }
        self.rac_count += 1;
        self.assert_invariants();
        true
    }

    /// Returns a confirmed seat slot to the pool.
    pub fn release_confirmed(&mut self, seat: SeatSlot) -> Result<(), ReservationError> {
        if self.confirmed_count == 0 {
            return Err(ReservationError::consistency(
                "release_confirmed with confirmed_count at zero",
            ));
        }
        if seat.0 == 0 || seat.0 > self.config.total_seats || !self.free_seats.insert(seat) {
            return Err(ReservationError::consistency(format!(
                "seat slot {seat} is not held"
            )));
        }
        self.confirmed_count -= 1;
        self.assert_invariants();
        Ok(())
    }

    pub fn release_rac(&mut self) -> Result<(), ReservationError> {
        if self.rac_count == 0 {
            return Err(ReservationError::consistency(
                "release_rac with rac_count at zero",
            ));
        }
        self.rac_count -= 1;
        self.assert_invariants();
        Ok(())
    }

    /// Moves one RAC holder onto a free confirmed seat in a single step.
    pub fn transfer_rac_to_confirmed(&mut self) -> Result<SeatSlot, ReservationError> {
        if self.rac_count == 0 {
            return Err(ReservationError::consistency(
                "RAC promotion with rac_count at zero",
            ));
        }
        let seat = self.free_seats.pop_first().ok_or_else(|| {
            ReservationError::consistency("RAC promotion without a free confirmed seat")
        })?;
        self.rac_count -= 1;
        self.confirmed_count += 1;
        self.assert_invariants();
        Ok(seat)
    }

    pub fn snapshot(&self) -> CapacitySnapshot {
        CapacitySnapshot {
            total_seats: self.config.total_seats,
            confirmed_count: self.confirmed_count,
            available_seats: self.available_seats(),
            rac_limit: self.config.rac_limit,
            rac_count: self.rac_count,
            waitlist_cap: self.config.waitlist_cap,
        }
    }
}
