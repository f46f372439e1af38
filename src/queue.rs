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

//! Ordered RAC and waitlist queues.
//!
//! Ordinals within a queue are always the contiguous sequence `1..=len`. Removing an
//! entry, whether from the head or from the middle, renumbers every entry behind it
//! so the sequence stays gap-free ("waitlist movement").

use crate::ReservationError;
use crate::base::{BookingId, PassengerId};
use crate::status::QueueKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueEntry {
    /// 1-based position; the head is always 1.
    pub ordinal: u32,
    pub booking_id: BookingId,
    pub passenger_id: PassengerId,
    pub enqueued_at: DateTime<Utc>,
}

/// An entry taken out of a queue, plus the entries renumbered by the compaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub removed: QueueEntry,
    /// Entries that moved up by one, carrying their new ordinals.
    pub shifted: Vec<QueueEntry>,
}

/// A bounded FIFO queue of passengers for one inventory and queue kind.
#[derive(Debug, Clone)]
pub struct AllocationQueue {
    kind: QueueKind,
    cap: u32,
    entries: VecDeque<QueueEntry>,
}

impl AllocationQueue {
    pub fn new(kind: QueueKind, cap: u32) -> Self {
        Self {
            kind,
            cap,
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.entries.iter()
    }

    pub fn head(&self) -> Option<&QueueEntry> {
        self.entries.front()
    }

    /// Appends a passenger at the tail and returns its ordinal.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::CapacityExceeded`] when the queue is at its cap.
    pub fn enqueue(
        &mut self,
        booking_id: BookingId,
        passenger_id: PassengerId,
        enqueued_at: DateTime<Utc>,
    ) -> Result<u32, ReservationError> {
        if self.entries.len() as u32 >= self.cap {
            return Err(ReservationError::CapacityExceeded);
        }
        let ordinal = self.entries.len() as u32 + 1;
        self.entries.push_back(QueueEntry {
            ordinal,
            booking_id,
            passenger_id,
            enqueued_at,
        });
        Ok(ordinal)
    }

    /// Removes the ordinal-1 entry and compacts the rest.
    pub fn dequeue_head(&mut self) -> Option<Removal> {
        self.remove_at(0)
    }

    /// Removes a passenger from anywhere in the queue and compacts the entries behind it.
    pub fn remove(&mut self, passenger_id: PassengerId) -> Option<Removal> {
        let index = self
            .entries
            .iter()
            .position(|e| e.passenger_id == passenger_id)?;
        self.remove_at(index)
    }

    fn remove_at(&mut self, index: usize) -> Option<Removal> {
        let removed = self.entries.remove(index)?;
        let mut shifted = Vec::with_capacity(self.entries.len() - index);
        for entry in self.entries.range_mut(index..) {
            entry.ordinal -= 1;
            shifted.push(entry.clone());
        }
        debug_assert!(self.check_ordinals().is_ok());
        Some(Removal { removed, shifted })
    }

    /// Current ordinal of a passenger, if queued.
    pub fn position(&self, passenger_id: PassengerId) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.passenger_id == passenger_id)
            .map(|e| e.ordinal)
    }

    /// Verifies ordinals are exactly `1..=len` and the cap is respected.
    pub fn check_ordinals(&self) -> Result<(), ReservationError> {
        if self.entries.len() as u32 > self.cap {
            return Err(ReservationError::consistency(format!(
                "{} queue holds {} entries over cap {}",
                self.kind,
                self.entries.len(),
                self.cap
            )));
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.ordinal != i as u32 + 1 {
                return Err(ReservationError::consistency(format!(
                    "{} queue ordinal {} at position {}",
                    self.kind,
                    entry.ordinal,
                    i + 1
                )));
            }
        }
        Ok(())
    }
}
