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

//! Per-key inventory shard.
//!
//! An [`Inventory`] owns the capacity ledger and both queues of one
//! (train, class, date, quota) key behind a single mutex. Every admission and
//! cancellation for the key runs as one critical section on that mutex; keys never
//! share a lock.

use crate::ReservationError;
use crate::base::InventoryKey;
use crate::capacity::{CapacityConfig, CapacityLedger, CapacitySnapshot};
use crate::config::LockPolicy;
use crate::queue::{AllocationQueue, QueueEntry};
use crate::status::QueueKind;
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;
use std::thread;
use tracing::{debug, error, warn};

/// Allocation state of one key: counters plus the RAC and waitlist queues.
#[derive(Debug, Clone)]
pub struct InventoryState {
    pub capacity: CapacityLedger,
    pub rac: AllocationQueue,
    pub waitlist: AllocationQueue,
}

impl InventoryState {
    pub fn new(config: CapacityConfig) -> Self {
        Self {
            capacity: CapacityLedger::new(config),
            rac: AllocationQueue::new(QueueKind::Rac, config.rac_limit),
            waitlist: AllocationQueue::new(QueueKind::Waitlist, config.waitlist_cap),
        }
    }

    pub fn queue(&self, kind: QueueKind) -> &AllocationQueue {
        match kind {
            QueueKind::Rac => &self.rac,
            QueueKind::Waitlist => &self.waitlist,
        }
    }

    /// Checks the cross-component invariants of a key.
    ///
    /// Besides per-component bounds, freed capacity must never sit idle while someone
    /// is queued for it: a free seat implies empty queues, and RAC headroom implies an
    /// empty waitlist.
    pub fn check_invariants(&self) -> Result<(), ReservationError> {
        self.capacity.check_invariants()?;
        self.rac.check_ordinals()?;
        self.waitlist.check_ordinals()?;

        if self.rac.len() as u32 != self.capacity.rac_count() {
            return Err(ReservationError::consistency(format!(
                "RAC queue length {} differs from rac_count {}",
                self.rac.len(),
                self.capacity.rac_count()
            )));
        }
        if self.capacity.available_seats() > 0 && !(self.rac.is_empty() && self.waitlist.is_empty())
        {
            return Err(ReservationError::consistency(
                "free confirmed seat while passengers are queued",
            ));
        }
        if self.capacity.rac_count() < self.capacity.config().rac_limit && !self.waitlist.is_empty()
        {
            return Err(ReservationError::consistency(
                "free RAC slot while passengers are waitlisted",
            ));
        }
        Ok(())
    }
}

/// Serializable point-in-time view of an inventory.
#[derive(Debug, Clone, Serialize)]
pub struct InventorySnapshot {
    pub key: InventoryKey,
    pub capacity: CapacitySnapshot,
    pub rac: Vec<QueueEntry>,
    pub waitlist: Vec<QueueEntry>,
}

#[derive(Debug)]
pub struct Inventory {
    key: InventoryKey,
    inner: Mutex<InventoryState>,
}

impl Inventory {
    pub fn new(key: InventoryKey, config: CapacityConfig) -> Self {
        Self {
            key,
            inner: Mutex::new(InventoryState::new(config)),
        }
    }

    /// Acquires the inventory lock with a bounded wait.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::TransientBusy`] once every attempt allowed by the
    /// policy has timed out.
    pub fn lock(
        &self,
        policy: &LockPolicy,
    ) -> Result<MutexGuard<'_, InventoryState>, ReservationError> {
        let attempts = policy.max_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(guard) = self.inner.try_lock_for(policy.wait()) {
                return Ok(guard);
            }
            if attempt < attempts {
                debug!(key = %self.key, attempt, "inventory lock contended, backing off");
                thread::sleep(policy.backoff(attempt));
            }
        }
        warn!(key = %self.key, attempts, "inventory lock unavailable");
        Err(ReservationError::TransientBusy)
    }

    /// Runs one all-or-nothing critical section.
    ///
    /// `mutate` changes the allocation state and returns a plan; the state is then
    /// checked against its invariants and `commit` writes the plan elsewhere (the
    /// booking ledger) while the lock is still held. If any step fails, the state is
    /// restored to what it was before `mutate` ran.
    pub fn transact<P, T>(
        &self,
        policy: &LockPolicy,
        mutate: impl FnOnce(&mut InventoryState) -> Result<P, ReservationError>,
        commit: impl FnOnce(P) -> Result<T, ReservationError>,
    ) -> Result<T, ReservationError> {
        let mut guard = self.lock(policy)?;
        let before = guard.clone();

        let result = mutate(&mut *guard)
            .and_then(|plan| guard.check_invariants().map(|()| plan))
            .and_then(commit);

        if let Err(e) = &result {
            *guard = before;
            if let ReservationError::InternalConsistency(msg) = e {
                error!(key = %self.key, %msg, "allocation rolled back");
            }
        }
        result
    }

    /// Reads the state under the lock without mutating it.
    pub fn read<T>(
        &self,
        policy: &LockPolicy,
        f: impl FnOnce(&InventoryState) -> T,
    ) -> Result<T, ReservationError> {
        let guard = self.lock(policy)?;
        Ok(f(&guard))
    }

    pub fn snapshot(&self, policy: &LockPolicy) -> Result<InventorySnapshot, ReservationError> {
        self.read(policy, |state| InventorySnapshot {
            key: self.key,
            capacity: state.capacity.snapshot(),
            rac: state.rac.entries().cloned().collect(),
            waitlist: state.waitlist.entries().cloned().collect(),
        })
    }
}
