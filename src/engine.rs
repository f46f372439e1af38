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

//! Seat allocation engine.
//!
//! The [`Engine`] decides whether each passenger of a booking request is confirmed,
//! placed in the RAC pool or waitlisted, and re-runs promotions whenever a cancellation
//! frees capacity.
//!
//! # Admission
//!
//! Passengers are admitted in submission order. Each one takes the first of:
//!
//! 1. a free confirmed seat,
//! 2. a free RAC slot (appended to the RAC queue),
//! 3. a place at the tail of the waitlist.
//!
//! If the waitlist is full the whole request is rejected with
//! [`ReservationError::BookingFull`], unless partial booking was requested, in which
//! case only the passengers that could not be queued are dropped.
//!
//! # Cancellation cascade
//!
//! | Cancelled passenger | Freed unit | Promotion |
//! |---------------------|------------|-----------|
//! | Confirmed | seat | RAC head → Confirmed, then waitlist head → RAC |
//! | Confirmed (no RAC pool) | seat | waitlist head → Confirmed |
//! | RAC | RAC slot | waitlist head → RAC |
//! | Waitlisted | none | waitlist compacts |
//!
//! # Thread Safety
//!
//! Inventories live in a [`DashMap`], each behind its own lock. Requests for different
//! (train, class, date, quota) keys run in parallel; requests for the same key are
//! serialized and every admission or cancellation is applied all-or-nothing.

use crate::ReservationError;
use crate::base::{BookingId, InventoryKey, PassengerId, Pnr, UserId};
use crate::booking::{
    Booking, BookingLedger, BookingRequest, Passenger, PassengerChange, StatusChange,
};
use crate::catalog::{Catalog, ConfirmationPredictor};
use crate::config::EngineConfig;
use crate::inventory::{Inventory, InventorySnapshot, InventoryState};
use crate::queue::QueueEntry;
use crate::status::{BookingStatus, PassengerStatus, QueueKind};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info};

/// Admission result for one passenger of a request, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerOutcome {
    Admitted {
        passenger_id: PassengerId,
        status: PassengerStatus,
    },
    /// Dropped in partial-booking mode because the waitlist was full.
    Rejected,
}

impl PassengerOutcome {
    pub fn status(&self) -> Option<PassengerStatus> {
        match self {
            Self::Admitted { status, .. } => Some(*status),
            Self::Rejected => None,
        }
    }

    pub fn passenger_id(&self) -> Option<PassengerId> {
        match self {
            Self::Admitted { passenger_id, .. } => Some(*passenger_id),
            Self::Rejected => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingResult {
    pub booking_id: BookingId,
    pub pnr: Pnr,
    pub status: BookingStatus,
    pub outcomes: Vec<PassengerOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancellationResult {
    pub booking_id: BookingId,
    /// Every passenger whose status changed, the cancelled ones included.
    pub affected: Vec<StatusChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueuePosition {
    pub kind: QueueKind,
    pub ordinal: u32,
    /// Informational estimate from the prediction service, if one is attached.
    pub confirmation_probability: Option<f64>,
}

/// Status changes accumulated inside one critical section.
///
/// A passenger can move several times within one section (e.g. shifted up the RAC
/// queue, then promoted); only the latest target is kept.
#[derive(Debug, Default)]
struct Plan {
    changes: Vec<PassengerChange>,
    /// Position of each passenger's change in `changes`.
    index: HashMap<PassengerId, usize>,
}

impl Plan {
    fn push(&mut self, booking_id: BookingId, passenger_id: PassengerId, to: PassengerStatus) {
        match self.index.entry(passenger_id) {
            Entry::Occupied(slot) => self.changes[*slot.get()].to = to,
            Entry::Vacant(slot) => {
                slot.insert(self.changes.len());
                self.changes.push(PassengerChange {
                    booking_id,
                    passenger_id,
                    to,
                });
            }
        }
    }

    fn shift(&mut self, kind: QueueKind, entries: Vec<QueueEntry>) {
        for entry in entries {
            self.push(entry.booking_id, entry.passenger_id, queued(kind, entry.ordinal));
        }
    }

    fn status_of(&self, passenger_id: PassengerId) -> Option<PassengerStatus> {
        self.index.get(&passenger_id).map(|&i| self.changes[i].to)
    }
}

fn queued(kind: QueueKind, ordinal: u32) -> PassengerStatus {
    match kind {
        QueueKind::Rac => PassengerStatus::Rac { number: ordinal },
        QueueKind::Waitlist => PassengerStatus::Waitlisted { number: ordinal },
    }
}

/// Reservation allocation engine.
///
/// # Invariants
///
/// - `confirmed_count <= total_seats` and `rac_count <= rac_limit` for every key.
/// - Queue ordinals are exactly `1..=len` for every key and queue kind.
/// - A free seat never coexists with a queued passenger, and a free RAC slot never
///   coexists with a waitlisted one.
/// - The booking ledger agrees with the queues whenever no call is in flight.
pub struct Engine {
    catalog: Arc<dyn Catalog>,
    predictor: Option<Arc<dyn ConfirmationPredictor>>,
    config: EngineConfig,
    /// Inventories indexed by key, created on the first booking attempt.
    inventories: DashMap<InventoryKey, Arc<Inventory>>,
    bookings: BookingLedger,
}

impl Engine {
    /// Creates an engine with the default configuration.
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self::with_config(catalog, EngineConfig::default())
    }

    pub fn with_config(catalog: Arc<dyn Catalog>, config: EngineConfig) -> Self {
        Engine {
            catalog,
            predictor: None,
            bookings: BookingLedger::new(config.pnr_seed),
            inventories: DashMap::new(),
            config,
        }
    }

    /// Attaches a confirmation predictor used by [`Engine::get_queue_position`].
    pub fn with_predictor(mut self, predictor: Arc<dyn ConfirmationPredictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn inventory(&self, key: &InventoryKey) -> Result<Arc<Inventory>, ReservationError> {
        if let Some(inventory) = self.inventories.get(key) {
            return Ok(Arc::clone(&inventory));
        }

        let config = self.catalog.capacity(key).ok_or(ReservationError::InvalidKey)?;
        let inventory = self.inventories.entry(*key).or_insert_with(|| {
            debug!(%key, ?config, "inventory opened");
            Arc::new(Inventory::new(*key, config))
        });
        Ok(Arc::clone(&inventory))
    }

    fn existing_inventory(&self, key: &InventoryKey) -> Result<Arc<Inventory>, ReservationError> {
        self.inventories
            .get(key)
            .map(|inventory| Arc::clone(&inventory))
            .ok_or_else(|| ReservationError::consistency(format!("no inventory for booked key {key}")))
    }

    /// Admits the passengers of a request and records the booking.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::EmptyRequest`] - The request has no passengers.
    /// - [`ReservationError::InvalidKey`] - The catalog does not know the key.
    /// - [`ReservationError::BookingFull`] - A passenger could not even be waitlisted
    ///   (any passenger without `allow_partial`, every passenger with it).
    /// - [`ReservationError::TransientBusy`] - The inventory lock was not acquired.
    /// - [`ReservationError::InternalConsistency`] - An invariant broke; nothing was applied.
    pub fn submit_booking(
        &self,
        request: BookingRequest,
        allow_partial: bool,
    ) -> Result<BookingResult, ReservationError> {
        if request.passengers.is_empty() {
            return Err(ReservationError::EmptyRequest);
        }
        let key = request.key;
        let inventory = self.inventory(&key)?;

        let booking_id = self.bookings.next_booking_id();
        let passenger_ids: Vec<PassengerId> = request
            .passengers
            .iter()
            .map(|_| self.bookings.next_passenger_id())
            .collect();
        let now = Utc::now();

        let result = inventory.transact(
            &self.config.lock,
            |state| admit(state, booking_id, &passenger_ids, allow_partial, now),
            |admitted| self.record_booking(request, booking_id, &passenger_ids, admitted, now),
        );

        match &result {
            Ok(booking) => info!(
                %key,
                pnr = %booking.pnr,
                status = %booking.status,
                passengers = passenger_ids.len(),
                "booking committed"
            ),
            Err(e) if e.is_business_rejection() => {
                info!(%key, passengers = passenger_ids.len(), "booking rejected: waitlist full")
            }
            Err(_) => {}
        }
        result
    }

    fn record_booking(
        &self,
        request: BookingRequest,
        booking_id: BookingId,
        passenger_ids: &[PassengerId],
        admitted: Vec<Option<PassengerStatus>>,
        now: DateTime<Utc>,
    ) -> Result<BookingResult, ReservationError> {
        let mut passengers = Vec::with_capacity(admitted.len());
        let mut outcomes = Vec::with_capacity(admitted.len());

        for ((details, id), status) in request
            .passengers
            .into_iter()
            .zip(passenger_ids)
            .zip(admitted)
        {
            let Some(status) = status else {
                outcomes.push(PassengerOutcome::Rejected);
                continue;
            };
            outcomes.push(PassengerOutcome::Admitted {
                passenger_id: *id,
                status,
            });
            passengers.push(Passenger {
                id: *id,
                booking_id,
                name: details.name,
                age: details.age,
                gender: details.gender,
                berth_preference: details.berth_preference,
                booking_status: status,
                current_status: status,
            });
        }

        let booking = Booking {
            id: booking_id,
            pnr: Pnr::from_sequence(0),
            user_id: request.user_id,
            key: request.key,
            from: request.from,
            to: request.to,
            total_fare: request.total_fare,
            passengers,
            created_at: now,
            updated_at: now,
        };
        let status = booking.status();
        let pnr = self.bookings.insert(booking)?;

        Ok(BookingResult {
            booking_id,
            pnr,
            status,
            outcomes,
        })
    }

    /// Cancels one passenger and promotes whoever the freed capacity belongs to.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::NotFound`] - Unknown booking or passenger.
    /// - [`ReservationError::AlreadyCancelled`] - The passenger is already cancelled.
    /// - [`ReservationError::TransientBusy`] - The inventory lock was not acquired.
    /// - [`ReservationError::InternalConsistency`] - An invariant broke; nothing was applied.
    pub fn cancel_passenger(
        &self,
        booking_id: BookingId,
        passenger_id: PassengerId,
    ) -> Result<CancellationResult, ReservationError> {
        let booking = self.bookings.get(booking_id).ok_or(ReservationError::NotFound)?;
        if booking.passenger(passenger_id).is_none() {
            return Err(ReservationError::NotFound);
        }
        let inventory = self.existing_inventory(&booking.key)?;
        let now = Utc::now();

        let result = inventory.transact(
            &self.config.lock,
            |state| {
                // Re-read under the lock: a concurrent cascade may have moved this passenger.
                let current = self
                    .bookings
                    .get(booking_id)
                    .and_then(|b| b.passenger(passenger_id).map(|p| p.current_status))
                    .ok_or(ReservationError::NotFound)?;

                let mut plan = Plan::default();
                cancel_one(state, booking_id, passenger_id, current, &mut plan, now)?;
                Ok(plan)
            },
            |plan| self.bookings.apply(&plan.changes, now),
        )?;

        info!(
            key = %booking.key,
            pnr = %booking.pnr,
            %passenger_id,
            affected = result.len(),
            "passenger cancelled"
        );
        Ok(CancellationResult {
            booking_id,
            affected: result,
        })
    }

    /// Cancels every live passenger of a booking in one critical section.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::cancel_passenger`]; `AlreadyCancelled` when no passenger is live.
    pub fn cancel_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<CancellationResult, ReservationError> {
        let booking = self.bookings.get(booking_id).ok_or(ReservationError::NotFound)?;
        let inventory = self.existing_inventory(&booking.key)?;
        let now = Utc::now();

        let result = inventory.transact(
            &self.config.lock,
            |state| {
                let booking = self.bookings.get(booking_id).ok_or(ReservationError::NotFound)?;
                let mut plan = Plan::default();
                let mut cancelled = 0;

                for passenger in &booking.passengers {
                    // Earlier cancellations in this loop may already have promoted a
                    // later passenger of the same booking.
                    let current = plan
                        .status_of(passenger.id)
                        .unwrap_or(passenger.current_status);
                    if current.is_cancelled() {
                        continue;
                    }
                    cancel_one(state, booking_id, passenger.id, current, &mut plan, now)?;
                    cancelled += 1;
                }

                if cancelled == 0 {
                    return Err(ReservationError::AlreadyCancelled);
                }
                Ok(plan)
            },
            |plan| self.bookings.apply(&plan.changes, now),
        )?;

        info!(
            key = %booking.key,
            pnr = %booking.pnr,
            affected = result.len(),
            "booking cancelled"
        );
        Ok(CancellationResult {
            booking_id,
            affected: result,
        })
    }

    /// Current queue position of a RAC or waitlisted passenger.
    ///
    /// # Errors
    ///
    /// [`ReservationError::NotFound`] if the booking or passenger is unknown, or the
    /// passenger is not queued (confirmed or cancelled).
    pub fn get_queue_position(
        &self,
        booking_id: BookingId,
        passenger_id: PassengerId,
    ) -> Result<QueuePosition, ReservationError> {
        let booking = self.bookings.get(booking_id).ok_or(ReservationError::NotFound)?;
        if booking.passenger(passenger_id).is_none() {
            return Err(ReservationError::NotFound);
        }
        let inventory = self.existing_inventory(&booking.key)?;

        let (kind, ordinal) = inventory
            .read(&self.config.lock, |state| {
                [QueueKind::Rac, QueueKind::Waitlist]
                    .into_iter()
                    .find_map(|kind| state.queue(kind).position(passenger_id).map(|o| (kind, o)))
            })?
            .ok_or(ReservationError::NotFound)?;

        // Consulted outside the lock; the estimate never feeds back into allocation.
        let confirmation_probability = self
            .predictor
            .as_ref()
            .and_then(|p| p.confirmation_probability(&booking.key, kind, ordinal));

        Ok(QueuePosition {
            kind,
            ordinal,
            confirmation_probability,
        })
    }

    pub fn get_booking(&self, booking_id: BookingId) -> Option<Booking> {
        self.bookings.get(booking_id)
    }

    /// PNR status enquiry.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InvalidPnr`] for a malformed PNR, [`ReservationError::NotFound`]
    /// if no booking carries it.
    pub fn get_booking_by_pnr(&self, pnr: &str) -> Result<Booking, ReservationError> {
        let pnr: Pnr = pnr.parse()?;
        self.bookings
            .get_by_pnr(&pnr)
            .ok_or(ReservationError::NotFound)
    }

    pub fn bookings_for_user(&self, user_id: UserId) -> Vec<Booking> {
        self.bookings.bookings_for_user(user_id)
    }

    /// Point-in-time capacity and queue listing for a key.
    ///
    /// A key known to the catalog but never booked reports its empty initial state.
    pub fn inventory_snapshot(
        &self,
        key: &InventoryKey,
    ) -> Result<InventorySnapshot, ReservationError> {
        if let Some(inventory) = self.inventories.get(key).map(|i| Arc::clone(&i)) {
            return inventory.snapshot(&self.config.lock);
        }
        let config = self.catalog.capacity(key).ok_or(ReservationError::InvalidKey)?;
        Inventory::new(*key, config).snapshot(&self.config.lock)
    }

    /// Keys of every inventory opened so far, sorted.
    pub fn inventories(&self) -> Vec<InventoryKey> {
        let mut keys: Vec<_> = self.inventories.iter().map(|e| *e.key()).collect();
        keys.sort();
        keys
    }

    /// Takes pending status-change events from the booking ledger.
    pub fn drain_events(&self) -> Vec<StatusChange> {
        self.bookings.drain_events()
    }

    /// Cross-checks every inventory against its invariants and the booking ledger.
    ///
    /// Bookings are copied before each inventory is locked, so the result is only
    /// meaningful while no booking or cancellation is in flight; a concurrent call can
    /// make a consistent engine report a violation.
    ///
    /// # Errors
    ///
    /// [`ReservationError::InternalConsistency`] describing the first violation found.
    pub fn verify(&self) -> Result<(), ReservationError> {
        let mut by_key: HashMap<InventoryKey, Vec<Booking>> = HashMap::new();
        for booking in self.bookings.bookings() {
            by_key.entry(booking.key).or_default().push(booking);
        }

        for key in self.inventories() {
            let inventory = self.existing_inventory(&key)?;
            let bookings = by_key.remove(&key).unwrap_or_default();
            inventory.read(&self.config.lock, |state| verify_inventory(state, &bookings))??;
        }

        match by_key.into_keys().next() {
            Some(key) => Err(ReservationError::consistency(format!(
                "bookings reference unopened inventory {key}"
            ))),
            None => Ok(()),
        }
    }
}

/// Admission decision for each passenger, in order. `None` marks a passenger dropped in
/// partial-booking mode.
fn admit(
    state: &mut InventoryState,
    booking_id: BookingId,
    passenger_ids: &[PassengerId],
    allow_partial: bool,
    now: DateTime<Utc>,
) -> Result<Vec<Option<PassengerStatus>>, ReservationError> {
    let mut admitted = Vec::with_capacity(passenger_ids.len());

    for &passenger_id in passenger_ids {
        let status = if let Some(seat) = state.capacity.reserve_confirmed() {
            Some(PassengerStatus::Confirmed { seat })
        } else if state.capacity.reserve_rac() {
            let number = state
                .rac
                .enqueue(booking_id, passenger_id, now)
                .map_err(|_| ReservationError::consistency("RAC queue full with RAC slot free"))?;
            Some(PassengerStatus::Rac { number })
        } else {
            match state.waitlist.enqueue(booking_id, passenger_id, now) {
                Ok(number) => Some(PassengerStatus::Waitlisted { number }),
                Err(ReservationError::CapacityExceeded) if allow_partial => None,
                Err(ReservationError::CapacityExceeded) => return Err(ReservationError::BookingFull),
                Err(e) => return Err(e),
            }
        };

        match &status {
            Some(status) => debug!(%booking_id, %passenger_id, %status, "passenger admitted"),
            None => debug!(%booking_id, %passenger_id, "passenger dropped: waitlist full"),
        }
        admitted.push(status);
    }

    if admitted.iter().all(Option::is_none) {
        return Err(ReservationError::BookingFull);
    }
    Ok(admitted)
}

/// Cancels one passenger whose current status is `current` and runs the cascade.
fn cancel_one(
    state: &mut InventoryState,
    booking_id: BookingId,
    passenger_id: PassengerId,
    current: PassengerStatus,
    plan: &mut Plan,
    now: DateTime<Utc>,
) -> Result<(), ReservationError> {
    match current {
        PassengerStatus::Cancelled => return Err(ReservationError::AlreadyCancelled),
        PassengerStatus::Confirmed { seat } => {
            state.capacity.release_confirmed(seat)?;
            fill_confirmed_seat(state, plan, now)?;
        }
        PassengerStatus::Rac { .. } => {
            let removal = state.rac.remove(passenger_id).ok_or_else(|| {
                ReservationError::consistency(format!("RAC passenger {passenger_id} not queued"))
            })?;
            state.capacity.release_rac()?;
            plan.shift(QueueKind::Rac, removal.shifted);
            fill_rac_slot(state, plan, now)?;
        }
        PassengerStatus::Waitlisted { .. } => {
            let removal = state.waitlist.remove(passenger_id).ok_or_else(|| {
                ReservationError::consistency(format!(
                    "waitlisted passenger {passenger_id} not queued"
                ))
            })?;
            plan.shift(QueueKind::Waitlist, removal.shifted);
        }
    }
    plan.push(booking_id, passenger_id, PassengerStatus::Cancelled);
    Ok(())
}

/// Hands a freed confirmed seat to the RAC head, or straight to the waitlist head when
/// the class has no RAC pool.
fn fill_confirmed_seat(
    state: &mut InventoryState,
    plan: &mut Plan,
    now: DateTime<Utc>,
) -> Result<(), ReservationError> {
    if let Some(removal) = state.rac.dequeue_head() {
        let seat = state.capacity.transfer_rac_to_confirmed()?;
        let head = removal.removed;
        debug!(passenger_id = %head.passenger_id, %seat, "RAC promoted to confirmed");
        plan.push(head.booking_id, head.passenger_id, PassengerStatus::Confirmed { seat });
        plan.shift(QueueKind::Rac, removal.shifted);
        return fill_rac_slot(state, plan, now);
    }

    if let Some(removal) = state.waitlist.dequeue_head() {
        let seat = state.capacity.reserve_confirmed().ok_or_else(|| {
            ReservationError::consistency("freed seat not available for waitlist promotion")
        })?;
        let head = removal.removed;
        debug!(passenger_id = %head.passenger_id, %seat, "waitlist promoted to confirmed");
        plan.push(head.booking_id, head.passenger_id, PassengerStatus::Confirmed { seat });
        plan.shift(QueueKind::Waitlist, removal.shifted);
    }
    Ok(())
}

/// Moves the waitlist head into a freed RAC slot.
fn fill_rac_slot(
    state: &mut InventoryState,
    plan: &mut Plan,
    now: DateTime<Utc>,
) -> Result<(), ReservationError> {
    let Some(removal) = state.waitlist.dequeue_head() else {
        return Ok(());
    };
    if !state.capacity.reserve_rac() {
        return Err(ReservationError::consistency(
            "RAC slot not free for waitlist promotion",
        ));
    }
    let head = removal.removed;
    let number = state
        .rac
        .enqueue(head.booking_id, head.passenger_id, now)
        .map_err(|_| ReservationError::consistency("RAC queue full after RAC slot freed"))?;
    debug!(passenger_id = %head.passenger_id, number, "waitlist promoted to RAC");
    plan.push(head.booking_id, head.passenger_id, PassengerStatus::Rac { number });
    plan.shift(QueueKind::Waitlist, removal.shifted);
    Ok(())
}

fn verify_inventory(state: &InventoryState, bookings: &[Booking]) -> Result<(), ReservationError> {
    state.check_invariants()?;

    let statuses: HashMap<PassengerId, PassengerStatus> = bookings
        .iter()
        .flat_map(|b| b.passengers.iter().map(|p| (p.id, p.current_status)))
        .collect();

    for kind in [QueueKind::Rac, QueueKind::Waitlist] {
        for entry in state.queue(kind).entries() {
            let expected = queued(kind, entry.ordinal);
            if statuses.get(&entry.passenger_id) != Some(&expected) {
                return Err(ReservationError::consistency(format!(
                    "passenger {} queued as {} but recorded as {:?}",
                    entry.passenger_id,
                    expected,
                    statuses.get(&entry.passenger_id)
                )));
            }
        }
    }

    let confirmed = statuses
        .values()
        .filter(|s| matches!(s, PassengerStatus::Confirmed { .. }))
        .count() as u32;
    let queued_count = statuses.values().filter(|s| s.queue_kind().is_some()).count();
    if confirmed != state.capacity.confirmed_count()
        || queued_count != state.rac.len() + state.waitlist.len()
    {
        return Err(ReservationError::consistency(format!(
            "ledger holds {confirmed} confirmed / {queued_count} queued, inventory {} / {}",
            state.capacity.confirmed_count(),
            state.rac.len() + state.waitlist.len()
        )));
    }
    Ok(())
}
