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

//! Booking ledger.
//!
//! Holds every [`Booking`] together with the passengers it owns. Passenger status is
//! written only by the allocation engine, inside the critical section of the booking's
//! inventory, so the ledger always agrees with the queues once a call returns.
//!
//! # Example
//!
//! ```
//! use rail_reservation_rs::{BookingStatus, PassengerStatus, SeatSlot};
//!
//! let cnf = PassengerStatus::Confirmed { seat: SeatSlot(7) };
//! let wl = PassengerStatus::Waitlisted { number: 2 };
//! assert_eq!(BookingStatus::derive([&cnf, &wl]), BookingStatus::Waitlisted);
//! ```

use crate::ReservationError;
use crate::base::{BookingId, InventoryKey, PassengerId, Pnr, SeatSlot, StationId, UserId};
use crate::status::{BookingStatus, PassengerStatus};
use chrono::{DateTime, Utc};
use crossbeam::queue::SegQueue;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Transgender,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "M" | "MALE" => Ok(Self::Male),
            "F" | "FEMALE" => Ok(Self::Female),
            "T" | "TRANSGENDER" => Ok(Self::Transgender),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BerthPreference {
    Lower,
    Middle,
    Upper,
    SideLower,
    SideUpper,
}

/// One passenger as submitted by the booking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerRequest {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    #[serde(default)]
    pub berth_preference: Option<BerthPreference>,
}

impl PassengerRequest {
    pub fn new(name: impl Into<String>, age: u8, gender: Gender) -> Self {
        Self {
            name: name.into(),
            age,
            gender,
            berth_preference: None,
        }
    }
}

/// A booking request for one inventory key.
///
/// Passenger order is admission priority: earlier passengers get the better outcome
/// when capacity is scarce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub user_id: UserId,
    pub key: InventoryKey,
    pub from: StationId,
    pub to: StationId,
    /// Computed by the fare service; carried as-is.
    pub total_fare: Decimal,
    pub passengers: Vec<PassengerRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Passenger {
    pub id: PassengerId,
    pub booking_id: BookingId,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub berth_preference: Option<BerthPreference>,
    /// Outcome at admission time; never changes.
    pub booking_status: PassengerStatus,
    pub current_status: PassengerStatus,
}

impl Passenger {
    pub fn seat_number(&self) -> Option<SeatSlot> {
        self.current_status.seat()
    }

    pub fn rac_number(&self) -> Option<u32> {
        match self.current_status {
            PassengerStatus::Rac { number } => Some(number),
            _ => None,
        }
    }

    pub fn waitlist_number(&self) -> Option<u32> {
        match self.current_status {
            PassengerStatus::Waitlisted { number } => Some(number),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub pnr: Pnr,
    pub user_id: UserId,
    pub key: InventoryKey,
    pub from: StationId,
    pub to: StationId,
    pub total_fare: Decimal,
    pub passengers: Vec<Passenger>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn status(&self) -> BookingStatus {
        BookingStatus::derive(self.passengers.iter().map(|p| &p.current_status))
    }

    pub fn passenger(&self, passenger_id: PassengerId) -> Option<&Passenger> {
        self.passengers.iter().find(|p| p.id == passenger_id)
    }

    fn passenger_mut(&mut self, passenger_id: PassengerId) -> Option<&mut Passenger> {
        self.passengers.iter_mut().find(|p| p.id == passenger_id)
    }
}

impl Serialize for Booking {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Booking", 11)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("pnr", &self.pnr)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("from", &self.from)?;
        state.serialize_field("to", &self.to)?;
        state.serialize_field("status", &self.status())?;
        state.serialize_field("total_fare", &self.total_fare)?;
        state.serialize_field("passengers", &self.passengers)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// A status transition requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassengerChange {
    pub booking_id: BookingId,
    pub passenger_id: PassengerId,
    pub to: PassengerStatus,
}

/// A recorded status transition. `from` is `None` for the admission itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub booking_id: BookingId,
    pub passenger_id: PassengerId,
    pub from: Option<PassengerStatus>,
    pub to: PassengerStatus,
    pub at: DateTime<Utc>,
}

/// Concurrent store of bookings with PNR and per-user indexes.
///
/// Status transitions are also appended to an outbox of [`StatusChange`] events that a
/// durable store or notifier drains with [`BookingLedger::drain_events`].
#[derive(Debug)]
pub struct BookingLedger {
    bookings: DashMap<BookingId, Booking>,
    pnrs: DashMap<Pnr, BookingId>,
    by_user: DashMap<UserId, Vec<BookingId>>,
    events: SegQueue<StatusChange>,
    next_booking: AtomicU64,
    next_passenger: AtomicU64,
    next_pnr: AtomicU64,
}

impl BookingLedger {
    pub fn new(pnr_seed: u64) -> Self {
        Self {
            bookings: DashMap::new(),
            pnrs: DashMap::new(),
            by_user: DashMap::new(),
            events: SegQueue::new(),
            next_booking: AtomicU64::new(1),
            next_passenger: AtomicU64::new(1),
            next_pnr: AtomicU64::new(pnr_seed),
        }
    }

    pub fn next_booking_id(&self) -> BookingId {
        BookingId(self.next_booking.fetch_add(1, Ordering::Relaxed))
    }

    pub fn next_passenger_id(&self) -> PassengerId {
        PassengerId(self.next_passenger.fetch_add(1, Ordering::Relaxed))
    }

    fn next_pnr(&self) -> Pnr {
        Pnr::from_sequence(self.next_pnr.fetch_add(1, Ordering::Relaxed))
    }

    /// Stores a new booking and assigns its PNR.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InternalConsistency`] if the booking ID is already
    /// present or the PNR sequence has wrapped onto a live PNR.
    pub fn insert(&self, mut booking: Booking) -> Result<Pnr, ReservationError> {
        let pnr = self.next_pnr();
        booking.pnr = pnr.clone();

        match self.pnrs.entry(pnr.clone()) {
            Entry::Occupied(_) => {
                return Err(ReservationError::consistency(format!("PNR {pnr} reused")));
            }
            Entry::Vacant(entry) => {
                entry.insert(booking.id);
            }
        }

        match self.bookings.entry(booking.id) {
            Entry::Occupied(_) => {
                self.pnrs.remove(&pnr);
                Err(ReservationError::consistency(format!(
                    "booking {} already stored",
                    booking.id
                )))
            }
            Entry::Vacant(entry) => {
                for passenger in &booking.passengers {
                    self.events.push(StatusChange {
                        booking_id: booking.id,
                        passenger_id: passenger.id,
                        from: None,
                        to: passenger.current_status,
                        at: booking.created_at,
                    });
                }
                self.by_user
                    .entry(booking.user_id)
                    .or_default()
                    .push(booking.id);
                entry.insert(booking);
                Ok(pnr)
            }
        }
    }

    /// Applies status transitions atomically: all are validated before any is written.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::InternalConsistency`] if a booking or passenger is
    /// missing or a transition is not allowed by the passenger state machine.
    pub fn apply(
        &self,
        changes: &[PassengerChange],
        at: DateTime<Utc>,
    ) -> Result<Vec<StatusChange>, ReservationError> {
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            let booking = self.bookings.get(&change.booking_id).ok_or_else(|| {
                ReservationError::consistency(format!("booking {} missing", change.booking_id))
            })?;
            let passenger = booking.passenger(change.passenger_id).ok_or_else(|| {
                ReservationError::consistency(format!(
                    "passenger {} missing from booking {}",
                    change.passenger_id, change.booking_id
                ))
            })?;
            if !passenger.current_status.can_transition_to(&change.to) {
                return Err(ReservationError::consistency(format!(
                    "illegal transition {} -> {} for passenger {}",
                    passenger.current_status, change.to, change.passenger_id
                )));
            }
            applied.push(StatusChange {
                booking_id: change.booking_id,
                passenger_id: change.passenger_id,
                from: Some(passenger.current_status),
                to: change.to,
                at,
            });
        }

        for change in &applied {
            if let Some(mut booking) = self.bookings.get_mut(&change.booking_id) {
                booking.updated_at = at;
                if let Some(passenger) = booking.passenger_mut(change.passenger_id) {
                    passenger.current_status = change.to;
                }
            }
            self.events.push(change.clone());
        }

        Ok(applied)
    }

    pub fn get(&self, booking_id: BookingId) -> Option<Booking> {
        self.bookings.get(&booking_id).map(|b| b.clone())
    }

    pub fn get_by_pnr(&self, pnr: &Pnr) -> Option<Booking> {
        let booking_id = *self.pnrs.get(pnr)?;
        self.get(booking_id)
    }

    pub fn bookings_for_user(&self, user_id: UserId) -> Vec<Booking> {
        let ids = self
            .by_user
            .get(&user_id)
            .map(|ids| ids.clone())
            .unwrap_or_default();
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// Copies of every stored booking, in no particular order.
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.iter().map(|b| b.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    /// Takes every pending status event, oldest first.
    pub fn drain_events(&self) -> Vec<StatusChange> {
        let mut drained = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.pop() {
            drained.push(event);
        }
        drained
    }
}
