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

//! # Rail Reservation
//!
//! This library provides the seat allocation core of a train reservation system:
//! deciding whether each passenger is confirmed, placed in the RAC
//! (Reservation Against Cancellation) pool or waitlisted, and promoting queued
//! passengers when cancellations free capacity.
//!
//! ## Core Components
//!
//! - [`Engine`]: Admission and cancellation cascade, serialized per inventory key
//! - [`CapacityLedger`]: Confirmed seat and RAC slot counters for one key
//! - [`AllocationQueue`]: Gap-free ordered RAC and waitlist queues
//! - [`BookingLedger`]: Bookings and the passengers they own
//! - [`ReservationError`]: Error types for allocation failures
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use rail_reservation_rs::{
//!     BookingRequest, CapacityConfig, ClassId, Engine, Gender, InMemoryCatalog,
//!     InventoryKey, PassengerRequest, PassengerStatus, Quota, StationId, TrainId, UserId,
//! };
//!
//! let key = InventoryKey::new(
//!     TrainId(12951),
//!     ClassId(3),
//!     NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
//!     Quota::General,
//! );
//! let catalog = InMemoryCatalog::new();
//! catalog.register(key, CapacityConfig::new(1, 1, 5)).unwrap();
//! let engine = Engine::new(Arc::new(catalog));
//!
//! let request = BookingRequest {
//!     user_id: UserId(1),
//!     key,
//!     from: StationId(10),
//!     to: StationId(20),
//!     total_fare: dec!(2450.00),
//!     passengers: vec![
//!         PassengerRequest::new("Meera", 41, Gender::Female),
//!         PassengerRequest::new("Arjun", 44, Gender::Male),
//!         PassengerRequest::new("Kabir", 12, Gender::Male),
//!     ],
//! };
//! let result = engine.submit_booking(request, false).unwrap();
//!
//! let statuses: Vec<_> = result.outcomes.iter().map(|o| o.status().unwrap()).collect();
//! assert!(matches!(statuses[0], PassengerStatus::Confirmed { .. }));
//! assert_eq!(statuses[1], PassengerStatus::Rac { number: 1 });
//! assert_eq!(statuses[2], PassengerStatus::Waitlisted { number: 1 });
//! ```
//!
//! ## Thread Safety
//!
//! Each (train, class, date, quota) key has its own lock with a bounded wait, so
//! requests for different keys never block each other while requests for the same key
//! are applied one at a time.

mod base;
pub mod booking;
pub mod capacity;
mod catalog;
pub mod config;
mod engine;
pub mod error;
pub mod inventory;
pub mod queue;
mod status;

pub use base::{
    BookingId, ClassId, InventoryKey, PassengerId, Pnr, Quota, SeatSlot, StationId, TrainId,
    UserId,
};
pub use booking::{
    BerthPreference, Booking, BookingLedger, BookingRequest, Gender, Passenger,
    PassengerRequest, StatusChange,
};
pub use capacity::{CapacityConfig, CapacityLedger, CapacitySnapshot};
pub use catalog::{Catalog, ConfirmationPredictor, InMemoryCatalog};
pub use config::{EngineConfig, LockPolicy};
pub use engine::{BookingResult, CancellationResult, Engine, PassengerOutcome, QueuePosition};
pub use error::ReservationError;
pub use inventory::InventorySnapshot;
pub use queue::{AllocationQueue, QueueEntry};
pub use status::{BookingStatus, PassengerStatus, QueueKind};
