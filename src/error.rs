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

//! Error types for reservation processing.

use thiserror::Error;

/// Reservation processing errors.
///
/// `BookingFull` and `CapacityExceeded` are expected business outcomes rather than
/// failures. `TransientBusy` is the only retryable variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// Train/class/date/quota is not known to the catalog
    #[error("unknown train/class/date/quota")]
    InvalidKey,

    /// Booking request has no passengers
    #[error("booking request has no passengers")]
    EmptyRequest,

    /// No passenger of the request could be admitted, not even to the waitlist
    #[error("booking full: waitlist capacity exhausted")]
    BookingFull,

    /// A queue is at its configured cap
    #[error("queue capacity exceeded")]
    CapacityExceeded,

    /// The inventory lock could not be acquired within the bounded wait
    #[error("inventory busy, retry later")]
    TransientBusy,

    /// An allocation invariant was violated; the operation was rolled back
    #[error("internal consistency error: {0}")]
    InternalConsistency(String),

    /// Booking or passenger does not exist
    #[error("booking or passenger not found")]
    NotFound,

    /// Passenger (or every passenger of the booking) is already cancelled
    #[error("already cancelled")]
    AlreadyCancelled,

    /// Inventory already registered for this key
    #[error("inventory already registered")]
    DuplicateInventory,

    /// PNR is not a ten digit number
    #[error("invalid PNR format")]
    InvalidPnr,
}

impl ReservationError {
    pub(crate) fn consistency(msg: impl Into<String>) -> Self {
        Self::InternalConsistency(msg.into())
    }

    /// Whether the caller may retry the same request after backing off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientBusy)
    }

    /// Whether this is an expected rejection to surface to the end user, not a failure.
    pub fn is_business_rejection(&self) -> bool {
        matches!(self, Self::BookingFull | Self::CapacityExceeded)
    }
}
