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

//! Core identifier types for trains, bookings and passengers.

use crate::ReservationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Train number as published in the timetable (e.g. `12951`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct TrainId(pub u32);

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Travel class identifier (1A, 2A, 3A, SL...) as assigned by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ClassId(pub u16);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a booking.
///
/// Allocated by the booking ledger from a monotonically increasing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookingId(pub u64);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a passenger. Globally unique, not per booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PassengerId(pub u64);

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the user who made a booking. Owned by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A confirmed seat slot within one inventory, numbered from 1.
///
/// Mapping a slot to a physical coach/berth is left to the seat layout service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SeatSlot(pub u16);

impl fmt::Display for SeatSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocation category with its own independent capacity pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quota {
    General,
    Ladies,
    SeniorCitizen,
    Tatkal,
    PremiumTatkal,
}

impl Quota {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Ladies => "LADIES",
            Self::SeniorCitizen => "SENIOR_CITIZEN",
            Self::Tatkal => "TATKAL",
            Self::PremiumTatkal => "PREMIUM_TATKAL",
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quota {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "GENERAL" | "GN" => Ok(Self::General),
            "LADIES" | "LD" => Ok(Self::Ladies),
            "SENIOR_CITIZEN" | "SS" => Ok(Self::SeniorCitizen),
            "TATKAL" | "TQ" => Ok(Self::Tatkal),
            "PREMIUM_TATKAL" | "PT" => Ok(Self::PremiumTatkal),
            _ => Err(ReservationError::InvalidKey),
        }
    }
}

/// Identifies one independent capacity pool: a train, class, journey date and quota.
///
/// All allocation state for a key is serialized behind a single lock; different keys
/// never block each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct InventoryKey {
    pub train_id: TrainId,
    pub class_id: ClassId,
    pub journey_date: NaiveDate,
    pub quota: Quota,
}

impl InventoryKey {
    pub fn new(train_id: TrainId, class_id: ClassId, journey_date: NaiveDate, quota: Quota) -> Self {
        Self {
            train_id,
            class_id,
            journey_date,
            quota,
        }
    }
}

impl fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.train_id, self.class_id, self.journey_date, self.quota
        )
    }
}

/// Passenger Name Record: the ten digit reference printed on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Pnr(String);

impl Pnr {
    pub const LEN: usize = 10;

    /// Formats a sequence number as a PNR. Sequence numbers beyond ten digits wrap.
    pub(crate) fn from_sequence(seq: u64) -> Self {
        Pnr(format!("{:010}", seq % 10_000_000_000))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pnr {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != Self::LEN || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ReservationError::InvalidPnr);
        }
        Ok(Pnr(s.to_string()))
    }
}

impl fmt::Display for Pnr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
