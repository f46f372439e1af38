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

//! Passenger and booking status.
//!
//! Passengers follow a state machine; queue numbers may only shrink through
//! compaction and a cancelled passenger never comes back:
//!
//! ```text
//!  Waitlisted(n) ──compaction──► Waitlisted(n-1)
//!       │
//!       ├──promotion──► Rac(m) ──compaction──► Rac(m-1)
//!       │                 │
//!       │                 └──promotion──► Confirmed(seat)
//!       └──promotion──► Confirmed(seat)
//!
//! A waitlisted passenger reaches a seat directly when the class has no RAC pool, or
//! when one call promotes it through RAC and then onto a seat (cancelling a whole
//! booking), since only the final status of such a call is recorded.
//!
//!  Confirmed | Rac | Waitlisted ──cancel──► Cancelled
//! ```

use crate::base::SeatSlot;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two ordered queues kept per inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueKind {
    Rac,
    Waitlist,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rac => f.write_str("RAC"),
            Self::Waitlist => f.write_str("WL"),
        }
    }
}

/// Per-passenger allocation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerStatus {
    Confirmed { seat: SeatSlot },
    Rac { number: u32 },
    Waitlisted { number: u32 },
    Cancelled,
}

impl PassengerStatus {
    pub fn queue_kind(&self) -> Option<QueueKind> {
        match self {
            Self::Rac { .. } => Some(QueueKind::Rac),
            Self::Waitlisted { .. } => Some(QueueKind::Waitlist),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn seat(&self) -> Option<SeatSlot> {
        match self {
            Self::Confirmed { seat } => Some(*seat),
            _ => None,
        }
    }

    /// Severity used to derive a booking status; higher is worse.
    fn rank(&self) -> u8 {
        match self {
            Self::Confirmed { .. } => 0,
            Self::Rac { .. } => 1,
            Self::Waitlisted { .. } => 2,
            Self::Cancelled => 3,
        }
    }

    /// Whether moving from `self` to `next` is a legal allocation step.
    pub fn can_transition_to(&self, next: &PassengerStatus) -> bool {
        use PassengerStatus::*;

        match (self, next) {
            (Waitlisted { number: from }, Waitlisted { number: to }) => to < from,
            (Rac { number: from }, Rac { number: to }) => to < from,
            (Waitlisted { .. }, Rac { .. } | Confirmed { .. }) => true,
            (Rac { .. }, Confirmed { .. }) => true,
            (Confirmed { .. } | Rac { .. } | Waitlisted { .. }, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PassengerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed { seat } => write!(f, "CNF {seat}"),
            Self::Rac { number } => write!(f, "RAC {number}"),
            Self::Waitlisted { number } => write!(f, "WL {number}"),
            Self::Cancelled => f.write_str("CAN"),
        }
    }
}

/// Booking-level status, derived from the passengers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rac,
    Waitlisted,
    Cancelled,
}

impl BookingStatus {
    /// Worst live passenger status; `Cancelled` only when every passenger is cancelled.
    pub fn derive<'a>(statuses: impl IntoIterator<Item = &'a PassengerStatus>) -> Self {
        let mut seen_any = false;
        let mut worst: Option<&PassengerStatus> = None;

        for status in statuses {
            seen_any = true;
            if status.is_cancelled() {
                continue;
            }
            if worst.is_none_or(|w| status.rank() > w.rank()) {
                worst = Some(status);
            }
        }

        match worst {
            Some(PassengerStatus::Confirmed { .. }) => Self::Confirmed,
            Some(PassengerStatus::Rac { .. }) => Self::Rac,
            Some(PassengerStatus::Waitlisted { .. }) => Self::Waitlisted,
            _ if seen_any => Self::Cancelled,
            _ => Self::Pending,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Rac => "RAC",
            Self::Waitlisted => "WAITLISTED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CNF: PassengerStatus = PassengerStatus::Confirmed { seat: SeatSlot(4) };

    #[test]
    fn promotion_transitions_are_legal() {
        let wl = PassengerStatus::Waitlisted { number: 1 };
        let rac = PassengerStatus::Rac { number: 2 };
        assert!(wl.can_transition_to(&rac));
        assert!(wl.can_transition_to(&CNF));
        assert!(rac.can_transition_to(&CNF));
    }

    #[test]
    fn compaction_only_moves_forward() {
        let wl3 = PassengerStatus::Waitlisted { number: 3 };
        assert!(wl3.can_transition_to(&PassengerStatus::Waitlisted { number: 2 }));
        assert!(!wl3.can_transition_to(&PassengerStatus::Waitlisted { number: 3 }));
        assert!(!wl3.can_transition_to(&PassengerStatus::Waitlisted { number: 4 }));
    }

    #[test]
    fn downgrades_and_resurrection_are_illegal() {
        let rac = PassengerStatus::Rac { number: 1 };
        assert!(!CNF.can_transition_to(&rac));
        assert!(!rac.can_transition_to(&PassengerStatus::Waitlisted { number: 1 }));
        assert!(!PassengerStatus::Cancelled.can_transition_to(&CNF));
        assert!(!PassengerStatus::Cancelled.can_transition_to(&PassengerStatus::Cancelled));
        assert!(!CNF.can_transition_to(&PassengerStatus::Confirmed { seat: SeatSlot(9) }));
    }

    #[test]
    fn booking_status_is_worst_live_passenger() {
        let rac = PassengerStatus::Rac { number: 1 };
        let wl = PassengerStatus::Waitlisted { number: 7 };

        assert_eq!(BookingStatus::derive([&CNF, &CNF]), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::derive([&CNF, &rac]), BookingStatus::Rac);
        assert_eq!(BookingStatus::derive([&rac, &wl, &CNF]), BookingStatus::Waitlisted);
        assert_eq!(
            BookingStatus::derive([&PassengerStatus::Cancelled, &CNF]),
            BookingStatus::Confirmed
        );
    }

    #[test]
    fn booking_status_cancelled_only_when_all_cancelled() {
        let cancelled = PassengerStatus::Cancelled;
        assert_eq!(
            BookingStatus::derive([&cancelled, &cancelled]),
            BookingStatus::Cancelled
        );
        assert_eq!(BookingStatus::derive([]), BookingStatus::Pending);
    }

    #[test]
    fn display_codes() {
        assert_eq!(CNF.to_string(), "CNF 4");
        assert_eq!(PassengerStatus::Rac { number: 3 }.to_string(), "RAC 3");
        assert_eq!(PassengerStatus::Waitlisted { number: 12 }.to_string(), "WL 12");
        assert_eq!(PassengerStatus::Cancelled.to_string(), "CAN");
    }
}
