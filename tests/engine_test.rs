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

//! Engine public API integration tests.

use chrono::NaiveDate;
use rail_reservation_rs::{
    BookingId, BookingRequest, BookingStatus, CapacityConfig, ClassId, ConfirmationPredictor,
    Engine, EngineConfig, Gender, InMemoryCatalog, InventoryKey, LockPolicy, PassengerId,
    PassengerOutcome, PassengerRequest, PassengerStatus, QueueKind, Quota, ReservationError,
    SeatSlot, StationId, TrainId, UserId,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

// === Helper Functions ===

fn key(quota: Quota) -> InventoryKey {
    InventoryKey::new(
        TrainId(12951),
        ClassId(3),
        NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        quota,
    )
}

fn engine_with(total_seats: u16, rac_limit: u32, waitlist_cap: u32) -> Engine {
    let catalog = InMemoryCatalog::new();
    catalog
        .register(
            key(Quota::General),
            CapacityConfig::new(total_seats, rac_limit, waitlist_cap),
        )
        .unwrap();
    Engine::new(Arc::new(catalog))
}

fn make_request(user: u32, quota: Quota, names: &[&str]) -> BookingRequest {
    BookingRequest {
        user_id: UserId(user),
        key: key(quota),
        from: StationId(101),
        to: StationId(202),
        total_fare: dec!(755.00) * rust_decimal::Decimal::from(names.len()),
        passengers: names
            .iter()
            .map(|name| PassengerRequest::new(*name, 30, Gender::Female))
            .collect(),
    }
}

fn book(engine: &Engine, names: &[&str]) -> (BookingId, Vec<PassengerId>) {
    let result = engine
        .submit_booking(make_request(1, Quota::General, names), false)
        .unwrap();
    let ids = result
        .outcomes
        .iter()
        .map(|o| o.passenger_id().unwrap())
        .collect();
    (result.booking_id, ids)
}

fn status(engine: &Engine, booking_id: BookingId, passenger_id: PassengerId) -> PassengerStatus {
    engine
        .get_booking(booking_id)
        .unwrap()
        .passenger(passenger_id)
        .unwrap()
        .current_status
}

fn cnf(seat: u16) -> PassengerStatus {
    PassengerStatus::Confirmed { seat: SeatSlot(seat) }
}

fn rac(number: u32) -> PassengerStatus {
    PassengerStatus::Rac { number }
}

fn wl(number: u32) -> PassengerStatus {
    PassengerStatus::Waitlisted { number }
}

// === Admission Tests ===

#[test]
fn three_passengers_get_confirmed_rac_and_waitlist() {
    let engine = engine_with(1, 1, 5);
    let result = engine
        .submit_booking(make_request(1, Quota::General, &["A", "B", "C"]), false)
        .unwrap();

    let statuses: Vec<_> = result.outcomes.iter().map(|o| o.status().unwrap()).collect();
    assert_eq!(statuses, vec![cnf(1), rac(1), wl(1)]);
    assert_eq!(result.status, BookingStatus::Waitlisted);
    engine.verify().unwrap();
}

#[test]
fn first_k_passengers_are_confirmed_in_submission_order() {
    let engine = engine_with(3, 0, 10);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D", "E"]);

    let statuses: Vec<_> = ids.iter().map(|id| status(&engine, booking_id, *id)).collect();
    assert_eq!(statuses, vec![cnf(1), cnf(2), cnf(3), wl(1), wl(2)]);
}

#[test]
fn later_bookings_queue_behind_earlier_ones() {
    let engine = engine_with(1, 1, 5);
    let (b1, p1) = book(&engine, &["A"]);
    let (b2, p2) = book(&engine, &["B", "C"]);
    let (b3, p3) = book(&engine, &["D"]);

    assert_eq!(status(&engine, b1, p1[0]), cnf(1));
    assert_eq!(status(&engine, b2, p2[0]), rac(1));
    assert_eq!(status(&engine, b2, p2[1]), wl(1));
    assert_eq!(status(&engine, b3, p3[0]), wl(2));
}

#[test]
fn booking_status_keeps_admission_and_current_columns() {
    let engine = engine_with(1, 1, 5);
    let (b1, p1) = book(&engine, &["A"]);
    let (b2, p2) = book(&engine, &["B"]);

    engine.cancel_passenger(b1, p1[0]).unwrap();

    let booking = engine.get_booking(b2).unwrap();
    let passenger = booking.passenger(p2[0]).unwrap();
    assert_eq!(passenger.booking_status, rac(1));
    assert_eq!(passenger.current_status, cnf(1));
    assert_eq!(passenger.seat_number(), Some(SeatSlot(1)));
    assert_eq!(booking.status(), BookingStatus::Confirmed);
}

#[test]
fn full_waitlist_rejects_whole_request_without_side_effects() {
    let engine = engine_with(1, 1, 1);
    book(&engine, &["A", "B"]);
    let before = engine.inventory_snapshot(&key(Quota::General)).unwrap();

    // One waitlist slot left but two passengers: all or nothing.
    let result = engine.submit_booking(make_request(2, Quota::General, &["C", "D"]), false);
    assert_eq!(result, Err(ReservationError::BookingFull));

    let after = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(before.capacity, after.capacity);
    assert!(after.waitlist.is_empty());
    assert!(engine.bookings_for_user(UserId(2)).is_empty());
    engine.verify().unwrap();
}

#[test]
fn partial_mode_keeps_admitted_passengers() {
    let engine = engine_with(1, 0, 1);
    let result = engine
        .submit_booking(make_request(1, Quota::General, &["A", "B", "C"]), true)
        .unwrap();

    assert_eq!(result.outcomes.len(), 3);
    assert_eq!(result.outcomes[0].status(), Some(cnf(1)));
    assert_eq!(result.outcomes[1].status(), Some(wl(1)));
    assert_eq!(result.outcomes[2], PassengerOutcome::Rejected);

    let booking = engine.get_booking(result.booking_id).unwrap();
    assert_eq!(booking.passengers.len(), 2);
    engine.verify().unwrap();
}

#[test]
fn partial_mode_with_nobody_admitted_is_booking_full() {
    let engine = engine_with(1, 0, 0);
    book(&engine, &["A"]);

    let result = engine.submit_booking(make_request(1, Quota::General, &["B"]), true);
    assert_eq!(result, Err(ReservationError::BookingFull));
}

#[test]
fn unknown_key_is_invalid() {
    let engine = engine_with(1, 1, 1);
    let result = engine.submit_booking(make_request(1, Quota::Tatkal, &["A"]), false);
    assert_eq!(result, Err(ReservationError::InvalidKey));
    assert!(engine.inventories().is_empty());
}

#[test]
fn empty_request_is_rejected() {
    let engine = engine_with(1, 1, 1);
    let result = engine.submit_booking(make_request(1, Quota::General, &[]), false);
    assert_eq!(result, Err(ReservationError::EmptyRequest));
}

#[test]
fn quotas_have_independent_pools() {
    let catalog = InMemoryCatalog::new();
    catalog
        .register(key(Quota::General), CapacityConfig::new(1, 0, 0))
        .unwrap();
    catalog
        .register(key(Quota::Tatkal), CapacityConfig::new(1, 0, 0))
        .unwrap();
    let engine = Engine::new(Arc::new(catalog));

    engine
        .submit_booking(make_request(1, Quota::General, &["A"]), false)
        .unwrap();
    let tatkal = engine
        .submit_booking(make_request(1, Quota::Tatkal, &["B"]), false)
        .unwrap();

    assert_eq!(tatkal.outcomes[0].status(), Some(cnf(1)));
    assert_eq!(engine.inventories().len(), 2);
}

// === Cancellation Cascade Tests ===

#[test]
fn cancelling_confirmed_promotes_rac_and_waitlist_heads() {
    let engine = engine_with(1, 1, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C"]);

    let result = engine.cancel_passenger(booking_id, ids[0]).unwrap();

    let statuses: Vec<_> = ids.iter().map(|id| status(&engine, booking_id, *id)).collect();
    assert_eq!(statuses, vec![PassengerStatus::Cancelled, cnf(1), rac(1)]);

    assert_eq!(result.affected.len(), 3);
    let cancelled = result
        .affected
        .iter()
        .find(|c| c.passenger_id == ids[0])
        .unwrap();
    assert_eq!(cancelled.from, Some(cnf(1)));
    assert_eq!(cancelled.to, PassengerStatus::Cancelled);

    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity.confirmed_count, 1);
    assert_eq!(snapshot.capacity.rac_count, 1);
    assert!(snapshot.waitlist.is_empty());
    engine.verify().unwrap();
}

#[test]
fn cancelling_confirmed_cascades_exactly_one_chain() {
    let engine = engine_with(1, 2, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D", "E"]);
    // A=CNF, B=RAC1, C=RAC2, D=WL1, E=WL2

    engine.cancel_passenger(booking_id, ids[0]).unwrap();

    let statuses: Vec<_> = ids.iter().map(|id| status(&engine, booking_id, *id)).collect();
    assert_eq!(
        statuses,
        vec![PassengerStatus::Cancelled, cnf(1), rac(1), rac(2), wl(1)]
    );
    engine.verify().unwrap();
}

#[test]
fn cancelling_rac_promotes_waitlist_head_to_rac_tail() {
    let engine = engine_with(1, 2, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D", "E"]);

    engine.cancel_passenger(booking_id, ids[1]).unwrap();

    let statuses: Vec<_> = ids.iter().map(|id| status(&engine, booking_id, *id)).collect();
    assert_eq!(
        statuses,
        vec![cnf(1), PassengerStatus::Cancelled, rac(1), rac(2), wl(1)]
    );
    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity.confirmed_count, 1);
    assert_eq!(snapshot.capacity.rac_count, 2);
}

#[test]
fn cancelling_waitlisted_only_compacts() {
    let engine = engine_with(1, 0, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D"]);
    // A=CNF, B=WL1, C=WL2, D=WL3
    let before = engine.inventory_snapshot(&key(Quota::General)).unwrap();

    let result = engine.cancel_passenger(booking_id, ids[2]).unwrap();

    assert_eq!(status(&engine, booking_id, ids[0]), cnf(1));
    assert_eq!(status(&engine, booking_id, ids[1]), wl(1));
    assert_eq!(status(&engine, booking_id, ids[3]), wl(2));
    assert_eq!(result.affected.len(), 2);

    let after = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(before.capacity, after.capacity);
    let ordinals: Vec<_> = after.waitlist.iter().map(|e| e.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2]);
}

#[test]
fn without_rac_pool_waitlist_head_is_confirmed_directly() {
    let engine = engine_with(2, 0, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D"]);

    engine.cancel_passenger(booking_id, ids[0]).unwrap();

    assert_eq!(status(&engine, booking_id, ids[2]), cnf(1));
    assert_eq!(status(&engine, booking_id, ids[3]), wl(1));
    engine.verify().unwrap();
}

#[test]
fn cancel_twice_is_already_cancelled_and_changes_nothing() {
    let engine = engine_with(1, 1, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C"]);

    engine.cancel_passenger(booking_id, ids[0]).unwrap();
    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    let booking = engine.get_booking(booking_id).unwrap();

    let again = engine.cancel_passenger(booking_id, ids[0]);
    assert_eq!(again.unwrap_err(), ReservationError::AlreadyCancelled);

    let snapshot_after = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity, snapshot_after.capacity);
    assert_eq!(snapshot.rac, snapshot_after.rac);
    assert_eq!(snapshot.waitlist, snapshot_after.waitlist);
    assert_eq!(engine.get_booking(booking_id).unwrap(), booking);
}

#[test]
fn cancel_unknown_booking_or_passenger_is_not_found() {
    let engine = engine_with(1, 1, 5);
    let (booking_id, _) = book(&engine, &["A"]);

    assert_eq!(
        engine.cancel_passenger(BookingId(999), PassengerId(1)).unwrap_err(),
        ReservationError::NotFound
    );
    assert_eq!(
        engine.cancel_passenger(booking_id, PassengerId(999)).unwrap_err(),
        ReservationError::NotFound
    );
}

#[test]
fn cancel_booking_cancels_every_live_passenger_and_promotes_others() {
    let engine = engine_with(1, 1, 5);
    let (b1, p1) = book(&engine, &["A", "B"]); // CNF 1, RAC 1
    let (b2, p2) = book(&engine, &["C"]); // WL 1

    let result = engine.cancel_booking(b1).unwrap();

    assert_eq!(engine.get_booking(b1).unwrap().status(), BookingStatus::Cancelled);
    assert_eq!(status(&engine, b1, p1[1]), PassengerStatus::Cancelled);
    assert_eq!(status(&engine, b2, p2[0]), cnf(1));

    // B went RAC 1 -> (CNF) -> CAN inside one section; only the end state is recorded.
    let b = result.affected.iter().find(|c| c.passenger_id == p1[1]).unwrap();
    assert_eq!(b.from, Some(rac(1)));
    assert_eq!(b.to, PassengerStatus::Cancelled);
    engine.verify().unwrap();

    assert_eq!(
        engine.cancel_booking(b1).unwrap_err(),
        ReservationError::AlreadyCancelled
    );
}

#[test]
fn cancel_booking_can_move_waitlisted_straight_to_confirmed() {
    let engine = engine_with(2, 1, 5);
    let (b1, _) = book(&engine, &["A", "B"]); // CNF 1, CNF 2
    let (b2, p2) = book(&engine, &["C"]); // RAC 1
    let (b3, p3) = book(&engine, &["D"]); // WL 1

    // Freeing both seats moves D through RAC onto a seat within one call.
    let result = engine.cancel_booking(b1).unwrap();

    assert_eq!(status(&engine, b2, p2[0]), cnf(1));
    assert_eq!(status(&engine, b3, p3[0]), cnf(2));
    let d = result.affected.iter().find(|c| c.passenger_id == p3[0]).unwrap();
    assert_eq!(d.from, Some(wl(1)));
    assert_eq!(d.to, cnf(2));
    engine.verify().unwrap();
}

#[test]
fn cancelling_ahead_of_a_long_waitlist_renumbers_everyone() {
    const WAITLISTED: u32 = 4_000;
    let engine = engine_with(1, 500, WAITLISTED);
    let (head, head_ids) = book(&engine, &["Head"]);
    for _ in 0..500 + WAITLISTED {
        book(&engine, &["P"]);
    }

    let result = engine.cancel_passenger(head, head_ids[0]).unwrap();

    // Cancelled head, 500 RAC moves (one promoted, 499 shifted), 4000 waitlist moves.
    assert_eq!(result.affected.len(), 1 + 500 + WAITLISTED as usize);
    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity.confirmed_count, 1);
    assert_eq!(snapshot.rac.len(), 500);
    assert_eq!(snapshot.waitlist.len(), WAITLISTED as usize - 1);
    assert_eq!(snapshot.waitlist.last().map(|e| e.ordinal), Some(WAITLISTED - 1));
    engine.verify().unwrap();
}

#[test]
fn cancel_booking_skips_already_cancelled_passengers() {
    let engine = engine_with(2, 0, 5);
    let (booking_id, ids) = book(&engine, &["A", "B"]);
    engine.cancel_passenger(booking_id, ids[0]).unwrap();

    let result = engine.cancel_booking(booking_id).unwrap();
    assert_eq!(result.affected.len(), 1);
    assert_eq!(result.affected[0].passenger_id, ids[1]);
}

// === Query Tests ===

struct FixedPredictor;

impl ConfirmationPredictor for FixedPredictor {
    fn confirmation_probability(
        &self,
        _key: &InventoryKey,
        kind: QueueKind,
        ordinal: u32,
    ) -> Option<f64> {
        match kind {
            QueueKind::Rac => Some(0.95),
            QueueKind::Waitlist => Some(1.0 / f64::from(ordinal + 1)),
        }
    }
}

#[test]
fn queue_position_follows_compaction() {
    let engine = engine_with(1, 1, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C", "D"]);

    let position = engine.get_queue_position(booking_id, ids[3]).unwrap();
    assert_eq!((position.kind, position.ordinal), (QueueKind::Waitlist, 2));
    assert_eq!(position.confirmation_probability, None);

    engine.cancel_passenger(booking_id, ids[2]).unwrap();
    let position = engine.get_queue_position(booking_id, ids[3]).unwrap();
    assert_eq!((position.kind, position.ordinal), (QueueKind::Waitlist, 1));

    assert_eq!(
        engine.get_queue_position(booking_id, ids[0]).unwrap_err(),
        ReservationError::NotFound
    );
}

#[test]
fn queue_position_reports_prediction_without_affecting_it() {
    let catalog = InMemoryCatalog::new();
    catalog
        .register(key(Quota::General), CapacityConfig::new(1, 1, 5))
        .unwrap();
    let engine = Engine::new(Arc::new(catalog)).with_predictor(Arc::new(FixedPredictor));
    let (booking_id, ids) = book(&engine, &["A", "B", "C"]);

    let rac_position = engine.get_queue_position(booking_id, ids[1]).unwrap();
    assert_eq!(rac_position.kind, QueueKind::Rac);
    assert_eq!(rac_position.confirmation_probability, Some(0.95));

    let wl_position = engine.get_queue_position(booking_id, ids[2]).unwrap();
    assert_eq!(wl_position.confirmation_probability, Some(0.5));
}

#[test]
fn pnr_enquiry() {
    let engine = engine_with(1, 1, 5);
    let result = engine
        .submit_booking(make_request(1, Quota::General, &["A"]), false)
        .unwrap();

    let booking = engine.get_booking_by_pnr(result.pnr.as_str()).unwrap();
    assert_eq!(booking.id, result.booking_id);
    assert_eq!(booking.total_fare, dec!(755.00));
    assert_eq!(
        engine.get_booking_by_pnr("12345").unwrap_err(),
        ReservationError::InvalidPnr
    );
    assert_eq!(
        engine.get_booking_by_pnr("0000000001").unwrap_err(),
        ReservationError::NotFound
    );
}

#[test]
fn pnrs_are_unique() {
    let engine = engine_with(50, 0, 50);
    let mut pnrs: Vec<_> = (0..40)
        .map(|_| {
            engine
                .submit_booking(make_request(1, Quota::General, &["A"]), false)
                .unwrap()
                .pnr
        })
        .collect();
    pnrs.sort();
    pnrs.dedup();
    assert_eq!(pnrs.len(), 40);
    assert_eq!(engine.bookings_for_user(UserId(1)).len(), 40);
}

#[test]
fn status_events_are_drained_once() {
    let engine = engine_with(1, 1, 5);
    let (booking_id, ids) = book(&engine, &["A", "B", "C"]);
    engine.cancel_passenger(booking_id, ids[0]).unwrap();

    let events = engine.drain_events();
    // Three admissions, then cancellation and two promotions.
    assert_eq!(events.len(), 6);
    assert!(events[..3].iter().all(|e| e.from.is_none()));
    assert!(engine.drain_events().is_empty());
}

#[test]
fn snapshot_of_unbooked_key_is_empty() {
    let engine = engine_with(4, 2, 8);
    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity.available_seats, 4);
    assert!(engine.inventories().is_empty());
    assert_eq!(
        engine.inventory_snapshot(&key(Quota::Ladies)).unwrap_err(),
        ReservationError::InvalidKey
    );
}

// === Concurrency Tests ===

#[test]
fn concurrent_bookings_on_one_key_never_overbook() {
    let catalog = InMemoryCatalog::new();
    catalog
        .register(key(Quota::General), CapacityConfig::new(20, 10, 30))
        .unwrap();
    let config = EngineConfig {
        lock: LockPolicy {
            wait_ms: 200,
            max_attempts: 50,
            backoff_ms: 1,
            max_backoff_ms: 10,
        },
        ..EngineConfig::default()
    };
    let engine = Arc::new(Engine::with_config(Arc::new(catalog), config));

    const NUM_THREADS: u32 = 16;
    const BOOKINGS_PER_THREAD: u32 = 10;

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let mut admitted = 0;
                for _ in 0..BOOKINGS_PER_THREAD {
                    match engine.submit_booking(make_request(t, Quota::General, &["P"]), false) {
                        Ok(_) => admitted += 1,
                        Err(ReservationError::BookingFull) => {}
                        Err(e) => panic!("unexpected error: {e}"),
                    }
                }
                admitted
            })
        })
        .collect();

    let admitted: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 20 + 10 + 30);

    let snapshot = engine.inventory_snapshot(&key(Quota::General)).unwrap();
    assert_eq!(snapshot.capacity.confirmed_count, 20);
    assert_eq!(snapshot.capacity.rac_count, 10);
    assert_eq!(snapshot.waitlist.len(), 30);
    engine.verify().unwrap();
}

#[test]
fn concurrent_cancellations_promote_in_queue_order() {
    let engine = Arc::new(engine_with(10, 5, 20));
    let bookings: Vec<_> = (0..35).map(|_| book(&engine, &["P"])).collect();

    // Cancel every confirmed passenger concurrently.
    let handles: Vec<_> = bookings[..10]
        .iter()
        .map(|(booking_id, ids)| {
            let engine = Arc::clone(&engine);
            let (booking_id, passenger_id) = (*booking_id, ids[0]);
            thread::spawn(move || engine.cancel_passenger(booking_id, passenger_id).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // The 5 RAC holders and the first 5 waitlisted are now confirmed; the next 5
    // waitlisted hold RAC, and the last 10 are WL 1..10 in their original order.
    for (i, (booking_id, ids)) in bookings.iter().enumerate().skip(10) {
        let current = status(&engine, *booking_id, ids[0]);
        match i {
            10..=19 => assert!(matches!(current, PassengerStatus::Confirmed { .. })),
            20..=24 => assert_eq!(current, rac(i as u32 - 19)),
            _ => assert_eq!(current, wl(i as u32 - 24)),
        }
    }
    engine.verify().unwrap();
}
