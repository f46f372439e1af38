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

//! Simple REST API server example for the allocation engine.
//!
//! Run with: `cargo run --example server`
//!
//! The server starts with a small demo catalog (train 12951, class 3, the next three
//! days, GENERAL and TATKAL quotas).
//!
//! ## Endpoints
//!
//! - `POST /bookings` - Submit a booking (`?allow_partial=true` admits whoever fits)
//! - `GET /bookings/{id}` - Get a booking
//! - `POST /bookings/{id}/cancel` - Cancel every live passenger of a booking
//! - `POST /bookings/{id}/passengers/{pid}/cancel` - Cancel one passenger
//! - `GET /bookings/{id}/passengers/{pid}/position` - RAC or waitlist position
//! - `GET /pnr/{pnr}` - PNR enquiry
//! - `GET /inventory` - Snapshots of every opened inventory
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:3000/bookings \
//!   -H "Content-Type: application/json" \
//!   -d '{"user_id": 1, "key": {"train_id": 12951, "class_id": 3,
//!        "journey_date": "2026-11-02", "quota": "GENERAL"},
//!        "from": 10, "to": 20, "total_fare": "1510.00",
//!        "passengers": [{"name": "Meera", "age": 41, "gender": "FEMALE"}]}'
//!
//! curl http://localhost:3000/pnr/4210000001
//! curl -X POST http://localhost:3000/bookings/1/passengers/1/cancel
//! ```

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Days, Utc};
use rail_reservation_rs::{
    Booking, BookingId, BookingRequest, BookingResult, CancellationResult, CapacityConfig,
    ClassId, Engine, EngineConfig, InMemoryCatalog, InventoryKey, InventorySnapshot,
    PassengerId, QueuePosition, Quota, ReservationError, TrainId,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// === Request/Response DTOs ===

#[derive(Debug, Default, Deserialize)]
pub struct BookingOptions {
    pub allow_partial: Option<bool>,
}

/// Response body for errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

// === Error Handling ===

/// Wrapper for converting `ReservationError` into HTTP responses.
pub struct AppError(ReservationError);

impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            ReservationError::InvalidKey => (StatusCode::BAD_REQUEST, "INVALID_KEY"),
            ReservationError::EmptyRequest => (StatusCode::BAD_REQUEST, "EMPTY_REQUEST"),
            ReservationError::InvalidPnr => (StatusCode::BAD_REQUEST, "INVALID_PNR"),
            ReservationError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ReservationError::AlreadyCancelled => (StatusCode::CONFLICT, "ALREADY_CANCELLED"),
            ReservationError::DuplicateInventory => (StatusCode::CONFLICT, "DUPLICATE_INVENTORY"),
            ReservationError::BookingFull => (StatusCode::UNPROCESSABLE_ENTITY, "BOOKING_FULL"),
            ReservationError::CapacityExceeded => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CAPACITY_EXCEEDED")
            }
            ReservationError::TransientBusy => (StatusCode::SERVICE_UNAVAILABLE, "TRANSIENT_BUSY"),
            ReservationError::InternalConsistency(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_CONSISTENCY")
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /bookings - Submit a booking request.
async fn create_booking(
    State(state): State<AppState>,
    Query(options): Query<BookingOptions>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingResult>), AppError> {
    let allow_partial = options
        .allow_partial
        .unwrap_or(state.engine.config().allow_partial_default);
    let result = state.engine.submit_booking(request, allow_partial)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .engine
        .get_booking(BookingId(id))
        .ok_or(ReservationError::NotFound)?;
    Ok(Json(booking))
}

/// POST /bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<CancellationResult>, AppError> {
    Ok(Json(state.engine.cancel_booking(BookingId(id))?))
}

/// POST /bookings/{id}/passengers/{pid}/cancel
async fn cancel_passenger(
    State(state): State<AppState>,
    Path((id, pid)): Path<(u64, u64)>,
) -> Result<Json<CancellationResult>, AppError> {
    let result = state
        .engine
        .cancel_passenger(BookingId(id), PassengerId(pid))?;
    Ok(Json(result))
}

/// GET /bookings/{id}/passengers/{pid}/position
async fn queue_position(
    State(state): State<AppState>,
    Path((id, pid)): Path<(u64, u64)>,
) -> Result<Json<QueuePosition>, AppError> {
    let position = state
        .engine
        .get_queue_position(BookingId(id), PassengerId(pid))?;
    Ok(Json(position))
}

/// GET /pnr/{pnr} - PNR status enquiry.
async fn pnr_status(
    State(state): State<AppState>,
    Path(pnr): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.engine.get_booking_by_pnr(&pnr)?))
}

/// GET /inventory - Snapshots of every opened inventory.
async fn list_inventory(
    State(state): State<AppState>,
) -> Result<Json<Vec<InventorySnapshot>>, AppError> {
    let snapshots = state
        .engine
        .inventories()
        .iter()
        .map(|key| state.engine.inventory_snapshot(key))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(snapshots))
}

// === Router ===

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/{id}/cancel", post(cancel_booking))
        .route("/bookings/{id}/passengers/{pid}/cancel", post(cancel_passenger))
        .route("/bookings/{id}/passengers/{pid}/position", get(queue_position))
        .route("/pnr/{pnr}", get(pnr_status))
        .route("/inventory", get(list_inventory))
        .with_state(state)
}

// === Status Events ===

/// How often the status-change outbox is emptied.
const EVENT_DRAIN_INTERVAL: Duration = Duration::from_millis(500);

/// Periodically drains the engine's status-change outbox and logs each event.
///
/// The demo has no durable store or notifier, so events are discarded once logged.
fn spawn_event_drain(engine: Arc<Engine>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let events = engine.drain_events();
            if events.is_empty() {
                continue;
            }
            for event in &events {
                debug!(
                    booking_id = %event.booking_id,
                    passenger_id = %event.passenger_id,
                    from = ?event.from,
                    to = %event.to,
                    "status changed"
                );
            }
            info!(count = events.len(), "status events drained");
        }
    })
}

fn demo_catalog() -> Result<InMemoryCatalog, ReservationError> {
    let catalog = InMemoryCatalog::new();
    let today = Utc::now().date_naive();
    for offset in 1..=3 {
        let Some(date) = today.checked_add_days(Days::new(offset)) else {
            continue;
        };
        let general = InventoryKey::new(TrainId(12951), ClassId(3), date, Quota::General);
        let tatkal = InventoryKey::new(TrainId(12951), ClassId(3), date, Quota::Tatkal);
        catalog.register(general, CapacityConfig::new(64, 16, 100))?;
        catalog.register(tatkal, CapacityConfig::new(8, 2, 10))?;
    }
    Ok(catalog)
}

// === Main ===

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rail_reservation_rs=info")),
        )
        .init();

    let config = EngineConfig::load(None)?;
    let engine = Arc::new(Engine::with_config(Arc::new(demo_catalog()?), config));
    spawn_event_drain(Arc::clone(&engine), EVENT_DRAIN_INTERVAL);
    let state = AppState { engine };

    let app = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    info!("reservation API listening on http://127.0.0.1:3000");
    println!("Endpoints:");
    println!("  POST /bookings                                 - Submit a booking");
    println!("  GET  /bookings/{{id}}                            - Get a booking");
    println!("  POST /bookings/{{id}}/cancel                     - Cancel a booking");
    println!("  POST /bookings/{{id}}/passengers/{{pid}}/cancel    - Cancel a passenger");
    println!("  GET  /bookings/{{id}}/passengers/{{pid}}/position  - Queue position");
    println!("  GET  /pnr/{{pnr}}                                - PNR enquiry");
    println!("  GET  /inventory                                - Inventory snapshots");

    axum::serve(listener, app).await?;
    Ok(())
}
