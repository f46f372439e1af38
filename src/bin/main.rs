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

use chrono::NaiveDate;
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rail_reservation_rs::{
    BookingId, BookingRequest, CapacityConfig, ClassId, Engine, EngineConfig, InMemoryCatalog,
    InventoryKey, PassengerId, PassengerRequest, Quota, StationId, TrainId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

/// Rail Reservation - Replay booking and cancellation CSVs
///
/// Loads train inventories, applies booking and cancellation operations in file order
/// and writes the resulting status of every passenger to stdout.
#[derive(Parser, Debug)]
#[command(name = "rail-reservation-rs")]
#[command(about = "Allocates train seats, RAC and waitlist from operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,request,user,train,class,date,quota,from,to,name,age,gender,fare,passenger
    /// Example: cargo run -- --inventory inventory.csv operations.csv > passengers.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Path to CSV file with inventories
    ///
    /// Expected format: train,class,date,quota,total_seats,rac_limit,waitlist_cap
    #[arg(long, value_name = "FILE")]
    inventory: PathBuf,

    /// Optional engine configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep the admitted passengers when part of a request cannot be waitlisted
    #[arg(long)]
    allow_partial: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "rail_reservation_rs=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match EngineConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    let catalog = match open(&args.inventory).and_then(|file| {
        load_catalog(BufReader::new(file)).map_err(|e| e.to_string())
    }) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Error loading inventory: {}", e);
            process::exit(1);
        }
    };

    let file = match open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let allow_partial = args.allow_partial || config.allow_partial_default;
    let engine = Engine::with_config(Arc::new(catalog), config);
    let bookings = match process_operations(&engine, BufReader::new(file), allow_partial) {
        Ok(bookings) => bookings,
        Err(e) => {
            error!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = engine.verify() {
        error!("Replay left the engine inconsistent: {}", e);
        process::exit(1);
    }

    if let Err(e) = write_passengers(&engine, &bookings, std::io::stdout()) {
        error!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn open(path: &Path) -> Result<File, String> {
    File::open(path).map_err(|e| format!("Error opening file '{}': {}", path.display(), e))
}

/// Inventory CSV row.
#[derive(Debug, Deserialize)]
struct InventoryRecord {
    train: u32,
    class: u16,
    date: NaiveDate,
    quota: String,
    total_seats: u16,
    rac_limit: u32,
    waitlist_cap: u32,
}

/// Loads inventory capacities into a catalog. Malformed or duplicate rows are skipped.
pub fn load_catalog<R: Read>(reader: R) -> Result<InMemoryCatalog, csv::Error> {
    let catalog = InMemoryCatalog::new();
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    for result in rdr.deserialize::<InventoryRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping malformed inventory row: {}", e);
                continue;
            }
        };
        let Ok(quota) = record.quota.parse::<Quota>() else {
            warn!("Skipping inventory row with unknown quota '{}'", record.quota);
            continue;
        };
        let key = InventoryKey::new(TrainId(record.train), ClassId(record.class), record.date, quota);
        let config = CapacityConfig::new(record.total_seats, record.rac_limit, record.waitlist_cap);
        if let Err(e) = catalog.register(key, config) {
            warn!("Skipping inventory {}: {}", key, e);
        }
    }

    Ok(catalog)
}

/// Operation CSV row.
///
/// `book` rows carry the inventory and passenger columns; `cancel` rows only need
/// `request` and the 1-based `passenger` index within that request.
#[derive(Debug, Deserialize)]
struct OperationRecord {
    #[serde(rename = "type")]
    op: String,
    request: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    user: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    train: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    class: Option<u16>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    date: Option<NaiveDate>,
    #[serde(default)]
    quota: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    from: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    to: Option<u32>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    age: Option<u8>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fare: Option<Decimal>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    passenger: Option<usize>,
}

impl OperationRecord {
    fn key(&self) -> Option<InventoryKey> {
        let quota = self.quota.as_deref()?.parse::<Quota>().ok()?;
        Some(InventoryKey::new(
            TrainId(self.train?),
            ClassId(self.class?),
            self.date?,
            quota,
        ))
    }

    fn passenger_request(&self) -> Option<PassengerRequest> {
        let name = self.name.clone().filter(|n| !n.is_empty())?;
        let gender = self.gender.as_deref()?.parse().ok()?;
        Some(PassengerRequest::new(name, self.age?, gender))
    }
}

/// A booking request being assembled from consecutive `book` rows.
struct PendingRequest {
    id: u32,
    request: BookingRequest,
}

/// Outcome of a replayed request: its booking and passenger IDs in row order
/// (`None` for passengers dropped in partial mode).
#[derive(Debug, Clone)]
pub struct ReplayedBooking {
    pub booking_id: BookingId,
    pub passengers: Vec<Option<PassengerId>>,
}

/// Replays booking and cancellation operations from a CSV reader.
///
/// Rows are streamed; invalid rows and rejected operations are logged and skipped,
/// they never stop processing.
///
/// # Errors
///
/// Returns a CSV error only if the reader itself fails.
pub fn process_operations<R: Read>(
    engine: &Engine,
    reader: R,
    allow_partial: bool,
) -> Result<BTreeMap<u32, ReplayedBooking>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let mut replayed = BTreeMap::new();
    let mut pending: Option<PendingRequest> = None;

    for result in rdr.deserialize::<OperationRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping malformed row: {}", e);
                continue;
            }
        };

        match record.op.to_lowercase().as_str() {
            "book" => {
                let (Some(key), Some(passenger)) = (record.key(), record.passenger_request())
                else {
                    debug!("Skipping incomplete book row for request {}", record.request);
                    continue;
                };
                let fare = record.fare.unwrap_or(Decimal::ZERO);

                if let Some(p) = pending
                    .as_mut()
                    .filter(|p| p.id == record.request && p.request.key == key)
                {
                    p.request.total_fare += fare;
                    p.request.passengers.push(passenger);
                    continue;
                }

                flush(engine, pending.take(), allow_partial, &mut replayed);
                pending = Some(PendingRequest {
                    id: record.request,
                    request: BookingRequest {
                        user_id: UserId(record.user.unwrap_or_default()),
                        key,
                        from: StationId(record.from.unwrap_or_default()),
                        to: StationId(record.to.unwrap_or_default()),
                        total_fare: fare,
                        passengers: vec![passenger],
                    },
                });
            }
            "cancel" => {
                flush(engine, pending.take(), allow_partial, &mut replayed);
                cancel(engine, &record, &replayed);
            }
            other => debug!("Skipping unknown operation '{}'", other),
        }
    }
    flush(engine, pending.take(), allow_partial, &mut replayed);

    Ok(replayed)
}

fn flush(
    engine: &Engine,
    pending: Option<PendingRequest>,
    allow_partial: bool,
    replayed: &mut BTreeMap<u32, ReplayedBooking>,
) {
    let Some(PendingRequest { id, request }) = pending else {
        return;
    };
    if replayed.contains_key(&id) {
        warn!("Skipping request {}: request ID already used", id);
        return;
    }
    match engine.submit_booking(request, allow_partial) {
        Ok(result) => {
            replayed.insert(
                id,
                ReplayedBooking {
                    booking_id: result.booking_id,
                    passengers: result.outcomes.iter().map(|o| o.passenger_id()).collect(),
                },
            );
        }
        Err(e) => warn!("Request {} not booked: {}", id, e),
    }
}

fn cancel(engine: &Engine, record: &OperationRecord, replayed: &BTreeMap<u32, ReplayedBooking>) {
    let Some(booking) = replayed.get(&record.request) else {
        warn!("Skipping cancel: request {} was never booked", record.request);
        return;
    };

    let result = match record.passenger {
        Some(index) => {
            let Some(passenger_id) = index
                .checked_sub(1)
                .and_then(|i| booking.passengers.get(i))
                .copied()
                .flatten()
            else {
                warn!(
                    "Skipping cancel: request {} has no admitted passenger {}",
                    record.request, index
                );
                return;
            };
            engine.cancel_passenger(booking.booking_id, passenger_id)
        }
        None => engine.cancel_booking(booking.booking_id),
    };

    if let Err(e) = result {
        warn!("Cancel for request {} failed: {}", record.request, e);
    }
}

/// Passenger status output row.
#[derive(Debug, Serialize)]
struct PassengerRow {
    request: u32,
    pnr: String,
    passenger: u64,
    name: String,
    booking_status: String,
    current_status: String,
}

/// Writes one row per admitted passenger, in request order.
///
/// # CSV Format
///
/// Columns: `request, pnr, passenger, name, booking_status, current_status`
///
/// # Example
///
/// ```csv
/// request,pnr,passenger,name,booking_status,current_status
/// 1,4210000001,1,Meera,CNF 1,CAN
/// 1,4210000001,2,Arjun,RAC 1,CNF 1
/// ```
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_passengers<W: Write>(
    engine: &Engine,
    bookings: &BTreeMap<u32, ReplayedBooking>,
    writer: W,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for (request, replayed) in bookings {
        let Some(booking) = engine.get_booking(replayed.booking_id) else {
            continue;
        };
        for passenger in &booking.passengers {
            wtr.serialize(PassengerRow {
                request: *request,
                pnr: booking.pnr.to_string(),
                passenger: passenger.id.0,
                name: passenger.name.clone(),
                booking_status: passenger.booking_status.to_string(),
                current_status: passenger.current_status.to_string(),
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}
