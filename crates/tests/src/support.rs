/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dispatch_service::{
    common::{license_roster::LicenseRoster, types::*},
    outbound::{types::BookingSearchQuery, DispatchBackend},
    tools::error::AppError,
};
use std::sync::Mutex;

/// Dispatch backend double. Searches honour the query window and types the way the real
/// backend does and every query is recorded for inspection.
pub struct InMemoryBackend {
    bookings: Vec<Booking>,
    fleet: FleetSnapshot,
    failing: bool,
    search_delay: Option<std::time::Duration>,
    queries: Mutex<Vec<BookingSearchQuery>>,
}

impl InMemoryBackend {
    pub fn new(bookings: Vec<Booking>, fleet: FleetSnapshot) -> Self {
        InMemoryBackend {
            bookings,
            fleet,
            failing: false,
            search_delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(fleet: FleetSnapshot) -> Self {
        InMemoryBackend {
            failing: true,
            ..InMemoryBackend::new(Vec::new(), fleet)
        }
    }

    pub fn slow(bookings: Vec<Booking>, fleet: FleetSnapshot, delay: std::time::Duration) -> Self {
        InMemoryBackend {
            search_delay: Some(delay),
            ..InMemoryBackend::new(bookings, fleet)
        }
    }

    pub fn queries(&self) -> Vec<BookingSearchQuery> {
        self.queries.lock().expect("queries lock").to_owned()
    }
}

#[async_trait]
impl DispatchBackend for InMemoryBackend {
    async fn search_bookings(&self, query: &BookingSearchQuery) -> Result<Vec<Booking>, AppError> {
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_owned());

        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(AppError::ExternalAPICallError(
                "503 Service Unavailable".to_string(),
            ));
        }

        Ok(self
            .bookings
            .iter()
            .filter(|booking| query.matches(booking))
            .cloned()
            .collect())
    }

    async fn fleet_snapshot(&self) -> Result<FleetSnapshot, AppError> {
        if self.failing {
            return Err(AppError::ExternalAPICallError(
                "503 Service Unavailable".to_string(),
            ));
        }
        Ok(self.fleet.to_owned())
    }
}

pub fn callsign(raw: &str) -> Callsign {
    Callsign(raw.to_string())
}

pub fn vehicle(
    internal_id: i64,
    vehicle_callsign: &str,
    driver_id: Option<i64>,
    driver_name: &str,
    status_color: StatusColor,
) -> FleetVehicle {
    FleetVehicle {
        internal_id: VehicleInternalId(internal_id),
        callsign: callsign(vehicle_callsign),
        driver_id: driver_id.map(DriverInternalId),
        driver_name: Some(driver_name.to_string()),
        driver_callsign: None,
        status_color,
    }
}

pub fn fleet(vehicles: Vec<FleetVehicle>) -> FleetSnapshot {
    FleetSnapshot {
        vehicles,
        captured_at: TimeStamp(Utc::now()),
    }
}

/// The fleet from the worked example: unit 997 is vehicle 385, driven by driver 525.
pub fn fleet_with_997(status_color: StatusColor) -> FleetSnapshot {
    fleet(vec![
        vehicle(385, "997", Some(525), "Ada Mensah", status_color),
        vehicle(412, "412", Some(530), "Tomasz Nowak", StatusColor::Available),
    ])
}

/// Same fleet, but the backend gives driver 525 a callsign of their own.
pub fn fleet_with_997_driven_by_d997(status_color: StatusColor) -> FleetSnapshot {
    let mut fleet = fleet_with_997(status_color);
    fleet.vehicles[0].driver_callsign = Some(callsign("D997"));
    fleet
}

pub fn roster(rows: &[(&str, &str, &str)]) -> LicenseRoster {
    LicenseRoster::new(
        rows.iter()
            .map(|(driver_callsign, driver_name, vehicle_callsign)| LicenseRecord {
                driver_callsign: callsign(driver_callsign),
                driver_name: driver_name.to_string(),
                vehicle_callsign: callsign(vehicle_callsign),
            })
            .collect(),
    )
}

pub fn booking(
    id: i64,
    now: DateTime<Utc>,
    minutes_from_now: i64,
    booking_type: BookingType,
) -> Booking {
    Booking {
        id: BookingId(id),
        pickup_address: format!("{id} Harbour Road"),
        destination_address: "Central Station".to_string(),
        pickup_due_time: TimeStamp(now + Duration::minutes(minutes_from_now)),
        booking_type,
        driver_constraints: Vec::new(),
        vehicle_constraints: Vec::new(),
        assigned_driver: None,
        assigned_vehicle: None,
        pricing: Pricing {
            price: Some(24.5),
            cost: None,
            extras: None,
        },
        customer_name: Some(format!("Customer {id}")),
        passengers: Some(1),
        notes: None,
    }
}

pub fn with_vehicle_constraint(mut booking: Booking, constraint_id: i64) -> Booking {
    booking.vehicle_constraints = vec![ConstraintId(constraint_id)];
    booking
}

pub fn with_driver_constraint(mut booking: Booking, constraint_id: i64) -> Booking {
    booking.driver_constraints = vec![ConstraintId(constraint_id)];
    booking
}
