/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::{dispatch_window::TimeWindow, types::*};
use crate::tools::{error::AppError, prometheus::FLEET_DATA_ANOMALIES};

/// What to ask the booking search for. An empty `booking_types` means every type.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSearchQuery {
    pub window: TimeWindow,
    pub booking_types: Vec<BookingType>,
}

impl BookingSearchQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        let TimeStamp(pickup_due_time) = booking.pickup_due_time;
        self.window.contains(pickup_due_time)
            && (self.booking_types.is_empty() || self.booking_types.contains(&booking.booking_type))
    }

    pub fn to_request(&self) -> BookingSearchRequest {
        BookingSearchRequest {
            from: self.window.from,
            to: self.window.to,
            booking_types: self.booking_types.to_owned(),
        }
    }
}

// Booking search
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingSearchRequest {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub booking_types: Vec<BookingType>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BookingSearchResponse {
    pub bookings: Option<Vec<RawBooking>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawBooking {
    pub id: Option<i64>,
    pub pickup_due_time: Option<DateTime<Utc>>,
    pub booking_type: Option<String>,
    pub driver_constraints: Option<Vec<i64>>,
    pub vehicle_constraints: Option<Vec<i64>>,
    pub assigned_driver: Option<RawAssignedDriver>,
    pub assigned_vehicle: Option<RawAssignedVehicle>,
    pub pricing: Option<Pricing>,
    pub pickup: Option<String>,
    pub destination: Option<String>,
    pub name: Option<String>,
    pub passengers: Option<u32>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignedDriver {
    pub id: Option<i64>,
    pub callsign: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawAssignedVehicle {
    pub id: Option<i64>,
    pub callsign: Option<String>,
    pub registration: Option<String>,
}

impl TryFrom<RawBooking> for Booking {
    type Error = AppError;

    fn try_from(raw: RawBooking) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .ok_or(AppError::MalformedRecord("booking without id".to_string()))?;
        let pickup_due_time = raw.pickup_due_time.ok_or(AppError::MalformedRecord(format!(
            "booking {id} without pickupDueTime"
        )))?;
        let booking_type = raw
            .booking_type
            .filter(|booking_type| !booking_type.trim().is_empty())
            .ok_or(AppError::MalformedRecord(format!(
                "booking {id} without bookingType"
            )))?;

        Ok(Booking {
            id: BookingId(id),
            pickup_address: raw.pickup.unwrap_or_default(),
            destination_address: raw.destination.unwrap_or_default(),
            pickup_due_time: TimeStamp(pickup_due_time),
            booking_type: BookingType::from(booking_type),
            driver_constraints: raw
                .driver_constraints
                .unwrap_or_default()
                .into_iter()
                .map(ConstraintId)
                .collect(),
            vehicle_constraints: raw
                .vehicle_constraints
                .unwrap_or_default()
                .into_iter()
                .map(ConstraintId)
                .collect(),
            assigned_driver: raw.assigned_driver.map(|driver| AssignedDriver {
                internal_id: driver.id.map(DriverInternalId),
                callsign: driver.callsign.as_deref().and_then(Callsign::parse),
                name: non_blank(driver.name),
            }),
            assigned_vehicle: raw.assigned_vehicle.map(|vehicle| AssignedVehicle {
                internal_id: vehicle.id.map(VehicleInternalId),
                callsign: vehicle.callsign.as_deref().and_then(Callsign::parse),
                registration: non_blank(vehicle.registration),
            }),
            pricing: raw.pricing.unwrap_or_default(),
            customer_name: non_blank(raw.name),
            passengers: raw.passengers,
            notes: non_blank(raw.notes),
        })
    }
}

// Fleet snapshot
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FleetSnapshotResponse {
    pub vehicles: Option<Vec<RawFleetVehicle>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawFleetVehicle {
    pub internal_id: Option<i64>,
    pub callsign: Option<String>,
    pub driver_id: Option<i64>,
    pub driver_name: Option<String>,
    pub driver_callsign: Option<String>,
    pub status_color: Option<String>,
}

impl TryFrom<RawFleetVehicle> for FleetVehicle {
    type Error = AppError;

    fn try_from(raw: RawFleetVehicle) -> Result<Self, Self::Error> {
        let internal_id = raw
            .internal_id
            .ok_or(AppError::MalformedRecord("vehicle without internalId".to_string()))?;
        let callsign = raw
            .callsign
            .as_deref()
            .and_then(Callsign::parse)
            .ok_or(AppError::MalformedRecord(format!(
                "vehicle {internal_id} without callsign"
            )))?;

        Ok(FleetVehicle {
            internal_id: VehicleInternalId(internal_id),
            callsign,
            driver_id: raw.driver_id.filter(|id| *id > 0).map(DriverInternalId),
            driver_name: non_blank(raw.driver_name),
            driver_callsign: raw.driver_callsign.as_deref().and_then(Callsign::parse),
            status_color: raw
                .status_color
                .as_deref()
                .map(StatusColor::parse_lossy)
                .unwrap_or(StatusColor::Unknown),
        })
    }
}

/// Converts wire bookings, dropping the ones that miss a required field.
pub fn bookings_from_wire(raw_bookings: Vec<RawBooking>) -> Vec<Booking> {
    raw_bookings
        .into_iter()
        .filter_map(|raw| {
            Booking::try_from(raw)
                .map_err(|err| skipped("booking_search", err))
                .ok()
        })
        .collect()
}

/// Converts wire vehicles, dropping the ones without an internal id or callsign.
pub fn fleet_from_wire(raw_vehicles: Vec<RawFleetVehicle>, captured_at: DateTime<Utc>) -> FleetSnapshot {
    FleetSnapshot {
        vehicles: raw_vehicles
            .into_iter()
            .filter_map(|raw| {
                FleetVehicle::try_from(raw)
                    .map_err(|err| skipped("fleet_snapshot", err))
                    .ok()
            })
            .collect(),
        captured_at: TimeStamp(captured_at),
    }
}

fn skipped(source: &str, err: AppError) {
    warn!(tag = "[Skipped Malformed Record]", source = source, reason = %err.message());
    FLEET_DATA_ANOMALIES
        .with_label_values(&[source, "malformed_record"])
        .inc();
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
