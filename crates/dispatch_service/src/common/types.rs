/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum_macros::{Display, EnumString};

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct BookingId(pub i64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ConstraintId(pub i64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VehicleInternalId(pub i64);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DriverInternalId(pub i64);
#[derive(Deserialize, Serialize, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Callsign(pub String);
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Hash, Ord)]
pub struct TimeStamp(pub DateTime<Utc>);

impl Callsign {
    /// Trimmed callsign, `None` for blank input.
    pub fn parse(raw: &str) -> Option<Callsign> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Callsign(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Callsign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Callsign(callsign) = self;
        f.write_str(callsign)
    }
}

impl ConstraintId {
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

/// Lifecycle of a booking as reported by the dispatch backend.
#[derive(Debug, Clone, EnumString, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[serde(from = "String", into = "String")]
#[strum(ascii_case_insensitive)]
pub enum BookingType {
    Active,
    Advanced,
    Mobile,
    Dispatched,
    Completed,
    Cancelled,
    #[strum(default)]
    Other(String),
}

impl BookingType {
    /// Types that are actionable on today's board.
    pub fn live() -> Vec<BookingType> {
        vec![
            BookingType::Active,
            BookingType::Advanced,
            BookingType::Mobile,
            BookingType::Dispatched,
        ]
    }

    pub fn is_live(&self) -> bool {
        matches!(
            self,
            BookingType::Active
                | BookingType::Advanced
                | BookingType::Mobile
                | BookingType::Dispatched
        )
    }

    /// Lower is more likely to be the job a vehicle is doing right now.
    pub fn status_rank(&self) -> u8 {
        match self {
            BookingType::Active => 0,
            BookingType::Dispatched => 1,
            BookingType::Advanced => 2,
            BookingType::Mobile => 3,
            BookingType::Completed => 4,
            BookingType::Other(_) => 5,
            BookingType::Cancelled => 6,
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingType::Active => f.write_str("Active"),
            BookingType::Advanced => f.write_str("Advanced"),
            BookingType::Mobile => f.write_str("Mobile"),
            BookingType::Dispatched => f.write_str("Dispatched"),
            BookingType::Completed => f.write_str("Completed"),
            BookingType::Cancelled => f.write_str("Cancelled"),
            BookingType::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<String> for BookingType {
    fn from(raw: String) -> Self {
        BookingType::from_str(raw.trim()).unwrap_or(BookingType::Other(raw))
    }
}

impl From<BookingType> for String {
    fn from(booking_type: BookingType) -> Self {
        booking_type.to_string()
    }
}

/// Live status of a vehicle on the fleet map.
#[derive(Debug, Clone, Copy, EnumString, Display, Serialize, Deserialize, Eq, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum StatusColor {
    #[strum(to_string = "Available", serialize = "green")]
    Available,
    #[strum(to_string = "Busy", serialize = "red", serialize = "amber")]
    Busy,
    #[strum(to_string = "Offline", serialize = "grey", serialize = "gray")]
    Offline,
    Unknown,
}

impl StatusColor {
    pub fn parse_lossy(raw: &str) -> StatusColor {
        StatusColor::from_str(raw.trim()).unwrap_or(StatusColor::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[strum(ascii_case_insensitive)]
pub enum ConstraintKind {
    Driver,
    Vehicle,
}

/// A booking restriction as sent by the dispatch backend. The id is an internal key of the
/// backend, never a callsign, and the tag says which table it was meant for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, Hash, PartialEq)]
#[serde(tag = "kind", content = "constraintId")]
pub enum Constraint {
    Driver(ConstraintId),
    Vehicle(ConstraintId),
}

impl Constraint {
    pub fn new(kind: ConstraintKind, id: ConstraintId) -> Constraint {
        match kind {
            ConstraintKind::Driver => Constraint::Driver(id),
            ConstraintKind::Vehicle => Constraint::Vehicle(id),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Driver(_) => ConstraintKind::Driver,
            Constraint::Vehicle(_) => ConstraintKind::Vehicle,
        }
    }

    pub fn id(&self) -> ConstraintId {
        match self {
            Constraint::Driver(id) | Constraint::Vehicle(id) => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, Eq, Hash, PartialEq)]
pub enum ResolutionMethod {
    #[serde(rename = "DirectID")]
    #[strum(serialize = "DirectID")]
    DirectId,
    CrossKind,
    LicenseRoster,
    UpstreamAssignment,
    Unresolved,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub price: Option<f64>,
    pub cost: Option<f64>,
    pub extras: Option<f64>,
}

impl Pricing {
    /// Fare shown to operators: the quoted price, else the driver cost.
    pub fn display_price(&self) -> Option<f64> {
        self.price.or(self.cost)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedDriver {
    pub internal_id: Option<DriverInternalId>,
    pub callsign: Option<Callsign>,
    pub name: Option<String>,
}

impl AssignedDriver {
    pub fn is_populated(&self) -> bool {
        self.callsign.is_some() || self.internal_id.is_some_and(|DriverInternalId(id)| id > 0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedVehicle {
    pub internal_id: Option<VehicleInternalId>,
    pub callsign: Option<Callsign>,
    pub registration: Option<String>,
}

impl AssignedVehicle {
    pub fn is_populated(&self) -> bool {
        self.callsign.is_some() || self.internal_id.is_some_and(|VehicleInternalId(id)| id > 0)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub pickup_address: String,
    pub destination_address: String,
    pub pickup_due_time: TimeStamp,
    pub booking_type: BookingType,
    pub driver_constraints: Vec<ConstraintId>,
    pub vehicle_constraints: Vec<ConstraintId>,
    pub assigned_driver: Option<AssignedDriver>,
    pub assigned_vehicle: Option<AssignedVehicle>,
    pub pricing: Pricing,
    pub customer_name: Option<String>,
    pub passengers: Option<u32>,
    pub notes: Option<String>,
}

impl Booking {
    // Only the first entry of each constraint list is authoritative.
    pub fn driver_constraint(&self) -> Option<Constraint> {
        self.driver_constraints.first().copied().map(Constraint::Driver)
    }

    pub fn vehicle_constraint(&self) -> Option<Constraint> {
        self.vehicle_constraints.first().copied().map(Constraint::Vehicle)
    }

    pub fn direct_driver(&self) -> Option<&AssignedDriver> {
        self.assigned_driver
            .as_ref()
            .filter(|driver| driver.is_populated())
    }

    pub fn direct_vehicle(&self) -> Option<&AssignedVehicle> {
        self.assigned_vehicle
            .as_ref()
            .filter(|vehicle| vehicle.is_populated())
    }

    pub fn has_direct_assignment(&self) -> bool {
        self.direct_driver().is_some() || self.direct_vehicle().is_some()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetVehicle {
    pub internal_id: VehicleInternalId,
    pub callsign: Callsign,
    pub driver_id: Option<DriverInternalId>,
    pub driver_name: Option<String>,
    pub driver_callsign: Option<Callsign>,
    pub status_color: StatusColor,
}

impl FleetVehicle {
    /// Drivers are addressed by the callsign of the unit they drive unless the backend
    /// reports a separate driver callsign.
    pub fn driver_callsign(&self) -> &Callsign {
        self.driver_callsign.as_ref().unwrap_or(&self.callsign)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FleetSnapshot {
    pub vehicles: Vec<FleetVehicle>,
    pub captured_at: TimeStamp,
}

impl FleetSnapshot {
    pub fn vehicle_by_callsign(&self, callsign: &Callsign) -> Option<&FleetVehicle> {
        self.vehicles
            .iter()
            .find(|vehicle| &vehicle.callsign == callsign)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LicenseRecord {
    pub driver_callsign: Callsign,
    pub driver_name: String,
    pub vehicle_callsign: Callsign,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConstraint {
    pub callsign: Callsign,
    pub name: Option<String>,
    pub method: ResolutionMethod,
    /// Callsign of the vehicle the match belongs to. Differs from `callsign` when a driver
    /// constraint resolves to a driver who carries a callsign of their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Callsign>,
}

/// Outcome for one constraint slot of a booking. `Unresolved` keeps the raw id so that it
/// can be shown for debugging, but it is never a callsign.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "state")]
pub enum ConstraintResolution {
    Resolved(ResolvedConstraint),
    Unresolved {
        kind: ConstraintKind,
        #[serde(rename = "constraintId")]
        constraint_id: ConstraintId,
        #[serde(rename = "displayLabel")]
        display_label: String,
    },
    NotRequested,
}

impl ConstraintResolution {
    pub fn unresolved(constraint: Constraint) -> ConstraintResolution {
        let ConstraintId(id) = constraint.id();
        ConstraintResolution::Unresolved {
            kind: constraint.kind(),
            constraint_id: constraint.id(),
            display_label: format!("{} #{id} (unresolved)", constraint.kind()),
        }
    }

    pub fn resolved(&self) -> Option<&ResolvedConstraint> {
        match self {
            ConstraintResolution::Resolved(resolved) => Some(resolved),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved().is_some()
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAssignment {
    pub booking_id: BookingId,
    pub resolved_driver_callsign: Option<Callsign>,
    pub resolved_vehicle_callsign: Option<Callsign>,
    pub method: ResolutionMethod,
    pub driver: ConstraintResolution,
    pub vehicle: ConstraintResolution,
}

impl ResolvedAssignment {
    pub fn is_assigned(&self) -> bool {
        self.method != ResolutionMethod::Unresolved
    }

    /// True when either slot resolved to `callsign` itself or to the vehicle carrying it.
    pub fn matches_callsign(&self, callsign: &Callsign) -> bool {
        self.resolved_vehicle_callsign.as_ref() == Some(callsign)
            || self.resolved_driver_callsign.as_ref() == Some(callsign)
            || [&self.driver, &self.vehicle]
                .into_iter()
                .filter_map(|slot| slot.resolved()?.unit.as_ref())
                .any(|unit| unit == callsign)
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedBooking {
    pub booking: Booking,
    pub assignment: ResolvedAssignment,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedBookings {
    pub assigned: Vec<ClassifiedBooking>,
    pub unassigned: Vec<ClassifiedBooking>,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobDetails {
    pub booking_id: BookingId,
    pub customer_name: Option<String>,
    pub pickup_address: String,
    pub destination_address: String,
    pub price: Option<f64>,
    pub status: BookingType,
    pub pickup_time: TimeStamp,
    pub matched_by: ResolutionMethod,
}

/// Result of looking up what a single vehicle is doing. A busy vehicle without a booking
/// is reported as `StreetJob` before the broadened search runs.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CurrentJob {
    Booked(JobDetails),
    StreetJob {
        vehicle: Callsign,
        #[serde(rename = "driverName")]
        driver_name: Option<String>,
    },
    NoJob {
        vehicle: Callsign,
    },
}
