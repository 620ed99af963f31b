/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{constraint_resolver::ConstraintResolver, types::*};
use tracing::debug;

/// Works out who a booking is assigned to.
///
/// A populated upstream `assignedDriver`/`assignedVehicle` wins outright. Slots without an
/// upstream structure fall back to the first entry of the matching constraint list.
pub fn resolve_assignment(booking: &Booking, resolver: &ConstraintResolver) -> ResolvedAssignment {
    let driver = match booking.direct_driver() {
        Some(AssignedDriver {
            callsign: Some(callsign),
            name,
            ..
        }) => upstream(
            callsign,
            name.to_owned(),
            resolver
                .vehicle_driven_by(callsign)
                .map(|vehicle| vehicle.callsign.to_owned()),
        ),
        Some(AssignedDriver {
            internal_id: Some(DriverInternalId(id)),
            ..
        }) => resolver.resolve(Constraint::Driver(ConstraintId(*id))),
        _ => slot(booking.driver_constraint(), resolver),
    };

    let vehicle = match booking.direct_vehicle() {
        Some(AssignedVehicle {
            callsign: Some(callsign),
            ..
        }) => upstream(callsign, None, Some(callsign.to_owned())),
        Some(AssignedVehicle {
            internal_id: Some(VehicleInternalId(id)),
            ..
        }) => resolver.resolve(Constraint::Vehicle(ConstraintId(*id))),
        _ => slot(booking.vehicle_constraint(), resolver),
    };

    let method = if booking.has_direct_assignment() {
        ResolutionMethod::UpstreamAssignment
    } else {
        vehicle
            .resolved()
            .or(driver.resolved())
            .map(|resolved| resolved.method)
            .unwrap_or(ResolutionMethod::Unresolved)
    };

    ResolvedAssignment {
        booking_id: booking.id,
        resolved_driver_callsign: driver.resolved().map(|resolved| resolved.callsign.to_owned()),
        resolved_vehicle_callsign: vehicle
            .resolved()
            .map(|resolved| resolved.callsign.to_owned()),
        method,
        driver,
        vehicle,
    }
}

/// Splits bookings into assigned and unassigned, keeping input order in both lists.
///
/// A booking is assigned when the backend already carries a direct assignment or when
/// either its driver or vehicle constraint resolves. The output depends only on the
/// bookings and the resolver's snapshot, so repeated calls give the same partition.
pub fn classify(bookings: &[Booking], resolver: &ConstraintResolver) -> ClassifiedBookings {
    let mut classified = ClassifiedBookings::default();

    for booking in bookings {
        let assignment = resolve_assignment(booking, resolver);
        debug!(tag = "[Booking Classified]", booking_id = booking.id.0, method = %assignment.method);

        let entry = ClassifiedBooking {
            booking: booking.to_owned(),
            assignment,
        };
        if entry.assignment.is_assigned() {
            classified.assigned.push(entry);
        } else {
            classified.unassigned.push(entry);
        }
    }

    classified
}

fn upstream(
    callsign: &Callsign,
    name: Option<String>,
    unit: Option<Callsign>,
) -> ConstraintResolution {
    ConstraintResolution::Resolved(ResolvedConstraint {
        callsign: callsign.to_owned(),
        name,
        method: ResolutionMethod::UpstreamAssignment,
        unit,
    })
}

fn slot(constraint: Option<Constraint>, resolver: &ConstraintResolver) -> ConstraintResolution {
    match constraint {
        Some(constraint) => resolver.resolve(constraint),
        None => ConstraintResolution::NotRequested,
    }
}
