/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use super::{license_roster::LicenseRoster, types::*};
use crate::tools::prometheus::{CONSTRAINT_RESOLUTIONS, FLEET_DATA_ANOMALIES};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// Maps booking constraints onto callsigns using a fleet snapshot and the license roster.
///
/// The constraint values sent by the dispatch backend are its own internal keys, so the
/// snapshot is indexed by internal vehicle and driver ids rather than by callsign. Lookup
/// order, first hit wins:
///
/// 1. `DirectID` - internal id of the constraint's own kind.
/// 2. `CrossKind` - vehicle constraints that match no vehicle are retried as driver ids,
///    the backend sometimes files a driver id under the vehicle list.
/// 3. `LicenseRoster` - the id read as a literal callsign, for units that are offline.
/// 4. Unresolved.
///
/// A resolver only borrows its inputs and holds no mutable state, one is built per request.
#[derive(Debug)]
pub struct ConstraintResolver<'a> {
    fleet: &'a FleetSnapshot,
    roster: &'a LicenseRoster,
    by_vehicle_id: FxHashMap<i64, usize>,
    by_driver_id: FxHashMap<i64, usize>,
    duplicate_vehicle_ids: Vec<VehicleInternalId>,
    duplicate_driver_ids: Vec<DriverInternalId>,
}

impl<'a> ConstraintResolver<'a> {
    pub fn new(fleet: &'a FleetSnapshot, roster: &'a LicenseRoster) -> ConstraintResolver<'a> {
        let mut by_vehicle_id = FxHashMap::default();
        let mut by_driver_id = FxHashMap::default();
        let mut duplicate_vehicle_ids = Vec::new();
        let mut duplicate_driver_ids = Vec::new();

        for (idx, vehicle) in fleet.vehicles.iter().enumerate() {
            let VehicleInternalId(vehicle_id) = vehicle.internal_id;
            if by_vehicle_id.contains_key(&vehicle_id) {
                warn!(tag = "[Fleet Snapshot - Duplicate Vehicle Id]", internal_id = vehicle_id, callsign = %vehicle.callsign);
                FLEET_DATA_ANOMALIES
                    .with_label_values(&["fleet_snapshot", "duplicate_vehicle_id"])
                    .inc();
                duplicate_vehicle_ids.push(vehicle.internal_id);
            } else {
                by_vehicle_id.insert(vehicle_id, idx);
            }

            if let Some(driver_id @ DriverInternalId(id)) = vehicle.driver_id {
                if id <= 0 {
                    continue;
                }
                if by_driver_id.contains_key(&id) {
                    warn!(tag = "[Fleet Snapshot - Duplicate Driver Id]", driver_id = id, callsign = %vehicle.callsign);
                    FLEET_DATA_ANOMALIES
                        .with_label_values(&["fleet_snapshot", "duplicate_driver_id"])
                        .inc();
                    duplicate_driver_ids.push(driver_id);
                } else {
                    by_driver_id.insert(id, idx);
                }
            }
        }

        ConstraintResolver {
            fleet,
            roster,
            by_vehicle_id,
            by_driver_id,
            duplicate_vehicle_ids,
            duplicate_driver_ids,
        }
    }

    /// Resolves one constraint into a tagged outcome. Never fails.
    pub fn resolve(&self, constraint: Constraint) -> ConstraintResolution {
        let resolution = match self.lookup(constraint) {
            Some(resolved) => ConstraintResolution::Resolved(resolved),
            None => ConstraintResolution::unresolved(constraint),
        };

        let method = resolution
            .resolved()
            .map(|resolved| resolved.method)
            .unwrap_or(ResolutionMethod::Unresolved);
        debug!(tag = "[Constraint Resolution]", kind = %constraint.kind(), constraint_id = constraint.id().0, method = %method);
        CONSTRAINT_RESOLUTIONS
            .with_label_values(&[
                constraint.kind().to_string().as_str(),
                method.to_string().as_str(),
            ])
            .inc();

        resolution
    }

    pub fn duplicate_vehicle_ids(&self) -> &[VehicleInternalId] {
        &self.duplicate_vehicle_ids
    }

    pub fn duplicate_driver_ids(&self) -> &[DriverInternalId] {
        &self.duplicate_driver_ids
    }

    fn lookup(&self, constraint: Constraint) -> Option<ResolvedConstraint> {
        let ConstraintId(id) = constraint.id();
        if id <= 0 {
            return None;
        }

        let live = match constraint {
            Constraint::Vehicle(_) => self
                .vehicle_with_id(id)
                .map(|vehicle| as_vehicle(vehicle, ResolutionMethod::DirectId))
                .or_else(|| {
                    self.vehicle_with_driver_id(id)
                        .map(|vehicle| as_driver(vehicle, ResolutionMethod::CrossKind))
                }),
            Constraint::Driver(_) => self
                .vehicle_with_driver_id(id)
                .map(|vehicle| as_driver(vehicle, ResolutionMethod::DirectId)),
        };

        live.or_else(|| self.from_roster(constraint))
    }

    /// Vehicle currently driven by the driver with this callsign, if any.
    pub fn vehicle_driven_by(&self, driver_callsign: &Callsign) -> Option<&FleetVehicle> {
        self.fleet
            .vehicles
            .iter()
            .find(|vehicle| vehicle.driver_callsign() == driver_callsign)
    }

    fn vehicle_with_id(&self, id: i64) -> Option<&FleetVehicle> {
        self.by_vehicle_id
            .get(&id)
            .and_then(|idx| self.fleet.vehicles.get(*idx))
    }

    fn vehicle_with_driver_id(&self, id: i64) -> Option<&FleetVehicle> {
        self.by_driver_id
            .get(&id)
            .and_then(|idx| self.fleet.vehicles.get(*idx))
    }

    fn from_roster(&self, constraint: Constraint) -> Option<ResolvedConstraint> {
        let ConstraintId(id) = constraint.id();
        let literal = Callsign(id.to_string());

        let (record, callsign) = match constraint {
            Constraint::Driver(_) => self
                .roster
                .by_driver_callsign(&literal)
                .or_else(|| self.roster.by_vehicle_callsign(&literal))
                .map(|record| (record, record.driver_callsign.to_owned()))?,
            Constraint::Vehicle(_) => self
                .roster
                .by_vehicle_callsign(&literal)
                .or_else(|| self.roster.by_driver_callsign(&literal))
                .map(|record| (record, record.vehicle_callsign.to_owned()))?,
        };

        Some(ResolvedConstraint {
            callsign,
            name: Some(record.driver_name.to_owned()).filter(|name| !name.is_empty()),
            method: ResolutionMethod::LicenseRoster,
            unit: Some(record.vehicle_callsign.to_owned()),
        })
    }
}

fn as_vehicle(vehicle: &FleetVehicle, method: ResolutionMethod) -> ResolvedConstraint {
    ResolvedConstraint {
        callsign: vehicle.callsign.to_owned(),
        name: vehicle.driver_name.to_owned(),
        method,
        unit: Some(vehicle.callsign.to_owned()),
    }
}

fn as_driver(vehicle: &FleetVehicle, method: ResolutionMethod) -> ResolvedConstraint {
    ResolvedConstraint {
        callsign: vehicle.driver_callsign().to_owned(),
        name: vehicle.driver_name.to_owned(),
        method,
        unit: Some(vehicle.callsign.to_owned()),
    }
}

/// One-shot form of [`ConstraintResolver::resolve`]: `None` when the constraint is unresolved.
pub fn resolve(
    constraint_id: ConstraintId,
    kind: ConstraintKind,
    fleet: &FleetSnapshot,
    roster: &LicenseRoster,
) -> Option<ResolvedConstraint> {
    match ConstraintResolver::new(fleet, roster).resolve(Constraint::new(kind, constraint_id)) {
        ConstraintResolution::Resolved(resolved) => Some(resolved),
        _ => None,
    }
}
