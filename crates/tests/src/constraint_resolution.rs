/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::support::*;
use dispatch_service::common::{
    constraint_resolver::{resolve, ConstraintResolver},
    license_roster::LicenseRoster,
    types::*,
};

#[test]
fn test_vehicle_constraint_matching_internal_id_resolves_directly() {
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();

    let resolved = resolve(ConstraintId(385), ConstraintKind::Vehicle, &fleet, &roster)
        .expect("385 is a known vehicle");

    assert_eq!(resolved.callsign, callsign("997"));
    assert_eq!(resolved.method, ResolutionMethod::DirectId);
    assert_eq!(resolved.name, Some("Ada Mensah".to_string()));
}

#[test]
fn test_every_fleet_internal_id_resolves_to_its_own_callsign() {
    let fleet = fleet(vec![
        vehicle(1, "A1", Some(101), "One", StatusColor::Available),
        vehicle(2, "B2", Some(102), "Two", StatusColor::Busy),
        vehicle(3, "C3", None, "Three", StatusColor::Offline),
        vehicle(4, "D4", Some(104), "Four", StatusColor::Unknown),
    ]);
    let roster = LicenseRoster::empty();

    for fleet_vehicle in &fleet.vehicles {
        let VehicleInternalId(id) = fleet_vehicle.internal_id;
        let resolved = resolve(ConstraintId(id), ConstraintKind::Vehicle, &fleet, &roster)
            .expect("fleet vehicle resolves");
        assert_eq!(resolved.callsign, fleet_vehicle.callsign);
        assert_eq!(resolved.method, ResolutionMethod::DirectId);
    }

    for fleet_vehicle in &fleet.vehicles {
        if let Some(DriverInternalId(id)) = fleet_vehicle.driver_id {
            let resolved = resolve(ConstraintId(id), ConstraintKind::Driver, &fleet, &roster)
                .expect("fleet driver resolves");
            assert_eq!(resolved.callsign, fleet_vehicle.callsign);
            assert_eq!(resolved.method, ResolutionMethod::DirectId);
        }
    }
}

#[test]
fn test_vehicle_constraint_holding_a_driver_id_resolves_cross_kind() {
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();

    let resolved = resolve(ConstraintId(525), ConstraintKind::Vehicle, &fleet, &roster)
        .expect("525 is the driver of 997");

    assert_eq!(resolved.callsign, callsign("997"));
    assert_eq!(resolved.method, ResolutionMethod::CrossKind);
}

#[test]
fn test_driver_constraint_is_not_retried_as_vehicle_id() {
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = LicenseRoster::empty();

    assert!(resolve(ConstraintId(385), ConstraintKind::Driver, &fleet, &roster).is_none());
}

#[test]
fn test_driver_callsign_is_preferred_when_the_fleet_reports_one() {
    let mut unit = vehicle(20, "V20", Some(220), "Lena Berg", StatusColor::Available);
    unit.driver_callsign = Some(callsign("D220"));
    let fleet = fleet(vec![unit]);
    let roster = LicenseRoster::empty();

    let resolved = resolve(ConstraintId(220), ConstraintKind::Driver, &fleet, &roster)
        .expect("driver 220 resolves");

    assert_eq!(resolved.callsign, callsign("D220"));
    assert_eq!(resolved.unit, Some(callsign("V20")));
}

#[test]
fn test_offline_units_resolve_through_the_license_roster() {
    let fleet = fleet(Vec::new());
    let roster = roster(&[("1207", "Priya Raman", "88"), ("412", "Tomasz Nowak", "412")]);

    let driver = resolve(ConstraintId(1207), ConstraintKind::Driver, &fleet, &roster)
        .expect("driver column match");
    assert_eq!(driver.callsign, callsign("1207"));
    assert_eq!(driver.name, Some("Priya Raman".to_string()));
    assert_eq!(driver.method, ResolutionMethod::LicenseRoster);

    let vehicle = resolve(ConstraintId(88), ConstraintKind::Vehicle, &fleet, &roster)
        .expect("vehicle column match");
    assert_eq!(vehicle.callsign, callsign("88"));
    assert_eq!(vehicle.method, ResolutionMethod::LicenseRoster);

    // No vehicle 1207 on the roster, but driver 1207 drives unit 88.
    let other_column = resolve(ConstraintId(1207), ConstraintKind::Vehicle, &fleet, &roster)
        .expect("other column match");
    assert_eq!(other_column.callsign, callsign("88"));
}

#[test]
fn test_live_fleet_wins_over_the_roster() {
    let fleet = fleet_with_997(StatusColor::Available);
    let roster = roster(&[("385", "Roster Name", "385")]);

    let resolved = resolve(ConstraintId(385), ConstraintKind::Vehicle, &fleet, &roster)
        .expect("resolves");

    assert_eq!(resolved.callsign, callsign("997"));
    assert_eq!(resolved.method, ResolutionMethod::DirectId);
}

#[test]
fn test_unknown_constraint_is_unresolved_and_never_a_callsign() {
    let fleet = fleet_with_997(StatusColor::Busy);
    let roster = roster(&[("1207", "Priya Raman", "88")]);

    assert!(resolve(ConstraintId(99999), ConstraintKind::Driver, &fleet, &roster).is_none());
    assert!(resolve(ConstraintId(99999), ConstraintKind::Vehicle, &fleet, &roster).is_none());

    let resolution =
        ConstraintResolver::new(&fleet, &roster).resolve(Constraint::Driver(ConstraintId(99999)));
    match resolution {
        ConstraintResolution::Unresolved {
            kind,
            constraint_id,
            display_label,
        } => {
            assert_eq!(kind, ConstraintKind::Driver);
            assert_eq!(constraint_id, ConstraintId(99999));
            assert_eq!(display_label, "Driver #99999 (unresolved)");
        }
        other => panic!("expected unresolved, got {other:?}"),
    }
}

#[test]
fn test_non_positive_constraints_are_unresolved() {
    let fleet = fleet(vec![vehicle(0, "ZERO", Some(0), "Nobody", StatusColor::Busy)]);
    let roster = roster(&[("0", "Nobody", "0"), ("-3", "Negative", "-3")]);

    for id in [0, -3] {
        assert!(resolve(ConstraintId(id), ConstraintKind::Vehicle, &fleet, &roster).is_none());
        assert!(resolve(ConstraintId(id), ConstraintKind::Driver, &fleet, &roster).is_none());
    }
}

#[test]
fn test_duplicate_internal_ids_keep_the_first_vehicle() {
    let fleet = fleet(vec![
        vehicle(10, "FIRST", Some(900), "First Driver", StatusColor::Available),
        vehicle(10, "SECOND", Some(900), "Second Driver", StatusColor::Available),
    ]);
    let roster = LicenseRoster::empty();
    let resolver = ConstraintResolver::new(&fleet, &roster);

    let by_vehicle = resolver.resolve(Constraint::Vehicle(ConstraintId(10)));
    let by_driver = resolver.resolve(Constraint::Driver(ConstraintId(900)));

    assert_eq!(
        by_vehicle.resolved().map(|resolved| resolved.callsign.to_owned()),
        Some(callsign("FIRST"))
    );
    assert_eq!(
        by_driver.resolved().map(|resolved| resolved.callsign.to_owned()),
        Some(callsign("FIRST"))
    );
    assert_eq!(resolver.duplicate_vehicle_ids(), &[VehicleInternalId(10)]);
    assert_eq!(resolver.duplicate_driver_ids(), &[DriverInternalId(900)]);
}
